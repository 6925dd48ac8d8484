/// Data models for board-service
///
/// This module defines structures for:
/// - Post: a discussion thread head, optionally closed to comments
/// - Comment: a comment on a post, optionally replying to another comment
/// - Page: normalized limit/offset pagination
///
/// Identifiers are `i64` internally and cross the service boundary as opaque
/// strings, both as inputs (`parse_id`) and when serialized.
use crate::error::{BoardError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page size used when the caller omits a limit or passes a non-positive one
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Post entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(with = "opaque_id")]
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub comments_enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Comment entity - `parent_id == None` marks a root comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(with = "opaque_id")]
    pub id: i64,
    #[serde(with = "opaque_id")]
    pub post_id: i64,
    #[serde(
        with = "opaque_id_opt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<i64>,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Input for post creation
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: String,
    pub comments_enabled: bool,
}

/// Input for comment creation, identifiers already resolved
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub author: String,
    pub content: String,
}

/// Limit/offset window over a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Apply listing defaults: limit falls back to `DEFAULT_PAGE_LIMIT` when
    /// absent or <= 0, offset falls back to 0 when absent or negative.
    pub fn normalize(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = match limit {
            Some(l) if l > 0 => l,
            _ => DEFAULT_PAGE_LIMIT,
        };
        let offset = match offset {
            Some(o) if o >= 0 => o,
            _ => 0,
        };

        Self { limit, offset }
    }

    pub(crate) fn limit_usize(&self) -> usize {
        usize::try_from(self.limit).unwrap_or(0)
    }

    pub(crate) fn offset_usize(&self) -> usize {
        usize::try_from(self.offset).unwrap_or(usize::MAX)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::normalize(None, None)
    }
}

/// Parse an opaque identifier supplied by a caller.
///
/// Accepts a positive base-10 integer, surrounding whitespace ignored.
pub fn parse_id(raw: &str) -> Result<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(BoardError::InvalidId(raw.to_string())),
    }
}

/// Parse an optional parent identifier; absent and empty both mean "root".
pub fn parse_parent_id(raw: Option<&str>) -> Result<Option<i64>> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_id(s).map(Some),
    }
}

mod opaque_id {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_id(&raw).map_err(de::Error::custom)
    }
}

mod opaque_id_opt {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => serializer.collect_str(id),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        super::parse_parent_id(raw.as_deref()).map_err(de::Error::custom)
    }
}
