//! Comment body validation.
//!
//! Lengths are measured in UTF-8 bytes (`str::len`), so a body of 2000 ASCII
//! characters is accepted while 2000 multi-byte characters may not be.

use thiserror::Error;

/// Maximum comment body length in bytes (inclusive).
pub const MAX_COMMENT_LEN: usize = 2000;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("content is empty")]
    EmptyContent,

    #[error("content too long (max {max} bytes)")]
    TooLong { max: usize },
}

/// Check a comment body before anything is written.
pub fn validate_comment_body(content: &str) -> Result<(), ValidationError> {
    if content.is_empty() {
        return Err(ValidationError::EmptyContent);
    }

    if content.len() > MAX_COMMENT_LEN {
        return Err(ValidationError::TooLong {
            max: MAX_COMMENT_LEN,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_rejected() {
        assert_eq!(
            validate_comment_body(""),
            Err(ValidationError::EmptyContent)
        );
    }

    #[test]
    fn test_length_boundary_is_inclusive() {
        let at_limit = "a".repeat(MAX_COMMENT_LEN);
        assert!(validate_comment_body(&at_limit).is_ok());

        let over_limit = "a".repeat(MAX_COMMENT_LEN + 1);
        assert_eq!(
            validate_comment_body(&over_limit),
            Err(ValidationError::TooLong {
                max: MAX_COMMENT_LEN
            })
        );
    }

    #[test]
    fn test_length_counts_bytes() {
        // 1000 two-byte characters hit the limit exactly, one more exceeds it
        let at_limit = "é".repeat(1000);
        assert!(validate_comment_body(&at_limit).is_ok());
        let over_limit = "é".repeat(1001);
        assert!(validate_comment_body(&over_limit).is_err());
    }

    #[test]
    fn test_whitespace_only_is_not_empty() {
        assert!(validate_comment_body(" ").is_ok());
    }
}
