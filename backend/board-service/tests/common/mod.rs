//! Behaviour every storage engine must share, exercised through `BoardService`.

#![allow(dead_code)]

use board_service::error::BoardError;
use board_service::validation::{ValidationError, MAX_COMMENT_LEN};
use board_service::BoardService;
use std::collections::HashSet;

pub async fn check_create_then_get(svc: &BoardService) {
    let mut seen = HashSet::new();
    for i in 0..5 {
        let created = svc
            .create_post(&format!("title {}", i), "content", "alice", Some(true))
            .await
            .unwrap();
        assert!(seen.insert(created.id), "post ids must be unique");

        let fetched = svc.get_post(&created.id.to_string()).await.unwrap();
        assert_eq!(fetched, created);
    }
}

pub async fn check_posts_newest_first(svc: &BoardService) {
    let mut created = Vec::new();
    for i in 0..4 {
        created.push(
            svc.create_post(&format!("ordered {}", i), "c", "a", None)
                .await
                .unwrap()
                .id,
        );
    }

    let listed: Vec<i64> = svc
        .list_posts(Some(4), Some(0))
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();

    created.reverse();
    assert_eq!(listed, created);
}

pub async fn check_comment_length_boundaries(svc: &BoardService) {
    let post = svc.create_post("t", "c", "a", Some(true)).await.unwrap();
    let post_id = post.id.to_string();

    let err = svc.create_comment(&post_id, None, "a", "").await.unwrap_err();
    assert!(matches!(
        err,
        BoardError::Validation(ValidationError::EmptyContent)
    ));

    let too_long = "x".repeat(MAX_COMMENT_LEN + 1);
    let err = svc
        .create_comment(&post_id, None, "a", &too_long)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BoardError::Validation(ValidationError::TooLong { .. })
    ));

    let at_limit = "x".repeat(MAX_COMMENT_LEN);
    let comment = svc
        .create_comment(&post_id, None, "a", &at_limit)
        .await
        .unwrap();
    assert_eq!(comment.content.len(), MAX_COMMENT_LEN);

    // Only the accepted comment was stored
    let listed = svc
        .list_comments(&post_id, None, None, None)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

pub async fn check_disabled_post_rejects_comments(svc: &BoardService) {
    let post = svc.create_post("closed", "c", "a", Some(false)).await.unwrap();
    let post_id = post.id.to_string();

    let err = svc
        .create_comment(&post_id, None, "a", "valid body")
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::CommentsDisabled));

    // Content errors still come first on a closed post
    let err = svc.create_comment(&post_id, None, "a", "").await.unwrap_err();
    assert!(matches!(err, BoardError::Validation(_)));
}

pub async fn check_cross_post_parent_rejected(svc: &BoardService) {
    let first = svc.create_post("first", "c", "a", Some(true)).await.unwrap();
    let second = svc.create_post("second", "c", "a", Some(true)).await.unwrap();

    let foreign = svc
        .create_comment(&first.id.to_string(), None, "a", "on first")
        .await
        .unwrap();

    let err = svc
        .create_comment(
            &second.id.to_string(),
            Some(&foreign.id.to_string()),
            "a",
            "reply across posts",
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BoardError::CrossPostParent | BoardError::ParentNotFound
    ));

    let err = svc
        .create_comment(&second.id.to_string(), Some("987654321"), "a", "orphan")
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::ParentNotFound));

    // No row was created on the second post
    let roots = svc
        .list_comments(&second.id.to_string(), None, None, None)
        .await
        .unwrap();
    assert!(roots.is_empty());
    let replies = svc
        .list_comments(
            &second.id.to_string(),
            Some(&foreign.id.to_string()),
            None,
            None,
        )
        .await
        .unwrap();
    assert!(replies.is_empty());
}

pub async fn check_threaded_listing(svc: &BoardService) {
    let post = svc.create_post("thread", "c", "a", Some(true)).await.unwrap();
    let post_id = post.id.to_string();

    let mut roots = Vec::new();
    for i in 0..3 {
        roots.push(
            svc.create_comment(&post_id, None, "a", &format!("root {}", i))
                .await
                .unwrap(),
        );
    }
    let first_root = roots[0].id.to_string();
    let mut replies = Vec::new();
    for i in 0..2 {
        replies.push(
            svc.create_comment(&post_id, Some(&first_root), "b", &format!("reply {}", i))
                .await
                .unwrap(),
        );
    }

    let listed_roots = svc
        .list_comments(&post_id, None, Some(10), Some(0))
        .await
        .unwrap();
    assert_eq!(listed_roots, roots);

    // An empty parent id also means "roots"
    let listed_roots_empty = svc
        .list_comments(&post_id, Some(""), Some(10), Some(0))
        .await
        .unwrap();
    assert_eq!(listed_roots_empty, roots);

    let listed_replies = svc
        .list_comments(&post_id, Some(&first_root), None, None)
        .await
        .unwrap();
    assert_eq!(listed_replies, replies);
    assert!(listed_replies
        .iter()
        .all(|c| c.parent_id == Some(roots[0].id)));

    let paged = svc
        .list_comments(&post_id, None, Some(2), Some(1))
        .await
        .unwrap();
    assert_eq!(paged, roots[1..3].to_vec());
}

pub async fn check_pagination_defaults(svc: &BoardService) {
    let post = svc.create_post("busy", "c", "a", Some(true)).await.unwrap();
    let post_id = post.id.to_string();
    for i in 0..12 {
        svc.create_comment(&post_id, None, "a", &format!("c{}", i))
            .await
            .unwrap();
    }

    assert_eq!(
        svc.list_comments(&post_id, None, None, None)
            .await
            .unwrap()
            .len(),
        10
    );
    assert_eq!(
        svc.list_comments(&post_id, None, Some(0), Some(-4))
            .await
            .unwrap()
            .len(),
        10
    );
    assert_eq!(
        svc.list_comments(&post_id, None, Some(5), Some(10))
            .await
            .unwrap()
            .len(),
        2
    );
}

pub async fn check_invalid_ids(svc: &BoardService) {
    assert!(matches!(
        svc.get_post("not-an-id").await,
        Err(BoardError::InvalidId(_))
    ));
    assert!(matches!(
        svc.list_comments("x", None, None, None).await,
        Err(BoardError::InvalidId(_))
    ));
    assert!(matches!(
        svc.get_post("987654321").await,
        Err(BoardError::NotFound(_))
    ));
}
