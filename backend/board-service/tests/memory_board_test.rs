//! Domain service over the in-memory engine

mod common;

use board_service::{BoardService, CommentBus, InMemoryStore};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn service() -> BoardService {
    BoardService::new(Arc::new(InMemoryStore::new()))
}

#[tokio::test]
async fn test_create_then_get_post() {
    common::check_create_then_get(&service()).await;
}

#[tokio::test]
async fn test_posts_listed_newest_first() {
    common::check_posts_newest_first(&service()).await;
}

#[tokio::test]
async fn test_comment_length_boundaries() {
    common::check_comment_length_boundaries(&service()).await;
}

#[tokio::test]
async fn test_disabled_post_rejects_comments() {
    common::check_disabled_post_rejects_comments(&service()).await;
}

#[tokio::test]
async fn test_cross_post_parent_rejected() {
    common::check_cross_post_parent_rejected(&service()).await;
}

#[tokio::test]
async fn test_threaded_listing() {
    common::check_threaded_listing(&service()).await;
}

#[tokio::test]
async fn test_pagination_defaults() {
    common::check_pagination_defaults(&service()).await;
}

#[tokio::test]
async fn test_invalid_ids() {
    common::check_invalid_ids(&service()).await;
}

#[tokio::test]
async fn test_list_posts_offset_past_end() {
    let svc = service();
    svc.create_post("only", "c", "a", None).await.unwrap();
    assert!(svc.list_posts(Some(10), Some(1)).await.unwrap().is_empty());
    assert_eq!(svc.list_posts(None, Some(-1)).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_read_after_write() {
    let svc = service();
    let post = svc.create_post("busy", "c", "a", Some(true)).await.unwrap();
    let post_id = post.id.to_string();

    let mut handles = Vec::new();
    for i in 0..32 {
        let svc = svc.clone();
        let post_id = post_id.clone();
        handles.push(tokio::spawn(async move {
            let created = svc
                .create_comment(&post_id, None, "writer", &format!("comment {}", i))
                .await
                .unwrap();

            // A successful write is visible to the very next read
            let visible = svc
                .list_comments(&post_id, None, Some(100), Some(0))
                .await
                .unwrap();
            assert!(visible.iter().any(|c| c.id == created.id));
            created.id
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        assert!(ids.insert(handle.await.unwrap()));
    }
    assert_eq!(ids.len(), 32);
}

#[tokio::test]
async fn test_service_publishes_to_post_subscribers() {
    let bus = Arc::new(CommentBus::new());
    let svc = BoardService::with_notifier(Arc::new(InMemoryStore::new()), Arc::clone(&bus));

    let watched = svc.create_post("watched", "c", "a", Some(true)).await.unwrap();
    let other = svc.create_post("other", "c", "a", Some(true)).await.unwrap();
    let mut sub = bus.subscribe(watched.id).await;

    svc.create_comment(&other.id.to_string(), None, "a", "elsewhere")
        .await
        .unwrap();
    let created = svc
        .create_comment(&watched.id.to_string(), None, "a", "hello")
        .await
        .unwrap();

    let received = tokio::time::timeout(Duration::from_secs(1), sub.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(received, created);

    // Nothing is published for a rejected comment
    let _ = svc.create_comment(&watched.id.to_string(), None, "a", "").await;
    assert!(sub.try_recv().is_err());
}
