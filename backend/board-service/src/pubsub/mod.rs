use crate::models::Comment;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tokio::sync::RwLock;
use uuid::Uuid;

pub mod metrics;

pub use metrics::NotifierMetrics;

/// Slots per subscriber channel. A full slot means the subscriber has not
/// drained the previous comment yet.
const SUBSCRIBER_CAPACITY: usize = 1;

/// Unique identifier for a live subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscriber entry with ID and channel
struct Subscriber {
    id: SubscriberId,
    sender: mpsc::Sender<Comment>,
}

/// Receiving end of a subscription to one post's new comments.
///
/// After `CommentBus::unsubscribe` the receiver yields whatever was already
/// in its slot, then `None` without waiting.
pub struct CommentSubscription {
    id: SubscriberId,
    post_id: i64,
    receiver: mpsc::Receiver<Comment>,
}

impl CommentSubscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn post_id(&self) -> i64 {
        self.post_id
    }

    /// Wait for the next comment; `None` once unsubscribed and drained.
    pub async fn recv(&mut self) -> Option<Comment> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Result<Comment, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Hand the raw channel to a transport that wants to own it.
    pub fn into_receiver(self) -> mpsc::Receiver<Comment> {
        self.receiver
    }
}

/// Outcome of one `publish` call
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    /// Comment placed in the subscriber's slot
    pub delivered: usize,
    /// Slot already occupied; the new comment was discarded for that subscriber
    pub dropped: usize,
    /// Receiver gone without unsubscribing; the entry was pruned
    pub closed: usize,
}

/// In-process fan-out of newly created comments to listeners of a post.
///
/// Delivery is best effort: each subscriber has a single slot and a comment
/// published while the slot is full is dropped for that subscriber (the
/// older comment stays). Subscribers recover by re-listing comments.
///
/// The registry lock guards membership only and is never held while sending.
#[derive(Default, Clone)]
pub struct CommentBus {
    // post_id -> list of subscribers
    inner: Arc<RwLock<HashMap<i64, Vec<Subscriber>>>>,
    metrics: NotifierMetrics,
}

impl CommentBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &NotifierMetrics {
        &self.metrics
    }

    /// Register a new listener for `post_id`.
    pub async fn subscribe(&self, post_id: i64) -> CommentSubscription {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CAPACITY);
        let subscriber_id = SubscriberId::new();

        let mut guard = self.inner.write().await;
        let subscribers = guard.entry(post_id).or_default();
        subscribers.push(Subscriber {
            id: subscriber_id,
            sender: tx,
        });

        tracing::debug!(
            "Added subscriber {:?} to post {}, total subscribers: {}",
            subscriber_id,
            post_id,
            subscribers.len()
        );

        CommentSubscription {
            id: subscriber_id,
            post_id,
            receiver: rx,
        }
    }

    /// Remove a subscriber and close its channel.
    ///
    /// Unknown ids are ignored. Returns whether an entry was removed.
    pub async fn unsubscribe(&self, post_id: i64, subscriber_id: SubscriberId) -> bool {
        let mut guard = self.inner.write().await;

        let Some(subscribers) = guard.get_mut(&post_id) else {
            return false;
        };

        let before = subscribers.len();
        // Dropping the sender is what closes the receiver
        subscribers.retain(|s| s.id != subscriber_id);
        let removed = subscribers.len() != before;

        if removed {
            tracing::debug!(
                "Removed subscriber {:?} from post {}, remaining: {}",
                subscriber_id,
                post_id,
                subscribers.len()
            );
        }

        if subscribers.is_empty() {
            guard.remove(&post_id);
            tracing::debug!("Removed empty post {} from registry", post_id);
        }

        removed
    }

    /// Offer `comment` to every current subscriber of its post without waiting.
    pub async fn publish(&self, comment: &Comment) -> PublishReport {
        // Snapshot senders, then release the lock before delivering.
        // A subscriber removed after this point may still get this comment.
        let targets: Vec<(SubscriberId, mpsc::Sender<Comment>)> = {
            let guard = self.inner.read().await;
            match guard.get(&comment.post_id) {
                Some(subscribers) => subscribers
                    .iter()
                    .map(|s| (s.id, s.sender.clone()))
                    .collect(),
                None => return PublishReport::default(),
            }
        };

        let mut report = PublishReport::default();
        let mut dead = Vec::new();

        for (subscriber_id, sender) in targets {
            match sender.try_send(comment.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    report.dropped += 1;
                    tracing::warn!(
                        "Dropped comment {} for slow subscriber {:?} on post {}",
                        comment.id,
                        subscriber_id,
                        comment.post_id
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    report.closed += 1;
                    dead.push(subscriber_id);
                }
            }
        }

        if !dead.is_empty() {
            self.prune(comment.post_id, &dead).await;
        }

        self.metrics
            .record(report.delivered, report.dropped, report.closed);
        report
    }

    /// Subscriber count for a post (for debugging/metrics)
    pub async fn subscriber_count(&self, post_id: i64) -> usize {
        let guard = self.inner.read().await;
        guard.get(&post_id).map(|v| v.len()).unwrap_or(0)
    }

    /// Forget subscribers whose receivers were dropped without unsubscribing.
    async fn prune(&self, post_id: i64, dead: &[SubscriberId]) {
        let mut guard = self.inner.write().await;
        if let Some(subscribers) = guard.get_mut(&post_id) {
            subscribers.retain(|s| !dead.contains(&s.id));
            tracing::debug!(
                "Pruned {} closed subscribers from post {}, {} active",
                dead.len(),
                post_id,
                subscribers.len()
            );
            if subscribers.is_empty() {
                guard.remove(&post_id);
            }
        }
    }
}
