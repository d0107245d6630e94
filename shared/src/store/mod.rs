use async_trait::async_trait;
use log::warn;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{Result, StoreError};
use crate::models::{RsvpDraft, RsvpRecord};

pub mod dynamo;
pub mod memory;

/// Document-store primitives for RSVP records.
#[async_trait]
pub trait RsvpStore: Send + Sync {
    /// All records whose name is exactly `name`.
    async fn find_by_name(&self, name: &str) -> Result<Vec<RsvpRecord>>;

    /// All records matching the `(name, birthdate)` identity pair.
    async fn find_by_identity(&self, name: &str, birthdate: &str) -> Result<Vec<RsvpRecord>>;

    /// Inserts a new record. The store assigns the id and both timestamps.
    async fn create_rsvp(&self, draft: RsvpDraft) -> Result<RsvpRecord>;

    /// Overwrites the writable fields of an existing record and refreshes
    /// `updated_at`. Fails with `NotFound` when the id is unknown.
    async fn update_rsvp(&self, id: &str, draft: RsvpDraft) -> Result<RsvpRecord>;
}

/// Document-store primitives for the single like-counter document.
#[async_trait]
pub trait LikeStore: Send + Sync {
    /// Current count, or `None` when the counter document does not exist yet.
    async fn get_likes(&self) -> Result<Option<u64>>;

    /// Creates the counter at zero if it is missing. Never resets an
    /// existing value. Returns the count after the call.
    async fn init_likes(&self) -> Result<u64>;

    /// Atomically adds `delta` on the store side and returns the new count.
    async fn increment_likes(&self, delta: u64) -> Result<u64>;

    /// Live view of the counter for as long as the subscription is held.
    async fn watch_likes(&self) -> Result<LikeSubscription>;
}

#[async_trait]
impl<T> RsvpStore for Arc<T>
where
    T: RsvpStore + ?Sized,
{
    async fn find_by_name(&self, name: &str) -> Result<Vec<RsvpRecord>> {
        (**self).find_by_name(name).await
    }

    async fn find_by_identity(&self, name: &str, birthdate: &str) -> Result<Vec<RsvpRecord>> {
        (**self).find_by_identity(name, birthdate).await
    }

    async fn create_rsvp(&self, draft: RsvpDraft) -> Result<RsvpRecord> {
        (**self).create_rsvp(draft).await
    }

    async fn update_rsvp(&self, id: &str, draft: RsvpDraft) -> Result<RsvpRecord> {
        (**self).update_rsvp(id, draft).await
    }
}

#[async_trait]
impl<T> LikeStore for Arc<T>
where
    T: LikeStore + ?Sized,
{
    async fn get_likes(&self) -> Result<Option<u64>> {
        (**self).get_likes().await
    }

    async fn init_likes(&self) -> Result<u64> {
        (**self).init_likes().await
    }

    async fn increment_likes(&self, delta: u64) -> Result<u64> {
        (**self).increment_likes(delta).await
    }

    async fn watch_likes(&self) -> Result<LikeSubscription> {
        (**self).watch_likes().await
    }
}

/// A live view of the like counter.
///
/// Stores with native change notification hand out a plain receiver. Stores
/// without one are polled by a background task that is aborted when the
/// subscription is dropped.
pub struct LikeSubscription {
    receiver: watch::Receiver<Option<u64>>,
    poller: Option<JoinHandle<()>>,
}

impl LikeSubscription {
    pub fn from_receiver(receiver: watch::Receiver<Option<u64>>) -> Self {
        Self {
            receiver,
            poller: None,
        }
    }

    /// Polls `store.get_likes()` every `interval` and publishes changes.
    pub fn polling<S>(store: S, interval: Duration) -> Self
    where
        S: LikeStore + 'static,
    {
        let (tx, rx) = watch::channel(None);
        let poller = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match store.get_likes().await {
                    Ok(count) => {
                        tx.send_if_modified(|current| {
                            if *current != count {
                                *current = count;
                                true
                            } else {
                                false
                            }
                        });
                    }
                    Err(e) => warn!("Failed to poll like counter: {}", e),
                }
                if tx.is_closed() {
                    break;
                }
            }
        });

        Self {
            receiver: rx,
            poller: Some(poller),
        }
    }

    /// The last value pushed by the store.
    pub fn current(&self) -> Option<u64> {
        *self.receiver.borrow()
    }

    /// Waits for the next pushed value.
    pub async fn changed(&mut self) -> Result<Option<u64>> {
        self.receiver
            .changed()
            .await
            .map_err(|_| StoreError::Backend("Like counter subscription closed".into()))?;
        Ok(*self.receiver.borrow_and_update())
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|p| !p.is_finished())
    }
}

impl Drop for LikeSubscription {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}
