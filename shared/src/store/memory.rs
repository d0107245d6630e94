use async_trait::async_trait;
use log::debug;
use tokio::sync::{watch, RwLock};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::models::{RsvpDraft, RsvpRecord};
use crate::store::{LikeStore, LikeSubscription, RsvpStore};

/// In-process RSVP store. Records are kept in creation order.
#[derive(Default)]
pub struct MemoryRsvpStore {
    records: RwLock<Vec<RsvpRecord>>,
}

impl MemoryRsvpStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with existing records.
    pub fn with_records(records: Vec<RsvpRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn get_rsvp(&self, id: &str) -> Result<RsvpRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("RSVP {}", id)))
    }
}

#[async_trait]
impl RsvpStore for MemoryRsvpStore {
    async fn find_by_name(&self, name: &str) -> Result<Vec<RsvpRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| r.name == name).cloned().collect())
    }

    async fn find_by_identity(&self, name: &str, birthdate: &str) -> Result<Vec<RsvpRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.matches_identity(name, birthdate))
            .cloned()
            .collect())
    }

    async fn create_rsvp(&self, draft: RsvpDraft) -> Result<RsvpRecord> {
        let record = RsvpRecord::from_draft(Uuid::new_v4().to_string(), draft);
        debug!("Creating RSVP id={}", record.id);
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn update_rsvp(&self, id: &str, draft: RsvpDraft) -> Result<RsvpRecord> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("RSVP {}", id)))?;
        record.apply(draft);
        debug!("Updated RSVP id={}", id);
        Ok(record.clone())
    }
}

/// In-process like counter with push-based change notification.
pub struct MemoryLikeStore {
    counter: watch::Sender<Option<u64>>,
}

impl Default for MemoryLikeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLikeStore {
    /// A store whose counter document does not exist yet.
    pub fn new() -> Self {
        let (counter, _) = watch::channel(None);
        Self { counter }
    }

    pub fn with_count(count: u64) -> Self {
        let (counter, _) = watch::channel(Some(count));
        Self { counter }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.counter.receiver_count()
    }
}

#[async_trait]
impl LikeStore for MemoryLikeStore {
    async fn get_likes(&self) -> Result<Option<u64>> {
        Ok(*self.counter.borrow())
    }

    async fn init_likes(&self) -> Result<u64> {
        self.counter.send_if_modified(|count| {
            if count.is_none() {
                *count = Some(0);
                true
            } else {
                false
            }
        });
        Ok(self.counter.borrow().unwrap_or(0))
    }

    async fn increment_likes(&self, delta: u64) -> Result<u64> {
        let mut updated = None;
        self.counter.send_if_modified(|count| {
            updated = count.unwrap_or(0).checked_add(delta);
            match updated {
                Some(next) => {
                    *count = Some(next);
                    true
                }
                None => false,
            }
        });
        updated.ok_or_else(|| {
            StoreError::InvalidRecord(format!("like counter overflow adding {}", delta))
        })
    }

    async fn watch_likes(&self) -> Result<LikeSubscription> {
        Ok(LikeSubscription::from_receiver(self.counter.subscribe()))
    }
}
