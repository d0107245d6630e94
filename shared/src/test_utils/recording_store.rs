use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{Result, StoreError};
use crate::models::{RsvpDraft, RsvpRecord};
use crate::store::{LikeStore, LikeSubscription, RsvpStore};

/// Wraps a store, recording every call and optionally failing them all as
/// if the network were down.
pub struct RecordingStore<S> {
    inner: S,
    calls: Mutex<Vec<&'static str>>,
    total: AtomicUsize,
    failing: AtomicBool,
}

impl<S> RecordingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            total: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Names of the store operations invoked, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str) -> Result<()> {
        self.total.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(op);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(format!("{} failed: network unreachable", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: RsvpStore> RsvpStore for RecordingStore<S> {
    async fn find_by_name(&self, name: &str) -> Result<Vec<RsvpRecord>> {
        self.record("find_by_name")?;
        self.inner.find_by_name(name).await
    }

    async fn find_by_identity(&self, name: &str, birthdate: &str) -> Result<Vec<RsvpRecord>> {
        self.record("find_by_identity")?;
        self.inner.find_by_identity(name, birthdate).await
    }

    async fn create_rsvp(&self, draft: RsvpDraft) -> Result<RsvpRecord> {
        self.record("create_rsvp")?;
        self.inner.create_rsvp(draft).await
    }

    async fn update_rsvp(&self, id: &str, draft: RsvpDraft) -> Result<RsvpRecord> {
        self.record("update_rsvp")?;
        self.inner.update_rsvp(id, draft).await
    }
}

#[async_trait]
impl<S: LikeStore> LikeStore for RecordingStore<S> {
    async fn get_likes(&self) -> Result<Option<u64>> {
        self.record("get_likes")?;
        self.inner.get_likes().await
    }

    async fn init_likes(&self) -> Result<u64> {
        self.record("init_likes")?;
        self.inner.init_likes().await
    }

    async fn increment_likes(&self, delta: u64) -> Result<u64> {
        self.record("increment_likes")?;
        self.inner.increment_likes(delta).await
    }

    async fn watch_likes(&self) -> Result<LikeSubscription> {
        self.record("watch_likes")?;
        self.inner.watch_likes().await
    }
}
