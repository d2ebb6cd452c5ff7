//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that embed the monitor
//! engine without a live listings source: scripted adapters, a
//! recording notifier, and a store with injectable failures.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::error::{FetchError, FetchResult, StoreError, StoreResult};
use crate::stores::MemorySnapshotStore;
use crate::traits::notifier::Notifier;
use crate::traits::source::{FetchPage, SourceAdapter};
use crate::traits::store::SnapshotStore;
use crate::types::{Listing, NotificationEvent, Snapshot};

/// One scripted fetch outcome.
enum ScriptedFetch {
    Page(FetchPage),
    Error(String),
}

/// A mock source adapter that replays scripted fetch outcomes.
///
/// Outcomes are consumed front-to-back, one per `fetch` call; once the
/// script is exhausted every further call returns an empty page. Calls
/// are recorded for assertions.
#[derive(Default)]
pub struct MockSourceAdapter {
    script: Mutex<VecDeque<ScriptedFetch>>,
    calls: RwLock<Vec<(String, Option<String>)>>,
    closed: AtomicBool,
}

impl MockSourceAdapter {
    /// Create an adapter with an empty script (every fetch succeeds
    /// with zero listings).
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful fetch returning the given page.
    pub fn with_page(self, page: FetchPage) -> Self {
        self.script.lock().unwrap().push_back(ScriptedFetch::Page(page));
        self
    }

    /// Queue a successful fetch returning the given listings.
    pub fn with_listings(self, listings: impl IntoIterator<Item = Listing>) -> Self {
        self.with_page(FetchPage::new(listings.into_iter().collect()))
    }

    /// Queue a failed fetch.
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedFetch::Error(message.into()));
        self
    }

    /// All `(keyword, cursor)` pairs fetched so far.
    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.read().unwrap().clone()
    }

    /// Number of fetches performed.
    pub fn fetch_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Whether the session released this adapter.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SourceAdapter for MockSourceAdapter {
    async fn fetch(&self, keyword: &str, cursor: Option<&str>) -> FetchResult<FetchPage> {
        self.calls
            .write()
            .unwrap()
            .push((keyword.to_string(), cursor.map(str::to_string)));

        match self.script.lock().unwrap().pop_front() {
            Some(ScriptedFetch::Page(page)) => Ok(page),
            Some(ScriptedFetch::Error(message)) => Err(FetchError::Adapter(message)),
            None => Ok(FetchPage::default()),
        }
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// A notifier that records every event it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Arc<RwLock<Vec<NotificationEvent>>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All events received so far, in delivery order.
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.read().unwrap().clone()
    }

    /// Number of events received.
    pub fn event_count(&self) -> usize {
        self.events.read().unwrap().len()
    }

    /// Clear the recorded events.
    pub fn clear(&self) {
        self.events.write().unwrap().clear();
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: NotificationEvent) {
        self.events.write().unwrap().push(event);
    }
}

/// A snapshot store whose failures can be toggled at runtime.
///
/// Wraps a [`MemorySnapshotStore`]; load/save failures surface as
/// injected I/O errors while the underlying state stays readable for
/// assertions.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemorySnapshotStore,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl FlakyStore {
    /// Create a healthy store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `load` calls fail.
    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `save` calls fail.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Read the underlying state directly, bypassing failure injection.
    pub async fn stored(&self, keyword: &str) -> Snapshot {
        self.inner.load(keyword).await.unwrap()
    }

    fn injected() -> StoreError {
        StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "injected store failure",
        ))
    }
}

#[async_trait::async_trait]
impl SnapshotStore for FlakyStore {
    async fn load(&self, keyword: &str) -> StoreResult<Snapshot> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        self.inner.load(keyword).await
    }

    async fn save(&self, keyword: &str, snapshot: &Snapshot) -> StoreResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Self::injected());
        }
        self.inner.save(keyword, snapshot).await?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
