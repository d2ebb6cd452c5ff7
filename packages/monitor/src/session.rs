//! The poll session: one cancellable unit of work per keyword.
//!
//! A session loops fetch → reconcile → notify → sleep until its
//! cancellation token fires. Every failure inside an iteration is
//! recoverable; only cancellation ends the loop.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::diff::diff;
use crate::error::{FetchError, StoreError};
use crate::traits::notifier::Notifier;
use crate::traits::source::SourceAdapter;
use crate::traits::store::SnapshotStore;
use crate::types::{NotificationEvent, SessionConfig, Snapshot};

/// Counters describing one completed reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationStats {
    /// Listings the adapter returned
    pub fetched: usize,
    /// New-listing events emitted
    pub added: usize,
    /// Price-drop events emitted
    pub price_drops: usize,
    /// Size of the merged snapshot
    pub snapshot_size: usize,
}

/// Outcome of a single poll iteration.
///
/// The loop consumes these instead of bubbling errors: no outcome is
/// fatal to the session.
#[derive(Debug)]
pub enum PollOutcome {
    /// Fetched, reconciled, persisted, notified.
    Reconciled(IterationStats),

    /// The adapter failed; nothing was mutated, nothing emitted.
    FetchFailed(FetchError),

    /// Stored state could not be read to seed the session; the
    /// iteration was skipped so a restart cannot re-notify everything.
    LoadFailed(StoreError),

    /// Reconciled and notified, but the store write failed. The
    /// in-memory state still advanced; a crash before the next
    /// successful save re-detects these changes (at-least-once).
    PersistFailed {
        stats: IterationStats,
        error: StoreError,
    },
}

/// One independently polling, cancellable monitor for a single keyword.
pub struct PollSession {
    keyword: String,
    adapter: Arc<dyn SourceAdapter>,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<dyn Notifier>,
    config: SessionConfig,
    /// Evolving search cursor; `None` until the adapter resolves one
    cursor: Option<String>,
    /// Last-known snapshot, owned exclusively by this session. The
    /// store is its durable mirror; `None` until seeded from the store
    /// on the first iteration.
    snapshot: Option<Snapshot>,
}

impl PollSession {
    /// Create a session in its idle state. No work happens until
    /// [`run`](Self::run) is awaited.
    pub fn new(
        keyword: impl Into<String>,
        adapter: Arc<dyn SourceAdapter>,
        store: Arc<dyn SnapshotStore>,
        notifier: Arc<dyn Notifier>,
        config: SessionConfig,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            adapter,
            store,
            notifier,
            config,
            cursor: None,
            snapshot: None,
        }
    }

    /// The keyword this session watches.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Run the poll loop until `shutdown` is cancelled.
    ///
    /// The cancellation signal is honored at each iteration boundary
    /// and interrupts the inter-poll sleep, so stop latency is bounded
    /// by roughly one tick. On the way out the session releases its
    /// adapter's underlying resources.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(keyword = %self.keyword, "session started");

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            match self.poll_once().await {
                PollOutcome::Reconciled(stats) => {
                    debug!(
                        keyword = %self.keyword,
                        fetched = stats.fetched,
                        added = stats.added,
                        price_drops = stats.price_drops,
                        snapshot_size = stats.snapshot_size,
                        "reconciled"
                    );
                }
                PollOutcome::FetchFailed(e) => {
                    warn!(keyword = %self.keyword, error = %e, "fetch failed, skipping iteration");
                }
                PollOutcome::LoadFailed(e) => {
                    warn!(keyword = %self.keyword, error = %e, "stored snapshot unreadable, skipping iteration");
                }
                PollOutcome::PersistFailed { stats, error } => {
                    error!(
                        keyword = %self.keyword,
                        error = %error,
                        added = stats.added,
                        price_drops = stats.price_drops,
                        "snapshot save failed, changes may re-notify after a restart"
                    );
                }
            }

            let delay = self.jittered_delay();
            debug!(keyword = %self.keyword, delay_secs = delay.as_secs(), "sleeping");
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.adapter.close().await;
        info!(keyword = %self.keyword, "session stopped");
    }

    /// Execute exactly one fetch/reconcile/notify iteration.
    ///
    /// Public so embedders and tests can drive the state machine
    /// without the loop, the sleep, or a live source.
    pub async fn poll_once(&mut self) -> PollOutcome {
        // Fetching
        let page = match self
            .adapter
            .fetch(&self.keyword, self.cursor.as_deref())
            .await
        {
            Ok(page) => page,
            Err(e) => return PollOutcome::FetchFailed(e),
        };
        if let Some(cursor) = page.next_cursor {
            self.cursor = Some(cursor);
        }

        // Reconciling: the diff base is the session's own snapshot,
        // seeded from the store once so a restart cannot re-notify
        // already-seen listings.
        let stored = match &self.snapshot {
            Some(snapshot) => snapshot.clone(),
            None => match self.store.load(&self.keyword).await {
                Ok(snapshot) => snapshot,
                Err(e) => return PollOutcome::LoadFailed(e),
            },
        };

        let incoming = Snapshot::from_listings(page.listings);
        let report = diff(&stored, &incoming);
        let stats = IterationStats {
            fetched: incoming.len(),
            added: report.added.len(),
            price_drops: report.price_drops.len(),
            snapshot_size: report.merged.len(),
        };

        let saved = self.store.save(&self.keyword, &report.merged).await;
        self.snapshot = Some(report.merged);

        // Notifying: fire-and-forget, even when the save failed - the
        // in-memory state advanced and the events are owed.
        for listing in report.added {
            self.notifier
                .notify(NotificationEvent::new_listing(&self.keyword, listing))
                .await;
        }
        for price_drop in report.price_drops {
            self.notifier
                .notify(NotificationEvent::price_drop(
                    &self.keyword,
                    price_drop.current,
                    price_drop.previous_price,
                    price_drop.current_price,
                ))
                .await;
        }

        match saved {
            Ok(()) => PollOutcome::Reconciled(stats),
            Err(error) => PollOutcome::PersistFailed { stats, error },
        }
    }

    /// Sample the inter-poll sleep uniformly from the configured range.
    fn jittered_delay(&self) -> Duration {
        let (min, max) = self.config.delay_bounds();
        if min == max {
            return min;
        }
        let millis = rand::rng().random_range(min.as_millis() as u64..=max.as_millis() as u64);
        Duration::from_millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FlakyStore, MockSourceAdapter, RecordingNotifier};
    use crate::traits::source::FetchPage;
    use crate::types::Listing;

    fn listing(id: &str, price: &str) -> Listing {
        Listing::new(id).with_name(format!("item {id}")).with_price(price)
    }

    struct Harness {
        adapter: Arc<MockSourceAdapter>,
        store: Arc<FlakyStore>,
        notifier: Arc<RecordingNotifier>,
    }

    impl Harness {
        fn new(adapter: MockSourceAdapter) -> Self {
            Self {
                adapter: Arc::new(adapter),
                store: Arc::new(FlakyStore::new()),
                notifier: Arc::new(RecordingNotifier::new()),
            }
        }

        fn session(&self, keyword: &str) -> PollSession {
            PollSession::new(
                keyword,
                self.adapter.clone(),
                self.store.clone(),
                self.notifier.clone(),
                SessionConfig::default(),
            )
        }
    }

    #[tokio::test]
    async fn first_poll_notifies_every_listing_as_new() {
        let h = Harness::new(
            MockSourceAdapter::new().with_listings([listing("m1", "1000円")]),
        );
        let mut session = h.session("kw");

        let outcome = session.poll_once().await;
        assert!(matches!(outcome, PollOutcome::Reconciled(s) if s.added == 1));
        assert_eq!(h.notifier.event_count(), 1);
        assert!(h.store.stored("kw").await.contains("m1"));
    }

    #[tokio::test]
    async fn price_drop_and_new_listing_in_one_poll() {
        let h = Harness::new(
            MockSourceAdapter::new()
                .with_listings([listing("1", "1000円")])
                .with_listings([listing("1", "800円"), listing("2", "500円")]),
        );
        let mut session = h.session("A");

        session.poll_once().await;
        h.notifier.clear();

        let stats = match session.poll_once().await {
            PollOutcome::Reconciled(stats) => stats,
            other => panic!("expected reconciled outcome, got {other:?}"),
        };
        assert_eq!(stats.added, 1);
        assert_eq!(stats.price_drops, 1);

        let events = h.notifier.events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| matches!(
            e,
            NotificationEvent::NewListing { listing, .. } if listing.id == "2"
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            NotificationEvent::PriceDrop {
                previous_price: 1000,
                current_price: 800,
                ..
            }
        )));

        let merged = h.store.stored("A").await;
        assert_eq!(merged.get("1").unwrap().price, "800円");
        assert_eq!(merged.get("2").unwrap().price, "500円");
    }

    #[tokio::test]
    async fn fetch_error_leaves_stored_snapshot_untouched() {
        let h = Harness::new(
            MockSourceAdapter::new()
                .with_listings([listing("m1", "1000円")])
                .with_error("page did not render"),
        );
        let mut session = h.session("kw");

        session.poll_once().await;
        let before = h.store.stored("kw").await;
        let saves_before = h.store.save_count();

        let outcome = session.poll_once().await;
        assert!(matches!(outcome, PollOutcome::FetchFailed(_)));
        assert_eq!(h.store.stored("kw").await, before);
        assert_eq!(h.store.save_count(), saves_before);
        assert_eq!(h.notifier.event_count(), 1); // only the first poll's event
    }

    #[tokio::test]
    async fn empty_fetch_is_not_an_error_and_loses_nothing() {
        let h = Harness::new(
            MockSourceAdapter::new()
                .with_listings([listing("m1", "1000円")])
                .with_listings([]),
        );
        let mut session = h.session("kw");

        session.poll_once().await;
        let outcome = session.poll_once().await;

        assert!(matches!(outcome, PollOutcome::Reconciled(s) if s.added == 0));
        assert!(h.store.stored("kw").await.contains("m1"));
    }

    #[tokio::test]
    async fn save_failure_still_notifies_and_advances_in_memory() {
        let h = Harness::new(
            MockSourceAdapter::new()
                .with_listings([listing("m1", "1000円")])
                .with_listings([listing("m1", "800円")]),
        );
        let mut session = h.session("kw");
        h.store.fail_saves(true);

        let first = session.poll_once().await;
        assert!(matches!(first, PollOutcome::PersistFailed { .. }));
        assert_eq!(h.notifier.event_count(), 1);

        // in-memory base advanced: the second poll sees the drop once
        let second = session.poll_once().await;
        assert!(matches!(
            second,
            PollOutcome::PersistFailed { stats, .. } if stats.price_drops == 1
        ));

        // and a third identical observation does not re-fire
        let h2_events = h.notifier.event_count();
        let third = session.poll_once().await;
        assert!(matches!(
            third,
            PollOutcome::PersistFailed { stats, .. } if stats.price_drops == 0 && stats.added == 0
        ));
        assert_eq!(h.notifier.event_count(), h2_events);
    }

    #[tokio::test]
    async fn load_failure_skips_the_iteration() {
        let h = Harness::new(MockSourceAdapter::new().with_listings([listing("m1", "1000円")]));
        let mut session = h.session("kw");
        h.store.fail_loads(true);

        let outcome = session.poll_once().await;
        assert!(matches!(outcome, PollOutcome::LoadFailed(_)));
        assert_eq!(h.notifier.event_count(), 0);
        assert_eq!(h.store.save_count(), 0);
    }

    #[tokio::test]
    async fn cursor_from_adapter_is_passed_back_on_the_next_fetch() {
        let h = Harness::new(
            MockSourceAdapter::new()
                .with_page(FetchPage::new(vec![]).with_cursor("https://example.test/search?cid=42"))
                .with_listings([]),
        );
        let mut session = h.session("kw");

        session.poll_once().await;
        session.poll_once().await;

        let calls = h.adapter.calls();
        assert_eq!(calls[0].1, None);
        assert_eq!(
            calls[1].1.as_deref(),
            Some("https://example.test/search?cid=42")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_the_sleep_and_closes_the_adapter() {
        let h = Harness::new(MockSourceAdapter::new());
        let session = h.session("kw");
        let token = CancellationToken::new();

        let handle = tokio::spawn(session.run(token.clone()));
        // let the first iteration and sleep entry happen
        tokio::task::yield_now().await;
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("session did not stop after cancellation")
            .unwrap();
        assert!(h.adapter.is_closed());
    }

    #[tokio::test]
    async fn pre_cancelled_token_stops_before_any_fetch() {
        let h = Harness::new(MockSourceAdapter::new());
        let session = h.session("kw");
        let token = CancellationToken::new();
        token.cancel();

        session.run(token).await;
        assert_eq!(h.adapter.fetch_count(), 0);
        assert!(h.adapter.is_closed());
    }

    #[test]
    fn jittered_delay_stays_within_bounds() {
        let h = Harness::new(MockSourceAdapter::new());
        let mut session = h.session("kw");
        session.config = SessionConfig::new(Duration::from_secs(2), Duration::from_secs(9));

        for _ in 0..200 {
            let d = session.jittered_delay();
            assert!(d >= Duration::from_secs(2) && d <= Duration::from_secs(9));
        }
    }

    #[test]
    fn jittered_delay_swaps_inverted_bounds() {
        let h = Harness::new(MockSourceAdapter::new());
        let mut session = h.session("kw");
        session.config = SessionConfig::new(Duration::from_secs(9), Duration::from_secs(2));

        for _ in 0..50 {
            let d = session.jittered_delay();
            assert!(d >= Duration::from_secs(2) && d <= Duration::from_secs(9));
        }
    }
}
