//! Marketplace Listing Monitor Engine
//!
//! Watches marketplace search keywords for new and discounted listings.
//! For each watched keyword an independent, cancellable session
//! repeatedly obtains a snapshot of the currently visible listings
//! through a pluggable source adapter, reconciles it against the
//! last-known snapshot, persists the merge, and emits one notification
//! event per change.
//!
//! # Design
//!
//! - No duplicate notifications across restarts: the merged snapshot is
//!   the durable diff base, and a drop can only fire once per downward
//!   transition.
//! - Forward progress despite per-poll failures: fetch errors, store
//!   errors, and malformed price text all skip work, never kill a
//!   session.
//! - Monotone merging: partial or reordered fetches never erase
//!   previously known listings.
//! - Collaborators are injected trait objects - no process-wide
//!   singletons, so independent monitor instances coexist in tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use listing_monitor::{
//!     HttpSourceAdapter, LogNotifier, FsSnapshotStore,
//!     SessionConfig, SessionRegistry, SharedAdapter, SourceAdapter,
//! };
//!
//! let adapter: Arc<dyn SourceAdapter> =
//!     Arc::new(HttpSourceAdapter::new("https://market.example/search?q={keyword}"));
//! let registry = SessionRegistry::new(
//!     Arc::new(SharedAdapter(adapter)),
//!     Arc::new(FsSnapshotStore::new("./data")),
//!     Arc::new(LogNotifier::new()),
//! );
//!
//! registry.register("クドわふたー");
//! registry.register("ブルアカ");
//! registry.start_all(SessionConfig::default());
//! // ... later
//! registry.shutdown().await;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (SourceAdapter, SnapshotStore, Notifier)
//! - [`types`] - Listings, snapshots, prices, events, configuration
//! - [`diff`] - The pure reconciliation function
//! - [`session`] - The per-keyword poll loop
//! - [`registry`] - The supervisor over all sessions
//! - [`stores`] - Snapshot store implementations
//! - [`adapters`] - Source adapter implementations
//! - [`notifiers`] - Notifier implementations
//! - [`testing`] - Mock collaborators for tests

pub mod adapters;
pub mod diff;
pub mod error;
pub mod notifiers;
pub mod registry;
pub mod session;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{FetchError, FetchResult, StoreError, StoreResult};
pub use traits::{
    notifier::Notifier,
    source::{FetchPage, SharedAdapter, SourceAdapter, SourceAdapterFactory},
    store::SnapshotStore,
};
pub use types::{
    Listing, NotificationEvent, SessionConfig, Snapshot, parse_price,
    DEFAULT_MAX_DELAY, DEFAULT_MIN_DELAY, DEFAULT_STOP_TIMEOUT,
};

// Re-export the engine pieces
pub use diff::{diff, ChangeReport, PriceDrop};
pub use registry::{SessionRegistry, SessionStatus};
pub use session::{IterationStats, PollOutcome, PollSession};

// Re-export implementations
pub use adapters::HttpSourceAdapter;
pub use notifiers::{ChannelNotifier, LogNotifier};
pub use stores::{FsSnapshotStore, MemorySnapshotStore};
