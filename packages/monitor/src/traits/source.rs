//! The source adapter seam.
//!
//! Everything site-specific - browser automation, DOM selectors,
//! pagination, sort-order handling - lives behind this trait so the
//! diff/session/registry logic is reusable against any listings source
//! (and mockable in tests).

use std::sync::Arc;

use crate::error::FetchResult;
use crate::types::Listing;

/// One page of raw listings as returned by a source adapter.
#[derive(Debug, Clone, Default)]
pub struct FetchPage {
    /// Listings currently visible for the keyword. Zero listings with no
    /// error is a valid, empty snapshot.
    pub listings: Vec<Listing>,

    /// Cursor to pass back on the next fetch, if the source resolved one
    /// (e.g. a redirected canonical search URL). `None` keeps the
    /// session's current cursor.
    pub next_cursor: Option<String>,
}

impl FetchPage {
    /// A page carrying the given listings and no cursor update.
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings,
            next_cursor: None,
        }
    }

    /// Attach a cursor for the next fetch.
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.next_cursor = Some(cursor.into());
        self
    }
}

/// Turns a keyword into raw listing records.
///
/// Must tolerate being invoked repeatedly with the same or an evolving
/// cursor; an absent cursor means "use the keyword's default search".
/// A returned error means "no reconciliation this iteration" - the
/// session skips to its sleep without touching stored state.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Fetch the currently visible listings for `keyword`.
    async fn fetch(&self, keyword: &str, cursor: Option<&str>) -> FetchResult<FetchPage>;

    /// Release any underlying resources (e.g. a browser handle).
    ///
    /// Called once by the session when it observes cancellation. The
    /// default is a no-op for adapters that hold nothing.
    async fn close(&self) {}
}

/// Creates one adapter per session.
///
/// Sessions own their adapter exclusively, mirroring sources where the
/// underlying handle (a browser, a socket) cannot be shared. Closures
/// `Fn(&str) -> Arc<dyn SourceAdapter>` implement this directly.
pub trait SourceAdapterFactory: Send + Sync {
    /// Create the adapter for `keyword`'s session.
    fn create(&self, keyword: &str) -> Arc<dyn SourceAdapter>;
}

impl<F> SourceAdapterFactory for F
where
    F: Fn(&str) -> Arc<dyn SourceAdapter> + Send + Sync,
{
    fn create(&self, keyword: &str) -> Arc<dyn SourceAdapter> {
        (self)(keyword)
    }
}

/// Hands every session the same shared adapter.
///
/// Suitable for stateless adapters (plain HTTP clients). Note that a
/// cancelled session will call `close` on the shared instance; stateless
/// adapters keep it a no-op.
pub struct SharedAdapter(pub Arc<dyn SourceAdapter>);

impl SourceAdapterFactory for SharedAdapter {
    fn create(&self, _keyword: &str) -> Arc<dyn SourceAdapter> {
        Arc::clone(&self.0)
    }
}
