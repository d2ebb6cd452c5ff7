//! Typed errors for the monitor engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. None of these errors is
//! fatal to a running session: fetch and store failures are reported
//! and the session carries on with its next iteration.

use thiserror::Error;

/// Errors raised by a source adapter while obtaining a listing snapshot.
///
/// A fetch error means "no reconciliation this iteration" - the session
/// skips straight to its sleep without touching stored state.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request exceeded the adapter's deadline
    #[error("timeout fetching listings for \"{keyword}\"")]
    Timeout { keyword: String },

    /// Search URL could not be constructed or parsed
    #[error("invalid search URL: {url}")]
    InvalidUrl { url: String },

    /// Response body could not be decoded into listings
    #[error("malformed listing payload: {0}")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Adapter-specific failure (markup change, missing element, ...)
    #[error("adapter error: {0}")]
    Adapter(String),
}

/// Errors raised by a snapshot store.
///
/// Absent state is not an error - `load` returns the empty snapshot on
/// first run. Only real I/O failures and corrupt on-disk state surface.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted snapshot could not be decoded
    #[error("corrupt snapshot: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Result type alias for source adapter operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for snapshot store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
