//! The snapshot store seam.

use crate::error::StoreResult;
use crate::types::Snapshot;

/// Durable key-value persistence of the last-known listing set per
/// keyword.
///
/// Storage is namespaced per keyword so keywords never collide, and each
/// keyword's record is written only by that keyword's session - no
/// cross-session locking is required on snapshot data.
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the stored snapshot for `keyword`.
    ///
    /// Absent state is `Ok(empty)` - first run is not a failure. Only
    /// real I/O or corruption failures surface as errors.
    async fn load(&self, keyword: &str) -> StoreResult<Snapshot>;

    /// Replace the stored snapshot for `keyword`.
    ///
    /// Atomic with respect to concurrent `load` for the same keyword:
    /// readers never observe a partially written snapshot. Creates the
    /// keyword's namespace on first save.
    async fn save(&self, keyword: &str, snapshot: &Snapshot) -> StoreResult<()>;
}
