//! Snapshot store implementations.

pub mod fs;
pub mod memory;

pub use fs::FsSnapshotStore;
pub use memory::MemorySnapshotStore;
