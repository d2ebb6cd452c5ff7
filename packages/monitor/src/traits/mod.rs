//! Core trait abstractions: the seams the engine's collaborators plug
//! into. Concrete implementations live in [`crate::adapters`],
//! [`crate::stores`], [`crate::notifiers`], and [`crate::testing`].

pub mod notifier;
pub mod source;
pub mod store;

pub use notifier::Notifier;
pub use source::{FetchPage, SharedAdapter, SourceAdapter, SourceAdapterFactory};
pub use store::SnapshotStore;
