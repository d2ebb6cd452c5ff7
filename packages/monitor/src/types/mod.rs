//! Domain types: listings, snapshots, prices, events, configuration.

pub mod config;
pub mod event;
pub mod listing;
pub mod price;

pub use config::{SessionConfig, DEFAULT_MAX_DELAY, DEFAULT_MIN_DELAY, DEFAULT_STOP_TIMEOUT};
pub use event::NotificationEvent;
pub use listing::{Listing, Snapshot};
pub use price::parse_price;
