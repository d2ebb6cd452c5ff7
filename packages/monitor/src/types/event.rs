//! Notification events emitted toward the external notifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::listing::Listing;

/// One change owed a notification, as decided by a poll session.
///
/// Delivery is best-effort and fire-and-forget from the session's point
/// of view; how the event is rendered (console line, OS popup, UI feed)
/// is the notifier's business. Serde-derived so a control surface can
/// ship events over a wire unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// A listing id appeared that the stored snapshot did not contain.
    NewListing {
        keyword: String,
        listing: Listing,
        at: DateTime<Utc>,
    },

    /// A known listing re-appeared with a lower parsed price.
    PriceDrop {
        keyword: String,
        listing: Listing,
        previous_price: u64,
        current_price: u64,
        at: DateTime<Utc>,
    },
}

impl NotificationEvent {
    /// Build a new-listing event stamped with the current time.
    pub fn new_listing(keyword: impl Into<String>, listing: Listing) -> Self {
        Self::NewListing {
            keyword: keyword.into(),
            listing,
            at: Utc::now(),
        }
    }

    /// Build a price-drop event stamped with the current time.
    pub fn price_drop(
        keyword: impl Into<String>,
        listing: Listing,
        previous_price: u64,
        current_price: u64,
    ) -> Self {
        Self::PriceDrop {
            keyword: keyword.into(),
            listing,
            previous_price,
            current_price,
            at: Utc::now(),
        }
    }

    /// The keyword this event belongs to.
    pub fn keyword(&self) -> &str {
        match self {
            Self::NewListing { keyword, .. } | Self::PriceDrop { keyword, .. } => keyword,
        }
    }

    /// The listing the event is about.
    pub fn listing(&self) -> &Listing {
        match self {
            Self::NewListing { listing, .. } | Self::PriceDrop { listing, .. } => listing,
        }
    }
}
