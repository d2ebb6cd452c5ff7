//! The diff engine: reconciles an incoming snapshot against the stored one.
//!
//! Pure and deterministic - no I/O, no clock, no randomness. Sessions
//! feed it snapshots and act on the report; that keeps every failure
//! path around it unit-testable without a live source.

use crate::types::{parse_price, Listing, Snapshot};

/// A downward price transition for one listing id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceDrop {
    /// The listing as previously stored
    pub previous: Listing,

    /// The listing as just observed
    pub current: Listing,

    /// Parsed stored price
    pub previous_price: u64,

    /// Parsed incoming price, strictly lower
    pub current_price: u64,
}

/// Output of one reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeReport {
    /// Listings whose id is present in incoming but absent from stored
    pub added: Vec<Listing>,

    /// Ids present in both sides whose parsed price went down
    pub price_drops: Vec<PriceDrop>,

    /// Union of stored and incoming, incoming winning per id
    pub merged: Snapshot,
}

impl ChangeReport {
    /// Whether the report carries no notifiable change.
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.price_drops.is_empty()
    }
}

/// Compare an incoming snapshot against the stored one.
///
/// - `added`: incoming ids not present in stored.
/// - `price_drops`: ids in both where both price texts parse and the
///   incoming amount is strictly lower. A parse failure on either side
///   silently skips the comparison for that id - malformed price text is
///   expected and never an error.
/// - `merged`: stored with every incoming entry upserted by id, so a
///   listing that temporarily fails to re-appear is not lost, while any
///   re-observed listing's fields are refreshed.
///
/// An empty incoming snapshot yields `merged == stored` and no events;
/// distinguishing "empty fetch" from "failed fetch" is the session's job,
/// and a failed fetch must never reach this function.
pub fn diff(stored: &Snapshot, incoming: &Snapshot) -> ChangeReport {
    let mut added = Vec::new();
    let mut price_drops = Vec::new();
    let mut merged = stored.clone();

    for listing in incoming.iter() {
        match stored.get(&listing.id) {
            None => added.push(listing.clone()),
            Some(previous) => {
                if let (Some(old), Some(new)) =
                    (parse_price(&previous.price), parse_price(&listing.price))
                {
                    if new < old {
                        price_drops.push(PriceDrop {
                            previous: previous.clone(),
                            current: listing.clone(),
                            previous_price: old,
                            current_price: new,
                        });
                    }
                }
            }
        }
        merged.upsert(listing.clone());
    }

    ChangeReport {
        added,
        price_drops,
        merged,
    }
}
