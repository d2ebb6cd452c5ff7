//! Listing and snapshot types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One marketplace item as observed in a snapshot.
///
/// `price` holds the originally-observed text (e.g. `"12,800円"`) so that
/// records whose price never parses still re-store byte-identically on
/// every poll. Parsing happens at comparison time, see
/// [`parse_price`](crate::types::parse_price).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Stable unique identifier assigned by the source
    pub id: String,

    /// Display title; may be empty if the adapter could not extract it
    #[serde(default)]
    pub name: String,

    /// Price text as observed on the source page
    #[serde(default)]
    pub price: String,

    /// Opaque reference to a preview image, never resolved by the engine
    #[serde(default)]
    pub image: String,

    /// Opaque reference to the detail page, never resolved by the engine
    #[serde(default)]
    pub link: String,
}

impl Listing {
    /// Create a listing with the given id; remaining fields start empty.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            price: String::new(),
            image: String::new(),
            link: String::new(),
        }
    }

    /// Set the display title.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the observed price text.
    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = price.into();
        self
    }

    /// Set the preview image reference.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Set the detail page reference.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }
}

/// The complete set of listings known for one keyword at a point in time.
///
/// Keyed by listing id, insertion-ordered. Serializes to (and from) a
/// plain JSON array of listings - the persisted layout is one array per
/// keyword, fully overwritten on each successful reconciliation.
/// Duplicate ids collapse to last-seen on construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Listing>", from = "Vec<Listing>")]
pub struct Snapshot {
    listings: IndexMap<String, Listing>,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from raw listings; duplicate ids collapse to
    /// last-seen, listings with an empty id are discarded.
    pub fn from_listings(listings: impl IntoIterator<Item = Listing>) -> Self {
        let mut snapshot = Self::new();
        for listing in listings {
            snapshot.upsert(listing);
        }
        snapshot
    }

    /// Insert or replace a listing by id. Empty ids are discarded.
    pub fn upsert(&mut self, listing: Listing) {
        if listing.id.is_empty() {
            return;
        }
        self.listings.insert(listing.id.clone(), listing);
    }

    /// Look up a listing by id.
    pub fn get(&self, id: &str) -> Option<&Listing> {
        self.listings.get(id)
    }

    /// Whether the snapshot contains the given id.
    pub fn contains(&self, id: &str) -> bool {
        self.listings.contains_key(id)
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the snapshot holds no listings.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Iterate listings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Listing> {
        self.listings.values()
    }

    /// Iterate listing ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.listings.keys().map(String::as_str)
    }
}

impl From<Vec<Listing>> for Snapshot {
    fn from(listings: Vec<Listing>) -> Self {
        Self::from_listings(listings)
    }
}

impl From<Snapshot> for Vec<Listing> {
    fn from(snapshot: Snapshot) -> Self {
        snapshot.listings.into_values().collect()
    }
}

impl FromIterator<Listing> for Snapshot {
    fn from_iter<I: IntoIterator<Item = Listing>>(iter: I) -> Self {
        Self::from_listings(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_ids_collapse_to_last_seen() {
        let snapshot = Snapshot::from_listings([
            Listing::new("m1").with_price("1000円"),
            Listing::new("m2").with_price("500円"),
            Listing::new("m1").with_price("800円"),
        ]);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("m1").unwrap().price, "800円");
    }

    #[test]
    fn empty_ids_are_discarded() {
        let snapshot = Snapshot::from_listings([Listing::new(""), Listing::new("m1")]);
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains("m1"));
    }

    #[test]
    fn serializes_as_plain_array() {
        let snapshot = Snapshot::from_listings([
            Listing::new("m1").with_name("item").with_price("1000円"),
        ]);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["id"], "m1");
        assert_eq!(json[0]["price"], "1000円");
    }

    #[test]
    fn deserializes_from_array_collapsing_duplicates() {
        let json = r#"[
            {"id": "m1", "name": "a", "price": "1000円", "image": "", "link": ""},
            {"id": "m1", "name": "a", "price": "900円", "image": "", "link": ""}
        ]"#;

        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("m1").unwrap().price, "900円");
    }

    #[test]
    fn missing_optional_fields_default_to_empty() {
        let json = r#"[{"id": "m1"}]"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.get("m1").unwrap().name, "");
    }
}
