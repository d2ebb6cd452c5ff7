//! Filesystem snapshot store: one JSON file per keyword.
//!
//! Layout mirrors the persisted interface: `<root>/<keyword>/listings.json`
//! holding a plain array of listings, fully overwritten on each
//! successful reconciliation. Writes go through a temp file and a rename
//! so a concurrent reader never observes a torn snapshot.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StoreResult;
use crate::traits::store::SnapshotStore;
use crate::types::Snapshot;

const SNAPSHOT_FILE: &str = "listings.json";

/// Snapshot store backed by per-keyword directories under a root path.
pub struct FsSnapshotStore {
    root: PathBuf,
}

impl FsSnapshotStore {
    /// Create a store rooted at `root`. The directory is created lazily
    /// on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory this store writes under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory namespacing one keyword's state.
    pub fn keyword_dir(&self, keyword: &str) -> PathBuf {
        self.root.join(sanitize_keyword(keyword))
    }

    fn snapshot_path(&self, keyword: &str) -> PathBuf {
        self.keyword_dir(keyword).join(SNAPSHOT_FILE)
    }
}

/// Escape a keyword into a filesystem-safe directory name.
///
/// Injective: distinct keywords always map to distinct names, so
/// keyword namespaces never collide. `%` escapes itself; path
/// separators and other reserved characters become `%XX`; the dot-only
/// names are prefixed so they cannot traverse upward.
fn sanitize_keyword(keyword: &str) -> String {
    let mut out = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        match c {
            '%' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => {
                out.push('%');
                out.push_str(&format!("{:02X}", c as u32));
            }
            _ => out.push(c),
        }
    }
    if out.is_empty() || out == "." || out == ".." {
        format!("%{out}")
    } else {
        out
    }
}

#[async_trait::async_trait]
impl SnapshotStore for FsSnapshotStore {
    async fn load(&self, keyword: &str) -> StoreResult<Snapshot> {
        let path = self.snapshot_path(keyword);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Snapshot::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(&self, keyword: &str, snapshot: &Snapshot) -> StoreResult<()> {
        let dir = self.keyword_dir(keyword);
        tokio::fs::create_dir_all(&dir).await?;

        let json = serde_json::to_vec_pretty(snapshot)?;
        let tmp = dir.join(format!("{SNAPSHOT_FILE}.tmp"));
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, self.snapshot_path(keyword)).await?;

        debug!(keyword = %keyword, listings = snapshot.len(), "snapshot persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Listing;

    fn store() -> (tempfile::TempDir, FsSnapshotStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsSnapshotStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn first_run_loads_empty_without_error() {
        let (_dir, store) = store();
        let snapshot = store.load("クドわふたー").await.unwrap();
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let (_dir, store) = store();
        let snapshot = Snapshot::from_listings([
            Listing::new("m1").with_name("item").with_price("1,000円"),
        ]);

        store.save("kw", &snapshot).await.unwrap();
        let loaded = store.load("kw").await.unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn save_fully_overwrites_previous_file() {
        let (_dir, store) = store();

        store
            .save("kw", &Snapshot::from_listings([Listing::new("m1")]))
            .await
            .unwrap();
        store
            .save("kw", &Snapshot::from_listings([Listing::new("m2")]))
            .await
            .unwrap();

        let loaded = store.load("kw").await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains("m2"));
    }

    #[tokio::test]
    async fn persisted_layout_is_a_plain_array() {
        let (dir, store) = store();
        store
            .save("kw", &Snapshot::from_listings([Listing::new("m1")]))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join("kw").join("listings.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.is_array());
    }

    #[tokio::test]
    async fn keywords_never_share_a_namespace() {
        let (_dir, store) = store();

        store
            .save("a", &Snapshot::from_listings([Listing::new("only-a")]))
            .await
            .unwrap();
        store
            .save("b", &Snapshot::from_listings([Listing::new("only-b")]))
            .await
            .unwrap();

        assert!(!store.load("a").await.unwrap().contains("only-b"));
        assert!(!store.load("b").await.unwrap().contains("only-a"));
    }

    #[test]
    fn sanitization_is_injective_and_traversal_safe() {
        assert_eq!(sanitize_keyword("plain"), "plain");
        assert_ne!(sanitize_keyword("a/b"), sanitize_keyword("a_b"));
        assert_ne!(sanitize_keyword("a/b"), sanitize_keyword("a%2Fb"));
        // separators are escaped, so the result is a single path component
        assert!(!sanitize_keyword("../escape").contains('/'));
        assert!(!sanitize_keyword("a\\b").contains('\\'));
        assert_eq!(sanitize_keyword(".."), "%..");
        assert_eq!(sanitize_keyword(""), "%");
        // unicode keywords pass through untouched
        assert_eq!(sanitize_keyword("ブルアカ"), "ブルアカ");
    }
}
