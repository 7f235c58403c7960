//! Ownership state: which container caused which rewrite to exist.
//!
//! The authority has no notion of ownership, so this store is the only
//! record that a rule was created on behalf of a container and should be
//! removed when that container stops. A rule is recorded only after the
//! authority confirmed its creation.
//!
//! The whole map is rewritten to disk after every mutation as a single JSON
//! document. Each write goes to a temporary file in the same directory which
//! is then renamed over the state file, so a crash mid-write leaves the last
//! committed document in place:
//!
//! ```json
//! {"4f66ad9a0b2e":[{"domain":"app.local","answer":"10.0.0.5"}]}
//! ```

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use syncdns_core::{ContainerId, Result, RewriteRule, SyncError};
use tempfile::NamedTempFile;
use tracing::debug;

/// Durable map from container to the rewrites it owns.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    entries: BTreeMap<ContainerId, Vec<RewriteRule>>,
}

impl StateStore {
    /// Open the state file at `path`.
    ///
    /// A missing file is created holding an empty document. An existing file
    /// is loaded as-is; it must be valid JSON of the expected shape.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            let store = Self {
                path,
                entries: BTreeMap::new(),
            };
            store.persist()?;
            debug!(path = %store.path.display(), "created empty state file");
            return Ok(store);
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| SyncError::State(format!("failed to read {}: {e}", path.display())))?;

        let entries = serde_json::from_str(&content).map_err(|e| {
            SyncError::State(format!("failed to parse {}: {e}", path.display()))
        })?;

        Ok(Self { path, entries })
    }

    /// Rules owned by `id`, in the order they were recorded
    #[must_use]
    pub fn get(&self, id: &ContainerId) -> &[RewriteRule] {
        self.entries.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether `id` owns exactly this rule
    #[must_use]
    pub fn has(&self, id: &ContainerId, rule: &RewriteRule) -> bool {
        self.get(id).contains(rule)
    }

    /// Record that `id` owns `rule`, then persist.
    ///
    /// On a persist failure the in-memory entry is kept and the error is
    /// returned; the next successful persist brings the file up to date.
    pub fn append(&mut self, id: &ContainerId, rule: RewriteRule) -> Result<()> {
        self.entries.entry(id.clone()).or_default().push(rule);
        self.persist()
    }

    /// Forget everything `id` owns, then persist.
    ///
    /// Returns whether there was an entry. Nothing is written when there was
    /// none. As with [`append`](Self::append), a persist failure does not
    /// restore the entry.
    pub fn remove(&mut self, id: &ContainerId) -> Result<bool> {
        if self.entries.remove(id).is_none() {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Replace the state file with the current contents
    pub fn persist(&self) -> Result<()> {
        let content = serde_json::to_vec(&self.entries)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let write_err = |e: std::io::Error| {
            SyncError::State(format!("failed to write {}: {e}", self.path.display()))
        };

        let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
        file.write_all(&content).map_err(write_err)?;
        file.as_file().sync_all().map_err(write_err)?;
        file.persist(&self.path).map_err(|e| write_err(e.error))?;
        debug!(path = %self.path.display(), containers = self.entries.len(), "state persisted");
        Ok(())
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of containers owning at least one entry
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no container owns anything
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read-only view of the whole map
    #[must_use]
    pub const fn snapshot(&self) -> &BTreeMap<ContainerId, Vec<RewriteRule>> {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn id(s: &str) -> ContainerId {
        ContainerId::new(s)
    }

    fn on_disk(store: &StateStore) -> BTreeMap<ContainerId, Vec<RewriteRule>> {
        let content = std::fs::read_to_string(store.path()).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    #[test]
    fn test_open_creates_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let store = StateStore::open(&path).unwrap();
        assert!(store.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_open_loads_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"c1":[{"domain":"a.com","answer":"1.2.3.4"},{"domain":"b.com","answer":"5.6.7.8"}]}"#,
        )
        .unwrap();

        let store = StateStore::open(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(&id("c1")),
            &[
                RewriteRule::new("a.com", "1.2.3.4"),
                RewriteRule::new("b.com", "5.6.7.8"),
            ]
        );
    }

    #[test]
    fn test_open_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(StateStore::open(&path), Err(SyncError::State(_))));
    }

    #[test]
    fn test_open_fails_without_parent_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("state.json");

        assert!(matches!(StateStore::open(&path), Err(SyncError::State(_))));
    }

    #[test]
    fn test_get_and_has_unknown_container() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::open(dir.path().join("state.json")).unwrap();

        assert!(store.get(&id("nope")).is_empty());
        assert!(!store.has(&id("nope"), &RewriteRule::new("a.com", "1.2.3.4")));
    }

    #[test]
    fn test_append_preserves_order_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::open(dir.path().join("state.json")).unwrap();

        store.append(&id("c1"), RewriteRule::new("a.com", "1.2.3.4")).unwrap();
        store.append(&id("c1"), RewriteRule::new("b.com", "5.6.7.8")).unwrap();

        assert!(store.has(&id("c1"), &RewriteRule::new("b.com", "5.6.7.8")));
        assert!(!store.has(&id("c1"), &RewriteRule::new("b.com", "5.6.7.9")));
        assert_eq!(&on_disk(&store), store.snapshot());
        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            r#"{"c1":[{"domain":"a.com","answer":"1.2.3.4"},{"domain":"b.com","answer":"5.6.7.8"}]}"#
        );
    }

    #[test]
    fn test_remove_persists() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::open(dir.path().join("state.json")).unwrap();
        store.append(&id("c1"), RewriteRule::new("a.com", "1.2.3.4")).unwrap();
        store.append(&id("c2"), RewriteRule::new("b.com", "5.6.7.8")).unwrap();

        assert!(store.remove(&id("c1")).unwrap());
        assert!(!store.remove(&id("c1")).unwrap());

        assert_eq!(store.len(), 1);
        assert_eq!(&on_disk(&store), store.snapshot());
    }

    #[test]
    fn test_reopen_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let mut store = StateStore::open(&path).unwrap();
        store.append(&id("c1"), RewriteRule::new("a.com", "1.2.3.4")).unwrap();

        let reopened = StateStore::open(&path).unwrap();
        assert_eq!(reopened.snapshot(), store.snapshot());
    }

    #[test]
    fn test_interrupted_write_keeps_committed_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let mut store = StateStore::open(&path).unwrap();
        let rule = RewriteRule::new("app.local", "10.0.0.5");
        store.append(&id("c1"), rule.clone()).unwrap();

        // A write that died before it was renamed into place.
        std::fs::write(
            dir.path().join(".tmpQ3xk9a"),
            r#"{"c1":[{"domain":"app.local","answer":"10.0.0.5"}],"c2":[{"d"#,
        )
        .unwrap();

        let reopened = StateStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get(&id("c1")), &[rule]);
    }

    #[test]
    fn test_persist_leaves_only_state_file() {
        let dir = TempDir::new().unwrap();
        let mut store = StateStore::open(dir.path().join("state.json")).unwrap();
        store.append(&id("c1"), RewriteRule::new("a.com", "1.2.3.4")).unwrap();
        store.append(&id("c2"), RewriteRule::new("b.com", "5.6.7.8")).unwrap();
        store.remove(&id("c1")).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("state.json")]);
    }

    #[test]
    fn test_persist_failure_keeps_memory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let mut store = StateStore::open(&path).unwrap();

        // Replace the file with a directory so the next write fails.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let rule = RewriteRule::new("a.com", "1.2.3.4");
        let err = store.append(&id("c1"), rule.clone()).unwrap_err();
        assert!(matches!(err, SyncError::State(_)));
        assert!(store.has(&id("c1"), &rule));
    }
}
