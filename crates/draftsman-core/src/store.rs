//! Flat key-value persistence for documents, keyed by document id.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::Document;

/// Every operation rejects ids outside `[A-Za-z0-9_-]` with `Error::InvalidId`.
pub trait DocumentStore: Send + Sync {
    /// All stored ids, sorted.
    fn list(&self) -> Result<Vec<String>>;

    fn get(&self, id: &str) -> Result<Document>;

    /// Insert or overwrite the document stored under `doc.id`.
    fn put(&self, doc: &Document) -> Result<()>;

    /// Deleting an id that is not stored is not an error.
    fn delete(&self, id: &str) -> Result<()>;
}

/// Ids double as file names, so they are restricted to `[A-Za-z0-9_-]`.
pub fn validate_id(id: &str) -> Result<()> {
    let ok = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidId { id: id.to_string() })
    }
}

// --- File store ---

/// One pretty-printed `<id>.json` file per document.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// Read a document as its raw JSON string.
    pub fn get_raw(&self, id: &str) -> Result<String> {
        validate_id(id)?;
        let path = self.path_for(id);
        if !path.exists() {
            return Err(Error::NotFound { id: id.to_string() });
        }
        Ok(fs::read_to_string(&path)?)
    }

    /// Write raw JSON under `id`.
    ///
    /// Goes through a temp file and a rename so readers never observe a
    /// half-written document.
    pub fn put_raw(&self, id: &str, data: &str) -> Result<()> {
        validate_id(id)?;
        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!(".{}.json.tmp", id));
        fs::write(&tmp, data)?;
        fs::rename(&tmp, self.path_for(id))?;
        Ok(())
    }
}

impl DocumentStore for FileStore {
    fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }
        let mut ids: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let name = entry.file_name().to_string_lossy().to_string();
                name.strip_suffix(".json")
                    .filter(|n| !n.starts_with('.'))
                    .map(|n| n.to_string())
            })
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn get(&self, id: &str) -> Result<Document> {
        let raw = self.get_raw(id)?;
        serde_json::from_str(&raw).map_err(|e| {
            warn!(id, error = %e, "stored document is not readable");
            Error::Json(e)
        })
    }

    fn put(&self, doc: &Document) -> Result<()> {
        let json = serde_json::to_string_pretty(doc)?;
        self.put_raw(&doc.id, &json)?;
        info!(id = %doc.id, dir = %self.dir.display(), "saved document");
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        validate_id(id)?;
        let path = self.path_for(id);
        if path.exists() {
            fs::remove_file(&path)?;
            info!(id, "deleted document");
        }
        Ok(())
    }
}

// --- In-memory store ---

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: Arc<RwLock<HashMap<String, Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// A poisoned lock only means another writer panicked mid-insert; the map is still usable.
impl DocumentStore for MemoryStore {
    fn list(&self) -> Result<Vec<String>> {
        let docs = self.docs.read().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<String> = docs.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn get(&self, id: &str) -> Result<Document> {
        validate_id(id)?;
        let docs = self.docs.read().unwrap_or_else(|e| e.into_inner());
        docs.get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound { id: id.to_string() })
    }

    fn put(&self, doc: &Document) -> Result<()> {
        validate_id(&doc.id)?;
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        docs.insert(doc.id.clone(), doc.clone());
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        validate_id(id)?;
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        docs.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DocumentContent, DocumentMetadata, UseCaseContent};
    use chrono::{TimeZone, Utc};

    fn doc(id: &str) -> Document {
        Document::new(
            id.to_string(),
            "Test".to_string(),
            DocumentContent::UseCase(UseCaseContent::default()),
            DocumentMetadata::new(Utc.timestamp_opt(0, 0).unwrap(), vec![], None),
        )
    }

    fn exercise(store: &dyn DocumentStore) {
        assert!(store.list().unwrap().is_empty());
        store.put(&doc("b-2")).unwrap();
        store.put(&doc("a_1")).unwrap();
        assert_eq!(store.list().unwrap(), vec!["a_1", "b-2"]);
        assert_eq!(store.get("a_1").unwrap(), doc("a_1"));

        store.delete("a_1").unwrap();
        store.delete("a_1").unwrap();
        assert!(matches!(store.get("a_1"), Err(Error::NotFound { .. })));
        assert_eq!(store.list().unwrap(), vec!["b-2"]);
    }

    #[test]
    fn memory_store_round_trip() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn file_store_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path().join("docs"));
        exercise(&store);
        assert!(store.dir().join("b-2.json").exists());
        assert!(!store.dir().join(".b-2.json.tmp").exists());
    }

    fn rejects_path_characters(store: &dyn DocumentStore) {
        assert!(matches!(store.get("../etc/passwd"), Err(Error::InvalidId { .. })));
        assert!(matches!(store.put(&doc("a/b")), Err(Error::InvalidId { .. })));
        assert!(matches!(store.put(&doc("")), Err(Error::InvalidId { .. })));
        assert!(matches!(store.delete("../x"), Err(Error::InvalidId { .. })));
    }

    #[test]
    fn ids_with_path_characters_are_rejected_by_both_stores() {
        let tmp = tempfile::tempdir().unwrap();
        rejects_path_characters(&FileStore::new(tmp.path()));
        rejects_path_characters(&MemoryStore::new());
    }

    #[test]
    fn corrupt_file_is_a_json_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path());
        store.put_raw("broken", "{ not json").unwrap();
        assert!(matches!(store.get("broken"), Err(Error::Json(_))));
    }
}
