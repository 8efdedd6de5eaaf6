//! Cache persistence.
//!
//! Load/save of derived documents as whole-file atomic units. Each cache
//! kind maps to one JSON file in the store directory; saves write a
//! sibling temp file and rename it into place, so readers never observe
//! a partial document. No cross-process locking is implemented:
//! concurrent writers from separate processes can race.

use crate::models::Context;
use crate::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// The derived documents the engine persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    /// The embeddings document (slug -> vector, source text, summary).
    Embeddings,
    /// The combo-intelligence document (edges, power combos, chains).
    ComboIntelligence,
}

impl CacheKind {
    /// Returns the file name for this cache document.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Embeddings => "embeddings.json",
            Self::ComboIntelligence => "combo-intelligence.json",
        }
    }

    /// Returns a short display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Embeddings => "embeddings",
            Self::ComboIntelligence => "combo intelligence",
        }
    }
}

/// Whole-file document store over one directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Directory holding the cache documents.
    dir: PathBuf,
}

impl CacheStore {
    /// Creates a store over the given directory.
    ///
    /// The directory is created lazily on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the store directory.
    #[must_use]
    pub const fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Returns the path of a cache document.
    #[must_use]
    pub fn path(&self, kind: CacheKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Loads a cache document, or `None` when it does not exist.
    ///
    /// Absence is not an error: callers decide whether it means cold
    /// start or misuse.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load<T: DeserializeOwned>(&self, kind: CacheKind) -> Result<Option<T>> {
        let path = self.path(kind);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| Error::OperationFailed {
            operation: format!("read_{}", kind.file_name()),
            cause: e.to_string(),
        })?;

        let document = serde_json::from_str(&content).map_err(|e| Error::OperationFailed {
            operation: format!("parse_{}", kind.file_name()),
            cause: e.to_string(),
        })?;

        Ok(Some(document))
    }

    /// Saves a cache document, replacing any prior one atomically.
    ///
    /// Serializes to a sibling temp file and renames it into place; the
    /// document is never observable half-written.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem step fails.
    pub fn save<T: Serialize>(&self, kind: CacheKind, document: &T) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::OperationFailed {
            operation: "create_cache_dir".to_string(),
            cause: e.to_string(),
        })?;

        let content = serde_json::to_string(document).map_err(|e| Error::OperationFailed {
            operation: format!("serialize_{}", kind.file_name()),
            cause: e.to_string(),
        })?;

        let path = self.path(kind);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, content).map_err(|e| Error::OperationFailed {
            operation: format!("write_{}", kind.file_name()),
            cause: e.to_string(),
        })?;

        fs::rename(&tmp, &path).map_err(|e| Error::OperationFailed {
            operation: format!("replace_{}", kind.file_name()),
            cause: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), "cache document saved");
        Ok(())
    }

    /// Removes a cache document if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn remove(&self, kind: CacheKind) -> Result<bool> {
        let path = self.path(kind);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| Error::OperationFailed {
            operation: format!("remove_{}", kind.file_name()),
            cause: e.to_string(),
        })?;
        Ok(true)
    }
}

impl AsRef<Path> for CacheStore {
    fn as_ref(&self) -> &Path {
        &self.dir
    }
}

/// Computes a fingerprint of a catalog snapshot.
///
/// SHA-256 over the sorted `(slug, embedding source text)` pairs. Stored
/// in both cache documents so a stale cache can be surfaced; rebuilds
/// remain manual.
#[must_use]
pub fn catalog_fingerprint(contexts: &[Context]) -> String {
    let mut pairs: Vec<(String, String)> = contexts
        .iter()
        .map(|c| {
            (
                c.slug.as_str().to_string(),
                crate::matcher::embedding_text(c),
            )
        })
        .collect();
    pairs.sort();

    let mut hasher = Sha256::new();
    for (slug, text) in &pairs {
        hasher.update(slug.as_bytes());
        hasher.update([0u8]);
        hasher.update(text.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        version: u32,
        payload: Vec<String>,
    }

    #[test]
    fn test_load_absent_is_none() {
        let dir = TempDir::new().expect("tempdir failed");
        let store = CacheStore::new(dir.path());

        let loaded: Option<Doc> = store.load(CacheKind::Embeddings).expect("load failed");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = TempDir::new().expect("tempdir failed");
        let store = CacheStore::new(dir.path());

        let doc = Doc {
            version: 1,
            payload: vec!["a".to_string(), "b".to_string()],
        };
        store
            .save(CacheKind::ComboIntelligence, &doc)
            .expect("save failed");

        let loaded: Option<Doc> = store
            .load(CacheKind::ComboIntelligence)
            .expect("load failed");
        assert_eq!(loaded, Some(doc));
    }

    #[test]
    fn test_save_replaces_whole_file() {
        let dir = TempDir::new().expect("tempdir failed");
        let store = CacheStore::new(dir.path());

        let first = Doc {
            version: 1,
            payload: vec!["stale".to_string(); 100],
        };
        store.save(CacheKind::Embeddings, &first).expect("save failed");

        let second = Doc {
            version: 2,
            payload: vec!["fresh".to_string()],
        };
        store.save(CacheKind::Embeddings, &second).expect("save failed");

        let loaded: Option<Doc> = store.load(CacheKind::Embeddings).expect("load failed");
        assert_eq!(loaded, Some(second));

        // No temp file left behind.
        let tmp = store.path(CacheKind::Embeddings).with_extension("json.tmp");
        assert!(!tmp.exists());
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let dir = TempDir::new().expect("tempdir failed");
        let store = CacheStore::new(dir.path().join("nested").join("cache"));

        let doc = Doc {
            version: 1,
            payload: Vec::new(),
        };
        store.save(CacheKind::Embeddings, &doc).expect("save failed");
        assert!(store.path(CacheKind::Embeddings).exists());
    }

    #[test]
    fn test_remove() {
        let dir = TempDir::new().expect("tempdir failed");
        let store = CacheStore::new(dir.path());

        let doc = Doc {
            version: 1,
            payload: Vec::new(),
        };
        store.save(CacheKind::Embeddings, &doc).expect("save failed");

        assert!(store.remove(CacheKind::Embeddings).expect("remove failed"));
        assert!(!store.remove(CacheKind::Embeddings).expect("remove failed"));
    }

    #[test]
    fn test_load_corrupt_document_errors() {
        let dir = TempDir::new().expect("tempdir failed");
        let store = CacheStore::new(dir.path());

        fs::create_dir_all(dir.path()).expect("mkdir failed");
        fs::write(store.path(CacheKind::Embeddings), "{not json").expect("write failed");

        let result: Result<Option<Doc>> = store.load(CacheKind::Embeddings);
        assert!(result.is_err());
    }
}
