//! Catalog loading with dynamic taxonomy discovery.
//!
//! The loader scans a storage root whose top-level directories are type
//! tags and whose leaf directories each hold one `context.yaml`. The
//! discovered records live in a dense array with slug and type offset
//! indexes, giving O(1) lookup and stable, cache-friendly iteration.

mod document;

pub use document::{ContextDocument, Metadata, parse_context};

use crate::models::{Context, ContextType, Slug};
use crate::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Catalog file name for leaf documents.
const DOCUMENT_NAME: &str = "context.yaml";

/// Scans a storage hierarchy and indexes the discovered contexts.
///
/// The loader is a plain value: multiple isolated instances can coexist
/// (tests, multi-tenant use). It is read-only with respect to storage;
/// the only side effect of a scan is in-memory index construction.
pub struct CatalogLoader {
    /// Storage root.
    root: PathBuf,
    /// Dense record array in scan order.
    contexts: Vec<Context>,
    /// Slug to array-offset index.
    slug_index: HashMap<Slug, usize>,
    /// Type tag to array-offset index.
    type_index: HashMap<ContextType, Vec<usize>>,
}

impl CatalogLoader {
    /// Creates a loader over the given storage root. No scan happens
    /// until [`load_all`](Self::load_all).
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            contexts: Vec::new(),
            slug_index: HashMap::new(),
            type_index: HashMap::new(),
        }
    }

    /// Returns the storage root.
    #[must_use]
    pub const fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Scans the storage root and populates the indexes.
    ///
    /// Every top-level directory becomes a type tag; each `context.yaml`
    /// beneath it is parsed into a [`Context`]. A malformed document is
    /// logged and skipped, never aborting the scan. A missing root
    /// yields an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns an error only for I/O failures other than a missing root
    /// (e.g. permission errors on the root directory).
    pub fn load_all(&mut self) -> Result<&[Context]> {
        self.contexts.clear();
        self.slug_index.clear();
        self.type_index.clear();

        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(
                    root = %self.root.display(),
                    "catalog root missing, loading empty catalog"
                );
                return Ok(&self.contexts);
            }
            Err(e) => {
                return Err(Error::OperationFailed {
                    operation: "read_catalog_root".to_string(),
                    cause: e.to_string(),
                });
            }
        };

        // Sort type directories by name so scan order (and therefore
        // ranking tie order) is deterministic across platforms.
        let mut type_dirs: Vec<PathBuf> = entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        type_dirs.sort();

        for type_dir in &type_dirs {
            let Some(tag) = type_dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let context_type = ContextType::new(tag);
            self.scan_type(type_dir, &context_type);
        }

        tracing::info!(
            contexts = self.contexts.len(),
            types = self.type_index.len(),
            root = %self.root.display(),
            "catalog loaded"
        );

        Ok(&self.contexts)
    }

    /// Walks one type directory for leaf documents.
    fn scan_type(&mut self, type_dir: &Path, context_type: &ContextType) {
        let walker = WalkDir::new(type_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| {
                entry.file_type().is_file() && entry.file_name() == DOCUMENT_NAME
            });

        for entry in walker {
            match document::parse_context(entry.path(), context_type) {
                Ok(context) => self.insert(context),
                Err(e) => {
                    tracing::warn!(
                        path = %entry.path().display(),
                        error = %e,
                        "skipping malformed context document"
                    );
                }
            }
        }
    }

    /// Inserts a context, replacing a previous record on duplicate slug.
    fn insert(&mut self, context: Context) {
        if let Some(&offset) = self.slug_index.get(&context.slug) {
            // Last-loaded-wins, flagged: duplicates are probably
            // unintended data loss on the catalog side.
            tracing::warn!(
                slug = %context.slug,
                previous = %self.contexts[offset].source_path.display(),
                replacement = %context.source_path.display(),
                "duplicate slug, last-loaded document wins"
            );

            let old_type = self.contexts[offset].context_type.clone();
            if old_type != context.context_type {
                if let Some(offsets) = self.type_index.get_mut(&old_type) {
                    offsets.retain(|&o| o != offset);
                }
                self.type_index
                    .entry(context.context_type.clone())
                    .or_default()
                    .push(offset);
            }
            self.contexts[offset] = context;
        } else {
            let offset = self.contexts.len();
            self.slug_index.insert(context.slug.clone(), offset);
            self.type_index
                .entry(context.context_type.clone())
                .or_default()
                .push(offset);
            self.contexts.push(context);
        }
    }

    /// Looks up a context by slug. Case-insensitive.
    #[must_use]
    pub fn get_by_slug(&self, slug: &str) -> Option<&Context> {
        let slug = Slug::new(slug);
        self.slug_index.get(&slug).map(|&offset| &self.contexts[offset])
    }

    /// Lists contexts by type tag; `"all"` lists everything in scan order.
    #[must_use]
    pub fn list_by_type(&self, context_type: &str) -> Vec<&Context> {
        if context_type == "all" {
            return self.contexts.iter().collect();
        }

        let tag = ContextType::new(context_type);
        self.type_index.get(&tag).map_or_else(Vec::new, |offsets| {
            offsets.iter().map(|&o| &self.contexts[o]).collect()
        })
    }

    /// Returns the discovered type tags, sorted.
    #[must_use]
    pub fn types(&self) -> Vec<&ContextType> {
        let mut types: Vec<&ContextType> = self.type_index.keys().collect();
        types.sort();
        types
    }

    /// Returns how many contexts carry the given type tag.
    #[must_use]
    pub fn count_by_type(&self, context_type: &ContextType) -> usize {
        self.type_index.get(context_type).map_or(0, Vec::len)
    }

    /// Returns every loaded context in scan order.
    #[must_use]
    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    /// Returns the number of loaded contexts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Returns true when no contexts are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Clears both indexes and re-scans the storage root.
    ///
    /// Guarantees no entries from the prior scan survive.
    ///
    /// # Errors
    ///
    /// Propagates the same I/O failures as [`load_all`](Self::load_all).
    pub fn rebuild(&mut self) -> Result<usize> {
        self.load_all()?;
        Ok(self.contexts.len())
    }
}
