//! # Wayfinder
//!
//! A context discovery and combination engine for AI agent systems.
//!
//! Wayfinder scans a catalog of context documents (agents, workflows,
//! tools, patterns), builds a cached embedding index over them, derives a
//! weighted relatedness graph, and answers free-text intent queries with
//! confident matches, ranked suggestions, combo recommendations and
//! progression chains.
//!
//! ## Features
//!
//! - Dynamic taxonomy discovery (directory names become type tags)
//! - Provider-agnostic semantic matching behind the [`Embedder`] trait
//! - Whole-file atomic cache documents, deletable to force a cold rebuild
//! - Bounded greedy chain construction with cycle prevention
//!
//! ## Example
//!
//! ```rust,ignore
//! use wayfinder::{DiscoveryService, WayfinderConfig};
//!
//! let mut service = DiscoveryService::with_default_embedder(WayfinderConfig::default());
//! service.rebuild_caches()?;
//! let outcome = service.find_workflow("summarize a research paper", None)?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cache;
pub mod catalog;
pub mod config;
pub mod embedding;
pub mod matcher;
pub mod models;
pub mod relationship;
pub mod services;

// Re-exports for convenience
pub use cache::{CacheKind, CacheStore};
pub use catalog::CatalogLoader;
pub use config::WayfinderConfig;
pub use embedding::{Embedder, HashedEmbedder, cosine_similarity};
pub use matcher::SemanticMatcher;
pub use models::{
    Chain, ChainOutcome, ComboOutcome, Context, ContextSummary, ContextType, EdgeKind,
    EmbeddingRecord, MatchOutcome, NextOutcome, PowerCombo, PowerComboOutcome, RelatednessEdge,
    Slug, Suggestion,
};
pub use relationship::RelationshipEngine;
pub use services::DiscoveryService;

/// Error type for wayfinder operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Caller misuse: unknown type filter, empty query |
/// | `InvalidDocument` | A catalog document fails to parse or lacks required metadata |
/// | `Provider` | An embedding-provider call failed |
/// | `CacheUnavailable` | A query ran before the named cache was built |
/// | `OperationFailed` | Filesystem I/O or (de)serialization of cache documents failed |
///
/// "Not found" is never an error: lookup misses are carried in result
/// types (see [`models::MatchOutcome`] and friends) so callers can render
/// suggestions instead of handling exceptions.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided by the caller.
    ///
    /// Raised when:
    /// - A type filter names a tag the catalog never discovered
    /// - A query string is empty
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A catalog document is malformed.
    ///
    /// Recoverable: the loader logs and skips the document, the scan
    /// continues. Surfaces only from per-document parse helpers.
    #[error("invalid context document '{path}': {cause}")]
    InvalidDocument {
        /// Path of the offending document.
        path: String,
        /// The underlying parse or schema failure.
        cause: String,
    },

    /// An embedding-provider call failed.
    ///
    /// Recoverable during builds: the failed batch is logged and its
    /// records are absent from the resulting cache.
    #[error("embedding provider failed during '{operation}': {cause}")]
    Provider {
        /// The provider operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A query ran before the required cache was built.
    ///
    /// Fatal for that query. The hint names the operation that builds the
    /// missing cache.
    #[error("{cache} cache unavailable: run {hint}")]
    CacheUnavailable {
        /// Which cache is missing.
        cache: String,
        /// The build operation to run.
        hint: String,
    },

    /// An operation failed.
    ///
    /// Raised when:
    /// - Cache documents cannot be read, written or renamed
    /// - Cache documents fail to (de)serialize
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for wayfinder operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("unknown type filter 'bogus'".to_string());
        assert_eq!(
            err.to_string(),
            "invalid input: unknown type filter 'bogus'"
        );

        let err = Error::CacheUnavailable {
            cache: "embeddings".to_string(),
            hint: "build_embeddings".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "embeddings cache unavailable: run build_embeddings"
        );

        let err = Error::OperationFailed {
            operation: "write_cache".to_string(),
            cause: "disk full".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'write_cache' failed: disk full");
    }

    #[test]
    fn test_invalid_document_display() {
        let err = Error::InvalidDocument {
            path: "contexts/tools/discord-tool/context.yaml".to_string(),
            cause: "missing metadata".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("discord-tool"));
        assert!(display.contains("missing metadata"));
    }
}
