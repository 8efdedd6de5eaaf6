//! Embedding records and the persisted embeddings document.

use super::{Context, ContextType, Slug};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Denormalized context fields carried alongside each embedding.
///
/// Holds everything needed to answer a query without reloading the full
/// catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSummary {
    /// Context slug.
    pub slug: Slug,
    /// Human-readable name.
    pub name: String,
    /// Context description.
    pub description: String,
    /// Type tag.
    pub context_type: ContextType,
    /// Capability list, if any.
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Use cases, if any.
    #[serde(default)]
    pub use_cases: Vec<String>,
    /// Trigger phrases.
    #[serde(default)]
    pub triggers: Vec<String>,
    /// Source document path, for display.
    pub source_path: String,
}

impl From<&Context> for ContextSummary {
    fn from(context: &Context) -> Self {
        Self {
            slug: context.slug.clone(),
            name: context.name.clone(),
            description: context.description.clone(),
            context_type: context.context_type.clone(),
            capabilities: context.capabilities().to_vec(),
            use_cases: context.use_cases().to_vec(),
            triggers: context.triggers.clone(),
            source_path: context.source_path.display().to_string(),
        }
    }
}

/// One embedded context: the vector, the exact text it was produced from,
/// and the summary used to answer queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    /// Context slug (foreign key into the catalog).
    pub slug: Slug,
    /// Embedding vector. All vectors in one document share a dimension.
    pub vector: Vec<f32>,
    /// The exact text submitted to the provider.
    pub source_text: String,
    /// Denormalized context fields.
    pub summary: ContextSummary,
}

/// The persisted embeddings cache document.
///
/// Produced wholesale by a build; a new build fully replaces the prior
/// document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsDocument {
    /// Document schema version.
    pub schema_version: u32,
    /// When this document was built.
    pub built_at: DateTime<Utc>,
    /// Fingerprint of the catalog snapshot the build saw.
    pub fingerprint: String,
    /// Vector dimension shared by every record.
    pub dimensions: usize,
    /// Type tags discovered in the catalog at build time.
    pub types: Vec<String>,
    /// Records in catalog iteration order.
    pub records: Vec<EmbeddingRecord>,
}

impl EmbeddingsDocument {
    /// Current schema version.
    pub const SCHEMA_VERSION: u32 = 1;
}
