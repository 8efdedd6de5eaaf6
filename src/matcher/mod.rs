//! Embedding-based semantic matching.
//!
//! Builds and queries a cached vector index over catalog contexts. The
//! index is rebuilt wholesale: a build replaces every prior record and
//! persists the result as the embeddings cache document.

use crate::cache::{CacheKind, CacheStore, catalog_fingerprint};
use crate::embedding::{Embedder, cosine_similarity};
use crate::models::{
    Context, EmbeddingRecord, EmbeddingsDocument, MatchOutcome, Suggestion, WorkflowMatch,
};
use crate::{Error, Result};
use chrono::Utc;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Embedding-provider batch size. Batches are submitted sequentially,
/// in order, bounding memory and provider rate.
const BATCH_SIZE: usize = 100;

/// Strict lower bound for a confident match: similarity must exceed
/// this, equality is not enough.
const CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Suggestions returned alongside a non-confident result.
const SUGGESTION_LIMIT: usize = 5;

/// Capacity of the per-instance query-embedding memoization cache.
const QUERY_CACHE_CAP: usize = 64;

/// Constructs the embedding input text for a context.
///
/// Concatenates name, description, triggers, type tag and the
/// type-specific structured fields in a fixed order, lower-cased. This
/// exact string is stored as the record's `source_text`.
#[must_use]
pub fn embedding_text(context: &Context) -> String {
    let mut parts: Vec<String> = vec![
        context.name.clone(),
        context.description.clone(),
        context.triggers.join(" "),
        context.context_type.as_str().to_string(),
    ];

    if let Some(tool) = &context.tool {
        parts.push(tool.capabilities.join(" "));
        parts.push(tool.philosophy.clone().unwrap_or_default());
    }

    if let Some(pattern) = &context.pattern {
        parts.push(pattern.use_cases.join(" "));
    }

    if let Some(workflow) = &context.workflow {
        if let Some(triggers) = &workflow.triggers {
            parts.push(triggers.manual().join(" "));
        }
    }

    if let Some(tool) = &context.tool {
        let mcp: Vec<String> = tool
            .mcp_tools
            .iter()
            .map(|t| format!("{} {}", t.name, t.description))
            .collect();
        parts.push(mcp.join(" "));
        let notes: Vec<&str> = tool
            .integration_notes
            .values()
            .map(String::as_str)
            .collect();
        parts.push(notes.join(" "));
    }

    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Cached vector index over catalog contexts.
///
/// All query operations are pure reads over the records loaded by the
/// last build; the only interior mutability is the query-embedding LRU.
pub struct SemanticMatcher {
    /// The embedding provider.
    embedder: Arc<dyn Embedder>,
    /// Records in catalog iteration order.
    records: Vec<EmbeddingRecord>,
    /// Type tags known to the current record set.
    types: Vec<String>,
    /// Fingerprint of the catalog snapshot the records came from.
    fingerprint: String,
    /// Query-embedding memoization.
    query_cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl SemanticMatcher {
    /// Creates an empty matcher. Queries fail with `CacheUnavailable`
    /// until [`build_embeddings`](Self::build_embeddings) runs or a
    /// cached document is loaded.
    #[must_use]
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            records: Vec::new(),
            types: Vec::new(),
            fingerprint: String::new(),
            query_cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(QUERY_CACHE_CAP).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    /// Creates a matcher from a previously persisted document.
    #[must_use]
    pub fn from_document(embedder: Arc<dyn Embedder>, document: EmbeddingsDocument) -> Self {
        let mut matcher = Self::new(embedder);
        matcher.types = document.types;
        matcher.fingerprint = document.fingerprint;
        matcher.records = document.records;
        matcher
    }

    /// Loads the embeddings document from the store, if present.
    ///
    /// An absent document yields an empty matcher (cold start).
    ///
    /// # Errors
    ///
    /// Returns an error if an existing document cannot be read or parsed.
    pub fn load(embedder: Arc<dyn Embedder>, store: &CacheStore) -> Result<Self> {
        match store.load::<EmbeddingsDocument>(CacheKind::Embeddings)? {
            Some(document) => {
                tracing::info!(
                    records = document.records.len(),
                    dimensions = document.dimensions,
                    "loaded embeddings cache"
                );
                Ok(Self::from_document(embedder, document))
            }
            None => {
                tracing::info!("no embeddings cache found, matcher starts cold");
                Ok(Self::new(embedder))
            }
        }
    }

    /// Returns true when at least one record is loaded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !self.records.is_empty()
    }

    /// Returns the loaded records in catalog order.
    #[must_use]
    pub fn records(&self) -> &[EmbeddingRecord] {
        &self.records
    }

    /// Returns the fingerprint of the catalog snapshot behind the records.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Builds embeddings for the given contexts, fully replacing the
    /// prior record set, and persists the document via the store.
    ///
    /// Texts are submitted in ordered batches of 100. A failed batch is
    /// logged and its slugs are simply absent from the new cache; the
    /// remaining batches still run. An empty catalog produces an empty
    /// document without raising.
    ///
    /// # Errors
    ///
    /// Returns an error only if persisting the finished document fails.
    pub fn build_embeddings(
        &mut self,
        contexts: &[Context],
        store: &CacheStore,
    ) -> Result<usize> {
        let inputs: Vec<(String, &Context)> = contexts
            .iter()
            .map(|context| (embedding_text(context), context))
            .collect();

        let mut records: Vec<EmbeddingRecord> = Vec::with_capacity(inputs.len());

        for (batch_index, batch) in inputs.chunks(BATCH_SIZE).enumerate() {
            let texts: Vec<String> = batch.iter().map(|(text, _)| text.clone()).collect();

            let vectors = match self.embedder.embed_batch(&texts) {
                Ok(vectors) if vectors.len() == batch.len() => vectors,
                Ok(vectors) => {
                    tracing::warn!(
                        batch = batch_index,
                        expected = batch.len(),
                        got = vectors.len(),
                        "provider returned wrong vector count, skipping batch"
                    );
                    continue;
                }
                Err(e) => {
                    tracing::warn!(
                        batch = batch_index,
                        error = %e,
                        "embedding batch failed, its contexts will be absent from the cache"
                    );
                    continue;
                }
            };

            for ((text, context), vector) in batch.iter().zip(vectors) {
                records.push(EmbeddingRecord {
                    slug: context.slug.clone(),
                    vector,
                    source_text: text.clone(),
                    summary: (*context).into(),
                });
            }

            tracing::debug!(
                batch = batch_index + 1,
                total = inputs.len().div_ceil(BATCH_SIZE),
                "embedding batch processed"
            );
        }

        let mut types: Vec<String> = contexts
            .iter()
            .map(|c| c.context_type.as_str().to_string())
            .collect();
        types.sort();
        types.dedup();

        let document = EmbeddingsDocument {
            schema_version: EmbeddingsDocument::SCHEMA_VERSION,
            built_at: Utc::now(),
            fingerprint: catalog_fingerprint(contexts),
            dimensions: self.embedder.dimensions(),
            types,
            records,
        };

        store.save(CacheKind::Embeddings, &document)?;

        tracing::info!(
            embedded = document.records.len(),
            contexts = contexts.len(),
            "embeddings built"
        );

        self.types = document.types;
        self.fingerprint = document.fingerprint;
        self.records = document.records;
        if let Ok(mut cache) = self.query_cache.lock() {
            cache.clear();
        }

        Ok(self.records.len())
    }

    /// Finds the best context for a free-text query.
    ///
    /// A similarity strictly above 0.5 is a confident match carrying the
    /// full summary; anything else returns the top five ranked
    /// suggestions. Ties keep catalog iteration order.
    ///
    /// # Errors
    ///
    /// - [`Error::CacheUnavailable`] when no embeddings are loaded
    /// - [`Error::InvalidInput`] for an unknown type filter or empty query
    /// - [`Error::Provider`] when embedding the query fails
    pub fn find_workflow(
        &self,
        query: &str,
        type_filter: Option<&str>,
    ) -> Result<MatchOutcome> {
        let ranked = self.rank(query, type_filter)?;

        if let Some((record, similarity)) = ranked.first() {
            if *similarity > CONFIDENCE_THRESHOLD {
                return Ok(MatchOutcome::Found(WorkflowMatch {
                    slug: record.slug.clone(),
                    similarity: *similarity,
                    summary: record.summary.clone(),
                }));
            }
        }

        Ok(MatchOutcome::NotFound {
            suggestions: Self::to_suggestions(&ranked, SUGGESTION_LIMIT),
        })
    }

    /// Returns up to `limit` ranked suggestions with no confidence gate.
    ///
    /// Used for "did you mean" flows and by the relationship build.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`find_workflow`](Self::find_workflow).
    pub fn get_suggestions(
        &self,
        query: &str,
        limit: usize,
        type_filter: Option<&str>,
    ) -> Result<Vec<Suggestion>> {
        let ranked = self.rank(query, type_filter)?;
        Ok(Self::to_suggestions(&ranked, limit))
    }

    /// Ranks every cached record against the query, best first.
    fn rank(
        &self,
        query: &str,
        type_filter: Option<&str>,
    ) -> Result<Vec<(&EmbeddingRecord, f32)>> {
        if self.records.is_empty() {
            return Err(Error::CacheUnavailable {
                cache: "embeddings".to_string(),
                hint: "build_embeddings".to_string(),
            });
        }

        if query.trim().is_empty() {
            return Err(Error::InvalidInput("query must not be empty".to_string()));
        }

        let filter = match type_filter {
            Some(tag) => {
                let tag = tag.to_lowercase();
                if !self.types.iter().any(|t| t == &tag) {
                    return Err(Error::InvalidInput(format!(
                        "unknown type filter '{tag}'"
                    )));
                }
                Some(tag)
            }
            None => None,
        };

        let query_vector = self.query_vector(query)?;

        let mut ranked: Vec<(&EmbeddingRecord, f32)> = self
            .records
            .iter()
            .filter(|record| {
                filter
                    .as_deref()
                    .is_none_or(|tag| record.summary.context_type.as_str() == tag)
            })
            .map(|record| (record, cosine_similarity(&query_vector, &record.vector)))
            .collect();

        // Stable sort: ties keep catalog iteration order.
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(ranked)
    }

    /// Embeds a query, memoizing per normalized query string.
    fn query_vector(&self, query: &str) -> Result<Vec<f32>> {
        let normalized = query.to_lowercase();

        if let Ok(mut cache) = self.query_cache.lock() {
            if let Some(vector) = cache.get(&normalized) {
                return Ok(vector.clone());
            }
        }

        let vector = self.embedder.embed(&normalized)?;

        if let Ok(mut cache) = self.query_cache.lock() {
            cache.put(normalized, vector.clone());
        }

        Ok(vector)
    }

    fn to_suggestions(ranked: &[(&EmbeddingRecord, f32)], limit: usize) -> Vec<Suggestion> {
        ranked
            .iter()
            .take(limit)
            .map(|(record, similarity)| Suggestion {
                slug: record.slug.clone(),
                name: record.summary.name.clone(),
                similarity: *similarity,
                context_type: record.summary.context_type.clone(),
            })
            .collect()
    }
}
