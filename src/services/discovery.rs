//! Discovery service facade.
//!
//! Owns one catalog handle, one matcher, one relationship engine and one
//! cache store, and exposes the query-time operations behind a single
//! entry point. State is threaded explicitly; multiple isolated services
//! can coexist in one process.

use crate::cache::{CacheKind, CacheStore, catalog_fingerprint};
use crate::catalog::CatalogLoader;
use crate::config::WayfinderConfig;
use crate::embedding::{Embedder, HashedEmbedder};
use crate::matcher::SemanticMatcher;
use crate::models::{
    ChainOutcome, ComboOutcome, Context, MatchOutcome, NextOutcome, PowerComboOutcome, Suggestion,
};
use crate::relationship::RelationshipEngine;
use crate::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Result of a full cache rebuild.
#[derive(Debug, Clone)]
pub struct RebuildSummary {
    /// Contexts discovered by the catalog scan.
    pub contexts: usize,
    /// Embedding records written.
    pub embedded: usize,
    /// Relatedness edges written.
    pub edges: usize,
    /// When the rebuild finished.
    pub completed_at: DateTime<Utc>,
}

/// One discovered type tag with its context count.
#[derive(Debug, Clone)]
pub struct TypeCount {
    /// The type tag.
    pub tag: String,
    /// Contexts carrying the tag.
    pub count: usize,
}

/// Facade over catalog, matcher, relationship engine and cache store.
pub struct DiscoveryService {
    config: WayfinderConfig,
    embedder: Arc<dyn Embedder>,
    catalog: CatalogLoader,
    matcher: SemanticMatcher,
    engine: RelationshipEngine,
    store: CacheStore,
    initialized: bool,
}

impl DiscoveryService {
    /// Creates a service over the given configuration and embedding
    /// provider. Nothing is loaded until the first call.
    #[must_use]
    pub fn new(config: WayfinderConfig, embedder: Arc<dyn Embedder>) -> Self {
        let catalog = CatalogLoader::new(&config.catalog_root);
        let store = CacheStore::new(&config.cache_dir);
        let matcher = SemanticMatcher::new(Arc::clone(&embedder));
        Self {
            config,
            embedder,
            catalog,
            matcher,
            engine: RelationshipEngine::new(),
            store,
            initialized: false,
        }
    }

    /// Creates a service with the deterministic [`HashedEmbedder`].
    #[must_use]
    pub fn with_default_embedder(config: WayfinderConfig) -> Self {
        Self::new(config, Arc::new(HashedEmbedder::new()))
    }

    /// Loads the catalog and both cache documents when present.
    ///
    /// Idempotent; every facade method calls this first. Absent cache
    /// documents leave the matcher/engine cold, so queries surface
    /// `CacheUnavailable` until [`rebuild_caches`](Self::rebuild_caches)
    /// runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog scan fails or an existing cache
    /// document cannot be read.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        self.catalog.load_all()?;
        self.matcher = SemanticMatcher::load(Arc::clone(&self.embedder), &self.store)?;
        self.engine = RelationshipEngine::load(&self.store)?;
        self.warn_if_stale();

        self.initialized = true;
        tracing::info!(
            contexts = self.catalog.len(),
            embeddings_ready = self.matcher.is_ready(),
            combos_ready = self.engine.is_ready(),
            "discovery service initialized"
        );
        Ok(())
    }

    /// Re-scans the catalog and rebuilds both cache documents.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan or either persist step fails.
    pub fn rebuild_caches(&mut self) -> Result<RebuildSummary> {
        self.initialize()?;
        let contexts = self.catalog.rebuild()?;
        let embedded = self
            .matcher
            .build_embeddings(self.catalog.contexts(), &self.store)?;
        let edges = self
            .engine
            .build_combo_intelligence(&self.catalog, &self.matcher, &self.store)?;

        let summary = RebuildSummary {
            contexts,
            embedded,
            edges,
            completed_at: Utc::now(),
        };
        tracing::info!(
            contexts = summary.contexts,
            embedded = summary.embedded,
            edges = summary.edges,
            "caches rebuilt"
        );
        Ok(summary)
    }

    /// Deletes both cache documents and resets the matcher and engine
    /// cold. The next rebuild starts from scratch.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing document cannot be removed.
    pub fn clear_caches(&mut self) -> Result<()> {
        self.store.remove(CacheKind::Embeddings)?;
        self.store.remove(CacheKind::ComboIntelligence)?;
        self.matcher = SemanticMatcher::new(Arc::clone(&self.embedder));
        self.engine = RelationshipEngine::new();
        tracing::info!("caches cleared");
        Ok(())
    }

    /// Finds the best context for an intent. See
    /// [`SemanticMatcher::find_workflow`].
    ///
    /// # Errors
    ///
    /// Propagates matcher failures (`CacheUnavailable`, `InvalidInput`,
    /// provider errors).
    pub fn find_workflow(
        &mut self,
        intent: &str,
        type_filter: Option<&str>,
    ) -> Result<MatchOutcome> {
        self.initialize()?;
        self.matcher.find_workflow(intent, type_filter)
    }

    /// Returns ranked suggestions for an intent, up to the configured
    /// limit.
    ///
    /// # Errors
    ///
    /// Propagates matcher failures.
    pub fn get_suggestions(
        &mut self,
        intent: &str,
        type_filter: Option<&str>,
    ) -> Result<Vec<Suggestion>> {
        self.initialize()?;
        self.matcher
            .get_suggestions(intent, self.config.max_suggestions, type_filter)
    }

    /// Recommends companion contexts for an intent. `depth` defaults to
    /// the configured combo depth.
    ///
    /// # Errors
    ///
    /// Propagates engine and matcher failures.
    pub fn find_combos(&mut self, intent: &str, depth: Option<usize>) -> Result<ComboOutcome> {
        self.initialize()?;
        let depth = depth.unwrap_or(self.config.combo_depth);
        self.engine.find_combos(intent, depth, &self.matcher)
    }

    /// Looks up a curated power combo for a scenario.
    ///
    /// # Errors
    ///
    /// Propagates engine failures.
    pub fn get_power_combo(&mut self, scenario: &str) -> Result<PowerComboOutcome> {
        self.initialize()?;
        self.engine.get_power_combo(scenario)
    }

    /// Builds a chain from a starting context toward a goal.
    ///
    /// # Errors
    ///
    /// Propagates engine failures.
    pub fn build_chain(&mut self, start: &str, goal: &str) -> Result<ChainOutcome> {
        self.initialize()?;
        self.engine.build_chain(start, goal, &self.catalog)
    }

    /// Suggests follow-up contexts after the current one.
    ///
    /// # Errors
    ///
    /// Propagates engine failures.
    pub fn suggest_next(&mut self, current: &str) -> Result<NextOutcome> {
        self.initialize()?;
        self.engine.suggest_next(current, &self.catalog)
    }

    /// Lists contexts by type tag; `"all"` lists everything.
    ///
    /// # Errors
    ///
    /// Propagates catalog scan failures on first use.
    pub fn list_contexts(&mut self, context_type: &str) -> Result<Vec<&Context>> {
        self.initialize()?;
        Ok(self.catalog.list_by_type(context_type))
    }

    /// Lists the discovered type tags with their context counts.
    ///
    /// # Errors
    ///
    /// Propagates catalog scan failures on first use.
    pub fn list_types(&mut self) -> Result<Vec<TypeCount>> {
        self.initialize()?;
        Ok(self
            .catalog
            .types()
            .into_iter()
            .map(|tag| TypeCount {
                tag: tag.as_str().to_string(),
                count: self.catalog.count_by_type(tag),
            })
            .collect())
    }

    /// Warns when a loaded cache no longer matches the live catalog.
    /// Rebuilds are manual; the fingerprint only surfaces drift.
    fn warn_if_stale(&self) {
        let live = catalog_fingerprint(self.catalog.contexts());

        if self.matcher.is_ready() && self.matcher.fingerprint() != live {
            tracing::warn!(
                "embeddings cache does not match the current catalog, run rebuild_caches"
            );
        }
        if self.engine.is_ready() && self.engine.fingerprint() != live {
            tracing::warn!(
                "combo-intelligence cache does not match the current catalog, run rebuild_caches"
            );
        }
    }
}
