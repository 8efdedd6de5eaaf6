//! The derived relationship graph and combo/chain queries.
//!
//! The engine holds a weighted adjacency list over context slugs, built
//! from embedding similarity and shared type tags, plus the curated
//! power-combo and chain tables. Query operations are pure reads; the
//! graph is rebuilt wholesale and persisted as the combo-intelligence
//! cache document.

pub mod curated;

use crate::cache::{CacheKind, CacheStore, catalog_fingerprint};
use crate::catalog::CatalogLoader;
use crate::matcher::SemanticMatcher;
use crate::models::{
    Chain, ChainOutcome, ChainStep, ComboIntelligence, ComboOutcome, ComboSuggestion, Context,
    ContextSummary, EdgeKind, MatchOutcome, NextOutcome, NextSuggestion, PowerCombo,
    PowerComboOutcome, RelatednessEdge, Slug,
};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};

/// Similarity a candidate must exceed to become a semantic edge.
const SEMANTIC_EDGE_THRESHOLD: f32 = 0.4;

/// Fixed weight of category (shared type tag) edges.
const CATEGORY_EDGE_WEIGHT: f32 = 0.6;

/// Maximum outgoing edges kept per source; semantic edges survive
/// truncation ahead of category edges.
const MAX_EDGES_PER_SOURCE: usize = 8;

/// Candidates requested from the matcher per context during a build.
const SEMANTIC_CANDIDATES: usize = 10;

/// Edges must strictly exceed this weight to appear in combo results
/// and chain walks.
const COMBO_WEIGHT_THRESHOLD: f32 = 0.5;

/// Edges must strictly exceed this weight to appear as next-step
/// suggestions.
const NEXT_WEIGHT_THRESHOLD: f32 = 0.6;

/// Maximum next-step suggestions.
const MAX_NEXT_SUGGESTIONS: usize = 3;

/// Additional steps a chain walk may take beyond the start.
const MAX_WALK_STEPS: usize = 4;

/// Token-overlap similarity a scenario must exceed to borrow a combo.
const SCENARIO_MATCH_THRESHOLD: f32 = 0.4;

/// Default combo depth used by the service facade.
pub const DEFAULT_COMBO_DEPTH: usize = 3;

/// Weighted recommendation graph with curated combo and chain tables.
pub struct RelationshipEngine {
    /// Outgoing edges keyed by source slug.
    edges: BTreeMap<Slug, Vec<RelatednessEdge>>,
    /// Curated power combos keyed by scenario.
    power_combos: BTreeMap<String, PowerCombo>,
    /// Curated chains keyed by name.
    chains: BTreeMap<String, Chain>,
    /// When the graph was built, if ever.
    built_at: Option<DateTime<Utc>>,
    /// Fingerprint of the catalog snapshot behind the graph.
    fingerprint: String,
    /// Catalog size at build time, for sanity display.
    catalog_size: usize,
}

impl RelationshipEngine {
    /// Creates an empty (cold) engine. Queries fail with
    /// `CacheUnavailable` until a build runs or a document is loaded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            edges: BTreeMap::new(),
            power_combos: BTreeMap::new(),
            chains: BTreeMap::new(),
            built_at: None,
            fingerprint: String::new(),
            catalog_size: 0,
        }
    }

    /// Creates an engine from a previously persisted document.
    #[must_use]
    pub fn from_document(document: ComboIntelligence) -> Self {
        Self {
            edges: document.edges,
            power_combos: document.power_combos,
            chains: document.chains,
            built_at: Some(document.built_at),
            fingerprint: document.fingerprint,
            catalog_size: document.catalog_size,
        }
    }

    /// Loads the combo-intelligence document from the store, if present.
    ///
    /// An absent document yields a cold engine.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing document cannot be read or parsed.
    pub fn load(store: &CacheStore) -> Result<Self> {
        match store.load::<ComboIntelligence>(CacheKind::ComboIntelligence)? {
            Some(document) => {
                tracing::info!(
                    sources = document.edges.len(),
                    catalog_size = document.catalog_size,
                    "loaded combo-intelligence cache"
                );
                Ok(Self::from_document(document))
            }
            None => {
                tracing::info!("no combo-intelligence cache found, engine starts cold");
                Ok(Self::new())
            }
        }
    }

    /// Returns true when a graph has been built or loaded.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.built_at.is_some()
    }

    /// Returns the fingerprint of the catalog snapshot behind the graph.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Returns the catalog size recorded at build time.
    #[must_use]
    pub const fn catalog_size(&self) -> usize {
        self.catalog_size
    }

    /// Returns the outgoing edges for a slug, strongest-ranked first.
    #[must_use]
    pub fn edges_for(&self, slug: &Slug) -> &[RelatednessEdge] {
        self.edges.get(slug).map_or(&[], Vec::as_slice)
    }

    /// Derives the relationship graph from the catalog, merges the
    /// curated tables, and persists the whole bundle, replacing any
    /// prior document.
    ///
    /// Per context, the related set is the union of semantically similar
    /// contexts (similarity > 0.4, excluding itself) and every other
    /// context sharing its type tag (fixed weight 0.6), truncated to the
    /// top 8 with semantic edges ranked ahead of category edges.
    ///
    /// # Errors
    ///
    /// Returns an error only if persisting the finished document fails.
    /// Per-context ranking failures are logged and leave that context
    /// with category edges only.
    pub fn build_combo_intelligence(
        &mut self,
        catalog: &CatalogLoader,
        matcher: &SemanticMatcher,
        store: &CacheStore,
    ) -> Result<usize> {
        let mut edges: BTreeMap<Slug, Vec<RelatednessEdge>> = BTreeMap::new();

        for context in catalog.contexts() {
            let mut related = Vec::new();
            Self::collect_semantic_edges(context, matcher, &mut related);
            Self::collect_category_edges(context, catalog, &mut related);
            rank_edges(&mut related);
            edges.insert(context.slug.clone(), related);
        }

        let document = ComboIntelligence {
            schema_version: ComboIntelligence::SCHEMA_VERSION,
            built_at: Utc::now(),
            fingerprint: catalog_fingerprint(catalog.contexts()),
            catalog_size: catalog.len(),
            edges,
            power_combos: curated::power_combos(),
            chains: curated::chains(),
        };

        store.save(CacheKind::ComboIntelligence, &document)?;

        let edge_count: usize = document.edges.values().map(Vec::len).sum();
        tracing::info!(
            sources = document.edges.len(),
            edges = edge_count,
            "combo intelligence built"
        );

        self.edges = document.edges;
        self.power_combos = document.power_combos;
        self.chains = document.chains;
        self.built_at = Some(document.built_at);
        self.fingerprint = document.fingerprint;
        self.catalog_size = document.catalog_size;

        Ok(edge_count)
    }

    fn collect_semantic_edges(
        context: &Context,
        matcher: &SemanticMatcher,
        related: &mut Vec<RelatednessEdge>,
    ) {
        if context.description.is_empty() || !matcher.is_ready() {
            return;
        }

        let suggestions =
            match matcher.get_suggestions(&context.description, SEMANTIC_CANDIDATES, None) {
                Ok(suggestions) => suggestions,
                Err(e) => {
                    tracing::warn!(
                        slug = %context.slug,
                        error = %e,
                        "semantic ranking failed, keeping category edges only"
                    );
                    return;
                }
            };

        for suggestion in suggestions {
            if suggestion.slug != context.slug && suggestion.similarity > SEMANTIC_EDGE_THRESHOLD {
                related.push(RelatednessEdge {
                    to: suggestion.slug,
                    kind: EdgeKind::Semantic,
                    weight: suggestion.similarity,
                    rationale: "semantic similarity".to_string(),
                });
            }
        }
    }

    fn collect_category_edges(
        context: &Context,
        catalog: &CatalogLoader,
        related: &mut Vec<RelatednessEdge>,
    ) {
        for other in catalog.list_by_type(context.context_type.as_str()) {
            if other.slug != context.slug {
                related.push(RelatednessEdge {
                    to: other.slug.clone(),
                    kind: EdgeKind::Category,
                    weight: CATEGORY_EDGE_WEIGHT,
                    rationale: format!("same type: {}", context.context_type),
                });
            }
        }
    }

    /// Resolves an intent to a primary context and recommends up to
    /// `depth` companions from its edge list (weight > 0.5).
    ///
    /// A non-confident primary lookup propagates as
    /// [`ComboOutcome::NoPrimary`], never as an error. An empty related
    /// set yields an empty combo list.
    ///
    /// # Errors
    ///
    /// [`Error::CacheUnavailable`] when the graph is cold; matcher
    /// failures (empty embedding cache, provider errors) propagate.
    pub fn find_combos(
        &self,
        intent: &str,
        depth: usize,
        matcher: &SemanticMatcher,
    ) -> Result<ComboOutcome> {
        self.ensure_ready()?;

        let primary = match matcher.find_workflow(intent, None)? {
            MatchOutcome::Found(found) => found,
            MatchOutcome::NotFound { suggestions } => {
                return Ok(ComboOutcome::NoPrimary { suggestions });
            }
        };

        let combos: Vec<ComboSuggestion> = self
            .edges_for(&primary.slug)
            .iter()
            .filter(|edge| edge.weight > COMBO_WEIGHT_THRESHOLD)
            .take(depth)
            .map(|edge| ComboSuggestion {
                slug: edge.to.clone(),
                kind: edge.kind,
                strength: edge.weight,
                rationale: edge.rationale.clone(),
            })
            .collect();

        let guidance = if combos.is_empty() {
            format!("Start with: {}", primary.summary.name)
        } else {
            let companions: Vec<&str> =
                combos.iter().take(2).map(|c| c.slug.as_str()).collect();
            format!(
                "Start with: {}, then consider: {}",
                primary.summary.name,
                companions.join(", ")
            )
        };

        Ok(ComboOutcome::Found {
            primary: primary.summary,
            similarity: primary.similarity,
            combos,
            guidance,
        })
    }

    /// Looks up a curated power combo for a scenario.
    ///
    /// Exact key lookup first; otherwise token-overlap comparison of the
    /// scenario against each combo's `name + description`, accepting the
    /// best match above 0.4. A miss lists every known scenario key.
    ///
    /// # Errors
    ///
    /// [`Error::CacheUnavailable`] when the graph is cold.
    pub fn get_power_combo(&self, scenario: &str) -> Result<PowerComboOutcome> {
        self.ensure_ready()?;

        if let Some(combo) = self.power_combos.get(scenario) {
            return Ok(PowerComboOutcome::Exact {
                combo: combo.clone(),
            });
        }

        let mut best: Option<(&PowerCombo, f32)> = None;
        for combo in self.power_combos.values() {
            let text = format!("{} {}", combo.name, combo.description);
            let similarity = token_overlap(scenario, &text);
            if similarity > SCENARIO_MATCH_THRESHOLD
                && best.is_none_or(|(_, s)| similarity > s)
            {
                best = Some((combo, similarity));
            }
        }

        best.map_or_else(
            || {
                Ok(PowerComboOutcome::NotFound {
                    available: self.power_combos.keys().cloned().collect(),
                })
            },
            |(combo, similarity)| {
                Ok(PowerComboOutcome::Closest {
                    combo: combo.clone(),
                    similarity,
                })
            },
        )
    }

    /// Builds a chain of contexts from `start` toward `goal`.
    ///
    /// A curated chain that starts at `start` and whose name contains
    /// the lowercased goal is returned verbatim. Otherwise an iterative
    /// bounded greedy walk assembles one: at most four steps beyond the
    /// start, each step the first strong unvisited edge whose rationale
    /// mentions the goal or whose kind is semantic. The visited set
    /// guarantees no duplicate slug; the path never exceeds five.
    ///
    /// # Errors
    ///
    /// [`Error::CacheUnavailable`] when the graph is cold.
    pub fn build_chain(
        &self,
        start: &str,
        goal: &str,
        catalog: &CatalogLoader,
    ) -> Result<ChainOutcome> {
        self.ensure_ready()?;

        let Some(start_context) = catalog.get_by_slug(start) else {
            return Ok(ChainOutcome::UnknownStart {
                slug: Slug::new(start),
            });
        };
        let start_slug = start_context.slug.clone();
        let goal_lc = goal.to_lowercase();

        for (name, chain) in &self.chains {
            if chain.steps.first() == Some(&start_slug) && name.contains(&goal_lc) {
                return Ok(ChainOutcome::Curated {
                    name: name.clone(),
                    steps: translate_steps(&chain.steps, goal, catalog),
                    description: format!("Pre-built chain from {start_slug} toward {goal}"),
                });
            }
        }

        let mut path = vec![start_slug.clone()];
        let mut visited: HashSet<Slug> = HashSet::new();
        visited.insert(start_slug);
        let mut current = path[0].clone();

        for _ in 0..MAX_WALK_STEPS {
            let next = self
                .edges_for(&current)
                .iter()
                .filter(|edge| edge.weight > COMBO_WEIGHT_THRESHOLD)
                .find(|edge| {
                    !visited.contains(&edge.to)
                        && (edge.rationale.to_lowercase().contains(&goal_lc)
                            || edge.kind == EdgeKind::Semantic)
                });

            match next {
                Some(edge) => {
                    path.push(edge.to.clone());
                    visited.insert(edge.to.clone());
                    current = edge.to.clone();
                }
                None => break,
            }
        }

        Ok(ChainOutcome::Walked {
            steps: translate_steps(&path, goal, catalog),
            description: format!(
                "Process flow from \"{}\" toward {goal}",
                start_context.name
            ),
        })
    }

    /// Suggests up to three follow-up contexts with edge weight > 0.6.
    ///
    /// # Errors
    ///
    /// [`Error::CacheUnavailable`] when the graph is cold.
    pub fn suggest_next(&self, current: &str, catalog: &CatalogLoader) -> Result<NextOutcome> {
        self.ensure_ready()?;

        let Some(context) = catalog.get_by_slug(current) else {
            return Ok(NextOutcome::UnknownContext {
                slug: Slug::new(current),
            });
        };

        let suggestions: Vec<NextSuggestion> = self
            .edges_for(&context.slug)
            .iter()
            .filter(|edge| edge.weight > NEXT_WEIGHT_THRESHOLD)
            .take(MAX_NEXT_SUGGESTIONS)
            .map(|edge| NextSuggestion {
                slug: edge.to.clone(),
                name: catalog.get_by_slug(edge.to.as_str()).map(|c| c.name.clone()),
                strength: edge.weight,
                rationale: edge.rationale.clone(),
            })
            .collect();

        Ok(NextOutcome::Suggestions {
            current: ContextSummary::from(context),
            suggestions,
        })
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.built_at.is_none() {
            return Err(Error::CacheUnavailable {
                cache: "combo intelligence".to_string(),
                hint: "build_combo_intelligence".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for RelationshipEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Ranks an edge list in place and truncates it to the per-source cap.
///
/// Semantic edges sort ahead of category edges; within a kind, heavier
/// first.
fn rank_edges(related: &mut Vec<RelatednessEdge>) {
    related.sort_by(|a, b| {
        let rank = |kind: EdgeKind| match kind {
            EdgeKind::Semantic => 0u8,
            EdgeKind::Category => 1u8,
        };
        rank(a.kind).cmp(&rank(b.kind)).then_with(|| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });
    related.truncate(MAX_EDGES_PER_SOURCE);
}

/// Token-overlap similarity of two texts: shared words over the longer
/// word count. Cheap stand-in for embedding similarity on short curated
/// strings.
#[must_use]
#[allow(clippy::cast_precision_loss)]
fn token_overlap(a: &str, b: &str) -> f32 {
    let a_lc = a.to_lowercase();
    let b_lc = b.to_lowercase();
    let words_a: Vec<&str> = a_lc.split_whitespace().collect();
    let words_b: HashSet<&str> = b_lc.split_whitespace().collect();

    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let shared = words_a.iter().filter(|w| words_b.contains(**w)).count();
    let longer = words_a.len().max(words_b.len());
    shared as f32 / longer as f32
}

/// Translates a slug path into human-readable steps via the catalog.
///
/// Slugs absent from the current catalog (curated chains may reference
/// them) fall back to the slug itself as the name.
fn translate_steps(path: &[Slug], goal: &str, catalog: &CatalogLoader) -> Vec<ChainStep> {
    path.iter()
        .map(|slug| {
            catalog.get_by_slug(slug.as_str()).map_or_else(
                || ChainStep {
                    slug: slug.clone(),
                    name: slug.as_str().to_string(),
                    description: String::new(),
                    purpose: format!("Step toward {goal}"),
                },
                |context| ChainStep {
                    slug: slug.clone(),
                    name: context.name.clone(),
                    description: context.description.clone(),
                    purpose: format!("Step toward {goal}"),
                },
            )
        })
        .collect()
}
