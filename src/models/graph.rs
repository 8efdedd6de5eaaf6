//! Relatedness graph types and the persisted combo-intelligence document.

use super::Slug;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How two contexts are related.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Related by embedding similarity.
    Semantic,
    /// Related by sharing a type tag.
    Category,
}

impl EdgeKind {
    /// Returns the kind as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Category => "category",
        }
    }
}

/// A directed, weighted recommendation edge.
///
/// Edges are keyed by their source slug in [`ComboIntelligence::edges`];
/// only the target lives on the edge itself. Directedness is deliberate:
/// `A -> B` does not imply `B -> A`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatednessEdge {
    /// Target context slug.
    pub to: Slug,
    /// Relationship kind.
    pub kind: EdgeKind,
    /// Recommendation strength. Semantic edges carry the raw similarity,
    /// category edges a fixed 0.6.
    pub weight: f32,
    /// Human-readable justification for the edge.
    pub rationale: String,
}

/// A curated bundle of contexts known to work well together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerCombo {
    /// Lookup key for the scenario this combo addresses.
    pub scenario_key: String,
    /// Display name.
    pub name: String,
    /// What the combo is for.
    pub description: String,
    /// The essential contexts, in order.
    pub core: Vec<Slug>,
    /// Supporting contexts.
    pub support: Vec<Slug>,
    /// Recommended execution order.
    pub sequence: Vec<Slug>,
    /// Curated effectiveness score in (0, 1].
    pub effectiveness: f32,
}

/// A curated ordered progression of contexts toward a goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chain {
    /// Chain name; goal matching is a substring test against this.
    pub name: String,
    /// Ordered context slugs.
    pub steps: Vec<Slug>,
}

/// The persisted combo-intelligence cache document: the full relatedness
/// graph plus the curated tables and build metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboIntelligence {
    /// Document schema version.
    pub schema_version: u32,
    /// When this document was built.
    pub built_at: DateTime<Utc>,
    /// Fingerprint of the catalog snapshot the build saw.
    pub fingerprint: String,
    /// Number of contexts in the catalog at build time, for sanity display.
    pub catalog_size: usize,
    /// Outgoing edges keyed by source slug, at most 8 per source.
    pub edges: BTreeMap<Slug, Vec<RelatednessEdge>>,
    /// Curated power combinations keyed by scenario.
    pub power_combos: BTreeMap<String, PowerCombo>,
    /// Curated chains keyed by name.
    pub chains: BTreeMap<String, Chain>,
}

impl ComboIntelligence {
    /// Current schema version.
    pub const SCHEMA_VERSION: u32 = 1;
}
