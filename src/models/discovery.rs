//! Query result types.
//!
//! "Not found" is always data, never an error: every outcome type has a
//! miss variant carrying whatever helps the caller recover (suggestions,
//! known keys, the unresolved slug).

use super::{ContextSummary, ContextType, EdgeKind, PowerCombo, Slug};
use serde::Serialize;

/// A ranked suggestion from the semantic matcher.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    /// Suggested context slug.
    pub slug: Slug,
    /// Display name.
    pub name: String,
    /// Cosine similarity to the query.
    pub similarity: f32,
    /// Type tag.
    pub context_type: ContextType,
}

/// A confident semantic match.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowMatch {
    /// Matched context slug.
    pub slug: Slug,
    /// Cosine similarity of the match.
    pub similarity: f32,
    /// Full denormalized summary of the matched context.
    pub summary: ContextSummary,
}

/// Outcome of [`crate::SemanticMatcher::find_workflow`].
#[derive(Debug, Clone, Serialize)]
pub enum MatchOutcome {
    /// Best similarity cleared the confidence threshold.
    Found(WorkflowMatch),
    /// No confident match; the top-ranked candidates instead.
    NotFound {
        /// Up to five ranked suggestions.
        suggestions: Vec<Suggestion>,
    },
}

impl MatchOutcome {
    /// Returns true for a confident match.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// One recommended companion context.
#[derive(Debug, Clone, Serialize)]
pub struct ComboSuggestion {
    /// Companion context slug.
    pub slug: Slug,
    /// How the companion relates to the primary.
    pub kind: EdgeKind,
    /// Edge weight.
    pub strength: f32,
    /// Why the edge exists.
    pub rationale: String,
}

/// Outcome of [`crate::RelationshipEngine::find_combos`].
#[derive(Debug, Clone, Serialize)]
pub enum ComboOutcome {
    /// The intent resolved to a primary context.
    Found {
        /// The resolved primary context.
        primary: ContextSummary,
        /// Similarity of the primary resolution.
        similarity: f32,
        /// Companion recommendations, strongest first.
        combos: Vec<ComboSuggestion>,
        /// One-line usage guidance.
        guidance: String,
    },
    /// No primary workflow found for the intent.
    NoPrimary {
        /// Suggestions from the underlying lookup.
        suggestions: Vec<Suggestion>,
    },
}

/// Outcome of [`crate::RelationshipEngine::get_power_combo`].
#[derive(Debug, Clone, Serialize)]
pub enum PowerComboOutcome {
    /// The scenario key matched exactly.
    Exact {
        /// The curated combo.
        combo: PowerCombo,
    },
    /// No exact key; the closest combo by text similarity.
    Closest {
        /// The curated combo.
        combo: PowerCombo,
        /// Similarity of the scenario text to the combo.
        similarity: f32,
    },
    /// Nothing matched; every known scenario key for the caller to pick from.
    NotFound {
        /// All curated scenario keys.
        available: Vec<String>,
    },
}

/// One human-readable step in a chain.
#[derive(Debug, Clone, Serialize)]
pub struct ChainStep {
    /// Context slug for this step.
    pub slug: Slug,
    /// Display name (falls back to the slug for contexts absent from the
    /// current catalog).
    pub name: String,
    /// Context description, when known.
    pub description: String,
    /// What this step contributes toward the goal.
    pub purpose: String,
}

/// Outcome of [`crate::RelationshipEngine::build_chain`].
#[derive(Debug, Clone, Serialize)]
pub enum ChainOutcome {
    /// A curated chain matched the start and goal.
    Curated {
        /// Chain name.
        name: String,
        /// The curated steps, translated.
        steps: Vec<ChainStep>,
        /// Display description.
        description: String,
    },
    /// A chain assembled by the bounded greedy walk.
    Walked {
        /// The walked steps, translated. Never contains a duplicate slug;
        /// never longer than five steps.
        steps: Vec<ChainStep>,
        /// Display description.
        description: String,
    },
    /// The starting slug is unknown.
    UnknownStart {
        /// The slug that failed to resolve.
        slug: Slug,
    },
}

/// One suggested follow-up context.
#[derive(Debug, Clone, Serialize)]
pub struct NextSuggestion {
    /// Suggested context slug.
    pub slug: Slug,
    /// Display name, when the catalog knows the slug.
    pub name: Option<String>,
    /// Edge weight.
    pub strength: f32,
    /// Why the edge exists.
    pub rationale: String,
}

/// Outcome of [`crate::RelationshipEngine::suggest_next`].
#[derive(Debug, Clone, Serialize)]
pub enum NextOutcome {
    /// Follow-up suggestions for the current context.
    Suggestions {
        /// Summary of the current context.
        current: ContextSummary,
        /// Up to three strong follow-ups.
        suggestions: Vec<NextSuggestion>,
    },
    /// The current slug is unknown.
    UnknownContext {
        /// The slug that failed to resolve.
        slug: Slug,
    },
}
