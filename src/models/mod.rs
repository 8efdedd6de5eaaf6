//! Data models for wayfinder.
//!
//! This module contains all the core data structures used throughout the
//! engine: catalog records, embedding records, the relatedness graph and
//! the query result types.

mod context;
mod discovery;
mod embedding;
pub mod graph;

pub use context::{
    AgentPayload, Context, ContextType, McpToolSpec, PatternPayload, Slug, ToolPayload,
    TriggerSpec, WorkflowPayload,
};
pub use discovery::{
    ChainOutcome, ChainStep, ComboOutcome, ComboSuggestion, MatchOutcome, NextOutcome,
    NextSuggestion, PowerComboOutcome, Suggestion, WorkflowMatch,
};
pub use embedding::{ContextSummary, EmbeddingRecord, EmbeddingsDocument};
pub use graph::{Chain, ComboIntelligence, EdgeKind, PowerCombo, RelatednessEdge};
