//! Context records and identifiers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Unique identifier for a context, derived from its storage location.
///
/// Slugs are normalized to lowercase on construction so lookups are
/// case-insensitive by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Creates a new slug, lowercasing the input.
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into().to_lowercase())
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Slug {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Slug {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Dynamically discovered type tag for a context.
///
/// Type tags come from top-level catalog directory names at scan time.
/// There is deliberately no closed enum of types: whatever the storage
/// hierarchy contains becomes a first-class tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextType(String);

impl ContextType {
    /// Creates a new type tag, lowercasing the input.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into().to_lowercase())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContextType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// An MCP tool descriptor inside a tool context document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpToolSpec {
    /// Tool name.
    pub name: String,
    /// Tool description.
    #[serde(default)]
    pub description: String,
}

/// Trigger declaration in a workflow document.
///
/// Documents write triggers either as a flat list or grouped under a
/// `manual` key; both shapes occur in real catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TriggerSpec {
    /// A flat list of trigger phrases.
    Flat(Vec<String>),
    /// Triggers grouped by activation mode.
    Grouped {
        /// Manually invoked trigger phrases.
        #[serde(default)]
        manual: Vec<String>,
    },
}

impl TriggerSpec {
    /// Returns the manual trigger phrases regardless of document shape.
    #[must_use]
    pub fn manual(&self) -> &[String] {
        match self {
            Self::Flat(list) => list,
            Self::Grouped { manual } => manual,
        }
    }
}

/// Workflow-specific payload section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowPayload {
    /// Free-text process description.
    #[serde(default)]
    pub process: Option<String>,
    /// Trigger declarations.
    #[serde(default)]
    pub triggers: Option<TriggerSpec>,
}

/// Pattern-specific payload section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternPayload {
    /// Situations the pattern applies to.
    #[serde(default)]
    pub use_cases: Vec<String>,
    /// Named process steps.
    #[serde(default)]
    pub process: BTreeMap<String, String>,
}

/// Tool-specific payload section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPayload {
    /// What the tool can do.
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Design philosophy notes.
    #[serde(default)]
    pub philosophy: Option<String>,
    /// MCP tools exposed by this context.
    #[serde(default)]
    pub mcp_tools: Vec<McpToolSpec>,
    /// Integration notes keyed by subsystem.
    #[serde(default)]
    pub integration_notes: BTreeMap<String, String>,
}

/// Agent-specific payload section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPayload {
    /// What the agent can do.
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Persona description.
    #[serde(default)]
    pub persona: Option<String>,
}

/// An addressable unit of capability described by one catalog document.
///
/// Contexts are created by a catalog scan and are immutable until the
/// next full reload.
#[derive(Debug, Clone)]
pub struct Context {
    /// Unique identifier within a catalog snapshot.
    pub slug: Slug,
    /// Human-readable name.
    pub name: String,
    /// What this context is for.
    pub description: String,
    /// Dynamically discovered type tag.
    pub context_type: ContextType,
    /// Phrases that should activate this context.
    pub triggers: Vec<String>,
    /// Usage instructions assembled from the document.
    pub instructions: String,
    /// Workflow payload, if the document has one.
    pub workflow: Option<WorkflowPayload>,
    /// Pattern payload, if the document has one.
    pub pattern: Option<PatternPayload>,
    /// Tool payload, if the document has one.
    pub tool: Option<ToolPayload>,
    /// Agent payload, if the document has one.
    pub agent: Option<AgentPayload>,
    /// Path of the document this context was parsed from.
    pub source_path: PathBuf,
}

impl Context {
    /// Returns the capability list from tool or agent payloads.
    #[must_use]
    pub fn capabilities(&self) -> &[String] {
        if let Some(tool) = &self.tool {
            if !tool.capabilities.is_empty() {
                return &tool.capabilities;
            }
        }
        if let Some(agent) = &self.agent {
            return &agent.capabilities;
        }
        &[]
    }

    /// Returns the use-case list from the pattern payload.
    #[must_use]
    pub fn use_cases(&self) -> &[String] {
        self.pattern.as_ref().map_or(&[], |p| &p.use_cases)
    }
}
