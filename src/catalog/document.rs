//! Catalog document schema and per-document parsing.

use crate::models::{
    AgentPayload, Context, ContextType, PatternPayload, Slug, ToolPayload, WorkflowPayload,
};
use crate::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Raw shape of a `context.yaml` document.
///
/// Permissive by design: only `metadata` is required, every payload
/// section is optional, and unknown keys are ignored so catalogs can
/// carry extra fields this engine does not interpret.
#[derive(Debug, Deserialize)]
pub struct ContextDocument {
    /// Required metadata mapping.
    pub metadata: Option<Metadata>,
    /// Workflow payload section.
    #[serde(default)]
    pub workflow_config: Option<WorkflowPayload>,
    /// Pattern payload section.
    #[serde(default)]
    pub pattern_config: Option<PatternPayload>,
    /// Tool payload section.
    #[serde(default)]
    pub tool_config: Option<ToolPayload>,
    /// Agent payload section.
    #[serde(default)]
    pub agent_config: Option<AgentPayload>,
}

/// The `metadata` mapping of a context document.
#[derive(Debug, Deserialize)]
pub struct Metadata {
    /// Explicit slug; the directory name is the default when absent.
    #[serde(default)]
    pub slug: Option<String>,
    /// Legacy identifier, unused for addressing.
    #[serde(default)]
    pub id: Option<String>,
    /// Context description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Parses one catalog document into a [`Context`].
///
/// # Errors
///
/// Returns [`Error::InvalidDocument`] when the file cannot be read, is
/// not valid YAML, or lacks the `metadata` mapping. The caller treats
/// this as recoverable and skips the document.
pub fn parse_context(path: &Path, context_type: &ContextType) -> Result<Context> {
    let invalid = |cause: String| Error::InvalidDocument {
        path: path.display().to_string(),
        cause,
    };

    let content = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let document: ContextDocument =
        serde_yaml_ng::from_str(&content).map_err(|e| invalid(e.to_string()))?;

    let metadata = document
        .metadata
        .as_ref()
        .ok_or_else(|| invalid("missing metadata".to_string()))?;

    let dir_name = path
        .parent()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .ok_or_else(|| invalid("document has no parent directory".to_string()))?;

    let slug = metadata
        .slug
        .as_deref()
        .map_or_else(|| Slug::new(dir_name), Slug::new);

    let description = metadata.description.clone().unwrap_or_default();
    let name = format_name(if description.is_empty() {
        dir_name
    } else {
        &description
    });

    let triggers = extract_triggers(&document);
    let instructions = extract_instructions(&document);

    Ok(Context {
        slug,
        name,
        description,
        context_type: context_type.clone(),
        triggers,
        instructions,
        workflow: document.workflow_config,
        pattern: document.pattern_config,
        tool: document.tool_config,
        agent: document.agent_config,
        source_path: path.to_path_buf(),
    })
}

/// Title-cases a description or directory name into a display name.
fn format_name(text: &str) -> String {
    text.replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collects trigger phrases from every payload section that carries them.
fn extract_triggers(document: &ContextDocument) -> Vec<String> {
    let mut triggers = Vec::new();

    if let Some(workflow) = &document.workflow_config {
        if let Some(spec) = &workflow.triggers {
            triggers.extend_from_slice(spec.manual());
        }
    }

    if let Some(pattern) = &document.pattern_config {
        triggers.extend_from_slice(&pattern.use_cases);
    }

    if let Some(tool) = &document.tool_config {
        triggers.extend_from_slice(&tool.capabilities);
    }

    if triggers.is_empty() {
        triggers.push("general purpose context".to_string());
    }
    triggers
}

/// Assembles usage instructions from the payload sections.
fn extract_instructions(document: &ContextDocument) -> String {
    let mut instructions = Vec::new();

    if let Some(workflow) = &document.workflow_config {
        if let Some(process) = &workflow.process {
            instructions.push(process.clone());
        }
    }

    if let Some(pattern) = &document.pattern_config {
        if !pattern.process.is_empty() {
            let steps: Vec<&str> = pattern.process.values().map(String::as_str).collect();
            instructions.push(steps.join("\n"));
        }
    }

    if let Some(tool) = &document.tool_config {
        if !tool.capabilities.is_empty() {
            instructions.push(format!("Capabilities: {}", tool.capabilities.join(", ")));
        }
        if !tool.mcp_tools.is_empty() {
            let names: Vec<&str> = tool.mcp_tools.iter().map(|t| t.name.as_str()).collect();
            instructions.push(format!("MCP Tools: {}", names.join(", ")));
        }
    }

    if instructions.is_empty() {
        "Execute this context with current setup.".to_string()
    } else {
        instructions.join("\n")
    }
}
