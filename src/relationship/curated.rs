//! Hand-curated power combinations and chains.
//!
//! These tables are editorial content, not derived data: combinations of
//! contexts that are known to work well together for recurring scenarios,
//! and progressions that reliably move work toward a goal. They are merged
//! into the combo-intelligence document at build time.

use crate::models::{Chain, PowerCombo, Slug};
use std::collections::BTreeMap;

fn slugs(names: &[&str]) -> Vec<Slug> {
    names.iter().map(|n| Slug::new(*n)).collect()
}

/// The curated power-combination table, keyed by scenario.
#[must_use]
pub fn power_combos() -> BTreeMap<String, PowerCombo> {
    let combos = [
        PowerCombo {
            scenario_key: "creative-problem-solving".to_string(),
            name: "Creative Problem Solving".to_string(),
            description: "Systematic approach to creative problem solving".to_string(),
            core: slugs(&["systematic-creativity", "radical-scenarios", "innovator"]),
            support: slugs(&[
                "first-principles-thinking",
                "reverse-brainstorming",
                "extreme-examples",
            ]),
            sequence: slugs(&["systematic-creativity", "radical-scenarios", "innovator"]),
            effectiveness: 0.92,
        },
        PowerCombo {
            scenario_key: "strategic-decision".to_string(),
            name: "Strategic Decision Making".to_string(),
            description: "Comprehensive framework for strategic decisions".to_string(),
            core: slugs(&["strategic-analysis", "user-research", "porter-five-forces"]),
            support: slugs(&["decision-matrix", "reversibility-check", "swot-analysis"]),
            sequence: slugs(&["user-research", "porter-five-forces", "strategic-analysis"]),
            effectiveness: 0.88,
        },
        PowerCombo {
            scenario_key: "innovation-pipeline".to_string(),
            name: "Innovation Pipeline".to_string(),
            description: "End-to-end innovation development".to_string(),
            core: slugs(&["innovator", "design-thinking", "jobs-to-be-done"]),
            support: slugs(&[
                "blue-ocean-strategy",
                "value-proposition-canvas",
                "first-principles-thinking",
            ]),
            sequence: slugs(&["jobs-to-be-done", "design-thinking", "innovator"]),
            effectiveness: 0.85,
        },
        PowerCombo {
            scenario_key: "user-research".to_string(),
            name: "Deep User Research".to_string(),
            description: "Comprehensive user understanding framework".to_string(),
            core: slugs(&["user-research", "jobs-to-be-done", "insight-synthesis"]),
            support: slugs(&["design-thinking", "empathy-mapping", "user-journey"]),
            sequence: slugs(&["user-research", "jobs-to-be-done", "insight-synthesis"]),
            effectiveness: 0.90,
        },
        PowerCombo {
            scenario_key: "system-optimization".to_string(),
            name: "System Optimization".to_string(),
            description: "Holistic system analysis and optimization".to_string(),
            core: slugs(&[
                "systems-thinking",
                "performance-audit",
                "first-principles-thinking",
            ]),
            support: slugs(&["value-stream-mapping", "constraint-theory", "optimization"]),
            sequence: slugs(&[
                "systems-thinking",
                "first-principles-thinking",
                "performance-audit",
            ]),
            effectiveness: 0.87,
        },
    ];

    combos
        .into_iter()
        .map(|combo| (combo.scenario_key.clone(), combo))
        .collect()
}

/// The curated chain table, keyed by chain name.
#[must_use]
pub fn chains() -> BTreeMap<String, Chain> {
    let chains = [
        Chain {
            name: "research-to-action".to_string(),
            steps: slugs(&[
                "user-research",
                "jobs-to-be-done",
                "design-thinking",
                "action-planning",
            ]),
        },
        Chain {
            name: "problem-to-solution".to_string(),
            steps: slugs(&[
                "radical-scenarios",
                "first-principles-thinking",
                "systematic-creativity",
                "innovator",
            ]),
        },
        Chain {
            name: "strategy-to-execution".to_string(),
            steps: slugs(&[
                "porter-five-forces",
                "strategic-analysis",
                "decision-matrix",
                "action-planning",
            ]),
        },
        Chain {
            name: "ideation-to-validation".to_string(),
            steps: slugs(&[
                "systematic-creativity",
                "radical-scenarios",
                "design-thinking",
                "lean-validation",
            ]),
        },
        Chain {
            name: "analysis-to-insight".to_string(),
            steps: slugs(&[
                "systems-thinking",
                "first-principles-thinking",
                "insight-synthesis",
                "strategic-analysis",
            ]),
        },
    ];

    chains
        .into_iter()
        .map(|chain| (chain.name.clone(), chain))
        .collect()
}
