//! End-to-end integration tests for the discovery pipeline.
//!
//! Each test builds a real catalog hierarchy in a temp directory, runs
//! the full scan -> embed -> graph -> query flow, and checks the spec
//! surface: confident matching, suggestion fallback, combo and chain
//! recommendations, cache lifecycle.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wayfinder::models::{ChainOutcome, ComboOutcome, MatchOutcome, NextOutcome};
use wayfinder::{
    CacheKind, CacheStore, CatalogLoader, DiscoveryService, Embedder, Error, HashedEmbedder,
    SemanticMatcher, WayfinderConfig,
};

fn write_context(root: &Path, context_type: &str, leaf: &str, yaml: &str) {
    let dir = root.join(context_type).join(leaf);
    fs::create_dir_all(&dir).expect("mkdir failed");
    fs::write(dir.join("context.yaml"), yaml).expect("write failed");
}

fn simple_doc(description: &str) -> String {
    format!("metadata:\n  description: {description}\n")
}

fn seeded_service(dir: &TempDir) -> DiscoveryService {
    let catalog_root = dir.path().join("contexts");

    write_context(
        &catalog_root,
        "workflows",
        "deep-research",
        "\
metadata:
  description: thorough multi source research workflow
workflow_config:
  process: gather, cross-check, synthesize
  triggers:
    manual:
      - research this topic
",
    );
    write_context(
        &catalog_root,
        "workflows",
        "quick-summary",
        &simple_doc("fast single document summary"),
    );
    write_context(
        &catalog_root,
        "tools",
        "web-search",
        "\
metadata:
  description: web search integration
tool_config:
  capabilities:
    - search the web
    - fetch pages
  mcp_tools:
    - name: web_fetch
      description: fetch a page by url
",
    );
    write_context(
        &catalog_root,
        "patterns",
        "first-principles",
        "\
metadata:
  description: reason from fundamentals
pattern_config:
  use_cases:
    - untangle a hard problem
",
    );

    let config = WayfinderConfig {
        catalog_root,
        cache_dir: dir.path().join("cache"),
        max_suggestions: 5,
        combo_depth: 3,
    };
    DiscoveryService::with_default_embedder(config)
}

#[test]
fn full_pipeline_scan_build_query() {
    let dir = TempDir::new().expect("tempdir failed");
    let mut service = seeded_service(&dir);

    let summary = service.rebuild_caches().expect("rebuild failed");
    assert_eq!(summary.contexts, 4);
    assert_eq!(summary.embedded, 4);
    assert!(summary.edges > 0);

    // Both cache documents exist on disk.
    let store = CacheStore::new(dir.path().join("cache"));
    assert!(store.path(CacheKind::Embeddings).exists());
    assert!(store.path(CacheKind::ComboIntelligence).exists());

    let types = service.list_types().expect("list failed");
    let tags: Vec<&str> = types.iter().map(|t| t.tag.as_str()).collect();
    assert_eq!(tags, ["patterns", "tools", "workflows"]);
}

#[test]
fn exact_source_text_query_is_confident_match() {
    let dir = TempDir::new().expect("tempdir failed");
    let catalog_root = dir.path().join("contexts");
    write_context(
        &catalog_root,
        "workflows",
        "deep-research",
        &simple_doc("thorough research"),
    );
    write_context(
        &catalog_root,
        "workflows",
        "quick-summary",
        &simple_doc("fast summary"),
    );

    let mut catalog = CatalogLoader::new(&catalog_root);
    catalog.load_all().expect("load failed");

    let store = CacheStore::new(dir.path().join("cache"));
    let mut matcher = SemanticMatcher::new(Arc::new(HashedEmbedder::new()));
    matcher
        .build_embeddings(catalog.contexts(), &store)
        .expect("build failed");

    let source_text = matcher.records()[0].source_text.clone();
    let outcome = matcher
        .find_workflow(&source_text, None)
        .expect("query failed");

    match outcome {
        MatchOutcome::Found(found) => {
            assert_eq!(found.slug.as_str(), "deep-research");
            assert!((found.similarity - 1.0).abs() < 0.0001);
            assert_eq!(found.summary.context_type.as_str(), "workflows");
        }
        MatchOutcome::NotFound { .. } => panic!("expected a confident match"),
    }
}

#[test]
fn unknown_topic_returns_exactly_five_ranked_suggestions() {
    let dir = TempDir::new().expect("tempdir failed");
    let catalog_root = dir.path().join("contexts");
    for i in 0..9 {
        write_context(
            &catalog_root,
            "patterns",
            &format!("pattern-{i}"),
            &simple_doc(&format!("thinking pattern number {i}")),
        );
    }

    let config = WayfinderConfig {
        catalog_root,
        cache_dir: dir.path().join("cache"),
        max_suggestions: 5,
        combo_depth: 3,
    };
    let mut service = DiscoveryService::with_default_embedder(config);
    service.rebuild_caches().expect("rebuild failed");

    let outcome = service
        .find_workflow("zzz-unknown-topic-zzz", None)
        .expect("query failed");

    match outcome {
        MatchOutcome::NotFound { suggestions } => {
            assert_eq!(suggestions.len(), 5);
            for pair in suggestions.windows(2) {
                assert!(
                    pair[0].similarity >= pair[1].similarity,
                    "suggestions not sorted by descending similarity"
                );
            }
        }
        MatchOutcome::Found(found) => panic!("nonsense matched {found:?}"),
    }
}

/// Embedder with scripted vectors, for exact-similarity boundary tests.
struct ScriptedEmbedder {
    vectors: HashMap<String, Vec<f32>>,
}

impl Embedder for ScriptedEmbedder {
    fn dimensions(&self) -> usize {
        4
    }

    fn embed(&self, text: &str) -> wayfinder::Result<Vec<f32>> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| Error::Provider {
                operation: "embed".to_string(),
                cause: format!("unscripted text: {text}"),
            })
    }
}

#[test]
fn similarity_exactly_half_is_not_confident() {
    let dir = TempDir::new().expect("tempdir failed");
    let catalog_root = dir.path().join("contexts");
    write_context(
        &catalog_root,
        "tools",
        "boundary-tool",
        &simple_doc("boundary case"),
    );

    let mut catalog = CatalogLoader::new(&catalog_root);
    catalog.load_all().expect("load failed");

    // The record vector is [1,1,1,1]. The boundary query vector
    // [1,1,-1,1] gives dot = 2, norms 2 and 2: cosine exactly 0.5 with
    // no rounding anywhere. The above-boundary query nudges one
    // component to land just past it.
    let catalog_text = wayfinder::matcher::embedding_text(&catalog.contexts()[0]);
    let mut vectors = HashMap::new();
    vectors.insert(catalog_text, vec![1.0, 1.0, 1.0, 1.0]);
    vectors.insert("at the boundary".to_string(), vec![1.0, 1.0, -1.0, 1.0]);
    vectors.insert(
        "just past the boundary".to_string(),
        vec![1.001, 1.0, -1.0, 1.0],
    );

    let store = CacheStore::new(dir.path().join("cache"));
    let mut matcher = SemanticMatcher::new(Arc::new(ScriptedEmbedder { vectors }));
    matcher
        .build_embeddings(catalog.contexts(), &store)
        .expect("build failed");

    // Exactly 0.5: strictly-greater threshold rejects it.
    let outcome = matcher
        .find_workflow("at the boundary", None)
        .expect("query failed");
    match outcome {
        MatchOutcome::NotFound { suggestions } => {
            assert!((suggestions[0].similarity - 0.5).abs() < 1e-6);
        }
        MatchOutcome::Found(found) => {
            panic!("similarity {} must not be confident", found.similarity)
        }
    }

    // Just above 0.5: accepted.
    let outcome = matcher
        .find_workflow("just past the boundary", None)
        .expect("query failed");
    match outcome {
        MatchOutcome::Found(found) => assert!(found.similarity > 0.5),
        MatchOutcome::NotFound { suggestions } => {
            panic!("similarity {} should be confident", suggestions[0].similarity)
        }
    }
}

#[test]
fn combos_and_chains_flow_through_the_service() {
    let dir = TempDir::new().expect("tempdir failed");
    let mut service = seeded_service(&dir);
    service.rebuild_caches().expect("rebuild failed");

    // Combos for a nonsense intent degrade to NoPrimary with suggestions.
    let outcome = service
        .find_combos("zzz-nothing-matches-zzz", None)
        .expect("find_combos failed");
    match outcome {
        ComboOutcome::NoPrimary { suggestions } => assert!(!suggestions.is_empty()),
        ComboOutcome::Found { .. } => panic!("nonsense intent resolved a primary"),
    }

    // Chains from a known slug stay bounded and duplicate-free.
    let outcome = service
        .build_chain("deep-research", "synthesis")
        .expect("build_chain failed");
    match outcome {
        ChainOutcome::Walked { steps, .. } | ChainOutcome::Curated { steps, .. } => {
            assert!(!steps.is_empty());
            assert!(steps.len() <= 5);
            let mut seen = std::collections::HashSet::new();
            for step in &steps {
                assert!(seen.insert(step.slug.clone()), "duplicate slug in chain");
            }
        }
        ChainOutcome::UnknownStart { .. } => panic!("start slug exists"),
    }

    // Next-step suggestions respect the unknown-slug contract.
    let outcome = service.suggest_next("no-such-slug").expect("suggest failed");
    assert!(matches!(outcome, NextOutcome::UnknownContext { .. }));
}

#[test]
fn rebuild_reflects_catalog_changes_only() {
    let dir = TempDir::new().expect("tempdir failed");
    let catalog_root = dir.path().join("contexts");
    write_context(
        &catalog_root,
        "tools",
        "old-tool",
        &simple_doc("the old tool"),
    );

    let config = WayfinderConfig {
        catalog_root: catalog_root.clone(),
        cache_dir: dir.path().join("cache"),
        max_suggestions: 5,
        combo_depth: 3,
    };
    let mut service = DiscoveryService::with_default_embedder(config);
    service.rebuild_caches().expect("rebuild failed");
    assert_eq!(service.list_contexts("all").expect("list failed").len(), 1);

    // Storage changes wholesale.
    fs::remove_dir_all(catalog_root.join("tools")).expect("rm failed");
    write_context(
        &catalog_root,
        "agents",
        "new-agent",
        &simple_doc("the new agent"),
    );

    let summary = service.rebuild_caches().expect("rebuild failed");
    assert_eq!(summary.contexts, 1);

    let contexts = service.list_contexts("all").expect("list failed");
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0].slug.as_str(), "new-agent");

    // The embeddings document on disk only knows the new state.
    let store = CacheStore::new(dir.path().join("cache"));
    let document: Option<wayfinder::models::EmbeddingsDocument> =
        store.load(CacheKind::Embeddings).expect("load failed");
    let document = document.expect("document missing");
    assert_eq!(document.records.len(), 1);
    assert_eq!(document.records[0].slug.as_str(), "new-agent");
}

#[test]
fn operator_deleting_cache_files_forces_cold_start() {
    let dir = TempDir::new().expect("tempdir failed");
    let mut service = seeded_service(&dir);
    service.rebuild_caches().expect("rebuild failed");
    drop(service);

    // Operator deletes the cache documents out-of-band.
    let store = CacheStore::new(dir.path().join("cache"));
    fs::remove_file(store.path(CacheKind::Embeddings)).expect("rm failed");
    fs::remove_file(store.path(CacheKind::ComboIntelligence)).expect("rm failed");

    let mut fresh = seeded_service(&dir);
    let result = fresh.find_workflow("research", None);
    match result {
        Err(Error::CacheUnavailable { hint, .. }) => {
            assert!(hint.contains("build"), "hint should name the build operation");
        }
        other => panic!("expected CacheUnavailable, got {other:?}"),
    }
}

#[test]
fn empty_catalog_builds_empty_caches_without_error() {
    let dir = TempDir::new().expect("tempdir failed");
    let config = WayfinderConfig {
        catalog_root: dir.path().join("does-not-exist"),
        cache_dir: dir.path().join("cache"),
        max_suggestions: 5,
        combo_depth: 3,
    };
    let mut service = DiscoveryService::with_default_embedder(config);

    let summary = service.rebuild_caches().expect("rebuild failed");
    assert_eq!(summary.contexts, 0);
    assert_eq!(summary.embedded, 0);
    assert_eq!(summary.edges, 0);

    // Queries against the (empty) embedding cache still surface
    // CacheUnavailable rather than empty results.
    let result = service.find_workflow("anything", None);
    assert!(matches!(result, Err(Error::CacheUnavailable { .. })));
}
