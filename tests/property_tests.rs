//! Property-based tests for the discovery engine.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Cosine similarity is reflexive (self-similarity ~ 1.0) and symmetric
//! - Hashed embeddings are deterministic and normalized
//! - Slugs lowercase deterministically
//! - Chain walks never revisit a slug and never exceed the length cap

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use tempfile::TempDir;
use wayfinder::models::{
    ChainOutcome, ComboIntelligence, EdgeKind, RelatednessEdge, Slug,
};
use wayfinder::{CatalogLoader, Embedder, HashedEmbedder, RelationshipEngine, cosine_similarity};

/// Number of nodes in the random-graph chain fixture.
const GRAPH_NODES: usize = 10;

fn nonzero_vector() -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-10.0f32..10.0, 3..64)
        .prop_filter("vector must have nonzero magnitude", |v| {
            v.iter().map(|x| x * x).sum::<f32>() > 0.01
        })
}

/// Two nonzero vectors sharing one length.
fn vector_pair() -> impl Strategy<Value = (Vec<f32>, Vec<f32>)> {
    (3usize..64).prop_flat_map(|len| {
        let one = proptest::collection::vec(-10.0f32..10.0, len)
            .prop_filter("vector must have nonzero magnitude", |v| {
                v.iter().map(|x| x * x).sum::<f32>() > 0.01
            });
        (one.clone(), one)
    })
}

proptest! {
    /// Property: a vector's cosine similarity with itself is 1.0 within
    /// floating tolerance.
    #[test]
    fn prop_cosine_self_similarity_is_one(v in nonzero_vector()) {
        let similarity = cosine_similarity(&v, &v);
        prop_assert!((similarity - 1.0).abs() < 0.001, "got {similarity}");
    }

    /// Property: cosine similarity is symmetric.
    #[test]
    fn prop_cosine_is_symmetric((a, b) in vector_pair()) {
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        prop_assert!((ab - ba).abs() < 0.0001);
    }

    /// Property: cosine similarity stays within [-1, 1] (plus tolerance).
    #[test]
    fn prop_cosine_bounded((a, b) in vector_pair()) {
        let similarity = cosine_similarity(&a, &b);
        prop_assert!((-1.001..=1.001).contains(&similarity), "got {similarity}");
    }

    /// Property: hashed embeddings are deterministic and unit-length.
    #[test]
    fn prop_hashed_embedding_deterministic_and_normalized(text in "[a-z ]{1,80}") {
        prop_assume!(!text.trim().is_empty());
        let embedder = HashedEmbedder::new();

        let first = embedder.embed(&text).expect("embed failed");
        let second = embedder.embed(&text).expect("embed failed");
        prop_assert_eq!(&first, &second);

        let magnitude: f32 = first.iter().map(|x| x * x).sum::<f32>().sqrt();
        prop_assert!((magnitude - 1.0).abs() < 0.01, "magnitude {magnitude}");
    }

    /// Property: slug construction lowercases and is idempotent.
    #[test]
    fn prop_slug_lowercase_idempotent(s in "[A-Za-z0-9-]{1,40}") {
        let once = Slug::new(&s);
        let twice = Slug::new(once.as_str());
        let lowered = s.to_lowercase();
        prop_assert_eq!(once.as_str(), lowered.as_str());
        prop_assert_eq!(once, twice);
    }
}

/// Builds a catalog of `GRAPH_NODES` contexts and a relationship engine
/// over an arbitrary edge set, then checks walk invariants.
fn walk_invariants(edge_specs: Vec<(usize, usize, f32)>, start: usize, goal: String) {
    let dir = TempDir::new().expect("tempdir failed");
    let root = dir.path().join("contexts");
    for i in 0..GRAPH_NODES {
        let leaf = root.join("tools").join(format!("node-{i}"));
        fs::create_dir_all(&leaf).expect("mkdir failed");
        fs::write(
            leaf.join("context.yaml"),
            format!("metadata:\n  description: node {i}\n"),
        )
        .expect("write failed");
    }
    let mut catalog = CatalogLoader::new(&root);
    catalog.load_all().expect("load failed");

    let mut edges: BTreeMap<Slug, Vec<RelatednessEdge>> = BTreeMap::new();
    for (from, to, weight) in edge_specs {
        edges
            .entry(Slug::new(format!("node-{from}")))
            .or_default()
            .push(RelatednessEdge {
                to: Slug::new(format!("node-{to}")),
                kind: EdgeKind::Semantic,
                weight,
                rationale: "semantic similarity".to_string(),
            });
    }

    let engine = RelationshipEngine::from_document(ComboIntelligence {
        schema_version: ComboIntelligence::SCHEMA_VERSION,
        built_at: chrono::Utc::now(),
        fingerprint: String::new(),
        catalog_size: GRAPH_NODES,
        edges,
        power_combos: BTreeMap::new(),
        chains: BTreeMap::new(),
    });

    let outcome = engine
        .build_chain(&format!("node-{start}"), &goal, &catalog)
        .expect("build_chain failed");

    match outcome {
        ChainOutcome::Walked { steps, .. } => {
            assert!(steps.len() <= 5, "path too long: {}", steps.len());
            let mut seen = HashSet::new();
            for step in &steps {
                assert!(seen.insert(step.slug.clone()), "duplicate slug in path");
            }
            assert_eq!(steps[0].slug, Slug::new(format!("node-{start}")));
        }
        ChainOutcome::Curated { .. } => panic!("no curated chains in this fixture"),
        ChainOutcome::UnknownStart { .. } => panic!("start node exists"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: over arbitrary dense weighted graphs (cycles included),
    /// the greedy walk never revisits a slug and never exceeds five
    /// steps.
    #[test]
    fn prop_chain_walk_bounded_and_duplicate_free(
        edge_specs in proptest::collection::vec(
            (0..GRAPH_NODES, 0..GRAPH_NODES, 0.0f32..1.0),
            0..40,
        ),
        start in 0..GRAPH_NODES,
        goal in "[a-z]{3,12}",
    ) {
        walk_invariants(edge_specs, start, goal);
    }
}
