use super::*;
use async_trait::async_trait;
use std::sync::atomic::Ordering;

use crate::memory::InMemoryStore;
use crate::types::{CardDetail, CardMetadata, Neighbor, StoredEmbedding};
use crate::vector::l2_normalize_in_place;

fn unit(v: &[f32]) -> Vec<f32> {
    let mut v = v.to_vec();
    l2_normalize_in_place(&mut v);
    v
}

fn card(id: &str, name: &str, type_line: &str) -> CardDetail {
    CardDetail {
        id: id.into(),
        name: name.into(),
        metadata: CardMetadata {
            scryfall_id: Some(format!("scry-{id}")),
            type_line: Some(type_line.into()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Small catalog: a red burn cluster, a blue counter cluster, and a second
/// printing of Lightning Bolt with its own record id.
fn seeded_store() -> Arc<InMemoryStore> {
    let store = InMemoryStore::new();
    store.insert(card("bolt", "Lightning Bolt", "Instant"), unit(&[1.0, 0.0, 0.0, 0.1]));
    store.insert(card("bolt-2", "Lightning Bolt", "Instant"), unit(&[1.0, 0.0, 0.0, 0.12]));
    store.insert(card("shock", "Shock", "Instant"), unit(&[0.9, 0.1, 0.0, 0.0]));
    store.insert(card("chain", "Chain Lightning", "Sorcery"), unit(&[0.95, 0.05, 0.1, 0.0]));
    store.insert(card("counter", "Counterspell", "Instant"), unit(&[0.0, 1.0, 0.0, 0.0]));
    store.insert(card("negate", "Negate", "Instant"), unit(&[0.1, 0.9, 0.0, 0.1]));
    store.insert(
        card("niv", "Niv-Mizzet, Parun", "Legendary Creature - Dragon Wizard"),
        unit(&[0.6, 0.6, 0.2, 0.0]),
    );
    store.insert(card("wings", "Wings of Aesthir", "Enchantment - Aura"), unit(&[0.0, 0.2, 1.0, 0.0]));
    Arc::new(store)
}

fn resolver_for(store: &Arc<InMemoryStore>) -> SimilarityResolver {
    SimilarityResolver::with_defaults(store.clone())
}

#[tokio::test]
async fn resolve_prefers_exact_match() {
    let store = seeded_store();
    let resolver = resolver_for(&store);

    let card = resolver.resolve("Shock").await.unwrap();
    assert_eq!(card.id, "shock");
    assert_eq!(store.calls().exact.load(Ordering::SeqCst), 1);
    assert_eq!(store.calls().substring.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn resolve_falls_back_to_substring() {
    let store = seeded_store();
    let resolver = resolver_for(&store);

    let card = resolver.resolve("Aesthir").await.unwrap();
    assert_eq!(card.id, "wings");
    assert_eq!(store.calls().exact.load(Ordering::SeqCst), 1);
    assert_eq!(store.calls().substring.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn resolve_with_many_substring_matches_succeeds() {
    let store = seeded_store();
    let resolver = resolver_for(&store);

    // "Lightning" matches several records; which one wins is up to the store.
    let card = resolver.resolve("Lightning").await.unwrap();
    assert!(!card.vector.is_empty());
}

#[tokio::test]
async fn resolve_missing_name_is_not_found() {
    let store = seeded_store();
    let resolver = resolver_for(&store);

    let err = resolver
        .resolve("Totally Nonexistent Card XYZ")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ResolveError::NotFound {
            name: "Totally Nonexistent Card XYZ".into()
        }
    );
    assert_eq!(store.calls().exact.load(Ordering::SeqCst), 1);
    assert_eq!(store.calls().substring.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn single_card_excludes_itself() {
    let store = seeded_store();
    let resolver = resolver_for(&store);

    let results = resolver
        .find_similar(&SimilarRequest::new(["Lightning Bolt"], 5))
        .await
        .unwrap();

    assert_eq!(store.calls().last_search_limit.load(Ordering::SeqCst), 5);
    assert!(results.len() <= 5);
    assert!(results.iter().all(|r| r.id != "bolt"));
    // Exclusion is by record id: the other printing stays and ranks first.
    assert_eq!(results[0].id, "bolt-2");
    assert_eq!(results.len(), 4);
}

#[tokio::test]
async fn two_cards_resolve_twice_and_search_once() {
    let store = seeded_store();
    let resolver = resolver_for(&store);

    let results = resolver
        .find_similar(&SimilarRequest::new(["Shock", "Counterspell"], 10))
        .await
        .unwrap();

    assert_eq!(store.calls().exact.load(Ordering::SeqCst), 2);
    assert_eq!(store.calls().search.load(Ordering::SeqCst), 1);
    assert_eq!(store.calls().last_search_limit.load(Ordering::SeqCst), 10);
    assert!(results.iter().all(|r| r.id != "shock" && r.id != "counter"));
    // Halfway between red and blue is the Izzet dragon.
    assert_eq!(results[0].id, "niv");
}

#[tokio::test]
async fn results_keep_distance_order_and_similarity_relation() {
    let store = seeded_store();
    let resolver = resolver_for(&store);

    let results = resolver
        .find_similar(&SimilarRequest::new(["Negate"], 10))
        .await
        .unwrap();

    for pair in results.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
    for r in &results {
        assert_eq!(r.similarity, 1.0 - r.distance);
    }
}

#[tokio::test]
async fn blank_names_yield_no_vectors_and_no_search() {
    let store = seeded_store();
    let resolver = resolver_for(&store);

    let err = resolver
        .find_similar(&SimilarRequest::new(["", "   "], 10))
        .await
        .unwrap_err();
    assert_eq!(err, ResolveError::NoVectorsResolved);
    assert_eq!(store.calls().exact.load(Ordering::SeqCst), 0);
    assert_eq!(store.calls().search.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_name_list_is_invalid_input() {
    let store = seeded_store();
    let resolver = resolver_for(&store);

    let err = resolver
        .find_similar(&SimilarRequest::new(Vec::<String>::new(), 10))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::InvalidInput(_)));
}

#[tokio::test]
async fn unknown_name_fails_whole_request_without_search() {
    let store = seeded_store();
    let resolver = resolver_for(&store);

    let err = resolver
        .find_similar(&SimilarRequest::new(["Totally Nonexistent Card XYZ"], 10))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ResolveError::NotFound {
            name: "Totally Nonexistent Card XYZ".into()
        }
    );
    assert_eq!(store.calls().search.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn one_bad_name_fails_the_batch() {
    let store = seeded_store();
    let cfg = ResolverConfig {
        concurrent_lookups: false,
        ..Default::default()
    };
    let resolver = SimilarityResolver::new(store.clone(), cfg);

    let err = resolver
        .find_similar(&SimilarRequest::new(["Shock", "Nope Nope Nope"], 10))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::NotFound { ref name } if name == "Nope Nope Nope"));
    assert_eq!(store.calls().search.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn non_positive_k_defaults_to_ten() {
    let store = seeded_store();
    let resolver = resolver_for(&store);

    resolver
        .find_similar(&SimilarRequest::new(["Wings of Aesthir"], -3))
        .await
        .unwrap();
    assert_eq!(store.calls().last_search_limit.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn k_is_capped_at_max_k() {
    let store = seeded_store();
    let cfg = ResolverConfig {
        max_k: 3,
        default_k: 2,
        ..Default::default()
    };
    let resolver = SimilarityResolver::new(store.clone(), cfg);

    let results = resolver
        .find_similar(&SimilarRequest::new(["Shock"], 1_000))
        .await
        .unwrap();
    assert_eq!(store.calls().last_search_limit.load(Ordering::SeqCst), 3);
    assert!(results.len() <= 3);
}

#[tokio::test]
async fn filters_apply_after_exclusion() {
    let store = seeded_store();
    let resolver = resolver_for(&store);

    let req = SimilarRequest::new(["Shock"], 10).with_filters(CardFilter {
        type_contains: Some("instant".into()),
        ..Default::default()
    });
    let results = resolver.find_similar(&req).await.unwrap();
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| {
        r.metadata
            .type_line
            .as_deref()
            .is_some_and(|t| t.contains("Instant"))
    }));
    for pair in results.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
}

#[tokio::test]
async fn by_scryfall_id_excludes_seed() {
    let store = seeded_store();
    let resolver = resolver_for(&store);

    let results = resolver
        .find_similar_by_scryfall_id("scry-counter", 3, None)
        .await
        .unwrap();
    assert!(results.iter().all(|r| r.id != "counter"));
    assert_eq!(results[0].id, "negate");

    let err = resolver
        .find_similar_by_scryfall_id("scry-missing", 3, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::NotFound { .. }));
}

#[tokio::test]
async fn store_failures_propagate_unmasked() {
    let store = seeded_store();
    let resolver = resolver_for(&store);

    store.fail_with(Some(StoreError::Protocol("bad query".into())));
    let err = resolver
        .find_similar(&SimilarRequest::new(["Shock"], 10))
        .await
        .unwrap_err();
    assert_eq!(err, ResolveError::UpstreamProtocol("bad query".into()));

    store.fail_with(Some(StoreError::Transport("connection refused".into())));
    let err = resolver.resolve("Shock").await.unwrap_err();
    assert!(matches!(err, ResolveError::Upstream(StoreError::Transport(_))));
}

#[tokio::test]
async fn metric_verification() {
    let cosine = Arc::new(InMemoryStore::new());
    let resolver = SimilarityResolver::with_defaults(cosine);
    assert_eq!(
        resolver.verify_distance_metric().await.unwrap(),
        Some(DistanceMetric::Cosine)
    );

    let l2 = Arc::new(InMemoryStore::new().with_metric(Some(DistanceMetric::L2Squared)));
    let strict = SimilarityResolver::with_defaults(l2.clone());
    assert_eq!(
        strict.verify_distance_metric().await.unwrap_err(),
        ResolveError::UnsupportedMetric {
            metric: DistanceMetric::L2Squared
        }
    );

    let lenient = SimilarityResolver::new(
        l2,
        ResolverConfig {
            allow_non_cosine_metric: true,
            ..Default::default()
        },
    );
    assert!(lenient.verify_distance_metric().await.is_ok());

    let unknown = Arc::new(InMemoryStore::new().with_metric(None));
    let resolver = SimilarityResolver::with_defaults(unknown);
    assert_eq!(resolver.verify_distance_metric().await.unwrap(), None);
}

/// Store whose calls never finish within the resolver's budget.
struct StalledStore;

#[async_trait]
impl VectorStore for StalledStore {
    async fn find_exact(
        &self,
        _field: LookupField,
        _value: &str,
        _limit: usize,
    ) -> StoreResult<Vec<StoredEmbedding>> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Vec::new())
    }

    async fn find_substring(
        &self,
        _field: LookupField,
        _pattern: &str,
        _limit: usize,
    ) -> StoreResult<Vec<StoredEmbedding>> {
        Ok(Vec::new())
    }

    async fn nearest_neighbors(&self, _vector: &[f32], _limit: usize) -> StoreResult<Vec<Neighbor>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn slow_store_times_out() {
    let resolver = SimilarityResolver::new(
        Arc::new(StalledStore),
        ResolverConfig {
            lookup_timeout_ms: 20,
            ..Default::default()
        },
    );

    let err = resolver
        .find_similar(&SimilarRequest::new(["Shock"], 10))
        .await
        .unwrap_err();
    assert!(err.is_timeout());
}

#[test]
fn config_validation_and_effective_k() {
    let cfg = ResolverConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.effective_k(0), 10);
    assert_eq!(cfg.effective_k(-3), 10);
    assert_eq!(cfg.effective_k(25), 25);
    assert_eq!(cfg.effective_k(10_000), 500);

    let bad = ResolverConfig {
        max_k: 5,
        default_k: 10,
        ..Default::default()
    };
    assert!(bad.validate().is_err());
}
