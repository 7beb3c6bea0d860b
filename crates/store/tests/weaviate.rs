use std::time::Duration;

use resolver::{
    CardCatalog, DistanceMetric, LookupField, ResolveError, SimilarRequest, SimilarityResolver,
    StoreError, VectorStore,
};
use serde_json::json;
use std::sync::Arc;
use store::{WeaviateClient, WeaviateConfig};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> WeaviateClient {
    let cfg = WeaviateConfig::default().with_url(server.uri());
    WeaviateClient::new(&cfg).expect("client")
}

fn cards(list: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": { "Get": { "Card": list } } }))
}

#[tokio::test]
async fn exact_lookup_sends_equal_filter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .and(body_string_contains("operator: Equal"))
        .and(body_string_contains("Lightning Bolt"))
        .respond_with(cards(json!([{
            "name": "Lightning Bolt",
            "_additional": { "id": "bolt-1", "vector": [0.6, 0.8] }
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let hits = client
        .find_exact(LookupField::Name, "Lightning Bolt", 1)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "bolt-1");
    assert_eq!(hits[0].vector, vec![0.6, 0.8]);
}

#[tokio::test]
async fn near_vector_returns_ordered_neighbors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .and(body_string_contains("nearVector"))
        .respond_with(cards(json!([
            { "name": "Chain Lightning", "type_line": "Sorcery", "cmc": 1,
              "_additional": { "id": "chain", "distance": 0.05 } },
            { "name": "Shock", "type_line": "Instant", "colors": ["R"],
              "_additional": { "id": "shock", "distance": 0.1 } }
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let hits = client.nearest_neighbors(&[1.0, 0.0], 2).await.unwrap();
    let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["chain", "shock"]);
    assert_eq!(hits[1].metadata.colors, vec!["R".to_string()]);
}

#[tokio::test]
async fn graphql_errors_become_protocol_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "Get": { "Card": null } },
            "errors": [{ "message": "invalid 'where' filter" }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .find_exact(LookupField::Name, "Shock", 1)
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::Protocol("invalid 'where' filter".into()));
}

#[tokio::test]
async fn non_200_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .respond_with(ResponseTemplate::new(503).set_body_string("  overloaded \n"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.nearest_neighbors(&[1.0], 5).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::Status {
            status: 503,
            body: "overloaded".into()
        }
    );
}

#[tokio::test]
async fn garbage_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.list_cards(0, 10).await.unwrap_err();
    assert!(matches!(err, StoreError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn slow_store_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .respond_with(cards(json!([])).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let cfg = WeaviateConfig {
        timeout_secs: 1,
        ..WeaviateConfig::default().with_url(server.uri())
    };
    let client = WeaviateClient::new(&cfg).unwrap();
    let err = client
        .find_exact(LookupField::Name, "Shock", 1)
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::Timeout);
}

#[tokio::test]
async fn unreachable_store_is_transport_error() {
    let cfg = WeaviateConfig::default().with_url("http://127.0.0.1:9");
    let client = WeaviateClient::new(&cfg).unwrap();
    let err = client.ping().await.unwrap_err();
    assert!(
        matches!(err, StoreError::Transport(_) | StoreError::Timeout),
        "{err:?}"
    );
}

#[tokio::test]
async fn card_detail_decodes_legalities() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .and(body_string_contains("scryfall_id"))
        .respond_with(cards(json!([{
            "scryfall_id": "e3285e6b",
            "name": "Lightning Bolt",
            "type_line": "Instant",
            "collector_number": "161",
            "keywords": null,
            "legalities": "{\"modern\":\"legal\",\"standard\":\"not_legal\"}",
            "_additional": { "id": "bolt-1" }
        }])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let card = client.get_card("e3285e6b").await.unwrap().unwrap();
    assert_eq!(card.name, "Lightning Bolt");
    assert_eq!(card.collector_number.as_deref(), Some("161"));
    assert!(card.keywords.is_empty());
    assert_eq!(card.legalities.get("modern").map(String::as_str), Some("legal"));
}

#[tokio::test]
async fn missing_card_detail_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .respond_with(cards(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.get_card("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn schema_reports_distance_metric() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/schema/Card"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "class": "Card",
            "vectorIndexConfig": { "distance": "cosine" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(
        client.distance_metric().await.unwrap(),
        Some(DistanceMetric::Cosine)
    );
}

#[tokio::test]
async fn ping_uses_ready_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/.well-known/ready"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.ping().await.unwrap();
}

#[tokio::test]
async fn resolver_falls_back_to_like_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .and(body_string_contains("operator: Equal"))
        .respond_with(cards(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .and(body_string_contains("operator: Like"))
        .and(body_string_contains("*Aesthir*"))
        .respond_with(cards(json!([{
            "name": "Wings of Aesthir",
            "_additional": { "id": "wings", "vector": [0.0, 1.0] }
        }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .and(body_string_contains("nearVector"))
        .and(body_string_contains("limit:10"))
        .respond_with(cards(json!([
            { "name": "Wings of Aesthir", "_additional": { "id": "wings", "distance": 0.0 } },
            { "name": "Flight", "_additional": { "id": "flight", "distance": 0.2 } }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = SimilarityResolver::with_defaults(Arc::new(client_for(&server)));
    let results = resolver
        .find_similar(&SimilarRequest::new(["Aesthir"], -3))
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "flight");
    assert_eq!(results[0].similarity, 1.0 - results[0].distance);
}

#[tokio::test]
async fn resolver_surfaces_protocol_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "class Card not found" }]
        })))
        .mount(&server)
        .await;

    let resolver = SimilarityResolver::with_defaults(Arc::new(client_for(&server)));
    let err = resolver
        .find_similar(&SimilarRequest::new(["Shock"], 10))
        .await
        .unwrap_err();
    assert_eq!(err, ResolveError::UpstreamProtocol("class Card not found".into()));
}
