use crate::error::{ServerError, ServerResult};
use crate::routes::{int_or, ListingParams};
use crate::state::ServerState;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use metrics::{counter, histogram};
use resolver::{sort_cards, ResolveResult, SimilarRequest, SimilarityResult, SortKey};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

/// `k` used by `GET /similar` when none is given. Listings are usually
/// narrowed by filters afterwards, so the default is generous.
pub const LISTING_DEFAULT_K: i64 = 200;

/// Query parameters for `GET /similar`
#[derive(Debug, Deserialize)]
pub struct SimilarParams {
    /// Card name to seed the search with
    #[serde(default)]
    pub name: Option<String>,

    /// Scryfall id of a printing; takes precedence over `name`
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub k: Option<String>,
}

/// Record request metrics and convert resolver failures.
fn observe<T>(outcome: ResolveResult<T>, started: Instant) -> ServerResult<T> {
    histogram!("cardsim_similar_latency_seconds").record(started.elapsed().as_secs_f64());
    outcome.map_err(|err| {
        counter!("cardsim_similar_failures_total", "kind" => err.kind()).increment(1);
        tracing::info!(kind = err.kind(), error = %err, "similarity request failed");
        ServerError::from(err)
    })
}

/// Find cards similar to a set of names
///
/// # Request
///
/// ```json
/// { "names": ["Lightning Bolt", "Shock"], "k": 10 }
/// ```
///
/// The body is decoded as JSON regardless of `Content-Type`. Results keep the
/// store's ascending-distance order; the input cards themselves are excluded.
pub async fn find_similar(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> ServerResult<Json<Vec<SimilarityResult>>> {
    let request: SimilarRequest = serde_json::from_slice(&body)?;
    counter!("cardsim_similar_requests_total").increment(1);

    let started = Instant::now();
    let outcome = state.resolver.find_similar(&request).await;
    let results = observe(outcome, started)?;

    tracing::debug!(
        names = request.names.len(),
        results = results.len(),
        "similar request served"
    );
    Ok(Json(results))
}

/// Single-card similarity listing with filters and sorting
///
/// `GET /similar?name=Lightning%20Bolt&k=200&type=instant&sort=cmc&order=asc`
pub async fn similar_listing(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SimilarParams>,
    Query(listing): Query<ListingParams>,
) -> ServerResult<Json<Vec<SimilarityResult>>> {
    let k = int_or(params.k.as_deref(), LISTING_DEFAULT_K);
    let filter = listing.filter();
    let filters = (!filter.is_empty()).then_some(&filter);

    let id = params.id.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let name = params.name.as_deref().map(str::trim).filter(|s| !s.is_empty());

    counter!("cardsim_similar_requests_total").increment(1);
    let started = Instant::now();
    let outcome = match (id, name) {
        (Some(id), _) => {
            state
                .resolver
                .find_similar_by_scryfall_id(id, k, filters)
                .await
        }
        (None, Some(name)) => {
            let mut request = SimilarRequest::new([name], k);
            request.filters = filters.cloned();
            state.resolver.find_similar(&request).await
        }
        (None, None) => return Err(ServerError::BadRequest("name or id required".into())),
    };
    let mut results = observe(outcome, started)?;

    let (key, order) = listing.sorting(SortKey::Similarity);
    sort_cards(&mut results, key, order);
    Ok(Json(results))
}
