use crate::error::{ServerError, ServerResult};
use crate::routes::{int_or, ListingParams};
use crate::state::ServerState;
use axum::extract::{Path, Query, State};
use axum::Json;
use resolver::{sort_cards, sort_printings, CardDetail, CardSummary, Printing, SortKey};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_SEARCH_LIMIT: usize = 200;
pub const MAX_SEARCH_LIMIT: usize = 500;
pub const PRINTINGS_LIMIT: usize = 200;

/// Query parameters for catalog paging
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub offset: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

/// One page of the catalog
#[derive(Debug, Serialize, Deserialize)]
pub struct CardPage {
    pub cards: Vec<CardSummary>,
    pub offset: usize,
    pub limit: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub prev_offset: usize,
    pub next_offset: usize,
}

impl CardPage {
    /// Build a page from a fetch of up to `limit + 1` cards; the extra card
    /// only signals that another page exists.
    pub fn from_fetch(mut cards: Vec<CardSummary>, offset: usize, limit: usize) -> Self {
        let has_next = cards.len() > limit;
        cards.truncate(limit);
        Self {
            cards,
            offset,
            limit,
            has_prev: offset > 0,
            has_next,
            prev_offset: offset.saturating_sub(limit),
            next_offset: offset + limit,
        }
    }
}

/// Query parameters for name search
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

/// Card detail with every printing of the same name
#[derive(Debug, Serialize, Deserialize)]
pub struct CardDetailResponse {
    pub card: CardDetail,
    pub printings: Vec<Printing>,
}

/// `limit` inside `1..=max`, or `default` when absent or out of range
fn bounded_limit(raw: Option<&str>, default: usize, max: usize) -> usize {
    match usize::try_from(int_or(raw, default as i64)) {
        Ok(limit) if (1..=max).contains(&limit) => limit,
        _ => default,
    }
}

/// Browse the catalog in store order
pub async fn list_cards(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<PageParams>,
) -> ServerResult<Json<CardPage>> {
    let offset = usize::try_from(int_or(params.offset.as_deref(), 0)).unwrap_or(0);
    let limit = bounded_limit(params.limit.as_deref(), DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);

    let cards = state.catalog.list_cards(offset, limit + 1).await?;
    Ok(Json(CardPage::from_fetch(cards, offset, limit)))
}

/// Substring search on card names, then filters and sorting
pub async fn search_cards(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SearchParams>,
    Query(listing): Query<ListingParams>,
) -> ServerResult<Json<Vec<CardSummary>>> {
    let q = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ServerError::BadRequest("q required".into()))?;
    let limit = bounded_limit(params.limit.as_deref(), DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT);

    let found = state.catalog.find_by_name_like(q, limit).await?;
    let mut cards = listing.filter().apply(found);
    let (key, order) = listing.sorting(SortKey::Name);
    sort_cards(&mut cards, key, order);

    tracing::debug!(query = %q, hits = cards.len(), "card search served");
    Ok(Json(cards))
}

/// Detail view of one printing plus its sibling printings
pub async fn card_detail(
    State(state): State<Arc<ServerState>>,
    Path(scryfall_id): Path<String>,
) -> ServerResult<Json<CardDetailResponse>> {
    let card = state
        .catalog
        .get_card(scryfall_id.trim())
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("card {scryfall_id}")))?;

    let mut printings = state
        .catalog
        .list_printings(&card.name, PRINTINGS_LIMIT)
        .await?;
    sort_printings(&mut printings);

    Ok(Json(CardDetailResponse { card, printings }))
}
