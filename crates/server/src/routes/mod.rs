//! API route handlers
//!
//! Routes are organized by functionality:
//!
//! - `health`: Health checks, readiness, and metrics
//! - `similar`: Nearest-neighbour recommendations
//! - `cards`: Catalog browsing, name search and card detail

pub mod cards;
pub mod health;
pub mod similar;

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use resolver::{CardFilter, SortKey, SortOrder};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// API version and base info
///
/// ```json
/// {
///   "name": "cardsim",
///   "version": "0.1.0",
///   "endpoints": ["..."]
/// }
/// ```
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "cardsim",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "POST /similar",
            "GET /similar",
            "GET /cards",
            "GET /cards/search",
            "GET /cards/{scryfall_id}",
            "/config",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// Effective store URL, so operators can see which instance is queried
pub async fn config_info(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(json!({ "weaviate_url": state.config.weaviate.base_url() }))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound("no such route".into())
}

/// Filter and sort query parameters shared by listing endpoints.
///
/// Values arrive as strings and are parsed leniently: an unparsable number is
/// treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    #[serde(default)]
    pub legendary: Option<String>,
    #[serde(default, rename = "type")]
    pub type_line: Option<String>,
    #[serde(default)]
    pub colors: Option<String>,
    #[serde(default)]
    pub cmc_min: Option<String>,
    #[serde(default)]
    pub cmc_max: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
}

fn parse_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse().ok())
}

impl ListingParams {
    pub fn filter(&self) -> CardFilter {
        let legendary = self
            .legendary
            .as_deref()
            .map(str::trim)
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true") || v == "on");
        CardFilter {
            legendary,
            type_contains: self
                .type_line
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            colors: self
                .colors
                .as_deref()
                .map(CardFilter::parse_colors)
                .unwrap_or_default(),
            cmc_min: parse_int(self.cmc_min.as_deref()),
            cmc_max: parse_int(self.cmc_max.as_deref()),
        }
    }

    /// Sort key and order, with `default_key` used when none is given.
    pub fn sorting(&self, default_key: SortKey) -> (SortKey, SortOrder) {
        let key = self
            .sort
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map_or(default_key, SortKey::parse);
        let order = self
            .order
            .as_deref()
            .map_or(SortOrder::default(), SortOrder::parse);
        (key, order)
    }
}

/// Parse an optional integer query value, falling back to `default`.
pub(crate) fn int_or(raw: Option<&str>, default: i64) -> i64 {
    parse_int(raw).unwrap_or(default)
}
