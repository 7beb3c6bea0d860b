//! cardsim Server - HTTP API for card similarity search
//!
//! This crate exposes the similarity resolver and the card catalog over HTTP.
//! It supports:
//!
//! - **Similarity**: nearest cards to one or more named cards, inputs excluded
//! - **Browsing**: catalog paging, name search and card detail with printings
//! - **Health & Metrics**: liveness/readiness probes and Prometheus metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `POST /similar` - `{ "names": [...], "k": 10, "filters": {...} }` to ranked results
//! - `GET /similar?name=|id=&k=` - single-card listing with filters and sorting
//! - `GET /cards?offset=&limit=` - catalog page
//! - `GET /cards/search?q=` - cards whose name contains `q`
//! - `GET /cards/{scryfall_id}` - card detail and its printings
//! - `GET /config` - effective store URL
//! - `GET /health`, `GET /healthz` - liveness probe
//! - `GET /ready` - readiness probe (pings the store)
//! - `GET /metrics` - Prometheus metrics
//!
//! Errors use a common body: `{ "error": { "code": "...", "message": "..." } }`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
