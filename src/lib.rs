//! Workspace umbrella crate for cardsim.
//!
//! Re-exports the similarity resolver, the Weaviate store client and the HTTP
//! server so callers can depend on a single crate, and adds the small helpers
//! the `cardsim` binary is built from.
//!
//! ```rust,no_run
//! use cardsim::{connect, ResolverConfig, SimilarRequest, WeaviateConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let resolver = connect(&WeaviateConfig::default(), ResolverConfig::default())?;
//!     let results = resolver
//!         .find_similar(&SimilarRequest::new(["Lightning Bolt"], 5))
//!         .await?;
//!     print!("{}", cardsim::format_results(&results));
//!     Ok(())
//! }
//! ```

use std::fmt::Write as _;
use std::sync::Arc;

pub use resolver::{
    CardCatalog, CardDetail, CardFilter, CardMetadata, CardSummary, DEFAULT_K, DistanceMetric,
    InMemoryStore, Neighbor, Printing, RecordId, ResolveError, ResolveResult, ResolverConfig,
    SimilarRequest, SimilarityResolver, SimilarityResult, SortKey, SortOrder, StoreError,
    StoreResult, VectorStore, aggregate, sort_cards,
};
pub use server::{ServerConfig, ServerError, ServerState, build_router, start_server};
pub use store::{DEFAULT_WEAVIATE_URL, WEAVIATE_URL_ENV, WeaviateClient, WeaviateConfig};

/// Build a resolver backed by the Weaviate instance described by `store_cfg`.
pub fn connect(
    store_cfg: &WeaviateConfig,
    resolver_cfg: ResolverConfig,
) -> anyhow::Result<SimilarityResolver> {
    store_cfg.validate()?;
    resolver_cfg.validate()?;
    let client = WeaviateClient::new(store_cfg)?;
    Ok(SimilarityResolver::new(Arc::new(client), resolver_cfg))
}

/// Render results as an aligned plain-text table, one card per line.
pub fn format_results(results: &[SimilarityResult]) -> String {
    if results.is_empty() {
        return "no similar cards found\n".to_string();
    }

    let width = results
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (rank, result) in results.iter().enumerate() {
        let type_line = result.metadata.type_line.as_deref().unwrap_or("");
        let _ = writeln!(
            out,
            "{:>3}. {:<width$}  {:.4}  {}",
            rank + 1,
            result.name,
            result.similarity,
            type_line,
        );
    }
    out
}
