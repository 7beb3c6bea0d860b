//! # Card Resolver (`resolver`)
//!
//! ## Purpose
//!
//! `resolver` answers "which cards are most like these ones?" at query time.
//! Embeddings are produced offline and live in a vector store; this crate
//! never computes an embedding from card text. It only looks records up,
//! averages their vectors and asks the store for nearest neighbours.
//!
//! The pipeline for one request:
//!
//! 1. Trim the input names and drop blank ones.
//! 2. Resolve every name: exact name match first, `*name*` substring match second.
//!    Any unresolved name fails the whole request.
//! 3. Average the resolved vectors and L2-normalise the centroid.
//! 4. Ask the store for the `k` nearest records by cosine distance.
//! 5. Drop the input records themselves, apply optional filters, and report
//!    `similarity = 1 - distance` alongside each hit.
//!
//! ## Core Types
//!
//! - [`SimilarityResolver`]: the pipeline, shared across requests.
//! - [`ResolverConfig`]: `k` defaults and caps, per-call timeout, concurrency.
//! - [`VectorStore`] / [`CardCatalog`]: the store contract. `card-store`
//!   implements both for Weaviate; [`InMemoryStore`] implements both in process.
//! - [`SimilarRequest`] / [`SimilarityResult`]: request and ranked output.
//! - [`CardFilter`], [`SortKey`], [`SortOrder`]: post-search narrowing and ordering.
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use resolver::{InMemoryStore, SimilarRequest, SimilarityResolver};
//!
//! # async fn run() -> Result<(), resolver::ResolveError> {
//! let store = Arc::new(InMemoryStore::new());
//! store.insert_named("id-1", "Lightning Bolt", vec![1.0, 0.0]);
//! store.insert_named("id-2", "Chain Lightning", vec![0.9, 0.1]);
//!
//! let resolver = SimilarityResolver::with_defaults(store);
//! let hits = resolver
//!     .find_similar(&SimilarRequest::new(["Lightning Bolt"], 5))
//!     .await?;
//! for hit in hits {
//!     println!("{} {:.3}", hit.name, hit.similarity);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod filter;
mod memory;
mod resolver;
mod store;
mod types;
mod vector;

pub use error::{ResolveError, ResolveResult, StoreError, StoreResult};
pub use filter::{sort_cards, sort_printings, CardFilter, CardView, SortKey, SortOrder};
pub use memory::{wildcard_match, CallCounts, InMemoryStore};
pub use resolver::{ResolverConfig, SimilarityResolver, DEFAULT_K};
pub use store::{CardCatalog, VectorStore};
pub use types::{
    CardDetail, CardMetadata, CardSummary, DistanceMetric, LookupField, Neighbor, Printing,
    RecordId, ResolvedCard, SimilarRequest, SimilarityResult, StoredEmbedding,
};
pub use vector::{aggregate, cosine_distance, l2_norm, l2_normalize_in_place};
