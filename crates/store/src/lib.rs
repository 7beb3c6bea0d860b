//! Weaviate-backed card store.
//!
//! [`WeaviateClient`] talks to Weaviate's GraphQL endpoint (`POST /v1/graphql`)
//! and implements both [`resolver::VectorStore`] and [`resolver::CardCatalog`].
//!
//! Every call is a single HTTP round trip bounded by the client timeout. There
//! are no retries; a non-200 status, a GraphQL `errors` entry or an
//! undecodable body is reported as a [`resolver::StoreError`] and left to the
//! caller.
//!
//! ```no_run
//! use std::sync::Arc;
//! use resolver::{SimilarRequest, SimilarityResolver};
//! use store::{WeaviateClient, WeaviateConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let cfg = WeaviateConfig::default().with_env_override();
//! let client = Arc::new(WeaviateClient::new(&cfg)?);
//! let resolver = SimilarityResolver::with_defaults(client);
//! let hits = resolver
//!     .find_similar(&SimilarRequest::new(["Lightning Bolt"], 10))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod query;
mod response;

pub use client::WeaviateClient;
pub use config::{WeaviateConfig, DEFAULT_WEAVIATE_URL, WEAVIATE_URL_ENV};
