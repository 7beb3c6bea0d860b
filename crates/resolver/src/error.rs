use thiserror::Error;

use crate::types::DistanceMetric;

/// Failures reported by a [`VectorStore`](crate::VectorStore) or
/// [`CardCatalog`](crate::CardCatalog) implementation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// The call did not complete within its time budget.
    #[error("store request timed out")]
    Timeout,
    /// Connection refused, reset, DNS failure and similar.
    #[error("store transport failure: {0}")]
    Transport(String),
    /// The store answered with a non-success HTTP status.
    #[error("store returned status {status}: {body}")]
    Status { status: u16, body: String },
    /// The store's query layer reported a structured error.
    #[error("store query error: {0}")]
    Protocol(String),
    /// The response could not be decoded into the expected shape.
    #[error("unexpected store response: {0}")]
    Decode(String),
    /// The client was misconfigured (bad base URL, bad class name).
    #[error("invalid store config: {0}")]
    Config(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the similarity resolver.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResolveError {
    /// No usable names were supplied, or the request was malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Neither the exact nor the substring lookup matched the name.
    #[error("card not found: {name}")]
    NotFound { name: String },
    /// Every supplied name was blank or produced an empty vector.
    #[error("no vectors found for input names")]
    NoVectorsResolved,
    /// Embeddings of different dimensionality cannot be averaged.
    #[error("embedding dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    /// The store was unreachable, timed out or returned an unusable response.
    #[error("upstream failure: {0}")]
    Upstream(StoreError),
    /// The store rejected the query with a structured error message.
    #[error("upstream query error: {0}")]
    UpstreamProtocol(String),
    /// The store ranks by a metric for which `1 - distance` is not a similarity.
    #[error("store uses {metric:?} distance; similarity assumes cosine")]
    UnsupportedMetric { metric: DistanceMetric },
}

impl From<StoreError> for ResolveError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Protocol(message) => ResolveError::UpstreamProtocol(message),
            other => ResolveError::Upstream(other),
        }
    }
}

impl ResolveError {
    /// Stable machine-readable kind, used for metrics labels and error codes.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::InvalidInput(_) => "invalid_input",
            ResolveError::NotFound { .. } => "not_found",
            ResolveError::NoVectorsResolved => "no_vectors_resolved",
            ResolveError::DimensionMismatch { .. } => "dimension_mismatch",
            ResolveError::Upstream(StoreError::Timeout) => "upstream_timeout",
            ResolveError::Upstream(_) => "upstream",
            ResolveError::UpstreamProtocol(_) => "upstream_protocol",
            ResolveError::UnsupportedMetric { .. } => "unsupported_metric",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ResolveError::Upstream(StoreError::Timeout))
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;
