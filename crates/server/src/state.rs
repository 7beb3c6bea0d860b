use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use metrics_exporter_prometheus::PrometheusHandle;
use resolver::{CardCatalog, SimilarityResolver, VectorStore};
use std::sync::Arc;
use store::WeaviateClient;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Similarity pipeline (shared across requests)
    pub resolver: SimilarityResolver,

    /// Catalog browsing backend
    pub catalog: Arc<dyn CardCatalog>,

    /// Prometheus renderer, present when the recorder was installed
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Create state backed by the configured Weaviate instance
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let client = WeaviateClient::new(&config.weaviate)
            .map_err(|e| ServerError::Config(e.to_string()))?;
        Ok(Self::with_store(config, Arc::new(client)))
    }

    /// Create state over any backend that serves both lookups and browsing
    pub fn with_store<S>(config: ServerConfig, store: Arc<S>) -> Self
    where
        S: VectorStore + CardCatalog + 'static,
    {
        let vectors: Arc<dyn VectorStore> = store.clone();
        let catalog: Arc<dyn CardCatalog> = store;
        let resolver = SimilarityResolver::new(vectors, config.resolver.clone());
        Self {
            config: Arc::new(config),
            resolver,
            catalog,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
