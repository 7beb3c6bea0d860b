use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ResolveError, ResolveResult, StoreError, StoreResult};
use crate::filter::CardFilter;
use crate::store::VectorStore;
use crate::types::{
    DistanceMetric, LookupField, RecordId, ResolvedCard, SimilarRequest, SimilarityResult,
};
use crate::vector::aggregate;

/// Number of neighbours requested when the caller supplies a non-positive `k`.
pub const DEFAULT_K: usize = 10;

/// Runtime knobs for [`SimilarityResolver`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// `k` used when the request carries a non-positive value.
    #[serde(default = "default_k")]
    pub default_k: usize,
    /// Upper bound applied to every requested `k`.
    #[serde(default = "default_max_k")]
    pub max_k: usize,
    /// Budget for a single store call, in milliseconds.
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,
    /// Resolve the names of one request concurrently.
    #[serde(default = "default_true")]
    pub concurrent_lookups: bool,
    /// Accept stores whose index is not configured for cosine distance.
    #[serde(default)]
    pub allow_non_cosine_metric: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            max_k: default_max_k(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
            concurrent_lookups: true,
            allow_non_cosine_metric: false,
        }
    }
}

impl ResolverConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    pub fn validate(&self) -> ResolveResult<()> {
        if self.default_k == 0 {
            return Err(ResolveError::InvalidInput(
                "default_k must be greater than zero".into(),
            ));
        }
        if self.max_k < self.default_k {
            return Err(ResolveError::InvalidInput(format!(
                "max_k ({}) must be >= default_k ({})",
                self.max_k, self.default_k
            )));
        }
        if self.lookup_timeout_ms == 0 {
            return Err(ResolveError::InvalidInput(
                "lookup_timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Map a caller-supplied `k` onto `1..=max_k`, defaulting non-positive values.
    pub fn effective_k(&self, k: i64) -> usize {
        if k <= 0 {
            return self.default_k;
        }
        usize::try_from(k).unwrap_or(usize::MAX).min(self.max_k)
    }
}

fn default_k() -> usize {
    DEFAULT_K
}

fn default_max_k() -> usize {
    500
}

fn default_lookup_timeout_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

/// Resolves card names to embeddings and ranks their nearest neighbours.
///
/// Holds no per-request state; a single instance is shared by all requests.
#[derive(Clone)]
pub struct SimilarityResolver {
    store: Arc<dyn VectorStore>,
    cfg: ResolverConfig,
}

impl SimilarityResolver {
    pub fn new(store: Arc<dyn VectorStore>, cfg: ResolverConfig) -> Self {
        Self { store, cfg }
    }

    pub fn with_defaults(store: Arc<dyn VectorStore>) -> Self {
        Self::new(store, ResolverConfig::default())
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.cfg
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Check that the store ranks by cosine distance.
    ///
    /// A store that cannot report its metric is accepted. Any other metric is
    /// rejected unless `allow_non_cosine_metric` is set.
    pub async fn verify_distance_metric(&self) -> ResolveResult<Option<DistanceMetric>> {
        let metric = self.bounded(self.store.distance_metric()).await?;
        match metric {
            Some(DistanceMetric::Cosine) => {
                tracing::debug!("store reports cosine distance");
            }
            Some(other) if self.cfg.allow_non_cosine_metric => {
                tracing::warn!(
                    metric = ?other,
                    "store does not use cosine distance; similarity scores are not meaningful"
                );
            }
            Some(other) => return Err(ResolveError::UnsupportedMetric { metric: other }),
            None => {
                tracing::warn!("store did not report a distance metric; assuming cosine");
            }
        }
        Ok(metric)
    }

    /// Resolve a card name to its stored embedding.
    ///
    /// Tries an exact, case-sensitive match first and falls back to an
    /// unanchored `*name*` pattern. When several records match the pattern the
    /// store's default order decides which one wins.
    pub async fn resolve(&self, name: &str) -> ResolveResult<ResolvedCard> {
        let exact = self
            .bounded(self.store.find_exact(LookupField::Name, name, 1))
            .await?;
        if let Some(hit) = exact.into_iter().next() {
            tracing::debug!(name = %name, id = %hit.id, "resolved by exact name");
            return Ok(ResolvedCard {
                id: hit.id,
                vector: hit.vector,
            });
        }

        let pattern = format!("*{name}*");
        let fuzzy = self
            .bounded(self.store.find_substring(LookupField::Name, &pattern, 1))
            .await?;
        match fuzzy.into_iter().next() {
            Some(hit) => {
                tracing::debug!(
                    name = %name,
                    matched = %hit.name,
                    id = %hit.id,
                    "resolved by substring"
                );
                Ok(ResolvedCard {
                    id: hit.id,
                    vector: hit.vector,
                })
            }
            None => Err(ResolveError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Resolve a single printing by its Scryfall id. No substring fallback.
    pub async fn resolve_by_scryfall_id(&self, scryfall_id: &str) -> ResolveResult<ResolvedCard> {
        let hits = self
            .bounded(self.store.find_exact(LookupField::ScryfallId, scryfall_id, 1))
            .await?;
        hits.into_iter()
            .next()
            .map(|hit| ResolvedCard {
                id: hit.id,
                vector: hit.vector,
            })
            .ok_or_else(|| ResolveError::NotFound {
                name: scryfall_id.to_string(),
            })
    }

    /// Nearest neighbours of `query`, in the store's ascending-distance order.
    pub async fn search(&self, query: &[f32], k: usize) -> ResolveResult<Vec<SimilarityResult>> {
        let k = if k == 0 {
            self.cfg.default_k
        } else {
            k.min(self.cfg.max_k)
        };
        let hits = self.bounded(self.store.nearest_neighbors(query, k)).await?;
        Ok(hits.into_iter().map(SimilarityResult::from).collect())
    }

    /// Full request pipeline: validate, resolve, aggregate, search, exclude inputs.
    ///
    /// Fails as a whole on the first error; partial results are never returned.
    pub async fn find_similar(&self, req: &SimilarRequest) -> ResolveResult<Vec<SimilarityResult>> {
        if req.names.is_empty() {
            return Err(ResolveError::InvalidInput("names required".into()));
        }
        let k = self.cfg.effective_k(req.k);

        let names: Vec<&str> = req
            .names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .collect();

        let resolved = self.resolve_all(&names).await?;
        self.rank(resolved, k, req.filters.as_ref()).await
    }

    /// Pipeline variant seeded by a single printing id.
    pub async fn find_similar_by_scryfall_id(
        &self,
        scryfall_id: &str,
        k: i64,
        filters: Option<&CardFilter>,
    ) -> ResolveResult<Vec<SimilarityResult>> {
        let scryfall_id = scryfall_id.trim();
        if scryfall_id.is_empty() {
            return Err(ResolveError::InvalidInput("id required".into()));
        }
        let k = self.cfg.effective_k(k);
        let resolved = self.resolve_by_scryfall_id(scryfall_id).await?;
        self.rank(vec![resolved], k, filters).await
    }

    async fn resolve_all(&self, names: &[&str]) -> ResolveResult<Vec<ResolvedCard>> {
        if self.cfg.concurrent_lookups {
            try_join_all(names.iter().map(|name| self.resolve(name))).await
        } else {
            let mut out = Vec::with_capacity(names.len());
            for name in names {
                out.push(self.resolve(name).await?);
            }
            Ok(out)
        }
    }

    async fn rank(
        &self,
        resolved: Vec<ResolvedCard>,
        k: usize,
        filters: Option<&CardFilter>,
    ) -> ResolveResult<Vec<SimilarityResult>> {
        let mut exclude: HashSet<RecordId> = HashSet::with_capacity(resolved.len());
        let mut vectors = Vec::with_capacity(resolved.len());
        for card in resolved {
            if card.vector.is_empty() {
                tracing::warn!(id = %card.id, "resolved card has an empty embedding; skipping");
                continue;
            }
            exclude.insert(card.id);
            vectors.push(card.vector);
        }
        if vectors.is_empty() {
            return Err(ResolveError::NoVectorsResolved);
        }

        let query = aggregate(&vectors)?;
        let hits = self.search(&query, k).await?;
        let returned = hits.len();

        let mut results: Vec<SimilarityResult> = hits
            .into_iter()
            .filter(|hit| !exclude.contains(&hit.id))
            .collect();
        if let Some(filters) = filters {
            results = filters.apply(results);
        }

        tracing::info!(
            inputs = vectors.len(),
            k,
            returned,
            kept = results.len(),
            "similarity search complete"
        );
        Ok(results)
    }

    async fn bounded<T>(&self, fut: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        match tokio::time::timeout(self.cfg.lookup_timeout(), fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests;
