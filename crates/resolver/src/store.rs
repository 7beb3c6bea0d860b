use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{
    CardDetail, CardSummary, DistanceMetric, LookupField, Neighbor, Printing, StoredEmbedding,
};

/// The query contract the resolver needs from a vector database.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Records whose `field` equals `value` exactly (case-sensitive), at most `limit`.
    async fn find_exact(
        &self,
        field: LookupField,
        value: &str,
        limit: usize,
    ) -> StoreResult<Vec<StoredEmbedding>>;

    /// Records whose `field` matches a wildcard `pattern` (`*` any run, `?` one char).
    async fn find_substring(
        &self,
        field: LookupField,
        pattern: &str,
        limit: usize,
    ) -> StoreResult<Vec<StoredEmbedding>>;

    /// Up to `limit` records nearest to `vector`, ordered by ascending distance.
    async fn nearest_neighbors(&self, vector: &[f32], limit: usize) -> StoreResult<Vec<Neighbor>>;

    /// Distance metric of the card index, when the store can report it.
    async fn distance_metric(&self) -> StoreResult<Option<DistanceMetric>> {
        Ok(None)
    }
}

/// Read-only browsing over the card catalog.
#[async_trait]
pub trait CardCatalog: Send + Sync {
    /// One page of cards in the store's default order.
    async fn list_cards(&self, offset: usize, limit: usize) -> StoreResult<Vec<CardSummary>>;

    /// Cards whose name contains `name`.
    async fn find_by_name_like(&self, name: &str, limit: usize) -> StoreResult<Vec<CardSummary>>;

    /// Detail view of a single printing.
    async fn get_card(&self, scryfall_id: &str) -> StoreResult<Option<CardDetail>>;

    /// Every printing sharing `name` exactly, unsorted.
    async fn list_printings(&self, name: &str, limit: usize) -> StoreResult<Vec<Printing>>;

    /// Cheap liveness probe of the backing store.
    async fn ping(&self) -> StoreResult<()>;
}
