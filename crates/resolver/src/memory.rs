//! An in-memory card store.
//!
//! Brute-force cosine search over a `Vec` behind a `RwLock`. Useful for tests,
//! demos and small offline catalogs; it implements the same traits as the
//! Weaviate client so the resolver and server can run against either.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::store::{CardCatalog, VectorStore};
use crate::types::{
    CardDetail, CardSummary, DistanceMetric, LookupField, Neighbor, Printing, RecordId,
    StoredEmbedding,
};
use crate::vector::cosine_distance;

#[derive(Debug, Clone)]
struct Entry {
    card: CardDetail,
    vector: Vec<f32>,
}

impl Entry {
    fn field(&self, field: LookupField) -> Option<&str> {
        match field {
            LookupField::Name => Some(self.card.name.as_str()),
            LookupField::ScryfallId => self.card.metadata.scryfall_id.as_deref(),
        }
    }

    fn embedding(&self) -> StoredEmbedding {
        StoredEmbedding {
            id: self.card.id.clone(),
            name: self.card.name.clone(),
            vector: self.vector.clone(),
        }
    }

    fn summary(&self) -> CardSummary {
        CardSummary {
            id: self.card.id.clone(),
            name: self.card.name.clone(),
            metadata: self.card.metadata.clone(),
        }
    }
}

/// Per-operation call counters, for asserting how a pipeline used the store.
#[derive(Debug, Default)]
pub struct CallCounts {
    pub exact: AtomicUsize,
    pub substring: AtomicUsize,
    pub search: AtomicUsize,
    pub last_search_limit: AtomicUsize,
}

/// In-memory [`VectorStore`] and [`CardCatalog`].
#[derive(Debug)]
pub struct InMemoryStore {
    entries: RwLock<Vec<Entry>>,
    metric: Option<DistanceMetric>,
    failure: RwLock<Option<StoreError>>,
    calls: CallCounts,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            metric: Some(DistanceMetric::Cosine),
            failure: RwLock::new(None),
            calls: CallCounts::default(),
        }
    }

    /// Report `metric` from [`VectorStore::distance_metric`].
    pub fn with_metric(mut self, metric: Option<DistanceMetric>) -> Self {
        self.metric = metric;
        self
    }

    /// Insert a card. Records keep insertion order, which is also the order
    /// used for lookups and catalog pages.
    pub fn insert(&self, card: CardDetail, vector: Vec<f32>) {
        let mut guard = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.push(Entry { card, vector });
    }

    /// Convenience insert keyed by id and name only.
    pub fn insert_named(&self, id: impl Into<RecordId>, name: impl Into<String>, vector: Vec<f32>) {
        self.insert(
            CardDetail {
                id: id.into(),
                name: name.into(),
                ..Default::default()
            },
            vector,
        );
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every subsequent call fail with `err` (or succeed again with `None`).
    pub fn fail_with(&self, err: Option<StoreError>) {
        let mut guard = self
            .failure
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = err;
    }

    pub fn calls(&self) -> &CallCounts {
        &self.calls
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Entry>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_failure(&self) -> StoreResult<()> {
        let guard = self
            .failure
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match guard.as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Wildcard match where `*` matches any run of characters and `?` exactly one.
/// Case-sensitive.
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut mark = 0usize;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            mark = ti;
            pi += 1;
        } else if let Some(s) = star {
            pi = s + 1;
            mark += 1;
            ti = mark;
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn find_exact(
        &self,
        field: LookupField,
        value: &str,
        limit: usize,
    ) -> StoreResult<Vec<StoredEmbedding>> {
        self.calls.exact.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self
            .read()
            .iter()
            .filter(|e| e.field(field) == Some(value))
            .take(limit)
            .map(Entry::embedding)
            .collect())
    }

    async fn find_substring(
        &self,
        field: LookupField,
        pattern: &str,
        limit: usize,
    ) -> StoreResult<Vec<StoredEmbedding>> {
        self.calls.substring.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self
            .read()
            .iter()
            .filter(|e| e.field(field).is_some_and(|v| wildcard_match(pattern, v)))
            .take(limit)
            .map(Entry::embedding)
            .collect())
    }

    async fn nearest_neighbors(&self, vector: &[f32], limit: usize) -> StoreResult<Vec<Neighbor>> {
        self.calls.search.fetch_add(1, Ordering::SeqCst);
        self.calls.last_search_limit.store(limit, Ordering::SeqCst);
        self.check_failure()?;

        let mut scored: Vec<Neighbor> = self
            .read()
            .iter()
            .map(|e| Neighbor {
                id: e.card.id.clone(),
                name: e.card.name.clone(),
                metadata: e.card.metadata.clone(),
                distance: cosine_distance(vector, &e.vector),
            })
            .collect();
        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn distance_metric(&self) -> StoreResult<Option<DistanceMetric>> {
        self.check_failure()?;
        Ok(self.metric)
    }
}

#[async_trait]
impl CardCatalog for InMemoryStore {
    async fn list_cards(&self, offset: usize, limit: usize) -> StoreResult<Vec<CardSummary>> {
        self.check_failure()?;
        Ok(self
            .read()
            .iter()
            .skip(offset)
            .take(limit)
            .map(Entry::summary)
            .collect())
    }

    async fn find_by_name_like(&self, name: &str, limit: usize) -> StoreResult<Vec<CardSummary>> {
        self.check_failure()?;
        let pattern = format!("*{name}*");
        Ok(self
            .read()
            .iter()
            .filter(|e| wildcard_match(&pattern, &e.card.name))
            .take(limit)
            .map(Entry::summary)
            .collect())
    }

    async fn get_card(&self, scryfall_id: &str) -> StoreResult<Option<CardDetail>> {
        self.check_failure()?;
        Ok(self
            .read()
            .iter()
            .find(|e| e.card.metadata.scryfall_id.as_deref() == Some(scryfall_id))
            .map(|e| e.card.clone()))
    }

    async fn list_printings(&self, name: &str, limit: usize) -> StoreResult<Vec<Printing>> {
        self.check_failure()?;
        Ok(self
            .read()
            .iter()
            .filter(|e| e.card.name == name)
            .take(limit)
            .map(|e| Printing {
                id: e.card.id.clone(),
                scryfall_id: e.card.metadata.scryfall_id.clone(),
                set: e.card.metadata.set.clone().unwrap_or_default(),
                collector_number: e.card.collector_number.clone().unwrap_or_default(),
                rarity: e.card.metadata.rarity.clone(),
                image_normal: e.card.metadata.image_normal.clone(),
            })
            .collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_failure()
    }
}
