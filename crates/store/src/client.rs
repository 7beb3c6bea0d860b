use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Instant;

use resolver::{
    CardCatalog, CardDetail, CardSummary, DistanceMetric, LookupField, Neighbor, Printing,
    StoreError, StoreResult, StoredEmbedding, VectorStore,
};

use crate::config::WeaviateConfig;
use crate::query::{GetQuery, DETAIL_FIELDS, PRINTING_FIELDS, SUMMARY_FIELDS};
use crate::response::{records, GraphQlResponse, RawCard};

/// Weaviate client for the card class.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct WeaviateClient {
    http: reqwest::Client,
    base_url: String,
    class: String,
}

fn map_transport(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout
    } else if err.is_decode() {
        StoreError::Decode(err.to_string())
    } else {
        StoreError::Transport(err.to_string())
    }
}

/// Non-200 answers become [`StoreError::Status`] carrying the trimmed body.
async fn ensure_ok(response: reqwest::Response) -> StoreResult<reqwest::Response> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body: body.trim().to_string(),
    })
}

impl WeaviateClient {
    pub fn new(cfg: &WeaviateConfig) -> StoreResult<Self> {
        cfg.validate()?;
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .connect_timeout(cfg.connect_timeout())
            .build()
            .map_err(|e| StoreError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: cfg.base_url().to_string(),
            class: cfg.class_name.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// Run one GraphQL query and return its `data` payload.
    async fn graphql(&self, query: String) -> StoreResult<Value> {
        let started = Instant::now();
        let response = self
            .http
            .post(format!("{}/v1/graphql", self.base_url))
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(map_transport)?;
        let response = ensure_ok(response).await?;

        let parsed: GraphQlResponse = response.json().await.map_err(map_transport)?;
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "graphql query complete"
        );
        parsed.into_data()
    }

    async fn get(&self, query: GetQuery<'_>) -> StoreResult<Vec<RawCard>> {
        let data = self.graphql(query.build()).await?;
        records(data, &self.class)
    }

    async fn lookup(&self, query: GetQuery<'_>) -> StoreResult<Vec<StoredEmbedding>> {
        self.get(query.additional("id vector"))
            .await?
            .into_iter()
            .map(RawCard::into_embedding)
            .collect()
    }
}

#[async_trait]
impl VectorStore for WeaviateClient {
    async fn find_exact(
        &self,
        field: LookupField,
        value: &str,
        limit: usize,
    ) -> StoreResult<Vec<StoredEmbedding>> {
        let query = GetQuery::new(&self.class, "name")
            .where_equal(field.as_str(), value)
            .limit(limit);
        self.lookup(query).await
    }

    async fn find_substring(
        &self,
        field: LookupField,
        pattern: &str,
        limit: usize,
    ) -> StoreResult<Vec<StoredEmbedding>> {
        let query = GetQuery::new(&self.class, "name")
            .where_like(field.as_str(), pattern)
            .limit(limit);
        self.lookup(query).await
    }

    async fn nearest_neighbors(&self, vector: &[f32], limit: usize) -> StoreResult<Vec<Neighbor>> {
        let query = GetQuery::new(&self.class, SUMMARY_FIELDS)
            .near_vector(vector)
            .limit(limit)
            .additional("id distance");
        self.get(query)
            .await?
            .into_iter()
            .map(RawCard::into_neighbor)
            .collect()
    }

    /// Reads `vectorIndexConfig.distance` from the class schema.
    async fn distance_metric(&self) -> StoreResult<Option<DistanceMetric>> {
        let response = self
            .http
            .get(format!("{}/v1/schema/{}", self.base_url, self.class))
            .send()
            .await
            .map_err(map_transport)?;
        let response = ensure_ok(response).await?;

        let schema: Value = response.json().await.map_err(map_transport)?;
        let reported = schema
            .pointer("/vectorIndexConfig/distance")
            .and_then(Value::as_str);
        match reported {
            Some(raw) => {
                let metric = DistanceMetric::parse(raw);
                if metric.is_none() {
                    tracing::warn!(metric = raw, "unrecognised distance metric in schema");
                }
                Ok(metric)
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CardCatalog for WeaviateClient {
    async fn list_cards(&self, offset: usize, limit: usize) -> StoreResult<Vec<CardSummary>> {
        let query = GetQuery::new(&self.class, SUMMARY_FIELDS)
            .limit(limit)
            .offset(offset);
        Ok(self
            .get(query)
            .await?
            .into_iter()
            .map(RawCard::into_summary)
            .collect())
    }

    async fn find_by_name_like(&self, name: &str, limit: usize) -> StoreResult<Vec<CardSummary>> {
        let pattern = format!("*{name}*");
        let query = GetQuery::new(&self.class, SUMMARY_FIELDS)
            .where_like(LookupField::Name.as_str(), &pattern)
            .limit(limit);
        Ok(self
            .get(query)
            .await?
            .into_iter()
            .map(RawCard::into_summary)
            .collect())
    }

    async fn get_card(&self, scryfall_id: &str) -> StoreResult<Option<CardDetail>> {
        let query = GetQuery::new(&self.class, DETAIL_FIELDS)
            .where_equal(LookupField::ScryfallId.as_str(), scryfall_id)
            .limit(1);
        Ok(self
            .get(query)
            .await?
            .into_iter()
            .next()
            .map(RawCard::into_detail))
    }

    async fn list_printings(&self, name: &str, limit: usize) -> StoreResult<Vec<Printing>> {
        let query = GetQuery::new(&self.class, PRINTING_FIELDS)
            .where_equal(LookupField::Name.as_str(), name)
            .limit(limit);
        Ok(self
            .get(query)
            .await?
            .into_iter()
            .map(RawCard::into_printing)
            .collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        let response = self
            .http
            .get(format!("{}/v1/.well-known/ready", self.base_url))
            .send()
            .await
            .map_err(map_transport)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(StoreError::Status {
                status: status.as_u16(),
                body: String::new(),
            })
        }
    }
}
