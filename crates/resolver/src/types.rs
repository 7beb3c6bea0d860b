use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque identifier assigned to a card record by the store at ingestion time.
pub type RecordId = String;

/// Record field a lookup is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupField {
    /// Human-readable card name. Shared by every printing of a card.
    Name,
    /// Scryfall printing id. Unique per printing.
    ScryfallId,
}

impl LookupField {
    /// Property name as stored in the `Card` class.
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupField::Name => "name",
            LookupField::ScryfallId => "scryfall_id",
        }
    }
}

/// Distance metric the store's vector index is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceMetric {
    Cosine,
    Dot,
    L2Squared,
    Manhattan,
    Hamming,
}

impl DistanceMetric {
    /// Parse the metric name reported by the store. Unknown names yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cosine" => Some(DistanceMetric::Cosine),
            "dot" => Some(DistanceMetric::Dot),
            "l2-squared" | "l2" => Some(DistanceMetric::L2Squared),
            "manhattan" => Some(DistanceMetric::Manhattan),
            "hamming" => Some(DistanceMetric::Hamming),
            _ => None,
        }
    }
}

/// A card record's embedding as returned by an exact or substring lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEmbedding {
    pub id: RecordId,
    pub name: String,
    pub vector: Vec<f32>,
}

/// Display metadata carried alongside search hits and catalog listings.
///
/// None of these fields take part in the similarity computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scryfall_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mana_cost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_normal: Option<String>,
}

/// A catalog entry without any distance information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSummary {
    pub id: RecordId,
    pub name: String,
    #[serde(flatten)]
    pub metadata: CardMetadata,
}

/// Fully populated card for detail views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardDetail {
    pub id: RecordId,
    pub name: String,
    #[serde(flatten)]
    pub metadata: CardMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toughness: Option<String>,
    #[serde(default)]
    pub color_identity: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collector_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    /// Format name to legality (`"legal"`, `"banned"`, ...).
    #[serde(default)]
    pub legalities: BTreeMap<String, String>,
}

/// One physical printing of a card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Printing {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scryfall_id: Option<String>,
    #[serde(default)]
    pub set: String,
    #[serde(default)]
    pub collector_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_normal: Option<String>,
}

/// Raw nearest-neighbor hit as reported by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: RecordId,
    pub name: String,
    #[serde(flatten)]
    pub metadata: CardMetadata,
    /// Raw metric value from the store; cosine distance in `[0, 2]`.
    pub distance: f32,
}

/// A ranked recommendation returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub id: RecordId,
    pub name: String,
    #[serde(flatten)]
    pub metadata: CardMetadata,
    pub distance: f32,
    /// Always `1 - distance`.
    pub similarity: f32,
}

impl From<Neighbor> for SimilarityResult {
    fn from(hit: Neighbor) -> Self {
        Self {
            similarity: 1.0 - hit.distance,
            id: hit.id,
            name: hit.name,
            metadata: hit.metadata,
            distance: hit.distance,
        }
    }
}

/// Inbound similarity request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarRequest {
    /// Card names to find neighbours for. At least one must be non-blank.
    #[serde(default)]
    pub names: Vec<String>,
    /// Number of neighbours to request. Non-positive values fall back to the default.
    #[serde(default)]
    pub k: i64,
    /// Optional post-search filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<crate::filter::CardFilter>,
}

impl SimilarRequest {
    pub fn new<I, S>(names: I, k: i64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            k,
            filters: None,
        }
    }

    pub fn with_filters(mut self, filters: crate::filter::CardFilter) -> Self {
        self.filters = Some(filters);
        self
    }
}

/// Embedding and id of a resolved input card.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCard {
    pub id: RecordId,
    pub vector: Vec<f32>,
}
