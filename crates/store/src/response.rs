//! Decoding of GraphQL response payloads into resolver types.

use resolver::{
    CardDetail, CardMetadata, CardSummary, Neighbor, Printing, StoreError, StoreResult,
    StoredEmbedding,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    #[serde(default)]
    pub message: String,
}

impl GraphQlResponse {
    /// The `data` payload, or the first reported error as a protocol failure.
    pub(crate) fn into_data(self) -> StoreResult<Value> {
        if let Some(first) = self.errors.into_iter().next() {
            return Err(StoreError::Protocol(first.message));
        }
        self.data
            .ok_or_else(|| StoreError::Decode("response carried neither data nor errors".into()))
    }
}

/// `_additional` block of a record.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Additional {
    pub id: String,
    #[serde(default)]
    pub vector: Option<Vec<f32>>,
    #[serde(default)]
    pub distance: Option<f32>,
}

/// Union of every property any query asks for. Weaviate reports missing
/// properties as `null`, so everything is optional.
#[derive(Debug, Deserialize)]
pub(crate) struct RawCard {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    scryfall_id: Option<String>,
    #[serde(default)]
    type_line: Option<String>,
    #[serde(default)]
    mana_cost: Option<String>,
    #[serde(default)]
    cmc: Option<f64>,
    #[serde(default)]
    oracle_text: Option<String>,
    #[serde(default)]
    power: Option<String>,
    #[serde(default)]
    toughness: Option<String>,
    #[serde(default)]
    colors: Option<Vec<String>>,
    #[serde(default)]
    color_identity: Option<Vec<String>>,
    #[serde(default)]
    keywords: Option<Vec<String>>,
    #[serde(default)]
    set: Option<String>,
    #[serde(default)]
    collector_number: Option<String>,
    #[serde(default)]
    rarity: Option<String>,
    #[serde(default)]
    layout: Option<String>,
    #[serde(default)]
    legalities: Option<String>,
    #[serde(default)]
    image_normal: Option<String>,
    #[serde(rename = "_additional")]
    additional: Additional,
}

/// Pull `Get.<class>` out of a data payload. A `null` list decodes as empty.
pub(crate) fn records(data: Value, class: &str) -> StoreResult<Vec<RawCard>> {
    let list = data
        .get("Get")
        .and_then(|get| get.get(class))
        .ok_or_else(|| StoreError::Decode(format!("missing Get.{class} in response")))?;
    if list.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(list.clone())
        .map_err(|e| StoreError::Decode(format!("invalid {class} records: {e}")))
}

/// Decode the JSON-encoded legalities string. Anything undecodable is an empty map.
pub(crate) fn parse_legalities(raw: Option<&str>) -> BTreeMap<String, String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => serde_json::from_str(text).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "ignoring undecodable legalities");
            BTreeMap::new()
        }),
        None => BTreeMap::new(),
    }
}

impl RawCard {
    fn metadata(&self) -> CardMetadata {
        CardMetadata {
            scryfall_id: self.scryfall_id.clone(),
            type_line: self.type_line.clone(),
            mana_cost: self.mana_cost.clone(),
            cmc: self.cmc,
            oracle_text: self.oracle_text.clone(),
            colors: self.colors.clone().unwrap_or_default(),
            set: self.set.clone(),
            rarity: self.rarity.clone(),
            image_normal: self.image_normal.clone(),
        }
    }

    pub(crate) fn into_embedding(self) -> StoreResult<StoredEmbedding> {
        let vector = self.additional.vector.ok_or_else(|| {
            StoreError::Decode(format!("record {} has no vector", self.additional.id))
        })?;
        Ok(StoredEmbedding {
            id: self.additional.id,
            name: self.name.unwrap_or_default(),
            vector,
        })
    }

    pub(crate) fn into_neighbor(self) -> StoreResult<Neighbor> {
        let distance = self.additional.distance.ok_or_else(|| {
            StoreError::Decode(format!("record {} has no distance", self.additional.id))
        })?;
        let metadata = self.metadata();
        Ok(Neighbor {
            id: self.additional.id,
            name: self.name.unwrap_or_default(),
            metadata,
            distance,
        })
    }

    pub(crate) fn into_summary(self) -> CardSummary {
        let metadata = self.metadata();
        CardSummary {
            id: self.additional.id,
            name: self.name.unwrap_or_default(),
            metadata,
        }
    }

    pub(crate) fn into_detail(self) -> CardDetail {
        let metadata = self.metadata();
        let legalities = parse_legalities(self.legalities.as_deref());
        CardDetail {
            id: self.additional.id,
            name: self.name.unwrap_or_default(),
            metadata,
            power: self.power,
            toughness: self.toughness,
            color_identity: self.color_identity.unwrap_or_default(),
            keywords: self.keywords.unwrap_or_default(),
            collector_number: self.collector_number,
            layout: self.layout,
            legalities,
        }
    }

    pub(crate) fn into_printing(self) -> Printing {
        Printing {
            id: self.additional.id,
            scryfall_id: self.scryfall_id,
            set: self.set.unwrap_or_default(),
            collector_number: self.collector_number.unwrap_or_default(),
            rarity: self.rarity,
            image_normal: self.image_normal,
        }
    }
}
