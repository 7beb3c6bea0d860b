//! Post-search filtering and ordering of card listings.
//!
//! Filters never reorder: a filtered similarity listing stays in ascending
//! distance order. Sorting is opt-in and stable.

use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::types::{CardMetadata, CardSummary, Printing, SimilarityResult};

/// Attribute filters applied after a search or catalog lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardFilter {
    /// Keep only cards whose type line contains "Legendary".
    #[serde(default)]
    pub legendary: bool,
    /// Case-insensitive substring the type line must contain.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_contains: Option<String>,
    /// Colors the card must all have (`W`, `U`, `B`, `R`, `G`), case-insensitive.
    /// Accepts a JSON list or a comma separated string such as `"U,R"`.
    #[serde(
        default,
        deserialize_with = "colors_from_list_or_csv",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub colors: Vec<String>,
    /// Inclusive lower bound on converted mana cost (truncated to an integer).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmc_min: Option<i64>,
    /// Inclusive upper bound on converted mana cost (truncated to an integer).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmc_max: Option<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorList {
    Csv(String),
    List(Vec<String>),
    Missing(()),
}

fn colors_from_list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ColorList::deserialize(deserializer)? {
        ColorList::Csv(raw) => CardFilter::parse_colors(&raw),
        ColorList::List(colors) => colors,
        ColorList::Missing(()) => Vec::new(),
    })
}

impl CardFilter {
    /// True when no criterion is set.
    pub fn is_empty(&self) -> bool {
        !self.legendary
            && self
                .type_contains
                .as_deref()
                .is_none_or(|t| t.trim().is_empty())
            && self.colors.iter().all(|c| c.trim().is_empty())
            && self.cmc_min.is_none()
            && self.cmc_max.is_none()
    }

    /// Split a comma separated color list such as `"w, U,R"`.
    pub fn parse_colors(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .collect()
    }

    pub fn matches(&self, meta: &CardMetadata) -> bool {
        let type_line = meta.type_line.as_deref().unwrap_or_default();

        if self.legendary && !type_line.contains("Legendary") {
            return false;
        }

        if let Some(wanted) = self.type_contains.as_deref().map(str::trim) {
            if !wanted.is_empty()
                && !type_line
                    .to_lowercase()
                    .contains(&wanted.to_lowercase())
            {
                return false;
            }
        }

        if !self.colors.is_empty() {
            let have: HashSet<String> = meta
                .colors
                .iter()
                .map(|c| c.trim().to_ascii_uppercase())
                .collect();
            let missing = self
                .colors
                .iter()
                .map(|c| c.trim().to_ascii_uppercase())
                .filter(|c| !c.is_empty())
                .any(|c| !have.contains(&c));
            if missing {
                return false;
            }
        }

        let cmc = meta.cmc.unwrap_or(0.0).trunc() as i64;
        if self.cmc_min.is_some_and(|min| cmc < min) {
            return false;
        }
        if self.cmc_max.is_some_and(|max| cmc > max) {
            return false;
        }

        true
    }

    /// Drop every item that does not match, keeping the original order.
    pub fn apply<T: CardView>(&self, items: Vec<T>) -> Vec<T> {
        if self.is_empty() {
            return items;
        }
        items
            .into_iter()
            .filter(|item| self.matches(item.metadata()))
            .collect()
    }
}

/// Common read access for anything that can be filtered and sorted.
pub trait CardView {
    fn name(&self) -> &str;
    fn metadata(&self) -> &CardMetadata;
    fn similarity(&self) -> Option<f32> {
        None
    }
}

impl CardView for SimilarityResult {
    fn name(&self) -> &str {
        &self.name
    }

    fn metadata(&self) -> &CardMetadata {
        &self.metadata
    }

    fn similarity(&self) -> Option<f32> {
        Some(self.similarity)
    }
}

impl CardView for CardSummary {
    fn name(&self) -> &str {
        &self.name
    }

    fn metadata(&self) -> &CardMetadata {
        &self.metadata
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Cmc,
    Similarity,
}

impl SortKey {
    /// Unknown keys fall back to `Name`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cmc" => SortKey::Cmc,
            "similarity" => SortKey::Similarity,
            _ => SortKey::Name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Anything other than `asc` sorts descending.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }
}

/// Stable sort of a card listing. Ties on cmc and similarity break by name.
pub fn sort_cards<T: CardView>(items: &mut [T], key: SortKey, order: SortOrder) {
    items.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Name => a.name().cmp(b.name()),
            SortKey::Cmc => {
                let ca = a.metadata().cmc.unwrap_or(0.0);
                let cb = b.metadata().cmc.unwrap_or(0.0);
                ca.total_cmp(&cb).then_with(|| a.name().cmp(b.name()))
            }
            SortKey::Similarity => {
                let sa = a.similarity().unwrap_or(0.0);
                let sb = b.similarity().unwrap_or(0.0);
                sa.total_cmp(&sb).then_with(|| a.name().cmp(b.name()))
            }
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// Order printings by set code, then collector number.
///
/// Collector numbers compare numerically when both parse as integers and
/// lexicographically otherwise (`"12a"`, `"★1"`).
pub fn sort_printings(printings: &mut [Printing]) {
    printings.sort_by(|a, b| {
        a.set
            .cmp(&b.set)
            .then_with(|| compare_collector(&a.collector_number, &b.collector_number))
    });
}

fn compare_collector(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}
