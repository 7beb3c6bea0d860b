//! GraphQL `Get` query construction.

use serde_json::Value;

/// Fields returned for catalog listings and search hits.
pub(crate) const SUMMARY_FIELDS: &str =
    "scryfall_id name type_line mana_cost cmc colors set rarity oracle_text image_normal";

/// Fields returned for the detail view.
pub(crate) const DETAIL_FIELDS: &str = "scryfall_id name type_line mana_cost cmc oracle_text power toughness colors color_identity keywords set collector_number rarity layout legalities image_normal";

pub(crate) const PRINTING_FIELDS: &str = "scryfall_id set collector_number rarity image_normal";

/// Quote `value` as a GraphQL string literal.
///
/// JSON string escaping is a subset of what GraphQL accepts.
pub(crate) fn quote(value: &str) -> String {
    Value::String(value.to_owned()).to_string()
}

/// Builder for `{ Get { <Class>(<args>){ <fields> _additional{ ... } } } }`.
#[derive(Debug)]
pub(crate) struct GetQuery<'a> {
    class: &'a str,
    args: Vec<String>,
    fields: &'a str,
    additional: &'a str,
}

impl<'a> GetQuery<'a> {
    pub(crate) fn new(class: &'a str, fields: &'a str) -> Self {
        Self {
            class,
            args: Vec::new(),
            fields,
            additional: "id",
        }
    }

    pub(crate) fn where_equal(mut self, path: &str, value: &str) -> Self {
        self.args.push(format!(
            "where:{{path:[{}], operator: Equal, valueString:{}}}",
            quote(path),
            quote(value)
        ));
        self
    }

    pub(crate) fn where_like(mut self, path: &str, pattern: &str) -> Self {
        self.args.push(format!(
            "where:{{path:[{}], operator: Like, valueText:{}}}",
            quote(path),
            quote(pattern)
        ));
        self
    }

    pub(crate) fn near_vector(mut self, vector: &[f32]) -> Self {
        let rendered = serde_json::to_string(vector).unwrap_or_else(|_| "[]".to_string());
        self.args.push(format!("nearVector:{{ vector:{rendered} }}"));
        self
    }

    pub(crate) fn limit(mut self, limit: usize) -> Self {
        self.args.push(format!("limit:{limit}"));
        self
    }

    pub(crate) fn offset(mut self, offset: usize) -> Self {
        self.args.push(format!("offset:{offset}"));
        self
    }

    pub(crate) fn additional(mut self, additional: &'a str) -> Self {
        self.additional = additional;
        self
    }

    pub(crate) fn build(&self) -> String {
        let args = if self.args.is_empty() {
            String::new()
        } else {
            format!("({})", self.args.join(", "))
        };
        format!(
            "{{ Get {{ {}{}{{ {} _additional{{ {} }} }} }} }}",
            self.class, args, self.fields, self.additional
        )
    }
}
