//! Wire types for the upstream inventory API.
//!
//! List requests are `POST /applications/{table}/records/list/` with paging in
//! the query string and `{ sort, filter, hydrated }` in the JSON body. Responses
//! carry `{ items, total, offset, limit }`. File handle lookups answer with `{ url }`.

use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One upstream record: an id plus opaque field-id keyed values
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawRecord {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RawRecord {
    /// Field value by upstream key, treating `null` as absent
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| !value.is_null())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListResponse {
    #[serde(default)]
    pub items: Vec<RawRecord>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Is,
    IsNot,
    Contains,
    NotContains,
    IsEmpty,
    IsNotEmpty,
    IsGreaterThan,
    IsLessThan,
    HasAnyOf,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FieldFilter {
    pub field: String,
    pub comparison: Comparison,
    pub value: Value,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, comparison: Comparison, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            comparison,
            value: value.into(),
        }
    }
}

/// Field/comparison/value triples joined by AND or OR
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Filter {
    pub operator: FilterOperator,
    pub fields: Vec<FieldFilter>,
}

impl Filter {
    pub fn all(fields: impl IntoIterator<Item = FieldFilter>) -> Self {
        Self {
            operator: FilterOperator::And,
            fields: fields.into_iter().collect(),
        }
    }

    pub fn any(fields: impl IntoIterator<Item = FieldFilter>) -> Self {
        Self {
            operator: FilterOperator::Or,
            fields: fields.into_iter().collect(),
        }
    }

    /// Single `field is value` condition
    pub fn field_is(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all([FieldFilter::new(field, Comparison::Is, value)])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

/// Parameters for a single list call
#[derive(Debug, Clone, Builder)]
pub struct ListParams {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    /// Ask upstream to ignore `limit`
    pub all: Option<bool>,
    #[builder(default)]
    pub sort: Vec<Sort>,
    pub filter: Option<Filter>,
    /// Return labels instead of raw ids for select and linked fields
    #[builder(default = true)]
    pub hydrated: bool,
}

impl Default for ListParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ListParams {
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(all) = self.all {
            pairs.push(("all", all.to_string()));
        }
        pairs
    }

    pub(crate) fn body(&self) -> ListRequestBody<'_> {
        ListRequestBody {
            sort: &self.sort,
            filter: self.filter.as_ref(),
            hydrated: self.hydrated,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ListRequestBody<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sort: &'a Vec<Sort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a Filter>,
    hydrated: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileUrlResponse {
    #[serde(default)]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_params_defaults_to_hydrated() {
        let params = ListParams::default();
        assert!(params.hydrated);
        assert!(params.query_pairs().is_empty());

        let body = serde_json::to_value(params.body()).unwrap();
        assert_eq!(body, json!({ "hydrated": true }));
    }

    #[test]
    fn test_list_params_body_and_query() {
        let params = ListParams::builder()
            .offset(1000)
            .limit(1000)
            .hydrated(false)
            .filter(Filter::field_is("scccefe375", "2019-kenworth-t800"))
            .sort(vec![Sort {
                field: "title".to_string(),
                direction: SortDirection::Asc,
            }])
            .build();

        assert_eq!(
            params.query_pairs(),
            vec![("offset", "1000".to_string()), ("limit", "1000".to_string())]
        );

        let body = serde_json::to_value(params.body()).unwrap();
        assert_eq!(
            body,
            json!({
                "sort": [{ "field": "title", "direction": "asc" }],
                "filter": {
                    "operator": "and",
                    "fields": [
                        { "field": "scccefe375", "comparison": "is", "value": "2019-kenworth-t800" }
                    ]
                },
                "hydrated": false
            })
        );
    }

    #[test]
    fn test_raw_record_keeps_opaque_fields() {
        let record: RawRecord = serde_json::from_value(json!({
            "id": "rec-1",
            "title": "Lowboy",
            "sc577d7e98": [{ "handle": "h1" }],
            "s3de57aeca": null
        }))
        .unwrap();

        assert_eq!(record.id, "rec-1");
        assert_eq!(record.field("title"), Some(&json!("Lowboy")));
        assert!(record.field("sc577d7e98").unwrap().is_array());
        assert!(record.field("s3de57aeca").is_none());
        assert!(record.field("missing").is_none());
    }

    #[test]
    fn test_list_response_tolerates_missing_counts() {
        let response: ListResponse = serde_json::from_value(json!({ "items": [] })).unwrap();
        assert_eq!(response.total, 0);
        assert!(response.items.is_empty());
    }
}
