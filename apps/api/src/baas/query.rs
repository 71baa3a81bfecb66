//! Document list filters, serialised the way the BaaS expects them:
//! one JSON object per `queries[]` parameter.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum Query {
    Equal { attribute: String, values: Vec<Value> },
    OrderAsc { attribute: String },
    OrderDesc { attribute: String },
    Limit { values: Vec<u32> },
}

impl Query {
    pub fn equal(attribute: &str, value: impl Into<Value>) -> Self {
        Query::Equal {
            attribute: attribute.to_string(),
            values: vec![value.into()],
        }
    }

    pub fn order_asc(attribute: &str) -> Self {
        Query::OrderAsc {
            attribute: attribute.to_string(),
        }
    }

    pub fn order_desc(attribute: &str) -> Self {
        Query::OrderDesc {
            attribute: attribute.to_string(),
        }
    }

    pub fn limit(n: u32) -> Self {
        Query::Limit { values: vec![n] }
    }

    /// Renders the query as the JSON string sent on the wire.
    pub fn to_param(&self) -> String {
        // Serializing a tagged enum of strings/values cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Evaluates an equality filter against a document. Non-equality queries
    /// always match.
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            Query::Equal { attribute, values } => document
                .get(attribute)
                .map(|v| values.contains(v))
                .unwrap_or(false),
            _ => true,
        }
    }
}

/// Builds `queries[]=...` pairs for a request.
pub fn to_params(queries: &[Query]) -> Vec<(&'static str, String)> {
    queries.iter().map(|q| ("queries[]", q.to_param())).collect()
}
