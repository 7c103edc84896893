//! Shared types used by the Easysearch client and shaping helpers.

use reqwest::StatusCode;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors returned while interacting with Easysearch.
#[derive(Debug, Error)]
pub enum EasysearchError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Easysearch URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Easysearch responded with an unexpected status code.
    #[error("Unexpected Easysearch response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the cluster.
        status: StatusCode,
        /// Body payload associated with the failing response, verbatim.
        body: String,
    },
    /// Response body failed to parse as JSON where JSON was expected.
    #[error("Malformed JSON in Easysearch response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Raw search response envelope as returned by `_search`-family endpoints.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub(crate) took: Option<u64>,
    #[serde(default)]
    pub(crate) timed_out: Option<bool>,
    #[serde(default)]
    pub(crate) hits: HitsEnvelope,
    #[serde(default)]
    pub(crate) aggregations: Option<Value>,
}

/// `hits` envelope with per-hit documents parsed into [`SearchHit`].
#[derive(Debug, Default, Deserialize)]
pub(crate) struct HitsEnvelope {
    #[serde(default)]
    pub(crate) total: Option<TotalHits>,
    #[serde(default)]
    pub(crate) max_score: Option<f64>,
    #[serde(default)]
    pub(crate) hits: Vec<SearchHit>,
}

/// `hits.total` comes back as `{value, relation}` on current clusters and as
/// a bare integer on legacy ones; both forms are accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TotalHits {
    Exact(u64),
    Object {
        value: u64,
        #[serde(default)]
        relation: Option<String>,
    },
}

impl TotalHits {
    pub(crate) fn value(&self) -> u64 {
        match self {
            Self::Exact(value) => *value,
            Self::Object { value, .. } => *value,
        }
    }
}

/// Single search hit reduced to the fields callers actually consume.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct SearchHit {
    /// Index the hit came from.
    #[serde(rename = "_index", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// Document identifier.
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    /// Relevance score; absent for sorted or scrolled results.
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    /// Document source as stored.
    #[serde(rename = "_source", default)]
    pub source: Option<Value>,
    /// Highlight fragments when highlighting was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Value>,
}

/// Search response reduced to the ergonomic summary returned by tools.
#[derive(Debug, Serialize, JsonSchema)]
pub struct SearchSummary {
    /// Server-side execution time in milliseconds.
    pub took_ms: Option<u64>,
    /// Whether the query timed out on the cluster.
    pub timed_out: Option<bool>,
    /// Total matching document count.
    pub total: u64,
    /// Highest score across the returned hits.
    pub max_score: Option<f64>,
    /// Matching documents in cluster order.
    pub hits: Vec<SearchHit>,
    /// Aggregation results, present only when aggregations were requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<Value>,
}

/// Raw scroll envelope; hits pass through untouched.
#[derive(Debug, Deserialize)]
pub(crate) struct ScrollResponse {
    #[serde(rename = "_scroll_id", default)]
    pub(crate) scroll_id: Option<String>,
    #[serde(default)]
    pub(crate) hits: RawHits,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawHits {
    #[serde(default)]
    pub(crate) total: Option<TotalHits>,
    #[serde(default)]
    pub(crate) hits: Vec<Value>,
}

/// One page of a caller-driven scroll iteration.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ScrollPage {
    /// Cursor token for the next continuation; the cluster may refresh it.
    pub scroll_id: Option<String>,
    /// Total matching documents, reported by the initiating call only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Raw hits for this page, in cluster order.
    pub hits: Vec<Value>,
}

/// Bulk response reduced to its outcome; per-item detail stays on the wire.
#[derive(Debug, Serialize, JsonSchema)]
pub struct BulkSummary {
    /// Server-side execution time in milliseconds.
    pub took: Option<u64>,
    /// Whether any item in the bulk request failed.
    pub errors: Option<bool>,
    /// Number of per-item results the cluster reported.
    pub items_count: usize,
}
