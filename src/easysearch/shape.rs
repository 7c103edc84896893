//! Request-shaping conventions shared by every tool.
//!
//! The cluster's REST API leans on a handful of recurring conventions: paths
//! assembled from optional segments, query parameters that are omitted rather
//! than sent empty, newline-delimited JSON for multi-operation payloads, and
//! large responses that callers only need a slice of. They are centralized
//! here so every tool behaves identically.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::easysearch::types::{
    BulkSummary, EasysearchError, ScrollPage, ScrollResponse, SearchResponse, SearchSummary,
    TotalHits,
};

/// Content type for newline-delimited JSON payloads.
pub const APPLICATION_NDJSON: &str = "application/x-ndjson";

/// Build a request path from optional segments.
///
/// Present segments are joined with `/` behind a leading slash; absent ones
/// vanish entirely, never rendering as an empty segment.
pub fn join_path(segments: &[Option<&str>]) -> String {
    let mut path = String::new();
    for segment in segments.iter().flatten() {
        if segment.is_empty() {
            continue;
        }
        path.push('/');
        path.push_str(segment);
    }
    if path.is_empty() {
        path.push('/');
    }
    path
}

/// Query parameter accumulator.
///
/// Only parameters the caller actually supplied are collected; an empty set
/// turns into "no query string at all" rather than an empty mapping, which is
/// what the cluster's parser expects.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter unconditionally.
    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        self.pairs.push((key.to_string(), value.into()));
    }

    /// Append a parameter when a value was supplied.
    pub fn push_opt(&mut self, key: &str, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    /// Append a boolean rendered as the literal string `"true"` or `"false"`.
    pub fn push_bool(&mut self, key: &str, value: bool) {
        self.push(key, if value { "true" } else { "false" });
    }

    /// Append `key=true` only when the flag is set; unset flags are omitted.
    pub fn push_flag(&mut self, key: &str, set: bool) {
        if set {
            self.push(key, "true");
        }
    }

    /// Append a comma-joined list when values were supplied.
    pub fn push_list(&mut self, key: &str, values: Option<&[String]>) {
        if let Some(values) = values
            && !values.is_empty()
        {
            self.push(key, values.join(","));
        }
    }

    /// Borrow the accumulated pairs, or `None` when nothing was supplied.
    pub fn as_pairs(&self) -> Option<&[(String, String)]> {
        if self.pairs.is_empty() {
            None
        } else {
            Some(&self.pairs)
        }
    }
}

/// Encode bulk operations as newline-delimited JSON.
///
/// Each operation carrying a `doc` key contributes two lines: the action
/// metadata (the operation minus `doc`) followed by the payload. Delete-class
/// operations contribute a single line. The document always ends with a
/// trailing newline, and line order encodes operation order.
pub fn encode_bulk(operations: &[Map<String, Value>]) -> Result<String, EasysearchError> {
    let mut lines = Vec::with_capacity(operations.len() * 2);
    for operation in operations {
        if let Some(doc) = operation.get("doc") {
            let action: Map<String, Value> = operation
                .iter()
                .filter(|(key, _)| key.as_str() != "doc")
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            lines.push(serde_json::to_string(&action)?);
            lines.push(serde_json::to_string(doc)?);
        } else {
            lines.push(serde_json::to_string(operation)?);
        }
    }
    Ok(format!("{}\n", lines.join("\n")))
}

/// Encode an index-only bulk payload targeting a single index.
pub fn encode_bulk_index(index: &str, documents: &[Value]) -> Result<String, EasysearchError> {
    let action = json!({ "index": { "_index": index } });
    let mut lines = Vec::with_capacity(documents.len() * 2);
    for document in documents {
        lines.push(serde_json::to_string(&action)?);
        lines.push(serde_json::to_string(document)?);
    }
    Ok(format!("{}\n", lines.join("\n")))
}

/// One entry of a multi-search request: a header line and a body line.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MsearchItem {
    /// Header selecting the target index and options; may be empty.
    #[serde(default)]
    pub header: Map<String, Value>,
    /// Search body; may be empty.
    #[serde(default)]
    pub body: Map<String, Value>,
}

/// Encode multi-search entries as alternating header/body NDJSON lines.
pub fn encode_msearch(searches: &[MsearchItem]) -> Result<String, EasysearchError> {
    let mut lines = Vec::with_capacity(searches.len() * 2);
    for search in searches {
        lines.push(serde_json::to_string(&search.header)?);
        lines.push(serde_json::to_string(&search.body)?);
    }
    Ok(format!("{}\n", lines.join("\n")))
}

/// Summarize a bulk response to its outcome.
pub fn summarize_bulk(result: &Value) -> BulkSummary {
    BulkSummary {
        took: result.get("took").and_then(Value::as_u64),
        errors: result.get("errors").and_then(Value::as_bool),
        items_count: result
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0),
    }
}

/// Reduce a raw search response to the summary returned by search tools.
pub fn reshape_search(raw: Value) -> Result<SearchSummary, EasysearchError> {
    let response: SearchResponse = serde_json::from_value(raw)?;
    Ok(SearchSummary {
        took_ms: response.took,
        timed_out: response.timed_out,
        total: response
            .hits
            .total
            .as_ref()
            .map(TotalHits::value)
            .unwrap_or(0),
        max_score: response.hits.max_score,
        hits: response.hits.hits,
        aggregations: response.aggregations,
    })
}

/// Reduce a k-NN search response to `{took_ms, hits}` with minimal hit fields.
pub fn reshape_knn(raw: Value) -> Result<Value, EasysearchError> {
    let response: SearchResponse = serde_json::from_value(raw)?;
    let hits: Vec<Value> = response
        .hits
        .hits
        .into_iter()
        .map(|hit| json!({ "_id": hit.id, "_score": hit.score, "_source": hit.source }))
        .collect();
    Ok(json!({ "took_ms": response.took, "hits": hits }))
}

/// Reduce an aggregation response to `{took_ms, total, aggregations}`.
pub fn reshape_aggregations(raw: Value) -> Result<Value, EasysearchError> {
    let response: SearchResponse = serde_json::from_value(raw)?;
    Ok(json!({
        "took_ms": response.took,
        "total": response.hits.total.as_ref().map(TotalHits::value).unwrap_or(0),
        "aggregations": response.aggregations.unwrap_or_else(|| json!({})),
    }))
}

/// Extract one scroll page; `include_total` is set by the initiating call.
pub fn reshape_scroll(raw: Value, include_total: bool) -> Result<ScrollPage, EasysearchError> {
    let response: ScrollResponse = serde_json::from_value(raw)?;
    Ok(ScrollPage {
        scroll_id: response.scroll_id,
        total: if include_total {
            response.hits.total.as_ref().map(TotalHits::value)
        } else {
            None
        },
        hits: response.hits.hits,
    })
}

/// Reduce cluster stats to the headline counters callers care about.
pub fn summarize_cluster_stats(raw: &Value) -> Value {
    let indices = raw.get("indices");
    let pick = |key: &str| indices.and_then(|value| value.get(key)).cloned();
    json!({
        "cluster_name": raw.get("cluster_name"),
        "status": raw.get("status"),
        "timestamp": raw.get("timestamp"),
        "nodes": raw.pointer("/nodes/count").cloned().unwrap_or_else(|| json!({})),
        "indices": {
            "count": pick("count"),
            "docs": pick("docs").unwrap_or_else(|| json!({})),
            "store": pick("store").unwrap_or_else(|| json!({})),
            "shards": pick("shards").unwrap_or_else(|| json!({})),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_path_omits_absent_segments() {
        assert_eq!(join_path(&[Some("_cat"), Some("indices"), None]), "/_cat/indices");
        assert_eq!(
            join_path(&[Some("_cat"), Some("indices"), Some("logs-*")]),
            "/_cat/indices/logs-*"
        );
        assert_eq!(
            join_path(&[Some("products"), Some("_doc"), Some("1")]),
            "/products/_doc/1"
        );
    }

    #[test]
    fn join_path_skips_empty_segments() {
        assert_eq!(join_path(&[Some("_nodes"), Some(""), Some("stats")]), "/_nodes/stats");
    }

    #[test]
    fn query_params_empty_set_means_no_query_string() {
        let mut params = QueryParams::new();
        assert!(params.as_pairs().is_none());
        params.push_opt("routing", None::<String>);
        params.push_flag("pri", false);
        params.push_list("_source", None);
        assert!(params.as_pairs().is_none());
    }

    #[test]
    fn query_params_render_booleans_as_literal_strings() {
        let mut params = QueryParams::new();
        params.push_bool("wait_for_completion", true);
        params.push_bool("verbose", false);
        params.push_flag("detailed", true);
        assert_eq!(
            params.as_pairs().expect("pairs"),
            &[
                ("wait_for_completion".to_string(), "true".to_string()),
                ("verbose".to_string(), "false".to_string()),
                ("detailed".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn query_params_join_lists_with_commas() {
        let mut params = QueryParams::new();
        params.push_list("_source", Some(&["name".to_string(), "price".to_string()]));
        assert_eq!(
            params.as_pairs().expect("pairs"),
            &[("_source".to_string(), "name,price".to_string())]
        );
    }

    #[test]
    fn encode_bulk_emits_two_lines_per_document_operation() {
        let operations: Vec<Map<String, Value>> = vec![
            json!({ "index": { "_index": "products", "_id": "1" }, "doc": { "name": "A" } }),
            json!({ "index": { "_index": "products", "_id": "2" }, "doc": { "name": "B" } }),
            json!({ "delete": { "_index": "products", "_id": "3" } }),
        ]
        .into_iter()
        .map(|value| value.as_object().expect("object").clone())
        .collect();

        let encoded = encode_bulk(&operations).expect("encode");
        assert!(encoded.ends_with('\n'));

        let lines: Vec<&str> = encoded.trim_end_matches('\n').split('\n').collect();
        assert_eq!(lines.len(), 5);

        let parsed: Vec<Value> = lines
            .iter()
            .map(|line| serde_json::from_str(line).expect("line parses"))
            .collect();
        assert_eq!(parsed[0], json!({ "index": { "_index": "products", "_id": "1" } }));
        assert_eq!(parsed[1], json!({ "name": "A" }));
        assert_eq!(parsed[2], json!({ "index": { "_index": "products", "_id": "2" } }));
        assert_eq!(parsed[3], json!({ "name": "B" }));
        assert_eq!(parsed[4], json!({ "delete": { "_index": "products", "_id": "3" } }));
    }

    #[test]
    fn encode_bulk_index_pairs_every_document_with_an_action_line() {
        let documents = vec![json!({ "name": "A" }), json!({ "name": "B" })];
        let encoded = encode_bulk_index("products", &documents).expect("encode");
        let lines: Vec<&str> = encoded.trim_end_matches('\n').split('\n').collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            serde_json::from_str::<Value>(lines[0]).expect("action"),
            json!({ "index": { "_index": "products" } })
        );
        assert_eq!(
            serde_json::from_str::<Value>(lines[3]).expect("doc"),
            json!({ "name": "B" })
        );
    }

    #[test]
    fn encode_msearch_alternates_header_and_body_lines() {
        let searches = vec![
            MsearchItem {
                header: json!({ "index": "products" }).as_object().expect("obj").clone(),
                body: json!({ "query": { "match_all": {} } })
                    .as_object()
                    .expect("obj")
                    .clone(),
            },
            MsearchItem {
                header: Map::new(),
                body: Map::new(),
            },
        ];
        let encoded = encode_msearch(&searches).expect("encode");
        let lines: Vec<&str> = encoded.trim_end_matches('\n').split('\n').collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "{}");
        assert_eq!(lines[3], "{}");
    }

    #[test]
    fn summarize_bulk_counts_items_and_preserves_error_flag() {
        let raw = json!({
            "took": 12,
            "errors": true,
            "items": [{ "index": { "status": 201 } }, { "index": { "status": 409 } }]
        });
        let summary = summarize_bulk(&raw);
        assert_eq!(summary.took, Some(12));
        assert_eq!(summary.errors, Some(true));
        assert_eq!(summary.items_count, 2);
    }

    #[test]
    fn reshape_search_preserves_order_and_hit_fields() {
        let raw = json!({
            "took": 3,
            "timed_out": false,
            "hits": {
                "total": { "value": 3, "relation": "eq" },
                "max_score": 1.7,
                "hits": [
                    { "_index": "products", "_id": "1", "_score": 1.7, "_source": { "name": "A" } },
                    { "_index": "products", "_id": "2", "_score": 0.4, "_source": { "name": "B" } }
                ]
            }
        });

        let summary = reshape_search(raw).expect("reshape");
        assert_eq!(summary.took_ms, Some(3));
        assert_eq!(summary.timed_out, Some(false));
        assert_eq!(summary.total, 3);
        assert_eq!(summary.max_score, Some(1.7));
        assert!(summary.aggregations.is_none());
        assert_eq!(summary.hits.len(), 2);
        assert_eq!(summary.hits[0].id.as_deref(), Some("1"));
        assert_eq!(summary.hits[0].score, Some(1.7));
        assert_eq!(summary.hits[0].source, Some(json!({ "name": "A" })));
        assert_eq!(summary.hits[1].id.as_deref(), Some("2"));
    }

    #[test]
    fn reshape_search_accepts_legacy_integer_total() {
        let raw = json!({ "took": 1, "hits": { "total": 42, "hits": [] } });
        let summary = reshape_search(raw).expect("reshape");
        assert_eq!(summary.total, 42);
        assert!(summary.hits.is_empty());
    }

    #[test]
    fn reshape_scroll_reports_total_only_when_asked() {
        let raw = json!({
            "_scroll_id": "cursor-1",
            "hits": { "total": { "value": 5 }, "hits": [{ "_id": "1" }, { "_id": "2" }] }
        });
        let first = reshape_scroll(raw.clone(), true).expect("reshape");
        assert_eq!(first.scroll_id.as_deref(), Some("cursor-1"));
        assert_eq!(first.total, Some(5));
        assert_eq!(first.hits.len(), 2);

        let next = reshape_scroll(raw, false).expect("reshape");
        assert!(next.total.is_none());
    }

    #[test]
    fn summarize_cluster_stats_selects_headline_counters() {
        let raw = json!({
            "cluster_name": "demo",
            "status": "green",
            "timestamp": 1700000000000u64,
            "nodes": { "count": { "total": 3, "data": 2 } },
            "indices": {
                "count": 7,
                "docs": { "count": 100 },
                "store": { "size_in_bytes": 2048 },
                "shards": { "total": 14 },
                "mappings": { "field_types": [] }
            }
        });
        let summary = summarize_cluster_stats(&raw);
        assert_eq!(summary["cluster_name"], "demo");
        assert_eq!(summary["nodes"]["total"], 3);
        assert_eq!(summary["indices"]["count"], 7);
        assert_eq!(summary["indices"]["shards"]["total"], 14);
        assert!(summary["indices"].get("mappings").is_none());
    }
}
