//! Handlers for node information and diagnostics tools.

use std::sync::Arc;

use rmcp::model::{CallToolResult, JsonObject};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::easysearch::{EasysearchClient, QueryParams, join_path};
use crate::mcp::registry::{ToolFuture, ToolSpec};
use crate::mcp::schemas::{integer_prop, object_schema, string_prop};

use super::{map_client_error, parse_arguments};

/// Tool descriptors contributed by this module.
pub(crate) fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec::read_only(
            "nodes_info",
            "Node Info",
            "Fetch node configuration: JVM, OS, thread pools, plugins.",
            nodes_info_schema,
            nodes_info,
        ),
        ToolSpec::read_only(
            "nodes_stats",
            "Node Stats",
            "Fetch node runtime statistics, optionally narrowed by metric.",
            nodes_stats_schema,
            nodes_stats,
        ),
        ToolSpec::read_only(
            "nodes_hot_threads",
            "Hot Threads",
            "Sample the busiest threads per node; returns plain text.",
            nodes_hot_threads_schema,
            nodes_hot_threads,
        ),
        ToolSpec::read_only(
            "nodes_usage",
            "Node Usage",
            "Report REST action and aggregation usage counters per node.",
            nodes_usage_schema,
            nodes_usage,
        ),
    ]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodesInfoRequest {
    #[serde(default)]
    node_id: Option<String>,
    #[serde(default)]
    metric: Option<String>,
}

fn nodes_info_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "node_id": string_prop("Node ids, comma-separated; covers every node when omitted"),
            "metric": string_prop(
                "Info section: settings, os, process, jvm, thread_pool, transport, http, \
                 plugins, or ingest"
            ),
        }),
        &[],
    )
}

fn nodes_info(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: NodesInfoRequest = parse_arguments(arguments)?;
        let path = join_path(&[
            Some("_nodes"),
            args.node_id.as_deref(),
            args.metric.as_deref(),
        ]);
        let result = client
            .get(&path, &QueryParams::new())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodesStatsRequest {
    #[serde(default)]
    node_id: Option<String>,
    #[serde(default)]
    metric: Option<String>,
    #[serde(default)]
    index_metric: Option<String>,
}

fn nodes_stats_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "node_id": string_prop("Node ids, comma-separated; covers every node when omitted"),
            "metric": string_prop(
                "Stats section: indices, os, process, jvm, thread_pool, fs, transport, http, \
                 breaker, script, discovery, or ingest"
            ),
            "index_metric": string_prop(
                "Index stats section when metric=indices, e.g. search, indexing, docs"
            ),
        }),
        &[],
    )
}

fn nodes_stats(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: NodesStatsRequest = parse_arguments(arguments)?;
        let path = join_path(&[
            Some("_nodes"),
            args.node_id.as_deref(),
            Some("stats"),
            args.metric.as_deref(),
            args.index_metric.as_deref(),
        ]);
        let result = client
            .get(&path, &QueryParams::new())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn default_threads() -> u64 {
    3
}

fn default_interval() -> String {
    "500ms".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodesHotThreadsRequest {
    #[serde(default)]
    node_id: Option<String>,
    #[serde(default = "default_threads")]
    threads: u64,
    #[serde(default = "default_interval")]
    interval: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

fn nodes_hot_threads_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "node_id": string_prop("Node ids; samples every node when omitted"),
            "threads": integer_prop("Threads reported per node (default 3)"),
            "interval": string_prop("Sampling interval (default 500ms)"),
            "type": string_prop("Thread state to sample: cpu, wait, or block"),
        }),
        &[],
    )
}

fn nodes_hot_threads(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: NodesHotThreadsRequest = parse_arguments(arguments)?;
        let mut params = QueryParams::new();
        params.push("threads", args.threads.to_string());
        params.push("interval", args.interval);
        params.push_opt("type", args.kind);
        let path = join_path(&[
            Some("_nodes"),
            args.node_id.as_deref(),
            Some("hot_threads"),
        ]);
        // The endpoint returns plain text, not JSON.
        let text = client
            .get_text(&path, &params)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(json!({ "hot_threads": text })))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodesUsageRequest {
    #[serde(default)]
    node_id: Option<String>,
    #[serde(default)]
    metric: Option<String>,
}

fn nodes_usage_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "node_id": string_prop("Node ids; covers every node when omitted"),
            "metric": string_prop("Usage section: rest_actions or aggregations"),
        }),
        &[],
    )
}

fn nodes_usage(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: NodesUsageRequest = parse_arguments(arguments)?;
        let path = join_path(&[
            Some("_nodes"),
            args.node_id.as_deref(),
            Some("usage"),
            args.metric.as_deref(),
        ]);
        let result = client
            .get(&path, &QueryParams::new())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}
