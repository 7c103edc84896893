//! Handlers for cluster health, settings, and shard-routing tools.

use std::sync::Arc;

use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolResult, JsonObject};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::easysearch::{EasysearchClient, QueryParams, join_path, shape::summarize_cluster_stats};
use crate::mcp::registry::{ToolFuture, ToolSpec};
use crate::mcp::schemas::{
    boolean_prop, empty_object_schema, integer_prop, object_array_prop, object_prop,
    object_schema, string_prop,
};

use super::{map_client_error, parse_arguments};

/// Tool descriptors contributed by this module.
pub(crate) fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec::read_only(
            "cluster_health",
            "Cluster Health",
            "Report cluster status, node counts, and shard allocation health.",
            cluster_health_schema,
            cluster_health,
        ),
        ToolSpec::read_only(
            "cluster_stats",
            "Cluster Stats",
            "Summarize cluster-wide document, storage, and node statistics.",
            cluster_stats_schema,
            cluster_stats,
        ),
        ToolSpec::read_only(
            "cluster_state",
            "Cluster State",
            "Fetch the cluster state, optionally narrowed by metric and index.",
            cluster_state_schema,
            cluster_state,
        ),
        ToolSpec::read_only(
            "cluster_get_settings",
            "Get Cluster Settings",
            "Fetch persistent and transient cluster settings.",
            cluster_get_settings_schema,
            cluster_get_settings,
        ),
        ToolSpec::idempotent(
            "cluster_put_settings",
            "Update Cluster Settings",
            "Apply persistent and/or transient cluster settings.",
            cluster_put_settings_schema,
            cluster_put_settings,
        ),
        ToolSpec::read_only(
            "cluster_pending_tasks",
            "Pending Cluster Tasks",
            "List cluster-level changes that have not yet executed.",
            empty_object_schema,
            cluster_pending_tasks,
        ),
        ToolSpec::read_only(
            "cluster_allocation_explain",
            "Explain Shard Allocation",
            "Explain why a shard is or is not allocated to a node.",
            cluster_allocation_explain_schema,
            cluster_allocation_explain,
        ),
        ToolSpec::mutating(
            "cluster_reroute",
            "Reroute Shards",
            "Manually move, allocate, or cancel shards.",
            cluster_reroute_schema,
            cluster_reroute,
        ),
    ]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClusterHealthRequest {
    #[serde(default)]
    index: Option<String>,
    #[serde(default)]
    level: Option<String>,
}

fn cluster_health_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Limit the report to one index"),
            "level": string_prop("Detail level: cluster, indices, or shards"),
        }),
        &[],
    )
}

fn cluster_health(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: ClusterHealthRequest = parse_arguments(arguments)?;
        let mut params = QueryParams::new();
        params.push_opt("level", args.level);
        let path = join_path(&[Some("_cluster"), Some("health"), args.index.as_deref()]);
        let result = client.get(&path, &params).await.map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClusterStatsRequest {
    #[serde(default)]
    node_id: Option<String>,
}

fn cluster_stats_schema() -> Map<String, Value> {
    object_schema(
        json!({ "node_id": string_prop("Limit the statistics to one node") }),
        &[],
    )
}

fn cluster_stats(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: ClusterStatsRequest = parse_arguments(arguments)?;
        let path = match args.node_id.as_deref() {
            Some(node_id) => join_path(&[Some("_cluster"), Some("stats"), Some("nodes"), Some(node_id)]),
            None => join_path(&[Some("_cluster"), Some("stats")]),
        };
        let raw = client
            .get(&path, &QueryParams::new())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(summarize_cluster_stats(&raw)))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClusterStateRequest {
    #[serde(default)]
    metric: Option<String>,
    #[serde(default)]
    index: Option<String>,
}

fn cluster_state_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "metric": string_prop(
                "Metric: version, master_node, nodes, routing_table, metadata, or blocks"
            ),
            "index": string_prop("Limit the state to one index"),
        }),
        &[],
    )
}

fn cluster_state(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: ClusterStateRequest = parse_arguments(arguments)?;
        if args.metric.is_none() && args.index.is_some() {
            return Err(McpError::invalid_params(
                "`index` requires `metric` to be set",
                None,
            ));
        }
        let path = join_path(&[
            Some("_cluster"),
            Some("state"),
            args.metric.as_deref(),
            args.index.as_deref(),
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
struct ClusterGetSettingsRequest {
    #[serde(default)]
    include_defaults: bool,
    #[serde(default)]
    flat_settings: bool,
}

fn cluster_get_settings_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "include_defaults": boolean_prop("Include default settings"),
            "flat_settings": boolean_prop("Render settings as flat dotted keys"),
        }),
        &[],
    )
}

fn cluster_get_settings(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: ClusterGetSettingsRequest = parse_arguments(arguments)?;
        let mut params = QueryParams::new();
        params.push_flag("include_defaults", args.include_defaults);
        params.push_flag("flat_settings", args.flat_settings);
        let result = client
            .get("/_cluster/settings", &params)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClusterPutSettingsRequest {
    #[serde(default)]
    persistent: Option<Map<String, Value>>,
    #[serde(default)]
    transient: Option<Map<String, Value>>,
}

fn cluster_put_settings_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "persistent": object_prop("Settings that survive a cluster restart"),
            "transient": object_prop("Settings reset on the next restart"),
        }),
        &[],
    )
}

fn cluster_put_settings(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: ClusterPutSettingsRequest = parse_arguments(arguments)?;
        if args.persistent.is_none() && args.transient.is_none() {
            return Err(McpError::invalid_params(
                "Either `persistent` or `transient` must be supplied",
                None,
            ));
        }
        let mut body = Map::new();
        if let Some(persistent) = args.persistent {
            body.insert("persistent".into(), Value::Object(persistent));
        }
        if let Some(transient) = args.transient {
            body.insert("transient".into(), Value::Object(transient));
        }
        let result = client
            .put(
                "/_cluster/settings",
                &QueryParams::new(),
                Some(&Value::Object(body)),
            )
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn cluster_pending_tasks(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    let _ = arguments;
    Box::pin(async move {
        let result = client
            .get("/_cluster/pending_tasks", &QueryParams::new())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AllocationExplainRequest {
    #[serde(default)]
    index: Option<String>,
    #[serde(default)]
    shard: Option<u64>,
    #[serde(default)]
    primary: Option<bool>,
}

fn cluster_allocation_explain_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name; explains the first unassigned shard when omitted"),
            "shard": integer_prop("Shard number"),
            "primary": boolean_prop("Whether to explain the primary shard"),
        }),
        &[],
    )
}

fn cluster_allocation_explain(
    client: Arc<EasysearchClient>,
    arguments: Option<JsonObject>,
) -> ToolFuture {
    Box::pin(async move {
        let args: AllocationExplainRequest = parse_arguments(arguments)?;
        let mut body = Map::new();
        if let Some(index) = args.index {
            body.insert("index".into(), Value::String(index));
        }
        if let Some(shard) = args.shard {
            body.insert("shard".into(), Value::from(shard));
        }
        if let Some(primary) = args.primary {
            body.insert("primary".into(), Value::Bool(primary));
        }
        let body = if body.is_empty() {
            None
        } else {
            Some(Value::Object(body))
        };
        let result = client
            .post(
                "/_cluster/allocation/explain",
                &QueryParams::new(),
                body.as_ref(),
            )
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClusterRerouteRequest {
    #[serde(default)]
    commands: Vec<Value>,
    #[serde(default)]
    dry_run: bool,
}

fn cluster_reroute_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "commands": object_array_prop(
                "Routing commands, e.g. {move: {...}}, {cancel: {...}}, {allocate_replica: {...}}"
            ),
            "dry_run": boolean_prop("Simulate the reroute without applying it"),
        }),
        &[],
    )
}

fn cluster_reroute(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: ClusterRerouteRequest = parse_arguments(arguments)?;
        let body = json!({ "commands": args.commands });
        let mut params = QueryParams::new();
        params.push_flag("dry_run", args.dry_run);
        let result = client
            .post("/_cluster/reroute", &params, Some(&body))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}
