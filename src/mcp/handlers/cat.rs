//! Handlers for the tabular `_cat` monitoring tools.
//!
//! Every endpoint is asked for `format=json` so agents receive structured
//! rows instead of fixed-width text.

use std::sync::Arc;

use rmcp::model::{CallToolResult, JsonObject};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::easysearch::{EasysearchClient, QueryParams, join_path};
use crate::mcp::registry::{ToolFuture, ToolSpec};
use crate::mcp::schemas::{boolean_prop, empty_object_schema, object_schema, string_prop};

use super::{map_client_error, parse_arguments};

const NODE_COLUMNS: &str =
    "name,ip,role,load_1m,load_5m,load_15m,cpu,heap.percent,ram.percent,node.role,master";
const THREAD_POOL_COLUMNS: &str = "node_name,name,active,queue,rejected,size,type";

/// Tool descriptors contributed by this module.
pub(crate) fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec::read_only(
            "cat_health",
            "Cat Health",
            "Cluster health as one compact row.",
            cat_health_schema,
            cat_health,
        ),
        ToolSpec::read_only(
            "cat_nodes",
            "Cat Nodes",
            "Per-node load, heap, and role columns.",
            cat_nodes_schema,
            cat_nodes,
        ),
        ToolSpec::read_only(
            "cat_indices",
            "Cat Indices",
            "Per-index health, document count, and storage size.",
            cat_indices_schema,
            cat_indices,
        ),
        ToolSpec::read_only(
            "cat_shards",
            "Cat Shards",
            "Shard placement and size per index.",
            cat_index_filter_schema,
            cat_shards,
        ),
        ToolSpec::read_only(
            "cat_allocation",
            "Cat Allocation",
            "Disk usage and shard counts per node.",
            cat_node_filter_schema,
            cat_allocation,
        ),
        ToolSpec::read_only(
            "cat_thread_pool",
            "Cat Thread Pools",
            "Active, queued, and rejected task counts per thread pool.",
            cat_thread_pool_schema,
            cat_thread_pool,
        ),
        ToolSpec::read_only(
            "cat_segments",
            "Cat Segments",
            "Lucene segment counts and sizes per shard.",
            cat_index_filter_schema,
            cat_segments,
        ),
        ToolSpec::read_only(
            "cat_count",
            "Cat Count",
            "Document counts, cluster-wide or per index.",
            cat_index_filter_schema,
            cat_count,
        ),
        ToolSpec::read_only(
            "cat_recovery",
            "Cat Recovery",
            "Shard recovery progress.",
            cat_recovery_schema,
            cat_recovery,
        ),
        ToolSpec::read_only(
            "cat_pending_tasks",
            "Cat Pending Tasks",
            "Pending cluster-level tasks.",
            empty_object_schema,
            cat_pending_tasks,
        ),
        ToolSpec::read_only(
            "cat_aliases",
            "Cat Aliases",
            "Alias-to-index mappings.",
            cat_name_filter_schema,
            cat_aliases,
        ),
        ToolSpec::read_only(
            "cat_templates",
            "Cat Templates",
            "Index templates and their patterns.",
            cat_name_filter_schema,
            cat_templates,
        ),
        ToolSpec::read_only(
            "cat_plugins",
            "Cat Plugins",
            "Installed plugins per node.",
            empty_object_schema,
            cat_plugins,
        ),
        ToolSpec::read_only(
            "cat_repositories",
            "Cat Repositories",
            "Registered snapshot repositories.",
            empty_object_schema,
            cat_repositories,
        ),
        ToolSpec::read_only(
            "cat_snapshots",
            "Cat Snapshots",
            "Snapshots in a repository with their status.",
            cat_snapshots_schema,
            cat_snapshots,
        ),
        ToolSpec::read_only(
            "cat_tasks",
            "Cat Tasks",
            "Tasks currently executing across the cluster.",
            cat_tasks_schema,
            cat_tasks,
        ),
    ]
}

fn json_params() -> QueryParams {
    let mut params = QueryParams::new();
    params.push("format", "json");
    params
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatIndexFilterRequest {
    #[serde(default)]
    index: Option<String>,
}

fn cat_index_filter_schema() -> Map<String, Value> {
    object_schema(
        json!({ "index": string_prop("Index name or pattern; covers everything when omitted") }),
        &[],
    )
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatNodeFilterRequest {
    #[serde(default)]
    node_id: Option<String>,
}

fn cat_node_filter_schema() -> Map<String, Value> {
    object_schema(
        json!({ "node_id": string_prop("Node id; covers every node when omitted") }),
        &[],
    )
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatNameFilterRequest {
    #[serde(default)]
    name: Option<String>,
}

fn cat_name_filter_schema() -> Map<String, Value> {
    object_schema(
        json!({ "name": string_prop("Name or pattern; covers everything when omitted") }),
        &[],
    )
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatHealthRequest {
    #[serde(default = "default_true")]
    ts: bool,
}

fn cat_health_schema() -> Map<String, Value> {
    object_schema(
        json!({ "ts": boolean_prop("Include the timestamp column (default true)") }),
        &[],
    )
}

fn cat_health(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: CatHealthRequest = parse_arguments(arguments)?;
        let mut params = json_params();
        if !args.ts {
            params.push_bool("ts", false);
        }
        let result = client
            .get("/_cat/health", &params)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatNodesRequest {
    #[serde(default)]
    full_id: bool,
}

fn cat_nodes_schema() -> Map<String, Value> {
    object_schema(
        json!({ "full_id": boolean_prop("Show full node ids") }),
        &[],
    )
}

fn cat_nodes(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: CatNodesRequest = parse_arguments(arguments)?;
        let mut params = json_params();
        params.push("h", NODE_COLUMNS);
        params.push_flag("full_id", args.full_id);
        let result = client
            .get("/_cat/nodes", &params)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn default_order() -> String {
    "asc".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatIndicesRequest {
    #[serde(default)]
    index: Option<String>,
    #[serde(default)]
    health: Option<String>,
    #[serde(default)]
    pri: bool,
    #[serde(default)]
    sort_by: Option<String>,
    #[serde(default = "default_order")]
    order: String,
}

fn cat_indices_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name or pattern; covers everything when omitted"),
            "health": string_prop("Filter by health: green, yellow, or red"),
            "pri": boolean_prop("Report primary-shard statistics only"),
            "sort_by": string_prop("Column to sort by, e.g. store.size or docs.count"),
            "order": string_prop("Sort direction: asc (default) or desc"),
        }),
        &[],
    )
}

fn cat_indices(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: CatIndicesRequest = parse_arguments(arguments)?;
        let mut params = json_params();
        params.push_opt("health", args.health);
        params.push_flag("pri", args.pri);
        if let Some(sort_by) = args.sort_by {
            params.push("s", format!("{}:{}", sort_by, args.order));
        }
        let path = join_path(&[Some("_cat"), Some("indices"), args.index.as_deref()]);
        let result = client.get(&path, &params).await.map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn cat_shards(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: CatIndexFilterRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some("_cat"), Some("shards"), args.index.as_deref()]);
        let result = client
            .get(&path, &json_params())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn cat_allocation(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: CatNodeFilterRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some("_cat"), Some("allocation"), args.node_id.as_deref()]);
        let result = client
            .get(&path, &json_params())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatThreadPoolRequest {
    #[serde(default)]
    thread_pool: Option<String>,
}

fn cat_thread_pool_schema() -> Map<String, Value> {
    object_schema(
        json!({ "thread_pool": string_prop("Thread pool name, e.g. search, write, or get") }),
        &[],
    )
}

fn cat_thread_pool(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: CatThreadPoolRequest = parse_arguments(arguments)?;
        let mut params = json_params();
        params.push("h", THREAD_POOL_COLUMNS);
        let path = join_path(&[
            Some("_cat"),
            Some("thread_pool"),
            args.thread_pool.as_deref(),
        ]);
        let result = client.get(&path, &params).await.map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn cat_segments(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: CatIndexFilterRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some("_cat"), Some("segments"), args.index.as_deref()]);
        let result = client
            .get(&path, &json_params())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn cat_count(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: CatIndexFilterRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some("_cat"), Some("count"), args.index.as_deref()]);
        let result = client
            .get(&path, &json_params())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatRecoveryRequest {
    #[serde(default)]
    index: Option<String>,
    #[serde(default)]
    active_only: bool,
}

fn cat_recovery_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name; covers everything when omitted"),
            "active_only": boolean_prop("Show only recoveries still in flight"),
        }),
        &[],
    )
}

fn cat_recovery(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: CatRecoveryRequest = parse_arguments(arguments)?;
        let mut params = json_params();
        params.push_flag("active_only", args.active_only);
        let path = join_path(&[Some("_cat"), Some("recovery"), args.index.as_deref()]);
        let result = client.get(&path, &params).await.map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn cat_pending_tasks(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    let _ = arguments;
    Box::pin(async move {
        let result = client
            .get("/_cat/pending_tasks", &json_params())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn cat_aliases(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: CatNameFilterRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some("_cat"), Some("aliases"), args.name.as_deref()]);
        let result = client
            .get(&path, &json_params())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn cat_templates(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: CatNameFilterRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some("_cat"), Some("templates"), args.name.as_deref()]);
        let result = client
            .get(&path, &json_params())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn cat_plugins(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    let _ = arguments;
    Box::pin(async move {
        let result = client
            .get("/_cat/plugins", &json_params())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn cat_repositories(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    let _ = arguments;
    Box::pin(async move {
        let result = client
            .get("/_cat/repositories", &json_params())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatSnapshotsRequest {
    repository: String,
}

fn cat_snapshots_schema() -> Map<String, Value> {
    object_schema(
        json!({ "repository": string_prop("Snapshot repository name") }),
        &["repository"],
    )
}

fn cat_snapshots(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: CatSnapshotsRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some("_cat"), Some("snapshots"), Some(&args.repository)]);
        let result = client
            .get(&path, &json_params())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatTasksRequest {
    #[serde(default)]
    detailed: bool,
    #[serde(default)]
    parent_task_id: Option<String>,
}

fn cat_tasks_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "detailed": boolean_prop("Include per-task detail"),
            "parent_task_id": string_prop("Limit to children of this task"),
        }),
        &[],
    )
}

fn cat_tasks(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: CatTasksRequest = parse_arguments(arguments)?;
        let mut params = json_params();
        params.push_flag("detailed", args.detailed);
        params.push_opt("parent_task_id", args.parent_task_id);
        let result = client
            .get("/_cat/tasks", &params)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}
