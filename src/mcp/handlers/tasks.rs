//! Handlers for task listing, inspection, and cancellation tools.
//!
//! Cancelling a long-running remote operation (a reindex, for instance) is an
//! ordinary tool call against the cluster's task API; there is no local
//! cancellation mechanism.

use std::sync::Arc;

use rmcp::model::{CallToolResult, JsonObject};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::easysearch::{EasysearchClient, QueryParams, join_path};
use crate::mcp::registry::{ToolFuture, ToolSpec};
use crate::mcp::schemas::{boolean_prop, object_schema, string_prop};

use super::{map_client_error, parse_arguments};

/// Tool descriptors contributed by this module.
pub(crate) fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec::read_only(
            "tasks_list",
            "List Tasks",
            "List tasks currently executing across the cluster.",
            tasks_list_schema,
            tasks_list,
        ),
        ToolSpec::read_only(
            "tasks_get",
            "Get Task",
            "Fetch one task by id, optionally waiting for it to finish.",
            tasks_get_schema,
            tasks_get,
        ),
        ToolSpec::mutating(
            "tasks_cancel",
            "Cancel Tasks",
            "Cancel a task by id, or a set of tasks by filters.",
            tasks_cancel_schema,
            tasks_cancel,
        ),
    ]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TasksListRequest {
    #[serde(default)]
    actions: Option<String>,
    #[serde(default)]
    detailed: bool,
    #[serde(default)]
    parent_task_id: Option<String>,
    #[serde(default)]
    nodes: Option<String>,
    #[serde(default)]
    group_by: Option<String>,
}

fn tasks_list_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "actions": string_prop("Action filter with wildcards, e.g. indices:data/write/*"),
            "detailed": boolean_prop("Include per-task detail"),
            "parent_task_id": string_prop("Limit to children of this task"),
            "nodes": string_prop("Node filter, comma-separated"),
            "group_by": string_prop("Grouping: nodes, parents, or none"),
        }),
        &[],
    )
}

fn tasks_list(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: TasksListRequest = parse_arguments(arguments)?;
        let mut params = QueryParams::new();
        params.push_opt("actions", args.actions);
        params.push_flag("detailed", args.detailed);
        params.push_opt("parent_task_id", args.parent_task_id);
        params.push_opt("nodes", args.nodes);
        params.push_opt("group_by", args.group_by);
        let result = client
            .get("/_tasks", &params)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TasksGetRequest {
    task_id: String,
    #[serde(default)]
    wait_for_completion: bool,
    #[serde(default)]
    timeout: Option<String>,
}

fn tasks_get_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "task_id": string_prop("Task id in node_id:task_number form"),
            "wait_for_completion": boolean_prop("Block until the task finishes"),
            "timeout": string_prop("How long to wait, e.g. 30s"),
        }),
        &["task_id"],
    )
}

fn tasks_get(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: TasksGetRequest = parse_arguments(arguments)?;
        let mut params = QueryParams::new();
        params.push_flag("wait_for_completion", args.wait_for_completion);
        params.push_opt("timeout", args.timeout);
        let path = join_path(&[Some("_tasks"), Some(&args.task_id)]);
        let result = client.get(&path, &params).await.map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TasksCancelRequest {
    #[serde(default)]
    task_id: Option<String>,
    #[serde(default)]
    actions: Option<String>,
    #[serde(default)]
    nodes: Option<String>,
    #[serde(default)]
    parent_task_id: Option<String>,
}

fn tasks_cancel_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "task_id": string_prop("Task id to cancel; filters apply when omitted"),
            "actions": string_prop("Action filter with wildcards, e.g. *reindex*"),
            "nodes": string_prop("Node filter, comma-separated"),
            "parent_task_id": string_prop("Cancel children of this task"),
        }),
        &[],
    )
}

fn tasks_cancel(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: TasksCancelRequest = parse_arguments(arguments)?;
        let mut params = QueryParams::new();
        params.push_opt("actions", args.actions);
        params.push_opt("nodes", args.nodes);
        params.push_opt("parent_task_id", args.parent_task_id);
        let path = match args.task_id.as_deref() {
            Some(task_id) => join_path(&[Some("_tasks"), Some(task_id), Some("_cancel")]),
            None => join_path(&[Some("_tasks"), Some("_cancel")]),
        };
        let result = client
            .post(&path, &params, None)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}
