//! Handlers for snapshot repository, snapshot, restore, and snapshot
//! lifecycle policy tools.

use std::sync::Arc;

use rmcp::model::{CallToolResult, JsonObject};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::easysearch::{EasysearchClient, QueryParams, join_path};
use crate::mcp::registry::{ToolFuture, ToolSpec};
use crate::mcp::schemas::{
    boolean_prop, integer_prop, object_prop, object_schema, string_array_prop, string_prop,
};

use super::{map_client_error, parse_arguments};

/// Tool descriptors contributed by this module.
pub(crate) fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec::idempotent(
            "snapshot_repo_create",
            "Create Snapshot Repository",
            "Register a snapshot repository (fs, s3, hdfs, azure, gcs).",
            snapshot_repo_create_schema,
            snapshot_repo_create,
        ),
        ToolSpec::read_only(
            "snapshot_repo_get",
            "Get Snapshot Repositories",
            "Fetch snapshot repository definitions.",
            snapshot_repo_get_schema,
            snapshot_repo_get,
        ),
        ToolSpec::destructive(
            "snapshot_repo_delete",
            "Delete Snapshot Repository",
            "Unregister a snapshot repository; stored snapshots stay on disk.",
            repo_name_schema,
            snapshot_repo_delete,
        ),
        ToolSpec::read_only(
            "snapshot_repo_verify",
            "Verify Snapshot Repository",
            "Verify that every node can write to a repository.",
            repo_name_schema,
            snapshot_repo_verify,
        ),
        ToolSpec::mutating(
            "snapshot_create",
            "Create Snapshot",
            "Snapshot selected indices, or the whole cluster, into a repository.",
            snapshot_create_schema,
            snapshot_create,
        ),
        ToolSpec::read_only(
            "snapshot_get",
            "Get Snapshots",
            "Fetch snapshot metadata from a repository.",
            snapshot_get_schema,
            snapshot_get,
        ),
        ToolSpec::read_only(
            "snapshot_status",
            "Snapshot Status",
            "Report progress of snapshots currently running.",
            snapshot_status_schema,
            snapshot_status,
        ),
        ToolSpec::destructive(
            "snapshot_delete",
            "Delete Snapshot",
            "Delete a snapshot from a repository.",
            snapshot_ref_schema,
            snapshot_delete,
        ),
        ToolSpec::mutating(
            "snapshot_restore",
            "Restore Snapshot",
            "Restore indices from a snapshot, optionally renaming them.",
            snapshot_restore_schema,
            snapshot_restore,
        ),
        ToolSpec::idempotent(
            "slm_policy_create",
            "Create Snapshot Policy",
            "Create a snapshot lifecycle policy with creation and deletion schedules.",
            slm_policy_create_schema,
            slm_policy_create,
        ),
        ToolSpec::read_only(
            "slm_policy_get",
            "Get Snapshot Policies",
            "Fetch snapshot lifecycle policies.",
            slm_policy_get_schema,
            slm_policy_get,
        ),
        ToolSpec::destructive(
            "slm_policy_delete",
            "Delete Snapshot Policy",
            "Delete a snapshot lifecycle policy.",
            policy_name_schema,
            slm_policy_delete,
        ),
        ToolSpec::read_only(
            "slm_policy_explain",
            "Explain Snapshot Policy",
            "Explain a policy's schedule, including upcoming runs.",
            policy_name_schema,
            slm_policy_explain,
        ),
        ToolSpec::idempotent(
            "slm_policy_start",
            "Start Snapshot Policy",
            "Start a snapshot lifecycle policy.",
            policy_name_schema,
            slm_policy_start,
        ),
        ToolSpec::idempotent(
            "slm_policy_stop",
            "Stop Snapshot Policy",
            "Stop a snapshot lifecycle policy.",
            policy_name_schema,
            slm_policy_stop,
        ),
    ]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RepoNameRequest {
    name: String,
}

fn repo_name_schema() -> Map<String, Value> {
    object_schema(json!({ "name": string_prop("Repository name") }), &["name"])
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotRepoCreateRequest {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    settings: Map<String, Value>,
}

fn snapshot_repo_create_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "name": string_prop("Repository name"),
            "type": string_prop("Repository type: fs, s3, hdfs, azure, or gcs"),
            "settings": object_prop("Repository settings, e.g. {location: \"/mount/backups\"}"),
        }),
        &["name", "type", "settings"],
    )
}

fn snapshot_repo_create(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: SnapshotRepoCreateRequest = parse_arguments(arguments)?;
        let body = json!({ "type": args.kind, "settings": args.settings });
        let path = join_path(&[Some("_snapshot"), Some(&args.name)]);
        let result = client
            .put(&path, &QueryParams::new(), Some(&body))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotRepoGetRequest {
    #[serde(default)]
    name: Option<String>,
}

fn snapshot_repo_get_schema() -> Map<String, Value> {
    object_schema(
        json!({ "name": string_prop("Repository name; wildcards are allowed") }),
        &[],
    )
}

fn snapshot_repo_get(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: SnapshotRepoGetRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some("_snapshot"), args.name.as_deref()]);
        let result = client
            .get(&path, &QueryParams::new())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn snapshot_repo_delete(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: RepoNameRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some("_snapshot"), Some(&args.name)]);
        let result = client
            .delete(&path, &QueryParams::new(), None)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn snapshot_repo_verify(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: RepoNameRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some("_snapshot"), Some(&args.name), Some("_verify")]);
        let result = client
            .post(&path, &QueryParams::new(), None)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotCreateRequest {
    repository: String,
    snapshot: String,
    #[serde(default)]
    indices: Option<Vec<String>>,
    #[serde(default)]
    ignore_unavailable: bool,
    #[serde(default = "default_true")]
    include_global_state: bool,
    #[serde(default)]
    wait_for_completion: bool,
}

fn default_true() -> bool {
    true
}

fn snapshot_create_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "repository": string_prop("Repository name"),
            "snapshot": string_prop("Snapshot name"),
            "indices": string_array_prop("Indices to include; everything when omitted"),
            "ignore_unavailable": boolean_prop("Skip indices that do not exist"),
            "include_global_state": boolean_prop("Include cluster state (default true)"),
            "wait_for_completion": boolean_prop("Block until the snapshot finishes"),
        }),
        &["repository", "snapshot"],
    )
}

fn snapshot_create(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: SnapshotCreateRequest = parse_arguments(arguments)?;
        let mut body = Map::new();
        body.insert(
            "ignore_unavailable".into(),
            Value::Bool(args.ignore_unavailable),
        );
        body.insert(
            "include_global_state".into(),
            Value::Bool(args.include_global_state),
        );
        if let Some(indices) = args.indices {
            body.insert("indices".into(), Value::String(indices.join(",")));
        }
        let mut params = QueryParams::new();
        params.push_bool("wait_for_completion", args.wait_for_completion);
        let path = join_path(&[
            Some("_snapshot"),
            Some(&args.repository),
            Some(&args.snapshot),
        ]);
        let result = client
            .put(&path, &params, Some(&Value::Object(body)))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotGetRequest {
    repository: String,
    #[serde(default)]
    snapshot: Option<String>,
    #[serde(default = "default_true")]
    verbose: bool,
}

fn snapshot_get_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "repository": string_prop("Repository name"),
            "snapshot": string_prop("Snapshot name or pattern; every snapshot when omitted"),
            "verbose": boolean_prop("Include full snapshot detail (default true)"),
        }),
        &["repository"],
    )
}

fn snapshot_get(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: SnapshotGetRequest = parse_arguments(arguments)?;
        let snapshot = args.snapshot.as_deref().unwrap_or("_all");
        let mut params = QueryParams::new();
        params.push_bool("verbose", args.verbose);
        let path = join_path(&[Some("_snapshot"), Some(&args.repository), Some(snapshot)]);
        let result = client.get(&path, &params).await.map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotStatusRequest {
    #[serde(default)]
    repository: Option<String>,
    #[serde(default)]
    snapshot: Option<String>,
}

fn snapshot_status_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "repository": string_prop("Repository name"),
            "snapshot": string_prop("Snapshot name; requires repository"),
        }),
        &[],
    )
}

fn snapshot_status(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: SnapshotStatusRequest = parse_arguments(arguments)?;
        let path = match (args.repository.as_deref(), args.snapshot.as_deref()) {
            (Some(repository), Some(snapshot)) => join_path(&[
                Some("_snapshot"),
                Some(repository),
                Some(snapshot),
                Some("_status"),
            ]),
            (Some(repository), None) => {
                join_path(&[Some("_snapshot"), Some(repository), Some("_status")])
            }
            _ => join_path(&[Some("_snapshot"), Some("_status")]),
        };
        let result = client
            .get(&path, &QueryParams::new())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotRefRequest {
    repository: String,
    snapshot: String,
}

fn snapshot_ref_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "repository": string_prop("Repository name"),
            "snapshot": string_prop("Snapshot name"),
        }),
        &["repository", "snapshot"],
    )
}

fn snapshot_delete(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: SnapshotRefRequest = parse_arguments(arguments)?;
        let path = join_path(&[
            Some("_snapshot"),
            Some(&args.repository),
            Some(&args.snapshot),
        ]);
        let result = client
            .delete(&path, &QueryParams::new(), None)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotRestoreRequest {
    repository: String,
    snapshot: String,
    #[serde(default)]
    indices: Option<Vec<String>>,
    #[serde(default)]
    ignore_unavailable: bool,
    #[serde(default)]
    include_global_state: bool,
    #[serde(default)]
    rename_pattern: Option<String>,
    #[serde(default)]
    rename_replacement: Option<String>,
    #[serde(default)]
    wait_for_completion: bool,
}

fn snapshot_restore_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "repository": string_prop("Repository name"),
            "snapshot": string_prop("Snapshot name"),
            "indices": string_array_prop("Indices to restore; everything when omitted"),
            "ignore_unavailable": boolean_prop("Skip indices missing from the snapshot"),
            "include_global_state": boolean_prop("Restore cluster state as well"),
            "rename_pattern": string_prop("Regex matching index names to rename"),
            "rename_replacement": string_prop("Replacement for renamed indices, e.g. restored_$1"),
            "wait_for_completion": boolean_prop("Block until the restore finishes"),
        }),
        &["repository", "snapshot"],
    )
}

fn snapshot_restore(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: SnapshotRestoreRequest = parse_arguments(arguments)?;
        let mut body = Map::new();
        body.insert(
            "ignore_unavailable".into(),
            Value::Bool(args.ignore_unavailable),
        );
        body.insert(
            "include_global_state".into(),
            Value::Bool(args.include_global_state),
        );
        if let Some(indices) = args.indices {
            body.insert("indices".into(), Value::String(indices.join(",")));
        }
        if let Some(pattern) = args.rename_pattern {
            body.insert("rename_pattern".into(), Value::String(pattern));
        }
        if let Some(replacement) = args.rename_replacement {
            body.insert("rename_replacement".into(), Value::String(replacement));
        }
        let mut params = QueryParams::new();
        params.push_bool("wait_for_completion", args.wait_for_completion);
        let path = join_path(&[
            Some("_snapshot"),
            Some(&args.repository),
            Some(&args.snapshot),
            Some("_restore"),
        ]);
        let result = client
            .post(&path, &params, Some(&Value::Object(body)))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyNameRequest {
    name: String,
}

fn policy_name_schema() -> Map<String, Value> {
    object_schema(json!({ "name": string_prop("Policy name") }), &["name"])
}

fn default_indices() -> String {
    "*".to_string()
}

fn default_creation_schedule() -> String {
    "0 8 * * *".to_string()
}

fn default_deletion_schedule() -> String {
    "0 1 * * *".to_string()
}

fn default_timezone() -> String {
    "Asia/Shanghai".to_string()
}

fn default_max_age() -> String {
    "7d".to_string()
}

fn default_max_count() -> u64 {
    21
}

fn default_min_count() -> u64 {
    7
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SlmPolicyCreateRequest {
    name: String,
    description: String,
    repository: String,
    #[serde(default = "default_indices")]
    indices: String,
    #[serde(default = "default_creation_schedule")]
    creation_schedule: String,
    #[serde(default = "default_timezone")]
    creation_timezone: String,
    #[serde(default = "default_deletion_schedule")]
    deletion_schedule: String,
    #[serde(default = "default_timezone")]
    deletion_timezone: String,
    #[serde(default = "default_max_age")]
    max_age: String,
    #[serde(default = "default_max_count")]
    max_count: u64,
    #[serde(default = "default_min_count")]
    min_count: u64,
    #[serde(default)]
    include_global_state: bool,
}

fn slm_policy_create_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "name": string_prop("Policy name"),
            "description": string_prop("Policy description"),
            "repository": string_prop("Target snapshot repository"),
            "indices": string_prop("Index pattern to back up (default *)"),
            "creation_schedule": string_prop("Cron expression for snapshot creation (default 0 8 * * *)"),
            "creation_timezone": string_prop("Timezone for the creation schedule"),
            "deletion_schedule": string_prop("Cron expression for snapshot deletion (default 0 1 * * *)"),
            "deletion_timezone": string_prop("Timezone for the deletion schedule"),
            "max_age": string_prop("Oldest snapshot to keep (default 7d)"),
            "max_count": integer_prop("Most snapshots to keep (default 21)"),
            "min_count": integer_prop("Fewest snapshots to keep (default 7)"),
            "include_global_state": boolean_prop("Include cluster state in snapshots"),
        }),
        &["name", "description", "repository"],
    )
}

fn slm_policy_create(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: SlmPolicyCreateRequest = parse_arguments(arguments)?;
        let body = json!({
            "description": args.description,
            "creation": {
                "schedule": {
                    "cron": {
                        "expression": args.creation_schedule,
                        "timezone": args.creation_timezone,
                    }
                },
                "time_limit": "1h",
            },
            "deletion": {
                "schedule": {
                    "cron": {
                        "expression": args.deletion_schedule,
                        "timezone": args.deletion_timezone,
                    }
                },
                "condition": {
                    "max_age": args.max_age,
                    "max_count": args.max_count,
                    "min_count": args.min_count,
                },
                "time_limit": "1h",
            },
            "snapshot_config": {
                "date_format": "yyyy-MM-dd-HH:mm",
                "date_format_timezone": args.creation_timezone,
                "indices": args.indices,
                "repository": args.repository,
                "ignore_unavailable": "true",
                "include_global_state": if args.include_global_state { "true" } else { "false" },
                "partial": "true",
            },
        });
        let path = join_path(&[Some("_slm"), Some("policies"), Some(&args.name)]);
        let result = client
            .post(&path, &QueryParams::new(), Some(&body))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SlmPolicyGetRequest {
    #[serde(default)]
    name: Option<String>,
}

fn slm_policy_get_schema() -> Map<String, Value> {
    object_schema(
        json!({ "name": string_prop("Policy name or pattern; every policy when omitted") }),
        &[],
    )
}

fn slm_policy_get(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: SlmPolicyGetRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some("_slm"), Some("policies"), args.name.as_deref()]);
        let result = client
            .get(&path, &QueryParams::new())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn slm_policy_delete(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: PolicyNameRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some("_slm"), Some("policies"), Some(&args.name)]);
        let result = client
            .delete(&path, &QueryParams::new(), None)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn slm_policy_explain(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: PolicyNameRequest = parse_arguments(arguments)?;
        let path = join_path(&[
            Some("_slm"),
            Some("policies"),
            Some(&args.name),
            Some("_explain"),
        ]);
        let result = client
            .get(&path, &QueryParams::new())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn slm_policy_start(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: PolicyNameRequest = parse_arguments(arguments)?;
        let path = join_path(&[
            Some("_slm"),
            Some("policies"),
            Some(&args.name),
            Some("_start"),
        ]);
        let result = client
            .post(&path, &QueryParams::new(), None)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn slm_policy_stop(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: PolicyNameRequest = parse_arguments(arguments)?;
        let path = join_path(&[
            Some("_slm"),
            Some("policies"),
            Some(&args.name),
            Some("_stop"),
        ]);
        let result = client
            .post(&path, &QueryParams::new(), None)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}
