//! Handlers for index lifecycle, alias, and template tools.

use std::sync::Arc;

use rmcp::model::{CallToolResult, JsonObject};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::easysearch::{EasysearchClient, QueryParams, join_path};
use crate::mcp::registry::{ToolFuture, ToolSpec};
use crate::mcp::schemas::{
    boolean_prop, integer_prop, object_array_prop, object_prop, object_schema, string_array_prop,
    string_prop,
};

use super::{map_client_error, parse_arguments};

/// Tool descriptors contributed by this module.
pub(crate) fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec::idempotent(
            "index_create",
            "Create Index",
            "Create an index with optional mappings, settings, and aliases.",
            index_create_schema,
            index_create,
        ),
        ToolSpec::destructive(
            "index_delete",
            "Delete Index",
            "Delete an index; wildcards are allowed.",
            index_name_schema,
            index_delete,
        ),
        ToolSpec::read_only(
            "index_exists",
            "Index Exists",
            "Check whether an index exists.",
            index_name_schema,
            index_exists,
        ),
        ToolSpec::read_only(
            "index_get",
            "Get Index",
            "Fetch an index's mappings, settings, and aliases.",
            index_name_schema,
            index_get,
        ),
        ToolSpec::read_only(
            "index_get_mapping",
            "Get Mapping",
            "Fetch an index's field mappings.",
            index_name_schema,
            index_get_mapping,
        ),
        ToolSpec::idempotent(
            "index_put_mapping",
            "Update Mapping",
            "Add fields to an index's mapping; existing fields cannot change.",
            index_put_mapping_schema,
            index_put_mapping,
        ),
        ToolSpec::read_only(
            "index_get_settings",
            "Get Index Settings",
            "Fetch index settings, optionally including defaults.",
            index_get_settings_schema,
            index_get_settings,
        ),
        ToolSpec::idempotent(
            "index_put_settings",
            "Update Index Settings",
            "Apply dynamic settings to an index.",
            index_put_settings_schema,
            index_put_settings,
        ),
        ToolSpec::idempotent(
            "index_open",
            "Open Index",
            "Open a closed index for reads and writes.",
            index_name_schema,
            index_open,
        ),
        ToolSpec::idempotent(
            "index_close",
            "Close Index",
            "Close an index; data is kept but reads and writes are rejected.",
            index_name_schema,
            index_close,
        ),
        ToolSpec::idempotent(
            "index_refresh",
            "Refresh Index",
            "Make recent writes searchable; refreshes every index when none is given.",
            optional_index_schema,
            index_refresh,
        ),
        ToolSpec::idempotent(
            "index_flush",
            "Flush Index",
            "Flush in-memory segments to disk.",
            index_flush_schema,
            index_flush,
        ),
        ToolSpec::mutating(
            "index_forcemerge",
            "Force Merge",
            "Merge index segments; resource intensive, best run off-peak.",
            index_forcemerge_schema,
            index_forcemerge,
        ),
        ToolSpec::read_only(
            "index_stats",
            "Index Stats",
            "Fetch index statistics, optionally narrowed to one metric group.",
            index_stats_schema,
            index_stats,
        ),
        ToolSpec::mutating(
            "index_rollover",
            "Rollover Alias",
            "Roll a write alias over to a fresh index when conditions are met.",
            index_rollover_schema,
            index_rollover,
        ),
        ToolSpec::mutating(
            "index_clone",
            "Clone Index",
            "Clone a read-only source index into a new target.",
            index_copy_schema,
            index_clone,
        ),
        ToolSpec::mutating(
            "index_split",
            "Split Index",
            "Split an index into one with more primary shards.",
            index_copy_schema,
            index_split,
        ),
        ToolSpec::mutating(
            "index_shrink",
            "Shrink Index",
            "Shrink an index into one with fewer primary shards.",
            index_copy_schema,
            index_shrink,
        ),
        ToolSpec::read_only(
            "alias_get",
            "Get Aliases",
            "Fetch aliases, filtered by alias name and/or index.",
            alias_get_schema,
            alias_get,
        ),
        ToolSpec::idempotent(
            "alias_create",
            "Create Alias",
            "Point an alias at an index, optionally filtered or routed.",
            alias_create_schema,
            alias_create,
        ),
        ToolSpec::destructive(
            "alias_delete",
            "Delete Alias",
            "Remove an alias from an index.",
            alias_delete_schema,
            alias_delete,
        ),
        ToolSpec::mutating(
            "alias_actions",
            "Alias Actions",
            "Apply a batch of alias add/remove actions atomically.",
            alias_actions_schema,
            alias_actions,
        ),
        ToolSpec::read_only(
            "template_get",
            "Get Templates",
            "Fetch index templates, optionally by name or pattern.",
            template_get_schema,
            template_get,
        ),
        ToolSpec::idempotent(
            "template_create",
            "Create Template",
            "Create or replace an index template for matching index patterns.",
            template_create_schema,
            template_create,
        ),
        ToolSpec::destructive(
            "template_delete",
            "Delete Template",
            "Delete an index template.",
            template_delete_schema,
            template_delete,
        ),
        ToolSpec::mutating(
            "reindex",
            "Reindex",
            "Copy documents from one index into another, optionally transforming them.",
            reindex_schema,
            reindex,
        ),
    ]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IndexNameRequest {
    index: String,
}

fn index_name_schema() -> Map<String, Value> {
    object_schema(json!({ "index": string_prop("Index name") }), &["index"])
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OptionalIndexRequest {
    #[serde(default)]
    index: Option<String>,
}

fn optional_index_schema() -> Map<String, Value> {
    object_schema(
        json!({ "index": string_prop("Index name; applies to every index when omitted") }),
        &[],
    )
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IndexCreateRequest {
    index: String,
    #[serde(default)]
    mappings: Option<Map<String, Value>>,
    #[serde(default)]
    settings: Option<Map<String, Value>>,
    #[serde(default)]
    aliases: Option<Map<String, Value>>,
}

fn index_create_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "mappings": object_prop("Field mapping definitions"),
            "settings": object_prop("Index settings such as shard and replica counts"),
            "aliases": object_prop("Alias definitions"),
        }),
        &["index"],
    )
}

fn index_create(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: IndexCreateRequest = parse_arguments(arguments)?;
        let mut body = Map::new();
        if let Some(mappings) = args.mappings {
            body.insert("mappings".into(), Value::Object(mappings));
        }
        if let Some(settings) = args.settings {
            body.insert("settings".into(), Value::Object(settings));
        }
        if let Some(aliases) = args.aliases {
            body.insert("aliases".into(), Value::Object(aliases));
        }
        let body = if body.is_empty() {
            None
        } else {
            Some(Value::Object(body))
        };
        let path = join_path(&[Some(&args.index)]);
        let result = client
            .put(&path, &QueryParams::new(), body.as_ref())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn index_delete(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: IndexNameRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some(&args.index)]);
        let result = client
            .delete(&path, &QueryParams::new(), None)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn index_exists(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: IndexNameRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some(&args.index)]);
        let exists = client.head(&path).await.map_err(map_client_error)?;
        Ok(CallToolResult::structured(json!({ "exists": exists })))
    })
}

fn index_get(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: IndexNameRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some(&args.index)]);
        let result = client
            .get(&path, &QueryParams::new())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn index_get_mapping(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: IndexNameRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some(&args.index), Some("_mapping")]);
        let result = client
            .get(&path, &QueryParams::new())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IndexPutMappingRequest {
    index: String,
    properties: Map<String, Value>,
    #[serde(default)]
    dynamic: Option<String>,
}

fn index_put_mapping_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "properties": object_prop("Field definitions to add"),
            "dynamic": string_prop("Dynamic mapping policy: true, false, or strict"),
        }),
        &["index", "properties"],
    )
}

fn index_put_mapping(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: IndexPutMappingRequest = parse_arguments(arguments)?;
        let mut body = Map::new();
        body.insert("properties".into(), Value::Object(args.properties));
        if let Some(dynamic) = args.dynamic {
            body.insert("dynamic".into(), Value::String(dynamic));
        }
        let path = join_path(&[Some(&args.index), Some("_mapping")]);
        let result = client
            .put(&path, &QueryParams::new(), Some(&Value::Object(body)))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IndexGetSettingsRequest {
    index: String,
    #[serde(default)]
    include_defaults: bool,
}

fn index_get_settings_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "include_defaults": boolean_prop("Include default settings in the response"),
        }),
        &["index"],
    )
}

fn index_get_settings(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: IndexGetSettingsRequest = parse_arguments(arguments)?;
        let mut params = QueryParams::new();
        params.push_flag("include_defaults", args.include_defaults);
        let path = join_path(&[Some(&args.index), Some("_settings")]);
        let result = client.get(&path, &params).await.map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IndexPutSettingsRequest {
    index: String,
    settings: Map<String, Value>,
}

fn index_put_settings_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "settings": object_prop("Settings to apply, e.g. index.refresh_interval"),
        }),
        &["index", "settings"],
    )
}

fn index_put_settings(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: IndexPutSettingsRequest = parse_arguments(arguments)?;
        let body = Value::Object(args.settings);
        let path = join_path(&[Some(&args.index), Some("_settings")]);
        let result = client
            .put(&path, &QueryParams::new(), Some(&body))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn index_open(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: IndexNameRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some(&args.index), Some("_open")]);
        let result = client
            .post(&path, &QueryParams::new(), None)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn index_close(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: IndexNameRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some(&args.index), Some("_close")]);
        let result = client
            .post(&path, &QueryParams::new(), None)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn index_refresh(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: OptionalIndexRequest = parse_arguments(arguments)?;
        let path = join_path(&[args.index.as_deref(), Some("_refresh")]);
        let result = client
            .post(&path, &QueryParams::new(), None)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IndexFlushRequest {
    #[serde(default)]
    index: Option<String>,
    #[serde(default)]
    force: bool,
}

fn index_flush_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name; flushes every index when omitted"),
            "force": boolean_prop("Force the flush even when nothing is pending"),
        }),
        &[],
    )
}

fn index_flush(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: IndexFlushRequest = parse_arguments(arguments)?;
        let mut params = QueryParams::new();
        params.push_flag("force", args.force);
        let path = join_path(&[args.index.as_deref(), Some("_flush")]);
        let result = client
            .post(&path, &params, None)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IndexForcemergeRequest {
    #[serde(default)]
    index: Option<String>,
    #[serde(default)]
    max_num_segments: Option<u64>,
    #[serde(default)]
    only_expunge_deletes: bool,
}

fn index_forcemerge_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name; merges every index when omitted"),
            "max_num_segments": integer_prop("Merge down to at most this many segments"),
            "only_expunge_deletes": boolean_prop("Only expunge deleted documents"),
        }),
        &[],
    )
}

fn index_forcemerge(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: IndexForcemergeRequest = parse_arguments(arguments)?;
        let mut params = QueryParams::new();
        params.push_opt(
            "max_num_segments",
            args.max_num_segments.map(|value| value.to_string()),
        );
        params.push_flag("only_expunge_deletes", args.only_expunge_deletes);
        let path = join_path(&[args.index.as_deref(), Some("_forcemerge")]);
        let result = client
            .post(&path, &params, None)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IndexStatsRequest {
    #[serde(default)]
    index: Option<String>,
    #[serde(default)]
    metric: Option<String>,
}

fn index_stats_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name; covers every index when omitted"),
            "metric": string_prop("Metric group, e.g. docs, store, indexing, search, segments"),
        }),
        &[],
    )
}

fn index_stats(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: IndexStatsRequest = parse_arguments(arguments)?;
        let path = join_path(&[
            args.index.as_deref(),
            Some("_stats"),
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
struct IndexRolloverRequest {
    alias: String,
    #[serde(default)]
    conditions: Option<Map<String, Value>>,
    #[serde(default)]
    settings: Option<Map<String, Value>>,
    #[serde(default)]
    mappings: Option<Map<String, Value>>,
}

fn index_rollover_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "alias": string_prop("Write alias to roll over"),
            "conditions": object_prop("Rollover conditions, e.g. max_age, max_docs, max_size"),
            "settings": object_prop("Settings for the new index"),
            "mappings": object_prop("Mappings for the new index"),
        }),
        &["alias"],
    )
}

fn index_rollover(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: IndexRolloverRequest = parse_arguments(arguments)?;
        let mut body = Map::new();
        if let Some(conditions) = args.conditions {
            body.insert("conditions".into(), Value::Object(conditions));
        }
        if let Some(settings) = args.settings {
            body.insert("settings".into(), Value::Object(settings));
        }
        if let Some(mappings) = args.mappings {
            body.insert("mappings".into(), Value::Object(mappings));
        }
        let body = if body.is_empty() {
            None
        } else {
            Some(Value::Object(body))
        };
        let path = join_path(&[Some(&args.alias), Some("_rollover")]);
        let result = client
            .post(&path, &QueryParams::new(), body.as_ref())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IndexCopyRequest {
    source: String,
    target: String,
    #[serde(default)]
    settings: Option<Map<String, Value>>,
}

fn index_copy_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "source": string_prop("Source index; must be read-only"),
            "target": string_prop("Target index to create"),
            "settings": object_prop("Settings for the target index"),
        }),
        &["source", "target"],
    )
}

async fn copy_index(
    client: Arc<EasysearchClient>,
    operation: &'static str,
    args: IndexCopyRequest,
) -> Result<Value, rmcp::ErrorData> {
    let body = args
        .settings
        .map(|settings| json!({ "settings": settings }));
    let path = join_path(&[Some(&args.source), Some(operation), Some(&args.target)]);
    client
        .post(&path, &QueryParams::new(), body.as_ref())
        .await
        .map_err(map_client_error)
}

fn index_clone(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: IndexCopyRequest = parse_arguments(arguments)?;
        let result = copy_index(client, "_clone", args).await?;
        Ok(CallToolResult::structured(result))
    })
}

fn index_split(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: IndexCopyRequest = parse_arguments(arguments)?;
        let result = copy_index(client, "_split", args).await?;
        Ok(CallToolResult::structured(result))
    })
}

fn index_shrink(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: IndexCopyRequest = parse_arguments(arguments)?;
        let result = copy_index(client, "_shrink", args).await?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AliasGetRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    index: Option<String>,
}

fn alias_get_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "name": string_prop("Alias name"),
            "index": string_prop("Index name"),
        }),
        &[],
    )
}

fn alias_get(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: AliasGetRequest = parse_arguments(arguments)?;
        let path = match (args.index.as_deref(), args.name.as_deref()) {
            (Some(index), Some(name)) => join_path(&[Some(index), Some("_alias"), Some(name)]),
            (Some(index), None) => join_path(&[Some(index), Some("_alias")]),
            (None, Some(name)) => join_path(&[Some("_alias"), Some(name)]),
            (None, None) => join_path(&[Some("_alias")]),
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
struct AliasCreateRequest {
    index: String,
    name: String,
    #[serde(default)]
    filter: Option<Map<String, Value>>,
    #[serde(default)]
    routing: Option<String>,
}

fn alias_create_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "name": string_prop("Alias name"),
            "filter": object_prop("Filter restricting the documents visible through the alias"),
            "routing": string_prop("Routing value for the alias"),
        }),
        &["index", "name"],
    )
}

fn alias_create(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: AliasCreateRequest = parse_arguments(arguments)?;
        let mut body = Map::new();
        if let Some(filter) = args.filter {
            body.insert("filter".into(), Value::Object(filter));
        }
        if let Some(routing) = args.routing {
            body.insert("routing".into(), Value::String(routing));
        }
        let body = if body.is_empty() {
            None
        } else {
            Some(Value::Object(body))
        };
        let path = join_path(&[Some(&args.index), Some("_alias"), Some(&args.name)]);
        let result = client
            .put(&path, &QueryParams::new(), body.as_ref())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AliasDeleteRequest {
    index: String,
    name: String,
}

fn alias_delete_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "name": string_prop("Alias name"),
        }),
        &["index", "name"],
    )
}

fn alias_delete(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: AliasDeleteRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some(&args.index), Some("_alias"), Some(&args.name)]);
        let result = client
            .delete(&path, &QueryParams::new(), None)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AliasActionsRequest {
    actions: Vec<Value>,
}

fn alias_actions_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "actions": object_array_prop(
                "Alias actions applied atomically, e.g. {add: {index, alias}} and \
                 {remove: {index, alias}}"
            ),
        }),
        &["actions"],
    )
}

fn alias_actions(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: AliasActionsRequest = parse_arguments(arguments)?;
        let body = json!({ "actions": args.actions });
        let result = client
            .post("/_aliases", &QueryParams::new(), Some(&body))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateGetRequest {
    #[serde(default)]
    name: Option<String>,
}

fn template_get_schema() -> Map<String, Value> {
    object_schema(
        json!({ "name": string_prop("Template name; wildcards are allowed") }),
        &[],
    )
}

fn template_get(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: TemplateGetRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some("_template"), args.name.as_deref()]);
        let result = client
            .get(&path, &QueryParams::new())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateCreateRequest {
    name: String,
    index_patterns: Vec<String>,
    template: Map<String, Value>,
    #[serde(default)]
    priority: Option<i64>,
}

fn template_create_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "name": string_prop("Template name"),
            "index_patterns": string_array_prop("Index patterns the template applies to"),
            "template": object_prop("Template body: mappings, settings, and aliases"),
            "priority": integer_prop("Template precedence when several patterns match"),
        }),
        &["name", "index_patterns", "template"],
    )
}

fn template_create(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: TemplateCreateRequest = parse_arguments(arguments)?;
        // Legacy _template API: the body carries mappings/settings/aliases at
        // the top level and precedence is called `order`.
        let mut body = Map::new();
        body.insert(
            "index_patterns".into(),
            Value::Array(args.index_patterns.into_iter().map(Value::String).collect()),
        );
        for (key, value) in args.template {
            body.insert(key, value);
        }
        if let Some(priority) = args.priority {
            body.insert("order".into(), Value::from(priority));
        }
        let path = join_path(&[Some("_template"), Some(&args.name)]);
        let result = client
            .put(&path, &QueryParams::new(), Some(&Value::Object(body)))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateDeleteRequest {
    name: String,
}

fn template_delete_schema() -> Map<String, Value> {
    object_schema(json!({ "name": string_prop("Template name") }), &["name"])
}

fn template_delete(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: TemplateDeleteRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some("_template"), Some(&args.name)]);
        let result = client
            .delete(&path, &QueryParams::new(), None)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReindexRequest {
    source: Map<String, Value>,
    dest: Map<String, Value>,
    #[serde(default)]
    script: Option<Map<String, Value>>,
    #[serde(default)]
    max_docs: Option<u64>,
}

fn reindex_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "source": object_prop("Source specification: index and optional query"),
            "dest": object_prop("Destination specification: index and optional pipeline"),
            "script": object_prop("Transformation script applied to each document"),
            "max_docs": integer_prop("Stop after copying this many documents"),
        }),
        &["source", "dest"],
    )
}

fn reindex(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: ReindexRequest = parse_arguments(arguments)?;
        let mut body = Map::new();
        body.insert("source".into(), Value::Object(args.source));
        body.insert("dest".into(), Value::Object(args.dest));
        if let Some(script) = args.script {
            body.insert("script".into(), Value::Object(script));
        }
        if let Some(max_docs) = args.max_docs {
            body.insert("max_docs".into(), Value::from(max_docs));
        }
        let result = client
            .post("/_reindex", &QueryParams::new(), Some(&Value::Object(body)))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}
