//! Handlers for ingest pipeline management and simulation tools.

use std::sync::Arc;

use rmcp::model::{CallToolResult, JsonObject};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::easysearch::{EasysearchClient, QueryParams, join_path};
use crate::mcp::registry::{ToolFuture, ToolSpec};
use crate::mcp::schemas::{
    boolean_prop, object_array_prop, object_prop, object_schema, string_prop,
};

use super::{map_client_error, parse_arguments};

/// Tool descriptors contributed by this module.
pub(crate) fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec::read_only(
            "pipeline_get",
            "Get Pipelines",
            "Fetch ingest pipelines, optionally by id or pattern.",
            pipeline_get_schema,
            pipeline_get,
        ),
        ToolSpec::idempotent(
            "pipeline_create",
            "Create Pipeline",
            "Create or replace an ingest pipeline from a processor list.",
            pipeline_create_schema,
            pipeline_create,
        ),
        ToolSpec::destructive(
            "pipeline_delete",
            "Delete Pipeline",
            "Delete an ingest pipeline.",
            pipeline_delete_schema,
            pipeline_delete,
        ),
        ToolSpec::read_only(
            "pipeline_simulate",
            "Simulate Pipeline",
            "Run test documents through a stored or inline pipeline.",
            pipeline_simulate_schema,
            pipeline_simulate,
        ),
        ToolSpec::read_only(
            "ingest_stats",
            "Ingest Stats",
            "Report per-pipeline ingest statistics from the nodes.",
            ingest_stats_schema,
            ingest_stats,
        ),
    ]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PipelineGetRequest {
    #[serde(default)]
    id: Option<String>,
}

fn pipeline_get_schema() -> Map<String, Value> {
    object_schema(
        json!({ "id": string_prop("Pipeline id or pattern; every pipeline when omitted") }),
        &[],
    )
}

fn pipeline_get(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: PipelineGetRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some("_ingest"), Some("pipeline"), args.id.as_deref()]);
        let result = client
            .get(&path, &QueryParams::new())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PipelineCreateRequest {
    id: String,
    description: String,
    processors: Vec<Value>,
    #[serde(default)]
    on_failure: Option<Vec<Value>>,
}

fn pipeline_create_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "id": string_prop("Pipeline id"),
            "description": string_prop("What the pipeline does"),
            "processors": object_array_prop(
                "Processors applied in order, e.g. set, rename, grok, date, script"
            ),
            "on_failure": object_array_prop("Processors run when one of the others fails"),
        }),
        &["id", "description", "processors"],
    )
}

fn pipeline_create(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: PipelineCreateRequest = parse_arguments(arguments)?;
        let mut body = Map::new();
        body.insert("description".into(), Value::String(args.description));
        body.insert("processors".into(), Value::Array(args.processors));
        if let Some(on_failure) = args.on_failure {
            body.insert("on_failure".into(), Value::Array(on_failure));
        }
        let path = join_path(&[Some("_ingest"), Some("pipeline"), Some(&args.id)]);
        let result = client
            .put(&path, &QueryParams::new(), Some(&Value::Object(body)))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PipelineDeleteRequest {
    id: String,
}

fn pipeline_delete_schema() -> Map<String, Value> {
    object_schema(json!({ "id": string_prop("Pipeline id") }), &["id"])
}

fn pipeline_delete(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: PipelineDeleteRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some("_ingest"), Some("pipeline"), Some(&args.id)]);
        let result = client
            .delete(&path, &QueryParams::new(), None)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PipelineSimulateRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    pipeline: Option<Map<String, Value>>,
    #[serde(default)]
    docs: Vec<Value>,
    #[serde(default)]
    verbose: bool,
}

fn pipeline_simulate_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "id": string_prop("Stored pipeline id to simulate"),
            "pipeline": object_prop("Inline pipeline definition to simulate"),
            "docs": object_array_prop("Test documents, each wrapped as {_source: {...}}"),
            "verbose": boolean_prop("Report the output of every processor"),
        }),
        &[],
    )
}

fn pipeline_simulate(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: PipelineSimulateRequest = parse_arguments(arguments)?;
        let mut body = Map::new();
        body.insert("docs".into(), Value::Array(args.docs));
        if let Some(pipeline) = args.pipeline {
            body.insert("pipeline".into(), Value::Object(pipeline));
        }
        let mut params = QueryParams::new();
        params.push_flag("verbose", args.verbose);
        let path = match args.id.as_deref() {
            Some(id) => join_path(&[Some("_ingest"), Some("pipeline"), Some(id), Some("_simulate")]),
            None => join_path(&[Some("_ingest"), Some("pipeline"), Some("_simulate")]),
        };
        let result = client
            .post(&path, &params, Some(&Value::Object(body)))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IngestStatsRequest {
    #[serde(default)]
    node_id: Option<String>,
}

fn ingest_stats_schema() -> Map<String, Value> {
    object_schema(
        json!({ "node_id": string_prop("Node id; covers every node when omitted") }),
        &[],
    )
}

fn ingest_stats(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: IngestStatsRequest = parse_arguments(arguments)?;
        let path = join_path(&[
            Some("_nodes"),
            args.node_id.as_deref(),
            Some("stats"),
            Some("ingest"),
        ]);
        let result = client
            .get(&path, &QueryParams::new())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}
