//! Handlers for document CRUD, bulk, and multi-get tools.

use std::sync::Arc;

use rmcp::model::{CallToolResult, JsonObject};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::easysearch::{
    EasysearchClient, QueryParams, join_path,
    shape::{encode_bulk, encode_bulk_index, summarize_bulk},
};
use crate::mcp::registry::{ToolFuture, ToolSpec};
use crate::mcp::schemas::{
    boolean_prop, object_array_prop, object_prop, object_schema, string_array_prop, string_prop,
};
use rmcp::ErrorData as McpError;

use super::{map_client_error, parse_arguments, structured};

/// Tool descriptors contributed by this module.
pub(crate) fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec::mutating(
            "doc_index",
            "Index Document",
            "Write a document into an index; replaces an existing document when an id is given.",
            doc_index_schema,
            doc_index,
        ),
        ToolSpec::read_only(
            "doc_get",
            "Get Document",
            "Fetch a document by id, optionally selecting source fields.",
            doc_get_schema,
            doc_get,
        ),
        ToolSpec::read_only(
            "doc_exists",
            "Document Exists",
            "Check whether a document exists without fetching its body.",
            doc_exists_schema,
            doc_exists,
        ),
        ToolSpec::destructive(
            "doc_delete",
            "Delete Document",
            "Delete a document by id.",
            doc_delete_schema,
            doc_delete,
        ),
        ToolSpec::mutating(
            "doc_update",
            "Update Document",
            "Partially update a document with fields, a script, or an upsert body.",
            doc_update_schema,
            doc_update,
        ),
        ToolSpec::mutating(
            "doc_bulk",
            "Bulk Operations",
            "Apply an ordered list of index/create/update/delete operations in one request.",
            doc_bulk_schema,
            doc_bulk,
        ),
        ToolSpec::mutating(
            "doc_bulk_index",
            "Bulk Index Documents",
            "Index a list of documents into one index in a single bulk request.",
            doc_bulk_index_schema,
            doc_bulk_index,
        ),
        ToolSpec::read_only(
            "doc_mget",
            "Multi-Get Documents",
            "Fetch several documents in one request, by docs list or by index plus ids.",
            doc_mget_schema,
            doc_mget,
        ),
        ToolSpec::destructive(
            "doc_delete_by_query",
            "Delete By Query",
            "Delete every document matching a query.",
            doc_delete_by_query_schema,
            doc_delete_by_query,
        ),
        ToolSpec::mutating(
            "doc_update_by_query",
            "Update By Query",
            "Update every document matching a query, optionally via script.",
            doc_update_by_query_schema,
            doc_update_by_query,
        ),
        ToolSpec::read_only(
            "doc_source",
            "Get Document Source",
            "Fetch only a document's source, without index metadata.",
            doc_source_schema,
            doc_source,
        ),
    ]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocIndexRequest {
    index: String,
    document: Map<String, Value>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    refresh: Option<String>,
    #[serde(default)]
    routing: Option<String>,
}

fn doc_index_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "document": object_prop("Document contents"),
            "id": string_prop("Document id; autogenerated when omitted"),
            "refresh": string_prop("Refresh policy: true, false, or wait_for"),
            "routing": string_prop("Routing value"),
        }),
        &["index", "document"],
    )
}

fn doc_index(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: DocIndexRequest = parse_arguments(arguments)?;
        let mut params = QueryParams::new();
        params.push_opt("refresh", args.refresh);
        params.push_opt("routing", args.routing);
        let body = Value::Object(args.document);
        let result = match args.id.as_deref() {
            Some(id) => {
                let path = join_path(&[Some(&args.index), Some("_doc"), Some(id)]);
                client.put(&path, &params, Some(&body)).await
            }
            None => {
                let path = join_path(&[Some(&args.index), Some("_doc")]);
                client.post(&path, &params, Some(&body)).await
            }
        }
        .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocGetRequest {
    index: String,
    id: String,
    #[serde(default)]
    source: Option<Vec<String>>,
    #[serde(default)]
    source_excludes: Option<Vec<String>>,
    #[serde(default)]
    routing: Option<String>,
}

fn doc_get_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "id": string_prop("Document id"),
            "source": string_array_prop("Source fields to include"),
            "source_excludes": string_array_prop("Source fields to exclude"),
            "routing": string_prop("Routing value"),
        }),
        &["index", "id"],
    )
}

fn doc_get(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: DocGetRequest = parse_arguments(arguments)?;
        let mut params = QueryParams::new();
        params.push_list("_source", args.source.as_deref());
        params.push_list("_source_excludes", args.source_excludes.as_deref());
        params.push_opt("routing", args.routing);
        let path = join_path(&[Some(&args.index), Some("_doc"), Some(&args.id)]);
        let result = client.get(&path, &params).await.map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocExistsRequest {
    index: String,
    id: String,
}

fn doc_exists_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "id": string_prop("Document id"),
        }),
        &["index", "id"],
    )
}

fn doc_exists(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: DocExistsRequest = parse_arguments(arguments)?;
        let path = join_path(&[Some(&args.index), Some("_doc"), Some(&args.id)]);
        let exists = client.head(&path).await.map_err(map_client_error)?;
        Ok(CallToolResult::structured(json!({ "exists": exists })))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocDeleteRequest {
    index: String,
    id: String,
    #[serde(default)]
    refresh: Option<String>,
    #[serde(default)]
    routing: Option<String>,
}

fn doc_delete_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "id": string_prop("Document id"),
            "refresh": string_prop("Refresh policy: true, false, or wait_for"),
            "routing": string_prop("Routing value"),
        }),
        &["index", "id"],
    )
}

fn doc_delete(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: DocDeleteRequest = parse_arguments(arguments)?;
        let mut params = QueryParams::new();
        params.push_opt("refresh", args.refresh);
        params.push_opt("routing", args.routing);
        let path = join_path(&[Some(&args.index), Some("_doc"), Some(&args.id)]);
        let result = client
            .delete(&path, &params, None)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocUpdateRequest {
    index: String,
    id: String,
    #[serde(default)]
    doc: Option<Map<String, Value>>,
    #[serde(default)]
    script: Option<Map<String, Value>>,
    #[serde(default)]
    upsert: Option<Map<String, Value>>,
    #[serde(default)]
    refresh: Option<String>,
}

fn doc_update_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "id": string_prop("Document id"),
            "doc": object_prop("Fields to merge into the document"),
            "script": object_prop("Update script with source and params"),
            "upsert": object_prop("Document to insert when the id does not exist"),
            "refresh": string_prop("Refresh policy: true, false, or wait_for"),
        }),
        &["index", "id"],
    )
}

fn doc_update(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: DocUpdateRequest = parse_arguments(arguments)?;
        if args.doc.is_none() && args.script.is_none() {
            return Err(McpError::invalid_params(
                "Either `doc` or `script` must be supplied",
                None,
            ));
        }
        let mut body = Map::new();
        if let Some(doc) = args.doc {
            body.insert("doc".into(), Value::Object(doc));
        }
        if let Some(script) = args.script {
            body.insert("script".into(), Value::Object(script));
        }
        if let Some(upsert) = args.upsert {
            body.insert("upsert".into(), Value::Object(upsert));
        }
        let mut params = QueryParams::new();
        params.push_opt("refresh", args.refresh);
        let path = join_path(&[Some(&args.index), Some("_update"), Some(&args.id)]);
        let result = client
            .post(&path, &params, Some(&Value::Object(body)))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocBulkRequest {
    operations: Vec<Map<String, Value>>,
    #[serde(default)]
    refresh: Option<String>,
}

fn doc_bulk_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "operations": object_array_prop(
                "Ordered operations; each carries action metadata (index/create/update/delete \
                 with _index/_id) plus a `doc` payload for non-delete actions"
            ),
            "refresh": string_prop("Refresh policy: true, false, or wait_for"),
        }),
        &["operations"],
    )
}

fn doc_bulk(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: DocBulkRequest = parse_arguments(arguments)?;
        if args.operations.is_empty() {
            return Err(McpError::invalid_params(
                "`operations` must not be empty",
                None,
            ));
        }
        let payload = encode_bulk(&args.operations).map_err(map_client_error)?;
        let mut params = QueryParams::new();
        params.push_opt("refresh", args.refresh);
        let result = client
            .post_ndjson("/_bulk", &params, &payload)
            .await
            .map_err(map_client_error)?;
        structured(&summarize_bulk(&result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocBulkIndexRequest {
    index: String,
    documents: Vec<Value>,
    #[serde(default)]
    refresh: Option<String>,
}

fn doc_bulk_index_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "documents": object_array_prop("Documents to index, in order"),
            "refresh": string_prop("Refresh policy: true, false, or wait_for"),
        }),
        &["index", "documents"],
    )
}

fn doc_bulk_index(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: DocBulkIndexRequest = parse_arguments(arguments)?;
        if args.documents.is_empty() {
            return Err(McpError::invalid_params(
                "`documents` must not be empty",
                None,
            ));
        }
        let payload = encode_bulk_index(&args.index, &args.documents).map_err(map_client_error)?;
        let mut params = QueryParams::new();
        params.push_opt("refresh", args.refresh);
        let result = client
            .post_ndjson("/_bulk", &params, &payload)
            .await
            .map_err(map_client_error)?;
        structured(&summarize_bulk(&result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocMgetRequest {
    #[serde(default)]
    docs: Option<Vec<Value>>,
    #[serde(default)]
    index: Option<String>,
    #[serde(default)]
    ids: Option<Vec<String>>,
    #[serde(default)]
    source: Option<Vec<String>>,
}

fn doc_mget_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "docs": object_array_prop("Explicit doc references with _index and _id"),
            "index": string_prop("Default index, combined with ids"),
            "ids": string_array_prop("Document ids within the default index"),
            "source": string_array_prop("Source fields to include"),
        }),
        &[],
    )
}

fn doc_mget(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: DocMgetRequest = parse_arguments(arguments)?;
        let mut body = Map::new();
        if let Some(docs) = args.docs {
            body.insert("docs".into(), Value::Array(docs));
        }
        if let Some(ids) = args.ids {
            body.insert(
                "ids".into(),
                Value::Array(ids.into_iter().map(Value::String).collect()),
            );
        }
        if let Some(source) = args.source {
            body.insert(
                "_source".into(),
                Value::Array(source.into_iter().map(Value::String).collect()),
            );
        }
        let path = join_path(&[args.index.as_deref(), Some("_mget")]);
        let result = client
            .post(&path, &QueryParams::new(), Some(&Value::Object(body)))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocDeleteByQueryRequest {
    index: String,
    query: Map<String, Value>,
    #[serde(default)]
    refresh: bool,
    #[serde(default = "default_conflicts")]
    conflicts: String,
}

fn default_conflicts() -> String {
    "abort".to_string()
}

fn doc_delete_by_query_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "query": object_prop("Query selecting the documents to delete"),
            "refresh": boolean_prop("Refresh the index after the deletion"),
            "conflicts": string_prop("Version conflict handling: abort or proceed"),
        }),
        &["index", "query"],
    )
}

fn doc_delete_by_query(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: DocDeleteByQueryRequest = parse_arguments(arguments)?;
        let body = json!({ "query": args.query });
        let mut params = QueryParams::new();
        params.push_bool("refresh", args.refresh);
        params.push("conflicts", args.conflicts);
        let path = join_path(&[Some(&args.index), Some("_delete_by_query")]);
        let result = client
            .post(&path, &params, Some(&body))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocUpdateByQueryRequest {
    index: String,
    #[serde(default)]
    query: Option<Map<String, Value>>,
    #[serde(default)]
    script: Option<Map<String, Value>>,
    #[serde(default)]
    refresh: bool,
}

fn doc_update_by_query_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "query": object_prop("Query selecting the documents; all documents when omitted"),
            "script": object_prop("Script applied to each matching document"),
            "refresh": boolean_prop("Refresh the index after the update"),
        }),
        &["index"],
    )
}

fn doc_update_by_query(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: DocUpdateByQueryRequest = parse_arguments(arguments)?;
        let mut body = Map::new();
        if let Some(query) = args.query {
            body.insert("query".into(), Value::Object(query));
        }
        if let Some(script) = args.script {
            body.insert("script".into(), Value::Object(script));
        }
        let body = if body.is_empty() {
            None
        } else {
            Some(Value::Object(body))
        };
        let mut params = QueryParams::new();
        params.push_bool("refresh", args.refresh);
        let path = join_path(&[Some(&args.index), Some("_update_by_query")]);
        let result = client
            .post(&path, &params, body.as_ref())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocSourceRequest {
    index: String,
    id: String,
    #[serde(default)]
    source: Option<Vec<String>>,
}

fn doc_source_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "id": string_prop("Document id"),
            "source": string_array_prop("Source fields to include"),
        }),
        &["index", "id"],
    )
}

fn doc_source(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: DocSourceRequest = parse_arguments(arguments)?;
        let mut params = QueryParams::new();
        params.push_list("_source", args.source.as_deref());
        let path = join_path(&[Some(&args.index), Some("_source"), Some(&args.id)]);
        let result = client.get(&path, &params).await.map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_update_requires_doc_or_script() {
        let raw: JsonObject = json!({ "index": "products", "id": "1" })
            .as_object()
            .expect("object")
            .clone();
        let args: DocUpdateRequest = parse_arguments(Some(raw)).expect("parse");
        assert!(args.doc.is_none() && args.script.is_none());
    }

    #[test]
    fn doc_delete_by_query_defaults_to_abort_on_conflicts() {
        let raw: JsonObject = json!({ "index": "logs", "query": { "match_all": {} } })
            .as_object()
            .expect("object")
            .clone();
        let args: DocDeleteByQueryRequest = parse_arguments(Some(raw)).expect("parse");
        assert_eq!(args.conflicts, "abort");
        assert!(!args.refresh);
    }

    #[test]
    fn unknown_argument_keys_are_rejected() {
        let raw: JsonObject = json!({ "index": "products", "id": "1", "bogus": true })
            .as_object()
            .expect("object")
            .clone();
        let error = parse_arguments::<DocGetRequest>(Some(raw)).unwrap_err();
        assert_eq!(error.code, rmcp::model::ErrorCode::INVALID_PARAMS);
    }
}
