//! Handlers for search, scroll, and query-analysis tools.

use std::sync::Arc;

use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolResult, JsonObject};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::easysearch::{
    EasysearchClient, QueryParams, join_path,
    shape::{MsearchItem, encode_msearch, reshape_aggregations, reshape_knn, reshape_scroll,
            reshape_search},
};
use crate::mcp::registry::{ToolFuture, ToolSpec};
use crate::mcp::schemas::{
    boolean_prop, integer_prop, number_array_prop, object_array_prop, object_prop, object_schema,
    string_array_prop, string_prop,
};

use super::{map_client_error, parse_arguments, structured};

/// Tool descriptors contributed by this module.
pub(crate) fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec::read_only(
            "search",
            "Search",
            "Run a DSL query and return a trimmed summary of hits and aggregations.",
            search_schema,
            search,
        ),
        ToolSpec::read_only(
            "search_template",
            "Search Template",
            "Run a stored or inline search template with parameters.",
            search_template_schema,
            search_template,
        ),
        ToolSpec::read_only(
            "msearch",
            "Multi-Search",
            "Run several searches in one request as header/body pairs.",
            msearch_schema,
            msearch,
        ),
        ToolSpec::read_only(
            "count",
            "Count Documents",
            "Count documents matching an optional query.",
            count_schema,
            count,
        ),
        ToolSpec::read_only(
            "validate_query",
            "Validate Query",
            "Check query syntax without executing it.",
            validate_query_schema,
            validate_query,
        ),
        ToolSpec::read_only(
            "explain",
            "Explain Match",
            "Explain why a document does or does not match a query, with scoring detail.",
            explain_schema,
            explain,
        ),
        ToolSpec::read_only(
            "aggregate",
            "Aggregate",
            "Run aggregations and return only the aggregation results.",
            aggregate_schema,
            aggregate,
        ),
        ToolSpec::read_only(
            "scroll_start",
            "Start Scroll",
            "Open a scroll cursor over a query and return the first page.",
            scroll_start_schema,
            scroll_start,
        ),
        ToolSpec::read_only(
            "scroll_next",
            "Continue Scroll",
            "Fetch the next page for a scroll cursor.",
            scroll_next_schema,
            scroll_next,
        ),
        ToolSpec::idempotent(
            "scroll_clear",
            "Clear Scroll",
            "Release one scroll cursor, or all of them.",
            scroll_clear_schema,
            scroll_clear,
        ),
        ToolSpec::read_only(
            "field_caps",
            "Field Capabilities",
            "Report per-field types and capabilities across indices.",
            field_caps_schema,
            field_caps,
        ),
        ToolSpec::read_only(
            "knn_search",
            "k-NN Search",
            "Find the nearest neighbors of a query vector.",
            knn_search_schema,
            knn_search,
        ),
        ToolSpec::read_only(
            "sql_query",
            "SQL Query",
            "Run a SQL statement against the cluster.",
            sql_query_schema,
            sql_query,
        ),
        ToolSpec::read_only(
            "sql_translate",
            "Translate SQL",
            "Translate a SQL statement into the equivalent query DSL.",
            sql_translate_schema,
            sql_translate,
        ),
    ]
}

fn default_search_size() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchRequest {
    index: String,
    #[serde(default)]
    query: Option<Map<String, Value>>,
    #[serde(default = "default_search_size")]
    size: u64,
    #[serde(default)]
    from: u64,
    #[serde(default)]
    sort: Option<Vec<Value>>,
    #[serde(default)]
    source: Option<Vec<String>>,
    #[serde(default)]
    aggs: Option<Map<String, Value>>,
    #[serde(default)]
    highlight: Option<Map<String, Value>>,
    #[serde(default = "default_true")]
    track_total_hits: bool,
}

fn search_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name; wildcards and comma-separated lists are allowed"),
            "query": object_prop("Query DSL; matches everything when omitted"),
            "size": integer_prop("Number of hits to return (default 10)"),
            "from": integer_prop("Offset of the first hit (default 0)"),
            "sort": object_array_prop("Sort clauses applied in order"),
            "source": string_array_prop("Source fields to include"),
            "aggs": object_prop("Aggregation definitions"),
            "highlight": object_prop("Highlighting configuration"),
            "track_total_hits": boolean_prop("Count total matches exactly (default true)"),
        }),
        &["index"],
    )
}

fn search(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: SearchRequest = parse_arguments(arguments)?;
        let mut body = Map::new();
        body.insert("size".into(), Value::from(args.size));
        body.insert("from".into(), Value::from(args.from));
        if let Some(query) = args.query {
            body.insert("query".into(), Value::Object(query));
        }
        if let Some(sort) = args.sort {
            body.insert("sort".into(), Value::Array(sort));
        }
        if let Some(source) = args.source {
            body.insert(
                "_source".into(),
                Value::Array(source.into_iter().map(Value::String).collect()),
            );
        }
        if let Some(aggs) = args.aggs {
            body.insert("aggs".into(), Value::Object(aggs));
        }
        if let Some(highlight) = args.highlight {
            body.insert("highlight".into(), Value::Object(highlight));
        }
        body.insert("track_total_hits".into(), Value::Bool(args.track_total_hits));

        let path = join_path(&[Some(&args.index), Some("_search")]);
        let raw = client
            .post(&path, &QueryParams::new(), Some(&Value::Object(body)))
            .await
            .map_err(map_client_error)?;
        let summary = reshape_search(raw).map_err(map_client_error)?;
        structured(&summary)
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchTemplateRequest {
    index: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    params: Option<Map<String, Value>>,
}

fn search_template_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "id": string_prop("Stored template id"),
            "source": string_prop("Inline template source"),
            "params": object_prop("Template parameters"),
        }),
        &["index"],
    )
}

fn search_template(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: SearchTemplateRequest = parse_arguments(arguments)?;
        let mut body = Map::new();
        body.insert(
            "params".into(),
            Value::Object(args.params.unwrap_or_default()),
        );
        if let Some(id) = args.id {
            body.insert("id".into(), Value::String(id));
        }
        if let Some(source) = args.source {
            body.insert("source".into(), Value::String(source));
        }
        let path = join_path(&[Some(&args.index), Some("_search"), Some("template")]);
        let result = client
            .post(&path, &QueryParams::new(), Some(&Value::Object(body)))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MsearchRequest {
    searches: Vec<MsearchItem>,
}

fn msearch_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "searches": object_array_prop(
                "Searches to run; each entry holds a `header` (target index, options) and a \
                 `body` (query)"
            ),
        }),
        &["searches"],
    )
}

fn msearch(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: MsearchRequest = parse_arguments(arguments)?;
        if args.searches.is_empty() {
            return Err(McpError::invalid_params("`searches` must not be empty", None));
        }
        let payload = encode_msearch(&args.searches).map_err(map_client_error)?;
        let result = client
            .post_ndjson("/_msearch", &QueryParams::new(), &payload)
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CountRequest {
    index: String,
    #[serde(default)]
    query: Option<Map<String, Value>>,
}

fn count_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "query": object_prop("Query DSL; counts everything when omitted"),
        }),
        &["index"],
    )
}

fn count(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: CountRequest = parse_arguments(arguments)?;
        let body = args.query.map(|query| json!({ "query": query }));
        let path = join_path(&[Some(&args.index), Some("_count")]);
        let result = client
            .post(&path, &QueryParams::new(), body.as_ref())
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ValidateQueryRequest {
    index: String,
    query: Map<String, Value>,
    #[serde(default)]
    explain: bool,
    #[serde(default)]
    rewrite: bool,
}

fn validate_query_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "query": object_prop("Query DSL to validate"),
            "explain": boolean_prop("Include an explanation for invalid queries"),
            "rewrite": boolean_prop("Return the rewritten form of the query"),
        }),
        &["index", "query"],
    )
}

fn validate_query(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: ValidateQueryRequest = parse_arguments(arguments)?;
        let body = json!({ "query": args.query });
        let mut params = QueryParams::new();
        params.push_flag("explain", args.explain);
        params.push_flag("rewrite", args.rewrite);
        let path = join_path(&[Some(&args.index), Some("_validate"), Some("query")]);
        let result = client
            .post(&path, &params, Some(&body))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExplainRequest {
    index: String,
    id: String,
    query: Map<String, Value>,
}

fn explain_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "id": string_prop("Document id"),
            "query": object_prop("Query DSL to explain against the document"),
        }),
        &["index", "id", "query"],
    )
}

fn explain(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: ExplainRequest = parse_arguments(arguments)?;
        let body = json!({ "query": args.query });
        let path = join_path(&[Some(&args.index), Some("_explain"), Some(&args.id)]);
        let result = client
            .post(&path, &QueryParams::new(), Some(&body))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AggregateRequest {
    index: String,
    aggs: Map<String, Value>,
    #[serde(default)]
    query: Option<Map<String, Value>>,
    #[serde(default)]
    size: u64,
}

fn aggregate_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "aggs": object_prop("Aggregation definitions"),
            "query": object_prop("Optional filter applied before aggregating"),
            "size": integer_prop("Number of hits to return alongside aggregations (default 0)"),
        }),
        &["index", "aggs"],
    )
}

fn aggregate(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: AggregateRequest = parse_arguments(arguments)?;
        let mut body = Map::new();
        body.insert("size".into(), Value::from(args.size));
        body.insert("aggs".into(), Value::Object(args.aggs));
        if let Some(query) = args.query {
            body.insert("query".into(), Value::Object(query));
        }
        let path = join_path(&[Some(&args.index), Some("_search")]);
        let raw = client
            .post(&path, &QueryParams::new(), Some(&Value::Object(body)))
            .await
            .map_err(map_client_error)?;
        let summary = reshape_aggregations(raw).map_err(map_client_error)?;
        Ok(CallToolResult::structured(summary))
    })
}

fn default_scroll_size() -> u64 {
    100
}

fn default_keep_alive() -> String {
    "5m".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScrollStartRequest {
    index: String,
    #[serde(default)]
    query: Option<Map<String, Value>>,
    #[serde(default = "default_scroll_size")]
    size: u64,
    #[serde(default = "default_keep_alive")]
    scroll: String,
    #[serde(default)]
    sort: Option<Vec<Value>>,
}

fn scroll_start_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "query": object_prop("Query DSL; matches everything when omitted"),
            "size": integer_prop("Page size (default 100)"),
            "scroll": string_prop("Cursor keep-alive, e.g. 5m (default)"),
            "sort": object_array_prop("Sort clauses applied in order"),
        }),
        &["index"],
    )
}

fn scroll_start(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: ScrollStartRequest = parse_arguments(arguments)?;
        let mut body = Map::new();
        body.insert("size".into(), Value::from(args.size));
        if let Some(query) = args.query {
            body.insert("query".into(), Value::Object(query));
        }
        if let Some(sort) = args.sort {
            body.insert("sort".into(), Value::Array(sort));
        }
        let mut params = QueryParams::new();
        params.push("scroll", args.scroll);
        let path = join_path(&[Some(&args.index), Some("_search")]);
        let raw = client
            .post(&path, &params, Some(&Value::Object(body)))
            .await
            .map_err(map_client_error)?;
        let page = reshape_scroll(raw, true).map_err(map_client_error)?;
        structured(&page)
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScrollNextRequest {
    scroll_id: String,
    #[serde(default = "default_keep_alive")]
    scroll: String,
}

fn scroll_next_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "scroll_id": string_prop("Cursor token from the previous page"),
            "scroll": string_prop("Cursor keep-alive, e.g. 5m (default)"),
        }),
        &["scroll_id"],
    )
}

fn scroll_next(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: ScrollNextRequest = parse_arguments(arguments)?;
        let body = json!({ "scroll": args.scroll, "scroll_id": args.scroll_id });
        let raw = client
            .post("/_search/scroll", &QueryParams::new(), Some(&body))
            .await
            .map_err(map_client_error)?;
        let page = reshape_scroll(raw, false).map_err(map_client_error)?;
        structured(&page)
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScrollClearRequest {
    #[serde(default)]
    scroll_id: Option<String>,
    #[serde(default)]
    all: bool,
}

fn scroll_clear_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "scroll_id": string_prop("Cursor token to release"),
            "all": boolean_prop("Release every open cursor instead"),
        }),
        &[],
    )
}

fn scroll_clear(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: ScrollClearRequest = parse_arguments(arguments)?;
        let result = if args.all {
            client
                .delete("/_search/scroll/_all", &QueryParams::new(), None)
                .await
        } else {
            let Some(scroll_id) = args.scroll_id else {
                return Err(McpError::invalid_params(
                    "Either `scroll_id` or `all` must be supplied",
                    None,
                ));
            };
            let body = json!({ "scroll_id": [scroll_id] });
            client
                .delete("/_search/scroll", &QueryParams::new(), Some(&body))
                .await
        }
        .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldCapsRequest {
    index: String,
    fields: Vec<String>,
}

fn field_caps_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "fields": string_array_prop("Fields to describe; wildcards are allowed"),
        }),
        &["index", "fields"],
    )
}

fn field_caps(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: FieldCapsRequest = parse_arguments(arguments)?;
        let mut params = QueryParams::new();
        params.push_list("fields", Some(&args.fields));
        let path = join_path(&[Some(&args.index), Some("_field_caps")]);
        let result = client.get(&path, &params).await.map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}

fn default_knn_k() -> u64 {
    10
}

fn default_knn_candidates() -> u64 {
    100
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct KnnSearchRequest {
    index: String,
    field: String,
    query_vector: Vec<f64>,
    #[serde(default = "default_knn_k")]
    k: u64,
    #[serde(default = "default_knn_candidates")]
    num_candidates: u64,
    #[serde(default)]
    filter: Option<Map<String, Value>>,
}

fn knn_search_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "index": string_prop("Index name"),
            "field": string_prop("Dense vector field to search"),
            "query_vector": number_array_prop("Query vector"),
            "k": integer_prop("Number of neighbors to return (default 10)"),
            "num_candidates": integer_prop("Candidates examined per shard (default 100)"),
            "filter": object_prop("Filter applied before the vector search"),
        }),
        &["index", "field", "query_vector"],
    )
}

fn knn_search(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: KnnSearchRequest = parse_arguments(arguments)?;
        let mut knn = Map::new();
        knn.insert("field".into(), Value::String(args.field));
        knn.insert("query_vector".into(), json!(args.query_vector));
        knn.insert("k".into(), Value::from(args.k));
        knn.insert("num_candidates".into(), Value::from(args.num_candidates));
        if let Some(filter) = args.filter {
            knn.insert("filter".into(), Value::Object(filter));
        }
        let body = json!({ "knn": knn });
        let path = join_path(&[Some(&args.index), Some("_search")]);
        let raw = client
            .post(&path, &QueryParams::new(), Some(&body))
            .await
            .map_err(map_client_error)?;
        let summary = reshape_knn(raw).map_err(map_client_error)?;
        Ok(CallToolResult::structured(summary))
    })
}

fn default_sql_format() -> String {
    "json".to_string()
}

fn default_fetch_size() -> u64 {
    1000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SqlQueryRequest {
    query: String,
    #[serde(default = "default_sql_format")]
    format: String,
    #[serde(default = "default_fetch_size")]
    fetch_size: u64,
}

fn sql_query_schema() -> Map<String, Value> {
    object_schema(
        json!({
            "query": string_prop("SQL statement"),
            "format": {
                "type": "string",
                "enum": ["json", "csv", "txt", "yaml"],
                "description": "Response format (default json)"
            },
            "fetch_size": integer_prop("Rows fetched per page (default 1000)"),
        }),
        &["query"],
    )
}

fn sql_query(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: SqlQueryRequest = parse_arguments(arguments)?;
        let body = json!({ "query": args.query, "fetch_size": args.fetch_size });
        let mut params = QueryParams::new();
        params.push("format", args.format.clone());
        if args.format == "json" {
            let result = client
                .post("/_sql", &params, Some(&body))
                .await
                .map_err(map_client_error)?;
            Ok(CallToolResult::structured(result))
        } else {
            let text = client
                .post_text("/_sql", &params, Some(&body))
                .await
                .map_err(map_client_error)?;
            Ok(CallToolResult::structured(
                json!({ "format": args.format, "body": text }),
            ))
        }
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SqlTranslateRequest {
    query: String,
}

fn sql_translate_schema() -> Map<String, Value> {
    object_schema(
        json!({ "query": string_prop("SQL statement to translate") }),
        &["query"],
    )
}

fn sql_translate(client: Arc<EasysearchClient>, arguments: Option<JsonObject>) -> ToolFuture {
    Box::pin(async move {
        let args: SqlTranslateRequest = parse_arguments(arguments)?;
        let body = json!({ "query": args.query });
        let result = client
            .post("/_sql/translate", &QueryParams::new(), Some(&body))
            .await
            .map_err(map_client_error)?;
        Ok(CallToolResult::structured(result))
    })
}
