use std::sync::Arc;

use easysearch_mcp::{
    config::{self, ConfigOverrides},
    easysearch::EasysearchClient,
    logging,
    mcp::EasysearchMcpServer,
};
use httpmock::{
    Method::{DELETE, GET, POST, PUT},
    MockServer,
};
use rmcp::{
    handler::client::ClientHandler,
    model::{self, CallToolRequestParam, ClientInfo, PaginatedRequestParam,
            ReadResourceRequestParam},
    service::{RoleClient, RoleServer, RunningService, Service, serve_directly},
    transport::async_rw::AsyncRwTransport,
};
use serde_json::json;
use tokio::{io::split, sync::OnceCell};

static INIT: OnceCell<()> = OnceCell::const_new();
static MOCK_SERVER: OnceCell<&'static MockServer> = OnceCell::const_new();

#[derive(Clone, Default)]
struct DummyClientHandler;

impl ClientHandler for DummyClientHandler {
    fn get_info(&self) -> ClientInfo {
        ClientInfo::default()
    }
}

struct TestHarness {
    service: RunningService<RoleClient, DummyClientHandler>,
    server: RunningService<RoleServer, EasysearchMcpServer>,
}

impl TestHarness {
    async fn new() -> Self {
        INIT.get_or_init(|| async {
            let mock_server_owned = MockServer::start_async().await;
            let mock_server = Box::leak(Box::new(mock_server_owned));
            MOCK_SERVER.set(mock_server).ok();
            register_cluster_mocks(mock_server).await;

            logging::init_tracing();
            config::init_config(ConfigOverrides {
                endpoint: Some(mock_server.base_url()),
                username: Some("admin".into()),
                password: Some("admin-secret".into()),
                verify_tls: Some(false),
                timeout_secs: Some(5),
            })
            .expect("test configuration");
        })
        .await;

        let config = config::get_config();
        let client = Arc::new(EasysearchClient::new(config).expect("client"));
        let server = EasysearchMcpServer::new(client);

        let (client_stream, server_stream) = tokio::io::duplex(16 * 1024);
        let (client_read, client_write) = split(client_stream);
        let (server_read, server_write) = split(server_stream);

        let client_transport = AsyncRwTransport::new_client(client_read, client_write);
        let server_transport = AsyncRwTransport::new_server(server_read, server_write);

        let server_info = server.get_info();
        let client_handler = DummyClientHandler;
        let client_info = ClientHandler::get_info(&client_handler);

        let server =
            serve_directly::<RoleServer, _, _, _, _>(server, server_transport, Some(client_info));
        let service = serve_directly::<RoleClient, _, _, _, _>(
            client_handler,
            client_transport,
            Some(server_info),
        );

        Self { service, server }
    }

    async fn shutdown(self) {
        let Self { service, server } = self;
        let _ = service.cancel().await;
        let _ = server.cancel().await;
    }
}

fn hit(id: u64) -> serde_json::Value {
    json!({ "_index": "products", "_id": id.to_string(), "_source": { "n": id } })
}

async fn register_cluster_mocks(server: &'static MockServer) {
    // Document write then read.
    server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/products/_doc/1")
                .json_body(json!({ "name": "A" }));
            then.status(201).json_body(json!({
                "_index": "products",
                "_id": "1",
                "result": "created",
                "_version": 1
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/products/_doc/1");
            then.status(200).json_body(json!({
                "_index": "products",
                "_id": "1",
                "found": true,
                "_source": { "name": "A" }
            }));
        })
        .await;

    // Version conflict used to assert error propagation.
    server
        .mock_async(|when, then| {
            when.method(PUT).path("/products/_doc/conflict");
            then.status(409)
                .body("{\"error\":{\"type\":\"version_conflict_engine_exception\"}}");
        })
        .await;

    // Plain search over five documents.
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/products/_search")
                .json_body_partial(r#"{ "from": 0 }"#);
            then.status(200).json_body(json!({
                "took": 4,
                "timed_out": false,
                "hits": {
                    "total": { "value": 3, "relation": "eq" },
                    "max_score": 1.2,
                    "hits": [
                        { "_index": "products", "_id": "1", "_score": 1.2, "_source": { "name": "A" } },
                        { "_index": "products", "_id": "2", "_score": 0.8, "_source": { "name": "B" } }
                    ]
                }
            }));
        })
        .await;

    // Scroll lifecycle: 5 documents in pages of 2, then an expired cursor.
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/products/_search")
                .query_param("scroll", "1m");
            then.status(200).json_body(json!({
                "_scroll_id": "cursor-1",
                "hits": {
                    "total": { "value": 5 },
                    "hits": [hit(1), hit(2)]
                }
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/_search/scroll")
                .json_body_partial(r#"{ "scroll_id": "cursor-1" }"#);
            then.status(200).json_body(json!({
                "_scroll_id": "cursor-2",
                "hits": { "hits": [hit(3), hit(4)] }
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/_search/scroll")
                .json_body_partial(r#"{ "scroll_id": "cursor-2" }"#);
            then.status(200).json_body(json!({
                "_scroll_id": "cursor-3",
                "hits": { "hits": [hit(5)] }
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/_search/scroll")
                .json_body_partial(r#"{ "scroll_id": ["cursor-3"] }"#);
            then.status(200)
                .json_body(json!({ "succeeded": true, "num_freed": 1 }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/_search/scroll")
                .json_body_partial(r#"{ "scroll_id": "cursor-3" }"#);
            then.status(404)
                .body("{\"error\":{\"type\":\"search_context_missing_exception\"}}");
        })
        .await;

    // Cluster health backing the health resource.
    server
        .mock_async(|when, then| {
            when.method(GET).path("/_cluster/health");
            then.status(200).json_body(json!({
                "cluster_name": "demo",
                "status": "green",
                "number_of_nodes": 1
            }));
        })
        .await;
}

fn arguments(value: serde_json::Value) -> Option<model::JsonObject> {
    Some(value.as_object().expect("arguments object").clone())
}

#[tokio::test]
async fn initialize_and_list_tools() {
    let harness = TestHarness::new().await;
    let service = &harness.service;

    let info = service
        .peer_info()
        .expect("server info should be initialized");
    assert_eq!(info.server_info.name, "easysearch-mcp");
    assert!(info.capabilities.tools.is_some());

    let tools_result = service
        .list_tools(Some(PaginatedRequestParam { cursor: None }))
        .await
        .expect("list_tools");

    let names: Vec<_> = tools_result
        .tools
        .iter()
        .map(|tool| tool.name.as_ref())
        .collect();

    for expected in [
        "cluster_health",
        "index_create",
        "doc_index",
        "doc_bulk",
        "search",
        "scroll_start",
        "cat_indices",
        "nodes_stats",
        "snapshot_create",
        "slm_policy_get",
        "pipeline_simulate",
        "tasks_cancel",
    ] {
        assert!(names.contains(&expected), "missing tool: {expected}");
    }

    // Listing is name-sorted for deterministic paging.
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);

    harness.shutdown().await;
}

#[tokio::test]
async fn document_write_then_read_round_trip() {
    let harness = TestHarness::new().await;
    let service = &harness.service;

    let write = service
        .call_tool(CallToolRequestParam {
            name: "doc_index".into(),
            arguments: arguments(json!({
                "index": "products",
                "id": "1",
                "document": { "name": "A" }
            })),
        })
        .await
        .expect("doc_index call");
    assert_eq!(write.is_error, Some(false));
    let written = write.structured_content.expect("structured write payload");
    assert_eq!(written["result"], "created");

    let read = service
        .call_tool(CallToolRequestParam {
            name: "doc_get".into(),
            arguments: arguments(json!({ "index": "products", "id": "1" })),
        })
        .await
        .expect("doc_get call");
    let fetched = read.structured_content.expect("structured read payload");
    assert_eq!(fetched["_source"], json!({ "name": "A" }));

    harness.shutdown().await;
}

#[tokio::test]
async fn search_reshapes_hits_and_total() {
    let harness = TestHarness::new().await;
    let service = &harness.service;

    let response = service
        .call_tool(CallToolRequestParam {
            name: "search".into(),
            arguments: arguments(json!({
                "index": "products",
                "query": { "match": { "name": "a" } }
            })),
        })
        .await
        .expect("search call");

    let payload = response.structured_content.expect("structured payload");
    assert_eq!(payload["total"], 3);
    assert_eq!(payload["hits"].as_array().expect("hits").len(), 2);
    assert_eq!(payload["hits"][0]["_id"], "1");
    assert_eq!(payload["hits"][0]["_score"], 1.2);
    assert_eq!(payload["hits"][0]["_source"], json!({ "name": "A" }));
    assert_eq!(payload["hits"][1]["_id"], "2");

    harness.shutdown().await;
}

#[tokio::test]
async fn scroll_lifecycle_pages_then_expires() {
    let harness = TestHarness::new().await;
    let service = &harness.service;

    let first = service
        .call_tool(CallToolRequestParam {
            name: "scroll_start".into(),
            arguments: arguments(json!({ "index": "products", "size": 2, "scroll": "1m" })),
        })
        .await
        .expect("scroll_start call");
    let first_page = first.structured_content.expect("first page");
    assert_eq!(first_page["scroll_id"], "cursor-1");
    assert_eq!(first_page["total"], 5);
    assert_eq!(first_page["hits"].as_array().expect("hits").len(), 2);

    let second = service
        .call_tool(CallToolRequestParam {
            name: "scroll_next".into(),
            arguments: arguments(json!({ "scroll_id": "cursor-1", "scroll": "1m" })),
        })
        .await
        .expect("scroll_next call");
    let second_page = second.structured_content.expect("second page");
    assert_eq!(second_page["scroll_id"], "cursor-2");
    assert_eq!(second_page["hits"].as_array().expect("hits").len(), 2);

    let third = service
        .call_tool(CallToolRequestParam {
            name: "scroll_next".into(),
            arguments: arguments(json!({ "scroll_id": "cursor-2", "scroll": "1m" })),
        })
        .await
        .expect("scroll_next call");
    let third_page = third.structured_content.expect("third page");
    assert_eq!(third_page["scroll_id"], "cursor-3");
    assert_eq!(third_page["hits"].as_array().expect("hits").len(), 1);

    let cleared = service
        .call_tool(CallToolRequestParam {
            name: "scroll_clear".into(),
            arguments: arguments(json!({ "scroll_id": "cursor-3" })),
        })
        .await
        .expect("scroll_clear call");
    let cleared_payload = cleared.structured_content.expect("clear payload");
    assert_eq!(cleared_payload["succeeded"], true);

    let expired = service
        .call_tool(CallToolRequestParam {
            name: "scroll_next".into(),
            arguments: arguments(json!({ "scroll_id": "cursor-3", "scroll": "1m" })),
        })
        .await
        .expect_err("expired cursor should fail");
    match expired {
        rmcp::service::ServiceError::McpError(data) => {
            assert!(data.message.contains("404"), "message: {}", data.message);
            assert!(data.message.contains("search_context_missing_exception"));
        }
        other => panic!("expected MCP error, got {other:?}"),
    }

    harness.shutdown().await;
}

#[tokio::test]
async fn remote_conflict_surfaces_status_and_body() {
    let harness = TestHarness::new().await;
    let service = &harness.service;

    let err = service
        .call_tool(CallToolRequestParam {
            name: "doc_index".into(),
            arguments: arguments(json!({
                "index": "products",
                "id": "conflict",
                "document": { "name": "B" }
            })),
        })
        .await
        .expect_err("conflict should fail");

    match err {
        rmcp::service::ServiceError::McpError(data) => {
            assert_eq!(data.code, model::ErrorCode::INTERNAL_ERROR);
            assert!(data.message.contains("409"), "message: {}", data.message);
            assert!(data.message.contains("version_conflict_engine_exception"));
        }
        other => panic!("expected MCP error, got {other:?}"),
    }

    harness.shutdown().await;
}

#[tokio::test]
async fn invalid_arguments_are_rejected_before_any_request() {
    let harness = TestHarness::new().await;
    let service = &harness.service;

    let err = service
        .call_tool(CallToolRequestParam {
            name: "doc_bulk".into(),
            arguments: arguments(json!({ "operations": [] })),
        })
        .await
        .expect_err("empty bulk should fail");

    match err {
        rmcp::service::ServiceError::McpError(data) => {
            assert_eq!(data.code, model::ErrorCode::INVALID_PARAMS);
        }
        other => panic!("expected MCP error, got {other:?}"),
    }

    harness.shutdown().await;
}

#[tokio::test]
async fn resources_report_health_and_elide_the_secret() {
    let harness = TestHarness::new().await;
    let service = &harness.service;

    let resources = service
        .list_resources(Some(PaginatedRequestParam { cursor: None }))
        .await
        .expect("list_resources");
    let uris: Vec<_> = resources
        .resources
        .iter()
        .map(|resource| resource.uri.as_str())
        .collect();
    assert!(uris.contains(&"mcp://health"));
    assert!(uris.contains(&"mcp://settings"));

    let health = service
        .read_resource(ReadResourceRequestParam {
            uri: "mcp://health".into(),
        })
        .await
        .expect("read health resource");
    let health_text = match &health.contents[0] {
        model::ResourceContents::TextResourceContents { text, .. } => text.clone(),
        other => panic!("expected text contents, got {other:?}"),
    };
    assert!(health_text.contains("\"reachable\": true"));
    assert!(health_text.contains("green"));

    let settings = service
        .read_resource(ReadResourceRequestParam {
            uri: "mcp://settings".into(),
        })
        .await
        .expect("read settings resource");
    let settings_text = match &settings.contents[0] {
        model::ResourceContents::TextResourceContents { text, .. } => text.clone(),
        other => panic!("expected text contents, got {other:?}"),
    };
    assert!(settings_text.contains("\"password_set\": true"));
    assert!(!settings_text.contains("admin-secret"));

    harness.shutdown().await;
}
