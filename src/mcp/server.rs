//! MCP server bootstrap and request dispatch.

use std::{borrow::Cow, sync::Arc};

use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::{
        AnnotateAble, CallToolRequestParam, CallToolResult, ListResourcesResult, ListToolsResult,
        RawResource, ReadResourceRequestParam, ReadResourceResult, Resource, ServerCapabilities,
        ServerInfo, Tool, ToolAnnotations,
    },
};
use serde_json::json;

use crate::{
    config::get_config,
    easysearch::{EasysearchClient, QueryParams},
    mcp::{
        format::{SettingsSnapshot, json_resource_contents, serialize_json},
        handlers, registry,
    },
};

const HEALTH_URI: &str = "mcp://health";
const SETTINGS_URI: &str = "mcp://settings";

/// MCP server implementation exposing Easysearch operations.
#[derive(Clone)]
pub struct EasysearchMcpServer {
    client: Arc<EasysearchClient>,
    registry: Arc<registry::Registry>,
}

impl EasysearchMcpServer {
    /// Create a new MCP server using the supplied cluster client.
    pub fn new(client: Arc<EasysearchClient>) -> Self {
        let mut registry = registry::Registry::new();
        registry.register_all(handlers::cluster::specs());
        registry.register_all(handlers::indices::specs());
        registry.register_all(handlers::documents::specs());
        registry.register_all(handlers::search::specs());
        registry.register_all(handlers::cat::specs());
        registry.register_all(handlers::nodes::specs());
        registry.register_all(handlers::snapshot::specs());
        registry.register_all(handlers::ingest::specs());
        registry.register_all(handlers::tasks::specs());
        tracing::debug!(tools = registry.tools.len(), "Registered tool specs");

        Self {
            client,
            registry: Arc::new(registry),
        }
    }

    fn describe_tools(&self) -> Vec<Tool> {
        let mut specs: Vec<&registry::ToolSpec> = self.registry.tools.values().collect();
        specs.sort_by_key(|spec| spec.name);
        specs
            .into_iter()
            .map(|spec| Tool {
                name: Cow::Borrowed(spec.name),
                title: Some(spec.title.to_string()),
                description: Some(Cow::Borrowed(spec.description)),
                input_schema: Arc::new((spec.schema)()),
                output_schema: None,
                annotations: Some(
                    ToolAnnotations::with_title(spec.title)
                        .read_only(spec.read_only)
                        .destructive(spec.destructive)
                        .idempotent(spec.idempotent)
                        .open_world(false),
                ),
                icons: None,
            })
            .collect()
    }

    fn describe_resources(&self) -> Vec<Resource> {
        let mut health = RawResource::new(HEALTH_URI, "health");
        health.description =
            Some("Live cluster health as reported by the configured endpoint".into());

        let mut settings = RawResource::new(SETTINGS_URI, "settings");
        settings.description =
            Some("Effective connection settings; the secret is never included".into());

        vec![health.no_annotation(), settings.no_annotation()]
    }
}

impl ServerHandler for EasysearchMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mut implementation = rmcp::model::Implementation::from_build_env();
        implementation.name = "easysearch-mcp".to_string();
        implementation.title = Some("Easysearch MCP".to_string());
        implementation.version = env!("CARGO_PKG_VERSION").to_string();

        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: implementation,
            instructions: Some(
                "Use this server to administer and query an Easysearch cluster. Inspect health \
                 and indices first, search or scroll for documents, and reach for the index, \
                 snapshot, and task tools when changing cluster state."
                    .into(),
            ),
            ..ServerInfo::default()
        }
    }

    fn list_resources(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        let resources = self.describe_resources();
        std::future::ready(Ok(ListResourcesResult::with_all_items(resources)))
    }

    fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools = self.describe_tools();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        let client = self.client.clone();
        async move {
            match request.uri.as_str() {
                HEALTH_URI => {
                    let payload = match client.get("/_cluster/health", &QueryParams::new()).await {
                        Ok(health) => json!({ "reachable": true, "health": health }),
                        Err(error) => json!({ "reachable": false, "error": error.to_string() }),
                    };
                    Ok(ReadResourceResult {
                        contents: vec![json_resource_contents(
                            HEALTH_URI,
                            serialize_json(&payload, HEALTH_URI),
                        )],
                    })
                }
                SETTINGS_URI => {
                    let snapshot = SettingsSnapshot::from_config(get_config());
                    Ok(ReadResourceResult {
                        contents: vec![json_resource_contents(
                            SETTINGS_URI,
                            serialize_json(&snapshot, SETTINGS_URI),
                        )],
                    })
                }
                uri => Err(McpError::invalid_params(
                    format!("Unknown resource URI: {uri}"),
                    None,
                )),
            }
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            if let Some(spec) = self.registry.tools.get(request.name.as_ref()) {
                return (spec.handler)(self.client.clone(), request.arguments).await;
            }

            Err(McpError::invalid_params(
                format!("Unknown tool: {}", request.name),
                None,
            ))
        }
    }
}
