//! Declarative tool registry.
//!
//! Every tool is described once as a [`ToolSpec`]: name, metadata, behavior
//! annotations, input schema, and handler. Tool listing and dispatch are both
//! derived from the registry, so the shared contract is enforced in one place
//! instead of being re-stated per tool.

use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolResult, JsonObject};
use serde_json::{Map, Value};

use crate::easysearch::EasysearchClient;

/// Boxed future returned by tool handlers.
pub type ToolFuture = Pin<Box<dyn Future<Output = Result<CallToolResult, McpError>> + Send>>;
/// Handler function invoked with the shared client and raw tool arguments.
pub type ToolHandler = fn(Arc<EasysearchClient>, Option<JsonObject>) -> ToolFuture;
/// Builder producing the JSON schema describing a tool's input.
pub type SchemaBuilder = fn() -> Map<String, Value>;

/// Declarative description of one tool.
pub struct ToolSpec {
    /// Tool name as exposed to MCP clients.
    pub name: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    /// One-line description shown in tool listings.
    pub description: &'static str,
    /// Whether the tool only reads cluster state.
    pub read_only: bool,
    /// Whether the tool removes data or cannot be undone.
    pub destructive: bool,
    /// Whether repeating the call yields the same outcome.
    pub idempotent: bool,
    /// Input schema builder.
    pub schema: SchemaBuilder,
    /// Handler dispatched on invocation.
    pub handler: ToolHandler,
}

impl ToolSpec {
    /// Spec for a tool that only reads cluster state.
    pub(crate) const fn read_only(
        name: &'static str,
        title: &'static str,
        description: &'static str,
        schema: SchemaBuilder,
        handler: ToolHandler,
    ) -> Self {
        Self {
            name,
            title,
            description,
            read_only: true,
            destructive: false,
            idempotent: true,
            schema,
            handler,
        }
    }

    /// Spec for a tool that changes cluster state but can be safely repeated.
    pub(crate) const fn idempotent(
        name: &'static str,
        title: &'static str,
        description: &'static str,
        schema: SchemaBuilder,
        handler: ToolHandler,
    ) -> Self {
        Self {
            name,
            title,
            description,
            read_only: false,
            destructive: false,
            idempotent: true,
            schema,
            handler,
        }
    }

    /// Spec for a tool whose effect is not safely repeatable.
    pub(crate) const fn mutating(
        name: &'static str,
        title: &'static str,
        description: &'static str,
        schema: SchemaBuilder,
        handler: ToolHandler,
    ) -> Self {
        Self {
            name,
            title,
            description,
            read_only: false,
            destructive: false,
            idempotent: false,
            schema,
            handler,
        }
    }

    /// Spec for a tool that removes data or otherwise cannot be undone.
    pub(crate) const fn destructive(
        name: &'static str,
        title: &'static str,
        description: &'static str,
        schema: SchemaBuilder,
        handler: ToolHandler,
    ) -> Self {
        Self {
            name,
            title,
            description,
            read_only: false,
            destructive: true,
            idempotent: false,
            schema,
            handler,
        }
    }
}

/// Registry mapping tool names to their specs.
pub struct Registry {
    /// Registered specs, keyed by tool name.
    pub tools: HashMap<&'static str, ToolSpec>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a single tool spec, replacing any previous one with the name.
    pub fn register(&mut self, spec: ToolSpec) {
        self.tools.insert(spec.name, spec);
    }

    /// Register a batch of tool specs.
    pub fn register_all(&mut self, specs: Vec<ToolSpec>) {
        for spec in specs {
            self.register(spec);
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
