//! Tool handlers for the MCP server.
//!
//! One module per tool family, mirroring the cluster's API groups. Every
//! handler follows the same shape: deserialize a typed argument struct, apply
//! the shaping conventions, issue exactly one client call, and return a
//! structured result. Failures map onto MCP errors with the remote status and
//! body preserved.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::easysearch::EasysearchError;

pub mod cat;
pub mod cluster;
pub mod documents;
pub mod indices;
pub mod ingest;
pub mod nodes;
pub mod search;
pub mod snapshot;
pub mod tasks;

/// Parse structured arguments supplied to a tool invocation.
pub(crate) fn parse_arguments<T: DeserializeOwned>(
    arguments: Option<JsonObject>,
) -> Result<T, McpError> {
    let value = arguments
        .map(Value::Object)
        .unwrap_or_else(|| Value::Object(JsonObject::new()));
    serde_json::from_value(value)
        .map_err(|err| McpError::invalid_params(format!("Invalid arguments: {err}"), None))
}

/// Map client errors onto MCP errors, keeping remote status and body verbatim.
pub(crate) fn map_client_error(error: EasysearchError) -> McpError {
    match error {
        EasysearchError::UnexpectedStatus { status, body } => {
            McpError::internal_error(format!("Easysearch returned {status}: {body}"), None)
        }
        other => McpError::internal_error(other.to_string(), None),
    }
}

/// Wrap a serializable summary into a structured tool result.
pub(crate) fn structured<T: serde::Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let payload = serde_json::to_value(value)
        .map_err(|err| McpError::internal_error(format!("Failed to serialize result: {err}"), None))?;
    Ok(CallToolResult::structured(payload))
}
