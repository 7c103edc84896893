//! Formatting helpers shared across MCP resources.

use rmcp::model::ResourceContents;
use schemars::JsonSchema;
use serde::Serialize;

use crate::config::Config;

pub(crate) const APPLICATION_JSON: &str = "application/json";

/// Serialize a value to JSON, falling back to compact formatting on error.
pub(crate) fn serialize_json<T: Serialize>(value: &T, context_uri: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|error| {
        tracing::warn!(uri = context_uri, %error, "Failed to serialize JSON prettily");
        serde_json::to_string(value).unwrap_or_else(|_| "{}".into())
    })
}

/// Build JSON resource contents for MCP resource responses.
pub(crate) fn json_resource_contents(uri: &str, text: String) -> ResourceContents {
    ResourceContents::TextResourceContents {
        uri: uri.to_string(),
        mime_type: Some(APPLICATION_JSON.into()),
        text,
        meta: None,
    }
}

/// Effective connection settings exposed via the `settings` resource.
///
/// The secret itself is never serialized; only its presence is reported.
#[derive(Debug, Serialize, JsonSchema)]
pub(crate) struct SettingsSnapshot {
    /// Base URL of the configured cluster endpoint.
    pub(crate) endpoint: String,
    /// Principal used for basic authentication.
    pub(crate) username: String,
    /// Whether a non-empty secret is configured.
    pub(crate) password_set: bool,
    /// Whether TLS certificates are verified.
    pub(crate) verify_tls: bool,
    /// Per-request timeout in seconds.
    pub(crate) timeout_secs: u64,
}

impl SettingsSnapshot {
    pub(crate) fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            username: config.username.clone(),
            password_set: !config.password.is_empty(),
            verify_tls: config.verify_tls,
            timeout_secs: config.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ConfigOverrides};

    #[test]
    fn settings_snapshot_elides_the_secret() {
        let config = Config {
            password: "s3cret".into(),
            ..Config::resolve(ConfigOverrides::default()).expect("defaults")
        };
        let snapshot = SettingsSnapshot::from_config(&config);
        let rendered = serialize_json(&snapshot, "mcp://settings");
        assert!(rendered.contains("\"password_set\": true"));
        assert!(!rendered.contains("s3cret"));
    }
}
