use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while resolving the connection configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Configuration was installed twice for one process.
    #[error("Configuration already initialized")]
    AlreadyInitialized,
}

/// Default cluster endpoint used when neither flag nor environment supplies one.
pub const DEFAULT_ENDPOINT: &str = "https://localhost:9200";
/// Default principal used for basic authentication.
pub const DEFAULT_USERNAME: &str = "admin";
/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection configuration for the Easysearch cluster.
///
/// Resolved once at process start and immutable afterwards. Defaults target a
/// local development cluster; against a remote deployment the credentials must
/// be supplied or the cluster itself will reject the first request.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the Easysearch REST endpoint.
    pub endpoint: String,
    /// Principal used for basic authentication.
    pub username: String,
    /// Secret paired with the principal. Empty by default.
    pub password: String,
    /// Whether to verify the cluster's TLS certificate.
    pub verify_tls: bool,
    /// Fixed per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Explicit overrides supplied on the command line.
///
/// Each populated field takes precedence over the corresponding environment
/// variable; unset fields fall back to the environment and then the defaults.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Override for `EASYSEARCH_URL`.
    pub endpoint: Option<String>,
    /// Override for `EASYSEARCH_USER`.
    pub username: Option<String>,
    /// Override for `EASYSEARCH_PASSWORD`.
    pub password: Option<String>,
    /// Override for `EASYSEARCH_VERIFY_TLS`.
    pub verify_tls: Option<bool>,
    /// Override for `EASYSEARCH_TIMEOUT_SECS`.
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Resolve configuration from overrides, environment variables, and defaults.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let verify_tls = match overrides.verify_tls {
            Some(value) => value,
            None => load_env_bool("EASYSEARCH_VERIFY_TLS")?.unwrap_or(false),
        };
        let timeout_secs = match overrides.timeout_secs {
            Some(value) => value,
            None => load_env_parsed("EASYSEARCH_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            endpoint: overrides
                .endpoint
                .or_else(|| load_env_optional("EASYSEARCH_URL"))
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            username: overrides
                .username
                .or_else(|| load_env_optional("EASYSEARCH_USER"))
                .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            password: overrides
                .password
                .or_else(|| env::var("EASYSEARCH_PASSWORD").ok())
                .unwrap_or_default(),
            verify_tls,
            timeout_secs,
        })
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn load_env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = load_env_optional(key) else {
        return Ok(None);
    };
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" => Ok(Some(true)),
        "false" | "0" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidValue(key.to_string())),
    }
}

fn load_env_parsed(key: &str) -> Result<Option<u64>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Resolve configuration and install it in the global cache.
pub fn init_config(overrides: ConfigOverrides) -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::resolve(overrides)?;
    tracing::debug!(
        endpoint = %config.endpoint,
        username = %config.username,
        has_password = !config.password.is_empty(),
        verify_tls = config.verify_tls,
        timeout_secs = config.timeout_secs,
        "Loaded configuration"
    );
    CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    Ok(get_config())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_applies_defaults_when_nothing_is_set() {
        let config = Config::resolve(ConfigOverrides::default()).expect("resolve");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.username, DEFAULT_USERNAME);
        assert!(config.password.is_empty());
        assert!(!config.verify_tls);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn resolve_prefers_explicit_overrides() {
        let overrides = ConfigOverrides {
            endpoint: Some("https://search.internal:9200".into()),
            username: Some("ops".into()),
            password: Some("s3cret".into()),
            verify_tls: Some(true),
            timeout_secs: Some(5),
        };
        let config = Config::resolve(overrides).expect("resolve");
        assert_eq!(config.endpoint, "https://search.internal:9200");
        assert_eq!(config.username, "ops");
        assert_eq!(config.password, "s3cret");
        assert!(config.verify_tls);
        assert_eq!(config.timeout_secs, 5);
    }
}
