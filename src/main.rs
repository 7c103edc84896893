//! Easysearch MCP server entrypoint (stdio transport).
//!
//! Launches an MCP server that exposes the cluster's administrative and query
//! API over stdio for editor and agent integrations. Connection settings come
//! from command-line flags first, then environment variables, then defaults.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use easysearch_mcp::{
    config::{self, ConfigOverrides},
    easysearch::EasysearchClient,
    logging,
    mcp::EasysearchMcpServer,
};
use rmcp::{service::ServiceExt, transport::stdio};

/// Expose an Easysearch cluster's REST API as MCP tools over stdio.
#[derive(Debug, Parser)]
#[command(name = "easysearch-mcp", version, about)]
struct Cli {
    /// Cluster endpoint URL (falls back to EASYSEARCH_URL, then https://localhost:9200).
    #[arg(long)]
    url: Option<String>,

    /// Basic-auth principal (falls back to EASYSEARCH_USER, then "admin").
    #[arg(long)]
    user: Option<String>,

    /// Basic-auth secret (falls back to EASYSEARCH_PASSWORD, then empty).
    #[arg(long)]
    password: Option<String>,

    /// Verify the cluster's TLS certificate (falls back to EASYSEARCH_VERIFY_TLS, then off).
    #[arg(long)]
    verify_tls: Option<bool>,

    /// Per-request timeout in seconds (falls back to EASYSEARCH_TIMEOUT_SECS, then 30).
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing();

    let config = config::init_config(ConfigOverrides {
        endpoint: cli.url,
        username: cli.user,
        password: cli.password,
        verify_tls: cli.verify_tls,
        timeout_secs: cli.timeout_secs,
    })
    .context("failed to load configuration")?;

    let client =
        Arc::new(EasysearchClient::new(config).context("failed to initialize Easysearch client")?);
    let server = EasysearchMcpServer::new(client);

    let service = server
        .serve(stdio())
        .await
        .context("failed to start MCP server over stdio")?;

    service
        .waiting()
        .await
        .context("MCP server terminated unexpectedly")?;

    Ok(())
}
