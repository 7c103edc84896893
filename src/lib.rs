#![deny(missing_docs)]

//! Core library for the Easysearch MCP server.

/// Environment-driven configuration management.
pub mod config;
/// Easysearch HTTP client and request-shaping helpers.
pub mod easysearch;
/// Structured logging and tracing setup.
pub mod logging;
/// Model Context Protocol server implementation.
pub mod mcp;
