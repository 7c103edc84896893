//! Model Context Protocol (MCP) integration for Easysearch.
//!
//! This module wires the cluster client into an MCP server so agent hosts can
//! administer and query Easysearch over stdio. The surface area consists of:
//!
//! - Tools: the full administrative and query surface (cluster, indices,
//!   documents, search, cat, nodes, snapshots, ingest, tasks), described
//!   declaratively in one registry.
//! - Resources: `mcp://health` and `mcp://settings`.
//!
//! Handlers, schemas, and formatting helpers are kept in focused submodules to
//! make tests and reviews small and targeted.

mod format;
pub mod handlers;
pub mod registry;
mod schemas;
mod server;

pub use server::EasysearchMcpServer;
