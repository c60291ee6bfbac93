// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! `zilmon-mcp` — MCP (Model Context Protocol) server for zilmon.
//!
//! Exposes the validator-metric tools to any MCP-compatible host (Cursor,
//! Claude Desktop, etc.) over **stdio** transport using line-delimited
//! JSON-RPC, or over the streamable-HTTP transport for browser-based
//! clients.
//!
//! # Quick start
//!
//! ```text
//! zilmon serve
//! ```
//!
//! # MCP client configuration
//!
//! ## Cursor / Claude Desktop (`mcp.json`)
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "zilmon": {
//!       "command": "zilmon",
//!       "args": ["serve"]
//!     }
//!   }
//! }
//! ```
//!
//! ## HTTP transport
//!
//! ```text
//! zilmon serve --http 127.0.0.1:8123
//! ```
//!
//! # Architecture
//!
//! ```text
//! MCP client (Cursor, Claude Desktop, …)
//!       │  stdin/stdout (line-delimited JSON-RPC) or streamable HTTP
//!       ▼
//! ZilmonMcpServer (rmcp ServerHandler)
//!       │
//!       ▼
//! ToolRegistry ──► Tool::execute() ──► MetricsService
//!       │                                   │  one spawned connection per query
//!       ▼                                   ▼
//! response envelope               downstream monitoring MCP
//! ```

pub mod bridge;
pub mod http;
pub mod registry;
pub mod server;

pub use registry::{build_registry, DEFAULT_TOOL_NAMES};
pub use server::ZilmonMcpServer;

use std::sync::Arc;

use anyhow::Result;
use rmcp::ServiceExt;
use zilmon_tools::ToolRegistry;

/// Start an MCP stdio server, serving the tools in `registry` on
/// `stdin` / `stdout`.
///
/// This function blocks until the client disconnects (stdin EOF) or the
/// process is terminated.  It is designed to be called as the sole
/// operation of the `zilmon serve` subcommand.
///
/// # Errors
///
/// Returns an error if the rmcp transport fails to initialize or if the
/// server encounters a fatal I/O error.
pub async fn serve_stdio(registry: Arc<ToolRegistry>) -> Result<()> {
    let server = ZilmonMcpServer::new(registry);
    let running = server
        .serve((tokio::io::stdin(), tokio::io::stdout()))
        .await
        .map_err(|e| anyhow::anyhow!("MCP server init error: {e}"))?;
    running
        .waiting()
        .await
        .map_err(|e| anyhow::anyhow!("MCP server error: {e}"))?;
    Ok(())
}
