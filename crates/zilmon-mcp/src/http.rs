// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! Streamable-HTTP transport for the MCP server.
//!
//! Mounts rmcp's [`StreamableHttpService`] into an axum router behind a
//! permissive CORS layer so browser-based MCP clients can connect.  Session
//! bookkeeping (the `Mcp-Session-Id` header, one server instance per
//! session) is owned by the rmcp [`LocalSessionManager`]; transport
//! failures before a response map to JSON-RPC error objects inside the
//! rmcp layer as well.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderName;
use axum::Router;
use rmcp::transport::{
    streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
    StreamableHttpService,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use zilmon_tools::ToolRegistry;

use crate::server::ZilmonMcpServer;

/// Keep-alive interval for the SSE response streams.
const SSE_KEEP_ALIVE: Duration = Duration::from_secs(15);

/// Build the axum router serving MCP under `/mcp`.
pub fn router(registry: Arc<ToolRegistry>) -> Router {
    let service = StreamableHttpService::new(
        move || Ok(ZilmonMcpServer::new(registry.clone())),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig {
            sse_keep_alive: Some(SSE_KEEP_ALIVE),
            stateful_mode: true,
            ..Default::default()
        },
    );

    // Browser clients need to read the session id header across origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static("mcp-session-id")]);

    Router::new().nest_service("/mcp", service).layer(cors)
}

/// Serve the streamable-HTTP transport on `addr` until the process is
/// terminated.
pub async fn serve_http(registry: Arc<ToolRegistry>, addr: SocketAddr) -> Result<()> {
    let app = router(registry);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "MCP streamable-HTTP transport listening on /mcp");
    axum::serve(listener, app)
        .await
        .context("HTTP server error")?;
    Ok(())
}

// ─── Unit tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_builds_with_empty_registry() {
        let _router = router(Arc::new(ToolRegistry::new()));
    }

    #[tokio::test]
    async fn serve_http_rejects_unbindable_address() {
        // 192.0.2.0/24 (TEST-NET-1) is not assigned to any local interface,
        // so the bind must fail cleanly instead of hanging.
        let addr: SocketAddr = "192.0.2.1:0".parse().unwrap();
        let result = serve_http(Arc::new(ToolRegistry::new()), addr).await;
        assert!(result.is_err());
    }
}
