// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! [`ZilmonMcpServer`] — the rmcp [`ServerHandler`] implementation.
//!
//! This struct wraps a [`ToolRegistry`] and implements the MCP
//! `tools/list` and `tools/call` protocol methods.  All other MCP lifecycle
//! methods (initialize, shutdown, ping) and the HTTP session bookkeeping
//! are handled by the rmcp defaults.
//!
//! The server is stateless: every `call_tool` request executes the tool in
//! isolation and does not carry any state between calls.  Each tool opens
//! and closes its own downstream connection, so nothing leaks across
//! requests either.

use std::sync::Arc;

use rmcp::{
    handler::server::ServerHandler,
    model::{
        CallToolRequestParams, CallToolResult, ListToolsResult, PaginatedRequestParams,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    ErrorData as McpError,
};
use uuid::Uuid;
use zilmon_tools::{ToolCall, ToolRegistry};

use crate::bridge::{output_to_call_result, schema_to_mcp_tool};

/// Zilmon MCP server — wraps a [`ToolRegistry`] and speaks the MCP protocol.
///
/// Create with [`ZilmonMcpServer::new`] and then call
/// [`rmcp::ServiceExt::serve`] to start serving on a transport.
#[derive(Clone)]
pub struct ZilmonMcpServer {
    registry: Arc<ToolRegistry>,
}

impl ZilmonMcpServer {
    /// Create a new server backed by the given [`ToolRegistry`].
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }
}

impl ServerHandler for ZilmonMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..ServerInfo::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let registry = self.registry.clone();
        async move {
            let tools = registry
                .schemas()
                .into_iter()
                .map(schema_to_mcp_tool)
                .collect();
            Ok(ListToolsResult {
                tools,
                next_cursor: None,
                meta: None,
            })
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let args = request
            .arguments
            .map(|m| serde_json::Value::Object(m.into_iter().collect()))
            .unwrap_or(serde_json::Value::Object(serde_json::Map::new()));

        let call = ToolCall {
            id: Uuid::new_v4().to_string(),
            name: request.name.to_string(),
            args,
        };

        let output = self.registry.execute(&call).await;
        Ok(output_to_call_result(output))
    }
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
//
// These tests cover the parts of ZilmonMcpServer that can be tested without
// an active transport or RequestContext.  The full list_tools / call_tool
// round-trips are covered by the integration tests in tests/integration.rs.

#[cfg(test)]
mod tests {
    use super::*;
    use zilmon_tools::ToolRegistry;

    fn make_server() -> ZilmonMcpServer {
        ZilmonMcpServer::new(Arc::new(ToolRegistry::new()))
    }

    #[test]
    fn get_info_enables_tools_capability() {
        let info = make_server().get_info();
        assert!(
            info.capabilities.tools.is_some(),
            "tools capability must be enabled"
        );
    }

    #[test]
    fn get_info_has_no_resources_capability() {
        let info = make_server().get_info();
        // zilmon only exposes tools; resources and prompts are not supported.
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
    }

    #[test]
    fn server_is_cloneable() {
        let server = make_server();
        let _clone = server.clone();
    }
}
