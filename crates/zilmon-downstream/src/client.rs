// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! Per-operation downstream client.
//!
//! # How it works
//!
//! Each [`DownstreamClient::list_time_series`] call spawns a fresh
//! downstream MCP server process, performs the `initialize` handshake,
//! issues exactly one `tools/call` with the metric query as arguments,
//! waits for the matching response, and reaps the child.
//!
//! The approach is intentionally simple: metric queries are rare enough
//! that per-request processes are fine, and a scoped child guarantees the
//! transport is released on success and failure alike (`kill_on_drop`
//! covers every early-return path).  Response matching is by request id,
//! so log notifications the server emits in between are skipped.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, warn};

use zilmon_core::MetricQuery;

use crate::protocol::{CallToolResult, JsonRpcRequest, JsonRpcResponse};

/// MCP protocol revision sent in the `initialize` handshake.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// The query capability the tool layer consumes.
///
/// [`DownstreamClient`] is the production implementation; tests substitute
/// canned sources so aggregation and fallback logic run against fixtures.
#[async_trait]
pub trait TimeSeriesSource: Send + Sync {
    async fn list_time_series(&self, query: &MetricQuery) -> Result<String, DownstreamError>;
}

#[derive(Debug, Error)]
pub enum DownstreamError {
    #[error("failed to spawn downstream MCP `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("downstream MCP io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("downstream MCP protocol error: {0}")]
    Protocol(String),
    #[error("downstream MCP tool error: {0}")]
    Tool(String),
    #[error("downstream MCP timed out after {0:?}")]
    Timeout(Duration),
}

/// Client for the downstream monitoring MCP server.
///
/// Holds only the spawn recipe; all connection state is scoped to a single
/// call.  Cheap to clone and share between tools.
#[derive(Debug, Clone)]
pub struct DownstreamClient {
    command: String,
    args: Vec<String>,
    query_tool: String,
    timeout: Duration,
}

impl DownstreamClient {
    pub fn new(
        command: impl Into<String>,
        args: Vec<String>,
        query_tool: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            args,
            query_tool: query_tool.into(),
            timeout,
        }
    }

    /// Issue one metric query; returns the raw JSON text of the
    /// time-series array.
    ///
    /// The configured timeout covers the whole spawn → handshake → query
    /// roundtrip.  There is no retry: a failed call surfaces immediately.
    pub async fn list_time_series(&self, query: &MetricQuery) -> Result<String, DownstreamError> {
        let arguments = serde_json::to_value(query)
            .map_err(|e| DownstreamError::Protocol(format!("unserializable query: {e}")))?;
        match tokio::time::timeout(self.timeout, self.roundtrip(arguments)).await {
            Ok(result) => result,
            Err(_) => Err(DownstreamError::Timeout(self.timeout)),
        }
    }

    async fn roundtrip(&self, arguments: Value) -> Result<String, DownstreamError> {
        let mut child = self.spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DownstreamError::Protocol("child stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownstreamError::Protocol("child stdout unavailable".into()))?;
        let mut reader = BufReader::new(stdout);

        // MCP handshake: initialize, await the result, confirm.
        let init = JsonRpcRequest::new(
            json!(0),
            "initialize",
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": { "name": "zilmon", "version": env!("CARGO_PKG_VERSION") }
            }),
        );
        send(&mut stdin, &init).await?;
        recv_result(&mut reader, &json!(0)).await?;
        send(
            &mut stdin,
            &JsonRpcRequest::notification("notifications/initialized", json!({})),
        )
        .await?;

        // The single query this connection exists for.
        let call_id = json!(uuid::Uuid::new_v4().to_string());
        let call = JsonRpcRequest::new(
            call_id.clone(),
            "tools/call",
            json!({ "name": self.query_tool, "arguments": arguments }),
        );
        send(&mut stdin, &call).await?;
        let result = recv_result(&mut reader, &call_id).await?;

        // Closing stdin lets a well-behaved server exit; kill reaps the rest.
        drop(stdin);
        let _ = child.kill().await;

        let call_result: CallToolResult = serde_json::from_value(result)
            .map_err(|e| DownstreamError::Protocol(format!("malformed tool result: {e}")))?;

        if call_result.is_error == Some(true) {
            return Err(DownstreamError::Tool(call_result.text()));
        }
        Ok(call_result.raw_payload())
    }

    fn spawn(&self) -> Result<Child, DownstreamError> {
        debug!(command = %self.command, "spawning downstream MCP server");
        Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| DownstreamError::Spawn {
                command: self.command.clone(),
                source,
            })
    }
}

#[async_trait]
impl TimeSeriesSource for DownstreamClient {
    async fn list_time_series(&self, query: &MetricQuery) -> Result<String, DownstreamError> {
        DownstreamClient::list_time_series(self, query).await
    }
}

/// Write a JSON-RPC message as a single newline-terminated line.
async fn send(
    stdin: &mut tokio::process::ChildStdin,
    msg: &JsonRpcRequest,
) -> Result<(), DownstreamError> {
    let line = serde_json::to_string(msg)
        .map_err(|e| DownstreamError::Protocol(format!("unserializable request: {e}")))?;
    stdin.write_all(line.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await?;
    Ok(())
}

/// Read lines until the response with the given id arrives.
///
/// Notifications and responses to other requests are skipped; a JSON-RPC
/// error object or early EOF becomes a protocol error.
async fn recv_result(
    reader: &mut BufReader<ChildStdout>,
    id: &Value,
) -> Result<Value, DownstreamError> {
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(DownstreamError::Protocol(
                "downstream closed the stream before responding".into(),
            ));
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response: JsonRpcResponse = match serde_json::from_str(trimmed) {
            Ok(r) => r,
            Err(_) => {
                // Notifications and server-initiated requests land here.
                debug!(line = %trimmed, "skipping non-response message from downstream");
                continue;
            }
        };
        if &response.id != id {
            warn!(got = %response.id, "response for a different request id, skipping");
            continue;
        }
        if let Some(err) = response.error {
            return Err(DownstreamError::Protocol(format!(
                "{} (code {})",
                err.message, err.code
            )));
        }
        return response
            .result
            .ok_or_else(|| DownstreamError::Protocol("response missing result".into()));
    }
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
//
// The full roundtrip is exercised against a scripted fake downstream server
// (a shell one-liner that plays back canned JSON-RPC responses).  That keeps
// the tests independent of any real monitoring backend while still covering
// spawn, handshake, id matching and payload extraction.
