// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! `zilmon-downstream` — client for the downstream monitoring MCP server.
//!
//! The monitoring backend is itself an MCP server, spawned as a child
//! process.  Each metric query opens a fresh connection (spawn → MCP
//! handshake → one `tools/call` → reap), so the transport is released on
//! success and failure alike and no connection state survives a tool call.

mod client;
mod protocol;

pub use client::{DownstreamClient, DownstreamError, TimeSeriesSource};
pub use protocol::{
    CallToolResult, ContentPart, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
};
