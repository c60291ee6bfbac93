// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub downstream: DownstreamConfig,
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// The downstream monitoring MCP server zilmon proxies every metric read to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownstreamConfig {
    /// Command used to spawn the downstream server.  A fresh process is
    /// spawned per logical operation and reaped afterwards.
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Name of the downstream tool that executes a time-series query.
    #[serde(default = "default_query_tool")]
    pub query_tool: String,
    /// Project scope forwarded verbatim in every query,
    /// e.g. `projects/zq2-mainnet`.
    #[serde(default = "default_project")]
    pub project: String,
    /// Wall-clock limit for one spawn → handshake → query roundtrip.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: Vec::new(),
            query_tool: default_query_tool(),
            project: default_project(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_command() -> String {
    "monitoring-mcp".to_string()
}

fn default_query_tool() -> String {
    "list_time_series".to_string()
}

fn default_project() -> String {
    "projects/zq2-mainnet".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Where the validator roster comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RosterSource {
    /// The list configured below (or the compiled-in list when empty).
    #[default]
    Static,
    /// A live query of the downstream roster metric on every tool call.
    Remote,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub source: RosterSource,
    /// Static validator list.
    ///
    /// ```toml
    /// [[roster.validators]]
    /// name        = "TorchWallet.io"
    /// public_key  = "0x92fa…"
    /// address     = "0x7a2f…"
    /// zil_address = "zil1og9…"
    /// ```
    #[serde(default)]
    pub validators: Vec<ValidatorEntry>,
}

/// One configured validator identity.  Mirrors the core record so the
/// config crate stays at the bottom of the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorEntry {
    pub name: String,
    pub public_key: String,
    pub address: String,
    pub zil_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the streamable-HTTP transport (`serve --http`).
    #[serde(default = "default_http_addr")]
    pub http_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
        }
    }
}

fn default_http_addr() -> String {
    "127.0.0.1:8123".to_string()
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
