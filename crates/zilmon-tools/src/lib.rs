// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! `zilmon-tools` — the validator-metric tools exposed over MCP.
//!
//! Each tool resolves its arguments, drives the [`MetricsService`]
//! orchestration layer (resolve → query → aggregate → rank) and renders a
//! `{"status": …}` envelope.  A tool call always resolves to an envelope:
//! bad arguments, unknown validators and downstream failures all become
//! structured failure responses, never protocol errors.

mod builtin;
pub mod envelope;
mod params;
mod registry;
mod remote_roster;
mod service;
mod tool;

pub use builtin::{
    ListValidatorsTool, SuccessRateTool, TopEarnersTool, TopStakersTool, TopSuccessRateTool,
    ValidatorEarningsTool, ValidatorStakeTool,
};
pub use registry::{ToolRegistry, ToolSchema};
pub use remote_roster::RemoteRoster;
pub use service::{Earnings, MetricsService, RateKind};
pub use tool::{Tool, ToolCall, ToolOutput};
