// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//!
//! Default tool registry for the zilmon MCP server.
//!
//! Wires the configured downstream client and roster provider into a
//! [`MetricsService`] and registers every validator-metric tool on it.

use std::sync::Arc;
use std::time::Duration;

use zilmon_config::{Config, RosterSource};
use zilmon_core::{RosterProvider, StaticRoster, ValidatorRecord};
use zilmon_downstream::{DownstreamClient, TimeSeriesSource};
use zilmon_tools::{
    ListValidatorsTool, MetricsService, RateKind, RemoteRoster, SuccessRateTool, TopEarnersTool,
    TopStakersTool, TopSuccessRateTool, ToolRegistry, ValidatorEarningsTool, ValidatorStakeTool,
};

/// Names of all tools the server exposes by default.
///
/// These names correspond exactly to the values returned by each tool's
/// `Tool::name()` implementation.  Clients can use this list to discover
/// what `zilmon serve` exposes.
pub const DEFAULT_TOOL_NAMES: &[&str] = &[
    "get_cosigner_success_rate",
    "get_proposer_success_rate",
    "get_top_cosigner_success_rate",
    "get_top_earners",
    "get_top_proposer_success_rate",
    "get_top_stakers",
    "get_validator_earnings",
    "get_validator_stake",
    "list_validators",
];

/// Build a [`ToolRegistry`] from the configuration.
///
/// `allowed_names` is an optional comma-separated list of tool names to
/// include.  Pass `"all"` (or `None`) to include everything.  Any name not
/// in [`DEFAULT_TOOL_NAMES`] is silently ignored — this guards against
/// clients requesting tools that were never registered.
pub fn build_registry(config: &Config, allowed_names: Option<&str>) -> ToolRegistry {
    let source: Arc<dyn TimeSeriesSource> = Arc::new(DownstreamClient::new(
        &config.downstream.command,
        config.downstream.args.clone(),
        &config.downstream.query_tool,
        Duration::from_secs(config.downstream.request_timeout_secs),
    ));

    let roster: Arc<dyn RosterProvider> = match config.roster.source {
        RosterSource::Remote => Arc::new(RemoteRoster::new(
            source.clone(),
            &config.downstream.project,
        )),
        RosterSource::Static if config.roster.validators.is_empty() => {
            Arc::new(StaticRoster::builtin())
        }
        RosterSource::Static => Arc::new(StaticRoster::new(
            config
                .roster
                .validators
                .iter()
                .map(|v| ValidatorRecord {
                    name: v.name.clone(),
                    public_key: v.public_key.clone(),
                    address: v.address.clone(),
                    zil_address: v.zil_address.clone(),
                })
                .collect(),
        )),
    };

    let service = Arc::new(MetricsService::new(
        source,
        &config.downstream.project,
        roster,
    ));

    let filter: Option<std::collections::HashSet<&str>> = match allowed_names {
        None | Some("all") => None,
        Some(list) => Some(list.split(',').map(|s| s.trim()).collect()),
    };

    let allow = |name: &str| -> bool {
        match &filter {
            None => true,
            Some(set) => set.contains(name),
        }
    };

    let mut reg = ToolRegistry::new();

    if allow("get_cosigner_success_rate") {
        reg.register(SuccessRateTool::new(service.clone(), RateKind::Cosigner));
    }
    if allow("get_proposer_success_rate") {
        reg.register(SuccessRateTool::new(service.clone(), RateKind::Proposer));
    }
    if allow("get_top_cosigner_success_rate") {
        reg.register(TopSuccessRateTool::new(service.clone(), RateKind::Cosigner));
    }
    if allow("get_top_earners") {
        reg.register(TopEarnersTool::new(service.clone()));
    }
    if allow("get_top_proposer_success_rate") {
        reg.register(TopSuccessRateTool::new(service.clone(), RateKind::Proposer));
    }
    if allow("get_top_stakers") {
        reg.register(TopStakersTool::new(service.clone()));
    }
    if allow("get_validator_earnings") {
        reg.register(ValidatorEarningsTool::new(service.clone()));
    }
    if allow("get_validator_stake") {
        reg.register(ValidatorStakeTool::new(service.clone()));
    }
    if allow("list_validators") {
        reg.register(ListValidatorsTool::new(service));
    }

    reg
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
