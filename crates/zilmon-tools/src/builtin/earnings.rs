// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! Earnings tools: a single-validator read and the top-N ranking.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::envelope;
use crate::params::{optional_limit, required_str, window_from_args};
use crate::service::MetricsService;
use crate::tool::{Tool, ToolCall, ToolOutput};

/// `get_validator_earnings` — proposer + cosigner rewards for one validator.
pub struct ValidatorEarningsTool {
    service: Arc<MetricsService>,
}

impl ValidatorEarningsTool {
    pub fn new(service: Arc<MetricsService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for ValidatorEarningsTool {
    fn name(&self) -> &str {
        "get_validator_earnings"
    }

    fn description(&self) -> &str {
        "Total earnings (proposer + cosigner rewards) of one validator over a time window. \
         The validator may be given by name, public key, or address."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "validator": {
                    "type": "string",
                    "description": "Validator name, public key, chain address, or zil address"
                },
                "startTime": {
                    "type": "string",
                    "description": "ISO-8601 start of the window (default: one hour before endTime)"
                },
                "endTime": {
                    "type": "string",
                    "description": "ISO-8601 end of the window (default: now)"
                }
            },
            "required": ["validator"]
        })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let identifier = match required_str(&call.args, "validator") {
            Ok(v) => v,
            Err(reason) => return ToolOutput::err(&call.id, envelope::failed(reason)),
        };
        let window = match window_from_args(&call.args) {
            Ok(w) => w,
            Err(reason) => return ToolOutput::err(&call.id, envelope::failed(reason)),
        };

        let record = match self.service.resolve(identifier).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                return ToolOutput::err(
                    &call.id,
                    envelope::failed(format!("validator not found: {identifier}")),
                )
            }
            Err(e) => return ToolOutput::err(&call.id, envelope::downstream_failed(e)),
        };

        debug!(validator = %record.name, "fetching earnings");
        match self.service.earnings(&record.public_key, &window).await {
            Ok(earnings) => ToolOutput::ok(
                &call.id,
                envelope::success(json!({
                    "validator": record.name,
                    "public_key": record.public_key,
                    "proposer_earnings": earnings.proposer,
                    "cosigner_earnings": earnings.cosigner,
                    "total_earnings": earnings.total(),
                    "window": window.describe(),
                })),
            ),
            Err(e) => ToolOutput::err(&call.id, envelope::downstream_failed(e)),
        }
    }
}

/// `get_top_earners` — validators ranked by total rewards over the window.
pub struct TopEarnersTool {
    service: Arc<MetricsService>,
}

impl TopEarnersTool {
    pub fn new(service: Arc<MetricsService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for TopEarnersTool {
    fn name(&self) -> &str {
        "get_top_earners"
    }

    fn description(&self) -> &str {
        "Validators ranked by total earnings (proposer + cosigner rewards) over a time window, \
         highest first."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "integer",
                    "description": "Number of validators to return (default 5)"
                },
                "startTime": {
                    "type": "string",
                    "description": "ISO-8601 start of the window (default: one hour before endTime)"
                },
                "endTime": {
                    "type": "string",
                    "description": "ISO-8601 end of the window (default: now)"
                }
            },
            "required": []
        })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let limit = match optional_limit(&call.args) {
            Ok(n) => n,
            Err(reason) => return ToolOutput::err(&call.id, envelope::failed(reason)),
        };
        let window = match window_from_args(&call.args) {
            Ok(w) => w,
            Err(reason) => return ToolOutput::err(&call.id, envelope::failed(reason)),
        };

        match self.service.top_earners(limit, &window).await {
            Ok(entries) => ToolOutput::ok(
                &call.id,
                envelope::success(json!({
                    "window": window.describe(),
                    "validators": entries,
                })),
            ),
            Err(e) => ToolOutput::err(&call.id, envelope::downstream_failed(e)),
        }
    }
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
