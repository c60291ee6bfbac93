// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! Stake tools.  Stake is a gauge: reads use the five-minute snapshot
//! window and only the latest point, with no aggregation parameters.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use crate::envelope;
use crate::params::{optional_limit, required_str};
use crate::service::MetricsService;
use crate::tool::{Tool, ToolCall, ToolOutput};

/// `get_validator_stake` — current stake of one validator.
pub struct ValidatorStakeTool {
    service: Arc<MetricsService>,
}

impl ValidatorStakeTool {
    pub fn new(service: Arc<MetricsService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for ValidatorStakeTool {
    fn name(&self) -> &str {
        "get_validator_stake"
    }

    fn description(&self) -> &str {
        "Current stake of one validator (latest gauge reading)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "validator": {
                    "type": "string",
                    "description": "Validator name, public key, chain address, or zil address"
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

        match self.service.stake(&record.public_key, Utc::now()).await {
            Ok(stake) => ToolOutput::ok(
                &call.id,
                envelope::success(json!({
                    "validator": record.name,
                    "public_key": record.public_key,
                    "stake": stake,
                })),
            ),
            Err(e) => ToolOutput::err(&call.id, envelope::downstream_failed(e)),
        }
    }
}

/// `get_top_stakers` — validators ranked by current stake.
pub struct TopStakersTool {
    service: Arc<MetricsService>,
}

impl TopStakersTool {
    pub fn new(service: Arc<MetricsService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for TopStakersTool {
    fn name(&self) -> &str {
        "get_top_stakers"
    }

    fn description(&self) -> &str {
        "Validators ranked by current stake, highest first."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "integer",
                    "description": "Number of validators to return (default 5)"
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

        match self.service.top_stakers(limit, Utc::now()).await {
            Ok(entries) => ToolOutput::ok(
                &call.id,
                envelope::success(json!({ "validators": entries })),
            ),
            Err(e) => ToolOutput::err(&call.id, envelope::downstream_failed(e)),
        }
    }
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
