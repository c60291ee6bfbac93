// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! Success-rate tools, parameterized over the proposer/cosigner metric
//! pair.  A validator with zero attempts gets the "N/A" sentinel in the
//! single read and is excluded entirely from the ranking.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use zilmon_core::success_rate;

use crate::envelope;
use crate::params::{optional_limit, required_str, window_from_args};
use crate::service::{MetricsService, RateKind};
use crate::tool::{Tool, ToolCall, ToolOutput};

/// `get_proposer_success_rate` / `get_cosigner_success_rate`.
pub struct SuccessRateTool {
    service: Arc<MetricsService>,
    kind: RateKind,
}

impl SuccessRateTool {
    pub fn new(service: Arc<MetricsService>, kind: RateKind) -> Self {
        Self { service, kind }
    }
}

#[async_trait]
impl Tool for SuccessRateTool {
    fn name(&self) -> &str {
        match self.kind {
            RateKind::Proposer => "get_proposer_success_rate",
            RateKind::Cosigner => "get_cosigner_success_rate",
        }
    }

    fn description(&self) -> &str {
        match self.kind {
            RateKind::Proposer => {
                "Proposal success rate of one validator over a time window \
                 (successful proposals / total proposals)."
            }
            RateKind::Cosigner => {
                "Cosignature success rate of one validator over a time window \
                 (successful cosignatures / total cosignatures)."
            }
        }
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

        match self
            .service
            .success_counts(self.kind, &record.public_key, &window)
            .await
        {
            Ok((total, success)) => {
                // Zero attempts is "not applicable", never a division error.
                let rate = success_rate(success, total)
                    .map(Value::String)
                    .unwrap_or(Value::String("N/A".to_string()));
                ToolOutput::ok(
                    &call.id,
                    envelope::success(json!({
                        "validator": record.name,
                        "public_key": record.public_key,
                        "role": self.kind.noun(),
                        "total_attempts": total,
                        "successful_attempts": success,
                        "success_rate": rate,
                        "window": window.describe(),
                    })),
                )
            }
            Err(e) => ToolOutput::err(&call.id, envelope::downstream_failed(e)),
        }
    }
}

/// `get_top_proposer_success_rate` / `get_top_cosigner_success_rate`.
pub struct TopSuccessRateTool {
    service: Arc<MetricsService>,
    kind: RateKind,
}

impl TopSuccessRateTool {
    pub fn new(service: Arc<MetricsService>, kind: RateKind) -> Self {
        Self { service, kind }
    }
}

#[async_trait]
impl Tool for TopSuccessRateTool {
    fn name(&self) -> &str {
        match self.kind {
            RateKind::Proposer => "get_top_proposer_success_rate",
            RateKind::Cosigner => "get_top_cosigner_success_rate",
        }
    }

    fn description(&self) -> &str {
        match self.kind {
            RateKind::Proposer => {
                "Validators ranked by proposal success rate over a time window, highest first. \
                 Validators with no proposals in the window are omitted."
            }
            RateKind::Cosigner => {
                "Validators ranked by cosignature success rate over a time window, highest first. \
                 Validators with no cosignatures in the window are omitted."
            }
        }
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

        match self.service.top_rates(self.kind, limit, &window).await {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::test_support::{fixed_service, ok_call};
    use serde_json::json;

    #[tokio::test]
    async fn proposer_rate_reports_percentage() {
        // Same canned value for totals and successes → 100.00%.
        let tool = SuccessRateTool::new(fixed_service(8.0), RateKind::Proposer);
        let out = tool
            .execute(&ok_call(json!({"validator": "TorchWallet.io"})))
            .await;
        assert!(!out.is_error, "got: {}", out.content);
        let env: Value = serde_json::from_str(&out.content).unwrap();
        assert_eq!(env["data"]["success_rate"], "100.00%");
        assert_eq!(env["data"]["role"], "proposer");
    }

    #[tokio::test]
    async fn rate_with_zero_attempts_is_not_applicable() {
        let tool = SuccessRateTool::new(fixed_service(0.0), RateKind::Cosigner);
        let out = tool
            .execute(&ok_call(json!({"validator": "Moonlet"})))
            .await;
        assert!(!out.is_error);
        let env: Value = serde_json::from_str(&out.content).unwrap();
        assert_eq!(env["data"]["success_rate"], "N/A");
        assert_eq!(env["data"]["total_attempts"], 0.0);
    }

    #[tokio::test]
    async fn tool_names_follow_kind() {
        let svc = fixed_service(1.0);
        assert_eq!(
            SuccessRateTool::new(svc.clone(), RateKind::Cosigner).name(),
            "get_cosigner_success_rate"
        );
        assert_eq!(
            TopSuccessRateTool::new(svc, RateKind::Proposer).name(),
            "get_top_proposer_success_rate"
        );
    }

    #[tokio::test]
    async fn top_rate_zero_attempt_validators_are_omitted() {
        // Every grouped query answers 0 for 0xaa → no validator qualifies.
        let tool = TopSuccessRateTool::new(fixed_service(0.0), RateKind::Proposer);
        let out = tool.execute(&ok_call(json!({"limit": 3}))).await;
        assert!(!out.is_error);
        let env: Value = serde_json::from_str(&out.content).unwrap();
        assert_eq!(env["data"]["validators"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn top_rate_invalid_time_is_structured_failure() {
        let tool = TopSuccessRateTool::new(fixed_service(1.0), RateKind::Proposer);
        let out = tool
            .execute(&ok_call(json!({"startTime": "not-a-time"})))
            .await;
        assert!(out.is_error);
        let env: Value = serde_json::from_str(&out.content).unwrap();
        assert!(env["reason"].as_str().unwrap().contains("startTime"));
    }
}
