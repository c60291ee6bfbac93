// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! Roster listing tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::envelope;
use crate::service::MetricsService;
use crate::tool::{Tool, ToolCall, ToolOutput};

/// `list_validators` — dump the current roster.
pub struct ListValidatorsTool {
    service: Arc<MetricsService>,
}

impl ListValidatorsTool {
    pub fn new(service: Arc<MetricsService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for ListValidatorsTool {
    fn name(&self) -> &str {
        "list_validators"
    }

    fn description(&self) -> &str {
        "List all known validators with their names, public keys and addresses."
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {}, "required": [] })
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutput {
        match self.service.roster().await {
            Ok(roster) => ToolOutput::ok(
                &call.id,
                envelope::success(json!({
                    "count": roster.len(),
                    "validators": roster,
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
    async fn lists_all_roster_records() {
        let tool = ListValidatorsTool::new(fixed_service(1.0));
        let out = tool.execute(&ok_call(json!({}))).await;
        assert!(!out.is_error);
        let env: Value = serde_json::from_str(&out.content).unwrap();
        assert_eq!(env["data"]["count"], 2);
        let names: Vec<&str> = env["data"]["validators"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"TorchWallet.io"));
        assert!(names.contains(&"Moonlet"));
    }
}
