// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! Metric query construction: effective time windows, filter expressions,
//! and the request descriptor sent verbatim to the downstream service.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Metric types exported by the monitoring backend.
pub mod metric {
    pub const PROPOSER_EARNINGS: &str = "custom.googleapis.com/validator/proposer_earnings";
    pub const COSIGNER_EARNINGS: &str = "custom.googleapis.com/validator/cosigner_earnings";
    pub const STAKE: &str = "custom.googleapis.com/validator/stake";
    pub const PROPOSALS_TOTAL: &str = "custom.googleapis.com/validator/proposals_total";
    pub const PROPOSALS_SUCCESS: &str = "custom.googleapis.com/validator/proposals_success";
    pub const COSIGNS_TOTAL: &str = "custom.googleapis.com/validator/cosigns_total";
    pub const COSIGNS_SUCCESS: &str = "custom.googleapis.com/validator/cosigns_success";
    /// Labeled-snapshot metric carrying the validator roster in its labels.
    pub const ROSTER: &str = "custom.googleapis.com/validator/roster";
}

/// Label key that carries the validator public key on every per-validator
/// series; also the grouping key for the ranking tools.
pub const VALIDATOR_LABEL: &str = "validator_pubkey";

/// The effective query window plus how it should be described to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// True when the caller supplied either bound explicitly.  The textual
    /// description depends on this flag, not on the resulting window.
    pub explicit: bool,
}

impl QueryWindow {
    /// Resolve an optional start/end pair against `now`.
    ///
    /// A missing end becomes `now`; a missing start becomes one hour before
    /// the effective end.  The rules apply independently — an explicit end
    /// with no start still yields a 1-hour window ending there.
    pub fn resolve(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let explicit = start.is_some() || end.is_some();
        let end_eff = end.unwrap_or(now);
        let start_eff = start.unwrap_or(end_eff - Duration::hours(1));
        Self {
            start: start_eff,
            end: end_eff,
            explicit,
        }
    }

    /// Gauge snapshot window: the last five minutes before `now`.  Only the
    /// latest point matters for a gauge read.
    pub fn snapshot(now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::minutes(5),
            end: now,
            explicit: false,
        }
    }

    /// The widened fallback window: same end, start pushed back to 24 hours.
    pub fn widened(&self) -> Self {
        Self {
            start: self.end - Duration::hours(24),
            end: self.end,
            explicit: self.explicit,
        }
    }

    pub fn length_secs(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    /// Human-readable description of the applied window.
    ///
    /// "in the last hour" when the caller supplied no bound, otherwise
    /// "between <start> and <end>" — keyed off [`QueryWindow::explicit`],
    /// not off the window length, so a widened fallback window keeps the
    /// default description.
    pub fn describe(&self) -> String {
        if self.explicit {
            format!(
                "between {} and {}",
                self.start.to_rfc3339(),
                self.end.to_rfc3339()
            )
        } else {
            "in the last hour".to_string()
        }
    }
}

/// Downstream aggregation aligner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aligner {
    /// Value change over the bucket — cumulative counters.
    #[serde(rename = "ALIGN_DELTA")]
    Delta,
    /// Mean over the bucket — labeled-snapshot custom metrics.
    #[serde(rename = "ALIGN_MEAN")]
    Mean,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    /// Bucket width, e.g. `"3600s"`.
    pub alignment_period: String,
    pub per_series_aligner: Aligner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInterval {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// A request descriptor sent verbatim to the downstream service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricQuery {
    /// Project scope, e.g. `projects/zq2-mainnet`.
    pub name: String,
    pub filter: String,
    pub interval: TimeInterval,
    /// Omitted for gauge reads; required for counter deltas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
}

impl MetricQuery {
    fn interval(window: &QueryWindow) -> TimeInterval {
        TimeInterval {
            start_time: window.start,
            end_time: window.end,
        }
    }

    /// Counter read: a single bucket spanning the whole window, ALIGN_DELTA.
    pub fn counter(scope: &str, filter: String, window: &QueryWindow) -> Self {
        Self {
            name: scope.to_string(),
            filter,
            interval: Self::interval(window),
            aggregation: Some(Aggregation {
                alignment_period: format!("{}s", window.length_secs()),
                per_series_aligner: Aligner::Delta,
            }),
        }
    }

    /// Gauge read: no aggregation, only the latest point matters.
    pub fn gauge(scope: &str, filter: String, window: &QueryWindow) -> Self {
        Self {
            name: scope.to_string(),
            filter,
            interval: Self::interval(window),
            aggregation: None,
        }
    }

    /// Labeled-snapshot sample (the roster metric): ALIGN_MEAN over a single
    /// window-wide bucket.
    pub fn labeled_snapshot(scope: &str, filter: String, window: &QueryWindow) -> Self {
        Self {
            name: scope.to_string(),
            filter,
            interval: Self::interval(window),
            aggregation: Some(Aggregation {
                alignment_period: format!("{}s", window.length_secs()),
                per_series_aligner: Aligner::Mean,
            }),
        }
    }
}

/// Build a downstream filter expression from a metric type and label
/// constraints.
pub fn filter_expr(metric_type: &str, labels: &[(&str, &str)]) -> String {
    let mut expr = format!("metric.type = \"{metric_type}\"");
    for (key, value) in labels {
        expr.push_str(&format!(" AND metric.labels.{key} = \"{value}\""));
    }
    expr
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
