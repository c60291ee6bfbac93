// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! Time-series payload parsing, value extraction and grouped aggregation.
//!
//! The downstream monitoring service answers every metric query with a JSON
//! array of time series.  All functions here are total: malformed or empty
//! payloads degrade to "no data" (zero / empty map) with a `warn` log line,
//! never an error.  Points are ordered most-recent-first by the upstream
//! service, so "latest value" is always `points[0]`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A single sampled value.
///
/// Exactly one of the two fields is populated per point; `double_value`
/// takes priority when both are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_value: Option<f64>,
    /// 64-bit integers arrive as JSON strings from the downstream service,
    /// so the deserializer accepts both encodings.
    #[serde(
        default,
        deserialize_with = "de_int64",
        skip_serializing_if = "Option::is_none"
    )]
    pub int64_value: Option<i64>,
}

impl TypedValue {
    /// Numeric value of this sample; a missing value contributes 0.
    pub fn as_f64(&self) -> f64 {
        if let Some(d) = self.double_value {
            d
        } else if let Some(i) = self.int64_value {
            i as f64
        } else {
            0.0
        }
    }
}

fn de_int64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// One sample in a series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    #[serde(default)]
    pub value: TypedValue,
}

/// Metric identity attached to a series: the type plus its label set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricDescriptor {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub metric_type: Option<String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// A time series as returned by the downstream service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    #[serde(default)]
    pub metric: MetricDescriptor,
    #[serde(default)]
    pub points: Vec<TimeSeriesPoint>,
}

impl TimeSeries {
    /// Value of the most recent sample (`points[0]`), or 0 when empty.
    pub fn latest(&self) -> f64 {
        self.points.first().map(|p| p.value.as_f64()).unwrap_or(0.0)
    }

    /// Parse a raw downstream payload into a series array.
    ///
    /// An empty payload yields an empty array; a malformed one is logged
    /// and treated the same way.
    pub fn parse_array(raw: &str) -> Vec<TimeSeries> {
        if raw.trim().is_empty() {
            return Vec::new();
        }
        match serde_json::from_str::<Vec<TimeSeries>>(raw) {
            Ok(series) => series,
            Err(e) => {
                warn!(error = %e, "unparseable time-series payload, treating as no data");
                Vec::new()
            }
        }
    }
}

/// How values from multiple series are combined by [`extract_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Add the latest sample of every series.  Counters (earnings, proposal
    /// and cosignature counts) report one series per shard and must be
    /// summed.
    Sum,
    /// Read only the first series in array order.  Gauges (stake) are
    /// reported redundantly, and duplicate series for the same entity must
    /// not be double-counted.
    Latest,
}

/// Extract a single numeric value from a raw downstream payload.
pub fn extract_value(raw: &str, mode: ExtractMode) -> f64 {
    let series = TimeSeries::parse_array(raw);
    match mode {
        ExtractMode::Sum => series.iter().map(TimeSeries::latest).sum(),
        ExtractMode::Latest => series.first().map(TimeSeries::latest).unwrap_or(0.0),
    }
}

/// Sum the latest sample of every series, keyed by the value of `label_key`.
///
/// Series lacking the label are skipped.  Used for counters, where several
/// series per entity are expected and must accumulate.
pub fn group_sum(raw: &str, label_key: &str) -> HashMap<String, f64> {
    let mut totals = HashMap::new();
    for series in TimeSeries::parse_array(raw) {
        let Some(label) = series.metric.labels.get(label_key) else {
            continue;
        };
        *totals.entry(label.clone()).or_insert(0.0) += series.latest();
    }
    totals
}

/// Latest sample per label value; the first series observed for a label wins.
///
/// Later series for the same label are ignored — duplicate gauge reporting
/// must not overwrite the first-reported value.
pub fn group_latest(raw: &str, label_key: &str) -> HashMap<String, f64> {
    let mut latest = HashMap::new();
    for series in TimeSeries::parse_array(raw) {
        let Some(label) = series.metric.labels.get(label_key) else {
            continue;
        };
        latest
            .entry(label.clone())
            .or_insert_with(|| series.latest());
    }
    latest
}

// ─── Unit tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn series(label: &str, value: f64) -> String {
        format!(
            r#"{{"metric":{{"labels":{{"validator_pubkey":"{label}"}}}},"points":[{{"value":{{"doubleValue":{value}}}}}]}}"#
        )
    }

    fn payload(parts: &[String]) -> String {
        format!("[{}]", parts.join(","))
    }

    // ── TypedValue coercion ────────────────────────────────────────────────

    #[test]
    fn double_value_read_as_is() {
        let v: TypedValue = serde_json::from_str(r#"{"doubleValue":1.5}"#).unwrap();
        assert_eq!(v.as_f64(), 1.5);
    }

    #[test]
    fn int64_value_accepts_json_number() {
        let v: TypedValue = serde_json::from_str(r#"{"int64Value":42}"#).unwrap();
        assert_eq!(v.as_f64(), 42.0);
    }

    #[test]
    fn int64_value_accepts_json_string() {
        let v: TypedValue = serde_json::from_str(r#"{"int64Value":"1200"}"#).unwrap();
        assert_eq!(v.as_f64(), 1200.0);
    }

    #[test]
    fn double_wins_over_int64_when_both_present() {
        let v: TypedValue =
            serde_json::from_str(r#"{"doubleValue":2.5,"int64Value":99}"#).unwrap();
        assert_eq!(v.as_f64(), 2.5);
    }

    #[test]
    fn neither_field_contributes_zero() {
        let v: TypedValue = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(v.as_f64(), 0.0);
    }

    // ── extract_value ──────────────────────────────────────────────────────

    #[test]
    fn malformed_payload_returns_zero() {
        assert_eq!(extract_value("not json at all", ExtractMode::Sum), 0.0);
        assert_eq!(extract_value("{\"truncated\":", ExtractMode::Latest), 0.0);
    }

    #[test]
    fn empty_payload_returns_zero() {
        assert_eq!(extract_value("", ExtractMode::Sum), 0.0);
        assert_eq!(extract_value("[]", ExtractMode::Sum), 0.0);
        assert_eq!(extract_value("[]", ExtractMode::Latest), 0.0);
    }

    #[test]
    fn sum_mode_adds_all_series() {
        let raw = payload(&[series("a", 10.0), series("b", 32.0)]);
        assert_eq!(extract_value(&raw, ExtractMode::Sum), 42.0);
    }

    #[test]
    fn latest_mode_reads_only_first_series() {
        let raw = payload(&[series("a", 10.0), series("a", 32.0)]);
        assert_eq!(extract_value(&raw, ExtractMode::Latest), 10.0);
    }

    #[test]
    fn series_without_points_contributes_zero() {
        let raw = r#"[{"metric":{"labels":{}},"points":[]}]"#;
        assert_eq!(extract_value(raw, ExtractMode::Sum), 0.0);
    }

    #[test]
    fn latest_uses_first_point_only() {
        let raw = r#"[{"metric":{"labels":{}},"points":[
            {"value":{"doubleValue":7.0}},
            {"value":{"doubleValue":100.0}}
        ]}]"#;
        assert_eq!(extract_value(raw, ExtractMode::Latest), 7.0);
    }

    // ── group_sum ──────────────────────────────────────────────────────────

    #[test]
    fn group_sum_accumulates_shared_label() {
        let raw = payload(&[series("v1", 10.0), series("v1", 5.0), series("v2", 3.0)]);
        let totals = group_sum(&raw, "validator_pubkey");
        assert_eq!(totals["v1"], 15.0);
        assert_eq!(totals["v2"], 3.0);
    }

    #[test]
    fn group_sum_equals_sum_of_individual_extractions() {
        let a = payload(&[series("v", 11.0)]);
        let b = payload(&[series("v", 31.0)]);
        let both = payload(&[series("v", 11.0), series("v", 31.0)]);
        let expected = extract_value(&a, ExtractMode::Sum) + extract_value(&b, ExtractMode::Sum);
        assert_eq!(group_sum(&both, "validator_pubkey")["v"], expected);
    }

    #[test]
    fn group_sum_skips_series_lacking_label() {
        let raw = format!(
            r#"[{},{{"metric":{{"labels":{{"other":"x"}}}},"points":[{{"value":{{"doubleValue":9.0}}}}]}}]"#,
            series("v1", 1.0)
        );
        let totals = group_sum(&raw, "validator_pubkey");
        assert_eq!(totals.len(), 1);
        assert_eq!(totals["v1"], 1.0);
    }

    #[test]
    fn group_sum_malformed_returns_empty_map() {
        assert!(group_sum("garbage", "validator_pubkey").is_empty());
        assert!(group_sum("", "validator_pubkey").is_empty());
    }

    // ── group_latest ───────────────────────────────────────────────────────

    #[test]
    fn group_latest_first_series_wins() {
        let raw = payload(&[series("v1", 100.0), series("v1", 250.0)]);
        let latest = group_latest(&raw, "validator_pubkey");
        assert_eq!(latest["v1"], 100.0);
    }

    #[test]
    fn group_latest_first_wins_regardless_of_magnitude() {
        // The second series is larger; the bias toward the first-reported
        // value must still hold.
        let raw = payload(&[series("v1", 1.0), series("v1", 1_000_000.0)]);
        assert_eq!(group_latest(&raw, "validator_pubkey")["v1"], 1.0);
    }

    #[test]
    fn group_latest_keeps_distinct_labels() {
        let raw = payload(&[series("v1", 100.0), series("v2", 250.0)]);
        let latest = group_latest(&raw, "validator_pubkey");
        assert_eq!(latest.len(), 2);
        assert_eq!(latest["v2"], 250.0);
    }

    #[test]
    fn group_latest_malformed_returns_empty_map() {
        assert!(group_latest("[not json", "validator_pubkey").is_empty());
    }
}
