// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! Roster provider backed by the downstream roster metric.
//!
//! The monitoring backend exports a labeled-snapshot custom metric with one
//! series per validator; the identity fields ride in the series labels.
//! Every call samples the metric live — no caching, matching the rest of
//! the per-operation connection model.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use zilmon_core::{
    filter_expr, metric, MetricQuery, QueryWindow, RosterProvider, TimeSeries, ValidatorRecord,
};
use zilmon_downstream::TimeSeriesSource;

pub struct RemoteRoster {
    source: Arc<dyn TimeSeriesSource>,
    scope: String,
}

impl RemoteRoster {
    pub fn new(source: Arc<dyn TimeSeriesSource>, scope: impl Into<String>) -> Self {
        Self {
            source,
            scope: scope.into(),
        }
    }
}

#[async_trait]
impl RosterProvider for RemoteRoster {
    async fn roster(&self) -> anyhow::Result<Vec<ValidatorRecord>> {
        let window = QueryWindow::snapshot(Utc::now());
        let query = MetricQuery::labeled_snapshot(
            &self.scope,
            filter_expr(metric::ROSTER, &[]),
            &window,
        );
        let raw = self.source.list_time_series(&query).await?;
        Ok(parse_roster(&raw))
    }
}

/// Build validator records from roster-metric series labels.
///
/// Series missing any identity label are skipped; the first series per
/// public key wins, consistent with the gauge de-duplication rule.
fn parse_roster(raw: &str) -> Vec<ValidatorRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for series in TimeSeries::parse_array(raw) {
        let labels = &series.metric.labels;
        let (Some(name), Some(public_key), Some(address), Some(zil_address)) = (
            labels.get("name"),
            labels.get("public_key"),
            labels.get("address"),
            labels.get("zil_address"),
        ) else {
            continue;
        };
        if !seen.insert(public_key.to_ascii_lowercase()) {
            continue;
        }
        records.push(ValidatorRecord {
            name: name.clone(),
            public_key: public_key.clone(),
            address: address.clone(),
            zil_address: zil_address.clone(),
        });
    }
    records
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
