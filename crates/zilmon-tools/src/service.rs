// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! Orchestration layer shared by the builtin tools: builds metric queries,
//! drives the downstream source, and feeds the core aggregation/ranking
//! functions.
//!
//! Per-validator counters for one tool call are fetched concurrently with a
//! fail-together join — a failure in either branch aborts the call and is
//! reported through the failure envelope.  The deep stake fallback is the
//! one place errors are swallowed per validator instead.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use zilmon_core::{
    extract_value, filter_expr, group_latest, group_sum, merge_narrow_over_wide, metric,
    rank_rates, rank_totals, ExtractMode, MetricQuery, QueryWindow, RankedEntry, RosterProvider,
    ValidatorRecord, VALIDATOR_LABEL,
};
use zilmon_downstream::{DownstreamError, TimeSeriesSource};

/// Which success-rate metric pair a tool works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateKind {
    Proposer,
    Cosigner,
}

impl RateKind {
    pub fn total_metric(self) -> &'static str {
        match self {
            RateKind::Proposer => metric::PROPOSALS_TOTAL,
            RateKind::Cosigner => metric::COSIGNS_TOTAL,
        }
    }

    pub fn success_metric(self) -> &'static str {
        match self {
            RateKind::Proposer => metric::PROPOSALS_SUCCESS,
            RateKind::Cosigner => metric::COSIGNS_SUCCESS,
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            RateKind::Proposer => "proposer",
            RateKind::Cosigner => "cosigner",
        }
    }
}

/// Earnings of one validator over a window, split by role.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Earnings {
    pub proposer: f64,
    pub cosigner: f64,
}

impl Earnings {
    pub fn total(&self) -> f64 {
        self.proposer + self.cosigner
    }
}

/// Query orchestration shared by all tools.
pub struct MetricsService {
    source: Arc<dyn TimeSeriesSource>,
    scope: String,
    roster: Arc<dyn RosterProvider>,
}

impl MetricsService {
    pub fn new(
        source: Arc<dyn TimeSeriesSource>,
        scope: impl Into<String>,
        roster: Arc<dyn RosterProvider>,
    ) -> Self {
        Self {
            source,
            scope: scope.into(),
            roster,
        }
    }

    /// Current roster from the injected provider.
    pub async fn roster(&self) -> anyhow::Result<Vec<ValidatorRecord>> {
        self.roster.roster().await
    }

    /// Resolve a user-supplied identifier to a roster record.
    pub async fn resolve(&self, identifier: &str) -> anyhow::Result<Option<ValidatorRecord>> {
        let roster = self.roster.roster().await?;
        Ok(zilmon_core::resolve(identifier, &roster).cloned())
    }

    // ── Single-query helpers ──────────────────────────────────────────────

    async fn counter_value(
        &self,
        metric_type: &str,
        pubkey: &str,
        window: &QueryWindow,
    ) -> Result<f64, DownstreamError> {
        let filter = filter_expr(metric_type, &[(VALIDATOR_LABEL, pubkey)]);
        let raw = self
            .source
            .list_time_series(&MetricQuery::counter(&self.scope, filter, window))
            .await?;
        Ok(extract_value(&raw, ExtractMode::Sum))
    }

    async fn gauge_value(
        &self,
        metric_type: &str,
        pubkey: &str,
        window: &QueryWindow,
    ) -> Result<f64, DownstreamError> {
        let filter = filter_expr(metric_type, &[(VALIDATOR_LABEL, pubkey)]);
        let raw = self
            .source
            .list_time_series(&MetricQuery::gauge(&self.scope, filter, window))
            .await?;
        Ok(extract_value(&raw, ExtractMode::Latest))
    }

    async fn grouped_counter(
        &self,
        metric_type: &str,
        window: &QueryWindow,
    ) -> Result<HashMap<String, f64>, DownstreamError> {
        let filter = filter_expr(metric_type, &[]);
        let raw = self
            .source
            .list_time_series(&MetricQuery::counter(&self.scope, filter, window))
            .await?;
        Ok(group_sum(&raw, VALIDATOR_LABEL))
    }

    async fn grouped_gauge(
        &self,
        metric_type: &str,
        window: &QueryWindow,
    ) -> Result<HashMap<String, f64>, DownstreamError> {
        let filter = filter_expr(metric_type, &[]);
        let raw = self
            .source
            .list_time_series(&MetricQuery::gauge(&self.scope, filter, window))
            .await?;
        Ok(group_latest(&raw, VALIDATOR_LABEL))
    }

    // ── Per-validator operations ──────────────────────────────────────────

    /// Proposer and cosigner earnings over the window, fetched concurrently.
    pub async fn earnings(
        &self,
        pubkey: &str,
        window: &QueryWindow,
    ) -> anyhow::Result<Earnings> {
        let (proposer, cosigner) = tokio::try_join!(
            self.counter_value(metric::PROPOSER_EARNINGS, pubkey, window),
            self.counter_value(metric::COSIGNER_EARNINGS, pubkey, window),
        )?;
        Ok(Earnings { proposer, cosigner })
    }

    /// Current stake (gauge): latest point in the snapshot window.
    pub async fn stake(&self, pubkey: &str, now: DateTime<Utc>) -> anyhow::Result<f64> {
        let window = QueryWindow::snapshot(now);
        Ok(self.gauge_value(metric::STAKE, pubkey, &window).await?)
    }

    /// Attempt and success counts for one validator.
    pub async fn success_counts(
        &self,
        kind: RateKind,
        pubkey: &str,
        window: &QueryWindow,
    ) -> anyhow::Result<(f64, f64)> {
        let (total, success) = tokio::try_join!(
            self.counter_value(kind.total_metric(), pubkey, window),
            self.counter_value(kind.success_metric(), pubkey, window),
        )?;
        Ok((total, success))
    }

    // ── Ranking operations ────────────────────────────────────────────────

    async fn earnings_by_validator(
        &self,
        window: &QueryWindow,
    ) -> Result<HashMap<String, f64>, DownstreamError> {
        let (proposer, cosigner) = tokio::try_join!(
            self.grouped_counter(metric::PROPOSER_EARNINGS, window),
            self.grouped_counter(metric::COSIGNER_EARNINGS, window),
        )?;
        let mut totals = proposer;
        for (key, value) in cosigner {
            *totals.entry(key).or_insert(0.0) += value;
        }
        Ok(totals)
    }

    /// Top earners (proposer + cosigner rewards) over the window.
    ///
    /// When the caller supplied no explicit bound and fewer than `limit`
    /// validators qualify, the same queries are re-issued over 24 hours and
    /// merged narrow-over-wide.
    pub async fn top_earners(
        &self,
        limit: usize,
        window: &QueryWindow,
    ) -> anyhow::Result<Vec<RankedEntry>> {
        let mut totals = self.earnings_by_validator(window).await?;
        if !window.explicit && totals.len() < limit {
            let wide = self.earnings_by_validator(&window.widened()).await?;
            totals = merge_narrow_over_wide(&totals, &wide);
        }
        let mut entries = rank_totals(&totals, limit);
        self.enrich_entries(&mut entries).await;
        Ok(entries)
    }

    /// Top validators by current stake.
    ///
    /// Three tiers: the batched gauge query, the widened batched query, and
    /// finally an individual probe per still-missing validator — batched
    /// filters can miss sparse gauge series entirely.  The probes run
    /// sequentially to bound downstream load, and a failed probe omits that
    /// validator only.
    pub async fn top_stakers(
        &self,
        limit: usize,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<RankedEntry>> {
        let window = QueryWindow::snapshot(now);
        let mut stakes = self.grouped_gauge(metric::STAKE, &window).await?;

        if stakes.len() < limit {
            let wide = self.grouped_gauge(metric::STAKE, &window.widened()).await?;
            stakes = merge_narrow_over_wide(&stakes, &wide);
        }

        if stakes.len() < limit {
            let roster = self.roster.roster().await.unwrap_or_else(|e| {
                warn!(error = %e, "roster unavailable for stake fallback");
                Vec::new()
            });
            for record in roster {
                let known = stakes
                    .keys()
                    .any(|k| k.eq_ignore_ascii_case(&record.public_key));
                if known {
                    continue;
                }
                match self
                    .gauge_value(metric::STAKE, &record.public_key, &window.widened())
                    .await
                {
                    Ok(v) if v > 0.0 => {
                        stakes.insert(record.public_key.clone(), v);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(
                            validator = %record.name,
                            error = %e,
                            "stake fallback query failed, omitting validator"
                        );
                    }
                }
            }
        }

        let mut entries = rank_totals(&stakes, limit);
        self.enrich_entries(&mut entries).await;
        Ok(entries)
    }

    /// Top validators by success rate; zero-attempt validators are excluded.
    pub async fn top_rates(
        &self,
        kind: RateKind,
        limit: usize,
        window: &QueryWindow,
    ) -> anyhow::Result<Vec<RankedEntry>> {
        let (mut totals, mut successes) = tokio::try_join!(
            self.grouped_counter(kind.total_metric(), window),
            self.grouped_counter(kind.success_metric(), window),
        )?;

        let qualifying = totals.values().filter(|t| **t > 0.0).count();
        if !window.explicit && qualifying < limit {
            let wide = window.widened();
            let (wide_totals, wide_successes) = tokio::try_join!(
                self.grouped_counter(kind.total_metric(), &wide),
                self.grouped_counter(kind.success_metric(), &wide),
            )?;
            totals = merge_narrow_over_wide(&totals, &wide_totals);
            successes = merge_narrow_over_wide(&successes, &wide_successes);
        }

        let mut entries = rank_rates(&totals, &successes, limit);
        self.enrich_entries(&mut entries).await;
        Ok(entries)
    }

    /// Best-effort roster join; a roster failure skips enrichment rather
    /// than failing the ranking call.
    async fn enrich_entries(&self, entries: &mut [RankedEntry]) {
        match self.roster.roster().await {
            Ok(roster) => zilmon_core::enrich(entries, &roster),
            Err(e) => warn!(error = %e, "roster unavailable, skipping enrichment"),
        }
    }
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
