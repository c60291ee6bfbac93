// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! Top-N ranking over per-validator aggregates.
//!
//! Two ranking modes: raw totals (stake, earnings) and success rates
//! (proposer / cosigner percentages).  The widen-window fallback merge lives
//! here too so every ranking tool applies the same "narrow overrides wide"
//! rule.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::roster::ValidatorRecord;

/// One ranked validator entry.  Ephemeral — produced per ranking call, never
/// persisted.  Enrichment fields stay `None` when the grouping key has no
/// roster match.
#[derive(Debug, Clone, Serialize)]
pub struct RankedEntry {
    /// Grouping key — the validator public key label.
    pub validator: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zil_address: Option<String>,
}

impl RankedEntry {
    fn new(validator: &str, value: f64) -> Self {
        Self {
            validator: validator.to_string(),
            value,
            rate: None,
            name: None,
            address: None,
            zil_address: None,
        }
    }
}

fn sort_descending(entries: &mut [RankedEntry]) {
    entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
}

/// Rank by raw aggregated total: sort descending, truncate to `limit`.
pub fn rank_totals(totals: &HashMap<String, f64>, limit: usize) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = totals
        .iter()
        .map(|(key, value)| RankedEntry::new(key, *value))
        .collect();
    sort_descending(&mut entries);
    entries.truncate(limit);
    entries
}

/// Rank by success percentage.
///
/// Entities with zero attempts are excluded entirely rather than ranked at
/// 0%.  The derived value is `(success / total) * 100`, carried both as a
/// sortable number and as a two-decimal percentage string.
pub fn rank_rates(
    totals: &HashMap<String, f64>,
    successes: &HashMap<String, f64>,
    limit: usize,
) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = totals
        .iter()
        .filter(|(_, total)| **total > 0.0)
        .map(|(key, total)| {
            let success = successes.get(key).copied().unwrap_or(0.0);
            let pct = success / total * 100.0;
            let mut entry = RankedEntry::new(key, pct);
            entry.rate = Some(format!("{pct:.2}%"));
            entry
        })
        .collect();
    sort_descending(&mut entries);
    entries.truncate(limit);
    entries
}

/// Two-decimal percentage, or `None` when the denominator is zero
/// ("not applicable" — never a division error).
pub fn success_rate(success: f64, total: f64) -> Option<String> {
    if total <= 0.0 {
        None
    } else {
        Some(format!("{:.2}%", success / total * 100.0))
    }
}

/// Merge a widened-window aggregate under a narrow-window one.
///
/// The wide map fills gaps; where both maps carry a key the narrow value
/// wins — fresher data is preferred, staleness is accepted only to reach
/// the requested count.
pub fn merge_narrow_over_wide(
    narrow: &HashMap<String, f64>,
    wide: &HashMap<String, f64>,
) -> HashMap<String, f64> {
    let mut merged = wide.clone();
    for (key, value) in narrow {
        merged.insert(key.clone(), *value);
    }
    merged
}

/// Join ranked entries with roster metadata by grouping key
/// (case-insensitive public-key match).  Unmatched entries are left as-is.
pub fn enrich(entries: &mut [RankedEntry], roster: &[ValidatorRecord]) {
    for entry in entries.iter_mut() {
        if let Some(record) = roster
            .iter()
            .find(|r| r.public_key.eq_ignore_ascii_case(&entry.validator))
        {
            entry.name = Some(record.name.clone());
            entry.address = Some(record.address.clone());
            entry.zil_address = Some(record.zil_address.clone());
        }
    }
}

// ─── Unit tests ───────────────────────────────────────────────────────────────
