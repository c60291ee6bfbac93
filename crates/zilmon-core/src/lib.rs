// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//!
//! `zilmon-core` — pure domain logic for the zilmon metrics proxy.
//!
//! Everything in this crate is IO-free: the time-series extractor and
//! grouped aggregators consume raw JSON text, the query builder produces
//! request descriptors, and the ranking engine works on plain maps.  The
//! tool layer (`zilmon-tools`) wires these pieces to the downstream client.

mod query;
mod rank;
mod roster;
mod timeseries;

pub use query::{
    filter_expr, metric, Aggregation, Aligner, MetricQuery, QueryWindow, TimeInterval,
    VALIDATOR_LABEL,
};
pub use rank::{
    enrich, merge_narrow_over_wide, rank_rates, rank_totals, success_rate, RankedEntry,
};
pub use roster::{resolve, RosterProvider, StaticRoster, ValidatorRecord};
pub use timeseries::{
    extract_value, group_latest, group_sum, ExtractMode, MetricDescriptor, TimeSeries,
    TimeSeriesPoint, TypedValue,
};
