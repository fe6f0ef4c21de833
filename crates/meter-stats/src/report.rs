//! Report pipeline tying range resolution, aggregation and series building
//! together, returning a [`StatsReport`] ready for a presentation layer.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use meter_core::models::{ChartPoint, DateRange, MeterType, Period, Reading};
use meter_core::period::PeriodResolver;

use crate::aggregator::{StatisticsAggregator, UsageStats};
use crate::chart::ChartSeriesBuilder;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// RFC 3339 timestamp when this report was generated.
    pub generated_at: String,
    /// Number of readings in the caller-supplied collection.
    pub readings_total: usize,
    /// Readings (after type filtering) whose date fell inside the range.
    pub readings_in_range: usize,
    /// Readings (after type filtering) excluded for malformed timestamps.
    pub readings_skipped: usize,
}

/// The complete output of [`build_report`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsReport {
    /// The period selector the report was built for.
    pub period: Period,
    /// The concrete inclusive range that was aggregated.
    pub range: DateRange,
    /// KPIs, previous-period comparison and per-type distribution.
    pub stats: UsageStats,
    /// Chart-ready point sequence for the period.
    pub series: Vec<ChartPoint>,
    /// Metadata about this report.
    pub metadata: ReportMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Build a full statistics report.
///
/// 1. Resolve the date range: an explicit range wins, otherwise
///    [`PeriodResolver::default_range`] anchored at `today`.
/// 2. Aggregate KPIs, comparison and distribution over the range.
/// 3. Build the chart series from the type-filtered readings.
///
/// Pure apart from the `generated_at` metadata stamp; repeated calls with
/// the same inputs yield identical stats and series.
pub fn build_report(
    readings: &[Reading],
    period: Period,
    explicit_range: Option<DateRange>,
    type_filter: Option<MeterType>,
    today: NaiveDate,
) -> StatsReport {
    let range = explicit_range.unwrap_or_else(|| PeriodResolver::default_range(period, today));
    debug!(
        "building report: period={:?} range={}..{} filter={:?}",
        period, range.start, range.end, type_filter
    );

    let stats = StatisticsAggregator::aggregate(readings, range, type_filter);

    let typed: Vec<Reading> = readings
        .iter()
        .filter(|r| type_filter.map_or(true, |t| r.meter_type == t))
        .cloned()
        .collect();
    let series = ChartSeriesBuilder::build_series(&typed, period);

    let readings_skipped = typed.iter().filter(|r| r.date().is_none()).count();
    let readings_in_range = typed
        .iter()
        .filter(|r| r.date().is_some_and(|d| range.contains(d)))
        .count();
    debug!(
        "report ready: {} in range, {} skipped, {} series points",
        readings_in_range,
        readings_skipped,
        series.len()
    );

    StatsReport {
        period,
        range,
        stats,
        series,
        metadata: ReportMetadata {
            generated_at: Utc::now().to_rfc3339(),
            readings_total: readings.len(),
            readings_in_range,
            readings_skipped,
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
