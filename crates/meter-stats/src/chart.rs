//! Chart series construction from time-ordered readings.
//!
//! The daily view and the coarser views carry deliberately different
//! semantics: per-day peak values versus the raw values of the most recent
//! readings. Each policy is a named strategy behind one trait so the
//! divergence stays explicit at the call site.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};

use meter_core::formatting::chart_label;
use meter_core::models::{ChartPoint, Period, Reading};

// ── SeriesStrategy ────────────────────────────────────────────────────────────

/// A policy for turning a reading collection into plottable points.
pub trait SeriesStrategy {
    /// Build the point sequence. Readings whose timestamp fails to parse
    /// are skipped; empty input yields an empty sequence.
    fn build(&self, readings: &[Reading]) -> Vec<ChartPoint>;
}

// ── DailyPeakStrategy ─────────────────────────────────────────────────────────

/// One point per calendar date, valued at the day's maximum reading.
///
/// For a monotonically non-decreasing cumulative counter the daily peak is
/// the day's last reading, assuming no resets. Output is ordered by date
/// ascending.
pub struct DailyPeakStrategy;

impl SeriesStrategy for DailyPeakStrategy {
    fn build(&self, readings: &[Reading]) -> Vec<ChartPoint> {
        let mut peaks: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for reading in readings {
            let Some(date) = reading.date() else { continue };
            peaks
                .entry(date)
                .and_modify(|v| *v = v.max(reading.value))
                .or_insert(reading.value);
        }

        peaks
            .into_iter()
            .map(|(date, value)| ChartPoint {
                label: chart_label(date),
                value,
                date,
            })
            .collect()
    }
}

// ── RecentRawStrategy ─────────────────────────────────────────────────────────

/// One point per reading for the chronologically last `limit` readings,
/// at each reading's raw counter value (not a delta).
///
/// A deliberately coarse fallback for the weekly and coarser views; its
/// point values are not comparable with [`DailyPeakStrategy`]'s.
pub struct RecentRawStrategy {
    /// Maximum number of trailing readings to emit.
    pub limit: usize,
}

impl Default for RecentRawStrategy {
    fn default() -> Self {
        Self { limit: 10 }
    }
}

impl SeriesStrategy for RecentRawStrategy {
    fn build(&self, readings: &[Reading]) -> Vec<ChartPoint> {
        let mut dated: Vec<(NaiveDateTime, &Reading)> = readings
            .iter()
            .filter_map(|r| r.parsed_timestamp().map(|ts| (ts, r)))
            .collect();
        dated.sort_by_key(|(ts, _)| *ts);

        let skip = dated.len().saturating_sub(self.limit);
        dated
            .into_iter()
            .skip(skip)
            .map(|(ts, reading)| ChartPoint {
                label: chart_label(ts.date()),
                value: reading.value,
                date: ts.date(),
            })
            .collect()
    }
}

// ── ChartSeriesBuilder ────────────────────────────────────────────────────────

/// Selects the series strategy for a [`Period`].
pub struct ChartSeriesBuilder;

impl ChartSeriesBuilder {
    /// Build the chart series for `period`: daily peaks for
    /// [`Period::Daily`], the last 10 raw readings for everything else.
    pub fn build_series(readings: &[Reading], period: Period) -> Vec<ChartPoint> {
        match period {
            Period::Daily => DailyPeakStrategy.build(readings),
            Period::Weekly | Period::Monthly | Period::Yearly | Period::Custom => {
                RecentRawStrategy::default().build(readings)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
