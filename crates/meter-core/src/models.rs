use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::MeterError;
use crate::time_utils;

// ── MeterType ─────────────────────────────────────────────────────────────────

/// The closed set of utility meters a reading can belong to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MeterType {
    /// Household electricity meter.
    Electricity,
    /// Cold water meter.
    ColdWater,
    /// Hot water meter.
    HotWater,
}

impl MeterType {
    /// Physical unit of this meter's cumulative counter.
    pub fn unit(&self) -> &'static str {
        match self {
            MeterType::Electricity => "kWh",
            MeterType::ColdWater | MeterType::HotWater => "m³",
        }
    }

    /// Human-readable name for display.
    pub fn label(&self) -> &'static str {
        match self {
            MeterType::Electricity => "Electricity",
            MeterType::ColdWater => "Cold water",
            MeterType::HotWater => "Hot water",
        }
    }

    /// All meter types, in distribution ordering.
    pub fn all() -> [MeterType; 3] {
        [
            MeterType::Electricity,
            MeterType::ColdWater,
            MeterType::HotWater,
        ]
    }
}

impl fmt::Display for MeterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MeterType {
    type Err = MeterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "electricity" => Ok(MeterType::Electricity),
            "cold_water" => Ok(MeterType::ColdWater),
            "hot_water" => Ok(MeterType::HotWater),
            other => Err(MeterError::UnknownMeterType(other.to_string())),
        }
    }
}

// ── Period ────────────────────────────────────────────────────────────────────

/// Coarse period selector from which a default [`DateRange`] is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// A single calendar day.
    Daily,
    /// The trailing seven days.
    Weekly,
    /// The trailing calendar month.
    Monthly,
    /// The trailing calendar year.
    Yearly,
    /// A caller-supplied explicit range.
    Custom,
}

impl Period {
    /// Human-readable name for display.
    pub fn label(&self) -> &'static str {
        match self {
            Period::Daily => "Day",
            Period::Weekly => "Week",
            Period::Monthly => "Month",
            Period::Yearly => "Year",
            Period::Custom => "Custom",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Period {
    type Err = MeterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            "yearly" => Ok(Period::Yearly),
            "custom" => Ok(Period::Custom),
            other => Err(MeterError::UnknownPeriod(other.to_string())),
        }
    }
}

// ── Reading ───────────────────────────────────────────────────────────────────

/// A single timestamped observation of a cumulative meter counter.
///
/// `value` is the counter's absolute position, not a delta; consumption is
/// derived downstream by differencing in-range readings per type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Storage-assigned identifier; `None` until persisted.
    #[serde(default)]
    pub id: Option<i64>,
    /// Which utility meter this observation belongs to.
    pub meter_type: MeterType,
    /// Cumulative counter value at the time of observation (non-negative).
    pub value: f64,
    /// Raw timestamp string, `"%Y-%m-%d %H:%M"` as written by storage.
    ///
    /// Kept raw so a malformed record is excluded from range filtering
    /// rather than failing the whole collection at deserialisation time.
    pub timestamp: String,
    /// Free-text note attached at entry time.
    #[serde(default)]
    pub note: String,
}

impl Reading {
    /// Parsed timestamp, or `None` if it matches no recognised format.
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        time_utils::parse_timestamp(&self.timestamp)
    }

    /// Calendar date of the reading, or `None` for a malformed timestamp.
    pub fn date(&self) -> Option<NaiveDate> {
        time_utils::parse_date(&self.timestamp)
    }
}

// ── DateRange ─────────────────────────────────────────────────────────────────

/// An inclusive range of calendar dates.
///
/// Callers are expected to supply `start <= end`; the analytics remain total
/// for inverted or zero-length ranges by flooring the span at one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the range (inclusive).
    pub start: NaiveDate,
    /// Last day of the range (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether `date` falls inside the range, inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Whole calendar days between start and end, minimum 1.
    ///
    /// A single-day range spans 1, not 0; an inverted range clamps to 1
    /// rather than going negative.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days().max(1)
    }

    /// The immediately preceding range of equal span.
    ///
    /// Ends the day before `start` and reaches back `span_days` further.
    pub fn previous(&self) -> DateRange {
        let span = self.span_days();
        DateRange {
            start: self.start - Duration::days(span),
            end: self.start - Duration::days(1),
        }
    }
}

// ── Result types ──────────────────────────────────────────────────────────────

/// Headline figures for the selected range.
///
/// Consumption is signed: a falling counter (physical meter reset or a
/// reversed entry) yields a negative delta that propagates unclamped, so
/// callers can decide whether to clamp or flag it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    /// Sum of per-type consumption deltas across the range.
    pub total_consumption: f64,
    /// Total divided by the range's span in days (span floored at 1).
    pub average_per_day: f64,
    /// Largest single type's consumption delta.
    pub max_consumption: f64,
    /// Physical unit when a single meter type was selected; `None` for
    /// multi-type aggregates, which have no single unit.
    #[serde(default)]
    pub unit: Option<String>,
}

/// Current-period consumption against the immediately preceding
/// equal-length period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Aggregate consumption in the current range.
    pub current: f64,
    /// Aggregate consumption in the previous range.
    pub previous: f64,
    /// Percentage change, 0 whenever `previous` is zero or negative.
    pub change_percentage: f64,
}

/// Per-type consumption deltas within the current range.
///
/// Only types present in the filtered, in-range readings appear. `BTreeMap`
/// keeps the iteration order stable for display.
pub type Distribution = BTreeMap<MeterType, f64>;

/// One plottable point of a chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Short `"dd.MM"` label for the axis.
    pub label: String,
    /// Daily peak value or raw reading value, depending on series policy.
    pub value: f64,
    /// Underlying calendar date; used for ordering, not display.
    pub date: NaiveDate,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
