//! Period-scoped statistics over cumulative meter readings.
//!
//! Consumption is derived by differencing a type's first and last in-range
//! counter values; the aggregator is total and maps every degenerate input
//! to zeroed output instead of raising.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use meter_core::models::{
    ComparisonResult, DateRange, Distribution, KpiSet, MeterType, Reading,
};

// ── UsageStats ────────────────────────────────────────────────────────────────

/// Complete output of one aggregation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Headline totals for the selected range.
    pub kpi: KpiSet,
    /// Current range against the immediately preceding equal-length range.
    pub comparison: ComparisonResult,
    /// Per-type consumption breakdown within the selected range.
    pub distribution: Distribution,
}

// ── StatisticsAggregator ──────────────────────────────────────────────────────

/// Stateless helper computing KPIs, comparison and distribution for a range.
pub struct StatisticsAggregator;

impl StatisticsAggregator {
    /// Aggregate `readings` over `range`, optionally narrowed to one meter
    /// type.
    ///
    /// Readings whose timestamp fails to parse are excluded from range
    /// filtering for this call; a single bad record never aborts the whole
    /// set. An empty filtered set is a defined terminal case and returns
    /// [`UsageStats::default`], not an error.
    pub fn aggregate(
        readings: &[Reading],
        range: DateRange,
        type_filter: Option<MeterType>,
    ) -> UsageStats {
        let typed: Vec<&Reading> = readings
            .iter()
            .filter(|r| type_filter.map_or(true, |t| r.meter_type == t))
            .collect();

        let in_range: Vec<&Reading> = typed
            .iter()
            .copied()
            .filter(|r| r.date().is_some_and(|d| range.contains(d)))
            .collect();

        if in_range.is_empty() {
            return UsageStats::default();
        }

        let distribution = Self::consumption_by_type(&in_range);
        let total: f64 = distribution.values().sum();
        let span_days = range.span_days();
        let average = total / span_days as f64;
        let max = distribution.values().copied().reduce(f64::max).unwrap_or(0.0);

        let kpi = KpiSet {
            total_consumption: total,
            average_per_day: average,
            max_consumption: max,
            unit: type_filter.map(|t| t.unit().to_string()),
        };

        // Previous period: same per-type delta-sum over the type-filtered
        // readings that fall into the preceding equal-length range.
        let previous_range = range.previous();
        let previous_readings: Vec<&Reading> = typed
            .iter()
            .copied()
            .filter(|r| r.date().is_some_and(|d| previous_range.contains(d)))
            .collect();
        let previous: f64 = Self::consumption_by_type(&previous_readings)
            .values()
            .sum();

        let change_percentage = if previous > 0.0 {
            (total - previous) / previous * 100.0
        } else {
            0.0
        };

        UsageStats {
            kpi,
            comparison: ComparisonResult {
                current: total,
                previous,
                change_percentage,
            },
            distribution,
        }
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Per-type consumption deltas: `last.value - first.value` over readings
    /// sorted by timestamp ascending.
    ///
    /// The delta is signed on purpose; a falling counter (meter reset,
    /// reversed entry) yields negative consumption that the caller decides
    /// how to treat. A type with a single reading contributes 0 (delta
    /// undefined with one sample) but still appears in the map.
    fn consumption_by_type(readings: &[&Reading]) -> Distribution {
        let mut groups: BTreeMap<MeterType, Vec<&Reading>> = BTreeMap::new();
        for &reading in readings {
            groups.entry(reading.meter_type).or_default().push(reading);
        }

        let mut distribution = Distribution::new();
        for (meter_type, mut group) in groups {
            group.sort_by_key(|r| r.parsed_timestamp());
            let delta = match group.as_slice() {
                [] | [_] => 0.0,
                [first, .., last] => last.value - first.value,
            };
            distribution.insert(meter_type, delta);
        }
        distribution
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_reading(meter_type: MeterType, value: f64, timestamp: &str) -> Reading {
        Reading {
            id: None,
            meter_type,
            value,
            timestamp: timestamp.to_string(),
            note: String::new(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn january() -> DateRange {
        DateRange::new(date(2024, 1, 1), date(2024, 1, 31))
    }

    // ── Empty / degenerate inputs ─────────────────────────────────────────

    #[test]
    fn test_no_readings_yields_zeroed_stats() {
        let stats = StatisticsAggregator::aggregate(&[], january(), None);
        assert_eq!(stats, UsageStats::default());
        assert_eq!(stats.kpi.unit, None);
        assert!(stats.distribution.is_empty());
    }

    #[test]
    fn test_no_matching_readings_yields_zeroed_stats() {
        let readings = vec![make_reading(
            MeterType::Electricity,
            100.0,
            "2023-06-01 12:00",
        )];
        let stats = StatisticsAggregator::aggregate(&readings, january(), None);
        assert_eq!(stats, UsageStats::default());
    }

    #[test]
    fn test_type_filter_with_no_matches_yields_zeroed_stats() {
        let readings = vec![make_reading(
            MeterType::Electricity,
            100.0,
            "2024-01-10 12:00",
        )];
        let stats =
            StatisticsAggregator::aggregate(&readings, january(), Some(MeterType::ColdWater));
        assert_eq!(stats, UsageStats::default());
    }

    #[test]
    fn test_inverted_range_yields_zeroed_stats() {
        let readings = vec![make_reading(
            MeterType::Electricity,
            100.0,
            "2024-01-10 12:00",
        )];
        let inverted = DateRange::new(date(2024, 1, 31), date(2024, 1, 1));
        let stats = StatisticsAggregator::aggregate(&readings, inverted, None);
        assert_eq!(stats, UsageStats::default());
    }

    // ── Consumption deltas ────────────────────────────────────────────────

    #[test]
    fn test_single_type_delta_is_last_minus_first() {
        let readings = vec![
            make_reading(MeterType::Electricity, 10.0, "2024-01-05 08:00"),
            make_reading(MeterType::Electricity, 25.0, "2024-01-20 08:00"),
        ];
        let stats = StatisticsAggregator::aggregate(&readings, january(), None);
        assert_eq!(stats.distribution[&MeterType::Electricity], 15.0);
        assert_eq!(stats.kpi.total_consumption, 15.0);
    }

    #[test]
    fn test_delta_uses_timestamp_order_not_input_order() {
        let readings = vec![
            make_reading(MeterType::Electricity, 25.0, "2024-01-20 08:00"),
            make_reading(MeterType::Electricity, 10.0, "2024-01-05 08:00"),
        ];
        let stats = StatisticsAggregator::aggregate(&readings, january(), None);
        assert_eq!(stats.distribution[&MeterType::Electricity], 15.0);
    }

    #[test]
    fn test_single_reading_contributes_zero_but_appears() {
        let readings = vec![make_reading(
            MeterType::HotWater,
            500.0,
            "2024-01-15 09:00",
        )];
        let stats = StatisticsAggregator::aggregate(&readings, january(), None);
        assert_eq!(stats.distribution[&MeterType::HotWater], 0.0);
        assert_eq!(stats.kpi.total_consumption, 0.0);
    }

    #[test]
    fn test_falling_counter_yields_negative_delta_unclamped() {
        // A physical meter reset mid-range: the signed delta propagates.
        let readings = vec![
            make_reading(MeterType::Electricity, 900.0, "2024-01-05 08:00"),
            make_reading(MeterType::Electricity, 100.0, "2024-01-25 08:00"),
        ];
        let stats = StatisticsAggregator::aggregate(&readings, january(), None);
        assert_eq!(stats.distribution[&MeterType::Electricity], -800.0);
        assert_eq!(stats.kpi.total_consumption, -800.0);
        assert_eq!(stats.kpi.max_consumption, -800.0);
    }

    #[test]
    fn test_distribution_covers_only_present_types() {
        let readings = vec![
            make_reading(MeterType::Electricity, 100.0, "2024-01-05 08:00"),
            make_reading(MeterType::Electricity, 130.0, "2024-01-25 08:00"),
            make_reading(MeterType::ColdWater, 10.0, "2024-01-05 08:00"),
            make_reading(MeterType::ColdWater, 14.0, "2024-01-25 08:00"),
        ];
        let stats = StatisticsAggregator::aggregate(&readings, january(), None);
        assert_eq!(stats.distribution.len(), 2);
        assert_eq!(stats.distribution[&MeterType::Electricity], 30.0);
        assert_eq!(stats.distribution[&MeterType::ColdWater], 4.0);
        assert!(!stats.distribution.contains_key(&MeterType::HotWater));
        assert_eq!(stats.kpi.total_consumption, 34.0);
        assert_eq!(stats.kpi.max_consumption, 30.0);
    }

    // ── KPI derivation ────────────────────────────────────────────────────

    #[test]
    fn test_average_divides_by_span_days() {
        // 30-day span (Jan 1 → Jan 31), total 30 → 1.0 per day.
        let readings = vec![
            make_reading(MeterType::Electricity, 100.0, "2024-01-01 08:00"),
            make_reading(MeterType::Electricity, 130.0, "2024-01-31 08:00"),
        ];
        let stats = StatisticsAggregator::aggregate(&readings, january(), None);
        assert!((stats.kpi.average_per_day - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_floors_single_day_span_to_one() {
        let single_day = DateRange::new(date(2024, 1, 15), date(2024, 1, 15));
        let readings = vec![
            make_reading(MeterType::Electricity, 100.0, "2024-01-15 08:00"),
            make_reading(MeterType::Electricity, 112.0, "2024-01-15 20:00"),
        ];
        let stats = StatisticsAggregator::aggregate(&readings, single_day, None);
        assert_eq!(stats.kpi.total_consumption, 12.0);
        assert_eq!(stats.kpi.average_per_day, 12.0);
    }

    #[test]
    fn test_unit_present_only_with_type_filter() {
        let readings = vec![
            make_reading(MeterType::Electricity, 100.0, "2024-01-05 08:00"),
            make_reading(MeterType::Electricity, 130.0, "2024-01-25 08:00"),
        ];
        let unfiltered = StatisticsAggregator::aggregate(&readings, january(), None);
        assert_eq!(unfiltered.kpi.unit, None);

        let filtered =
            StatisticsAggregator::aggregate(&readings, january(), Some(MeterType::Electricity));
        assert_eq!(filtered.kpi.unit.as_deref(), Some("kWh"));
    }

    #[test]
    fn test_type_filter_discards_other_types() {
        let readings = vec![
            make_reading(MeterType::Electricity, 100.0, "2024-01-05 08:00"),
            make_reading(MeterType::Electricity, 130.0, "2024-01-25 08:00"),
            make_reading(MeterType::ColdWater, 10.0, "2024-01-05 08:00"),
            make_reading(MeterType::ColdWater, 99.0, "2024-01-25 08:00"),
        ];
        let stats =
            StatisticsAggregator::aggregate(&readings, january(), Some(MeterType::Electricity));
        assert_eq!(stats.distribution.len(), 1);
        assert_eq!(stats.kpi.total_consumption, 30.0);
    }

    // ── Malformed timestamps ──────────────────────────────────────────────

    #[test]
    fn test_malformed_timestamp_is_excluded_not_fatal() {
        let readings = vec![
            make_reading(MeterType::Electricity, 10.0, "2024-01-05 08:00"),
            make_reading(MeterType::Electricity, 9999.0, "not a timestamp"),
            make_reading(MeterType::Electricity, 25.0, "2024-01-20 08:00"),
        ];
        let stats = StatisticsAggregator::aggregate(&readings, january(), None);
        assert_eq!(stats.distribution[&MeterType::Electricity], 15.0);
    }

    // ── Previous-period comparison ────────────────────────────────────────

    #[test]
    fn test_change_percentage_zero_when_previous_absent() {
        let readings = vec![
            make_reading(MeterType::Electricity, 10.0, "2024-01-05 08:00"),
            make_reading(MeterType::Electricity, 25.0, "2024-01-20 08:00"),
        ];
        let stats = StatisticsAggregator::aggregate(&readings, january(), None);
        assert_eq!(stats.comparison.previous, 0.0);
        assert_eq!(stats.comparison.change_percentage, 0.0);
        assert_eq!(stats.comparison.current, 15.0);
    }

    #[test]
    fn test_change_percentage_zero_when_previous_negative() {
        // Previous period holds a falling counter; its negative consumption
        // must not feed the percentage division.
        let readings = vec![
            make_reading(MeterType::Electricity, 500.0, "2023-12-05 08:00"),
            make_reading(MeterType::Electricity, 400.0, "2023-12-20 08:00"),
            make_reading(MeterType::Electricity, 410.0, "2024-01-05 08:00"),
            make_reading(MeterType::Electricity, 440.0, "2024-01-20 08:00"),
        ];
        let stats = StatisticsAggregator::aggregate(&readings, january(), None);
        assert_eq!(stats.comparison.previous, -100.0);
        assert_eq!(stats.comparison.change_percentage, 0.0);
    }

    #[test]
    fn test_change_percentage_computed_against_previous() {
        // Current Jan 1..31 (span 30) → previous Dec 2..Dec 31.
        let readings = vec![
            make_reading(MeterType::Electricity, 100.0, "2023-12-05 08:00"),
            make_reading(MeterType::Electricity, 120.0, "2023-12-28 08:00"),
            make_reading(MeterType::Electricity, 130.0, "2024-01-05 08:00"),
            make_reading(MeterType::Electricity, 160.0, "2024-01-28 08:00"),
        ];
        let stats = StatisticsAggregator::aggregate(&readings, january(), None);
        assert_eq!(stats.comparison.current, 30.0);
        assert_eq!(stats.comparison.previous, 20.0);
        assert!((stats.comparison.change_percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_previous_period_groups_per_type() {
        // Two types in the previous period: deltas are summed per type, not
        // taken last-minus-first over the mixed sequence.
        let readings = vec![
            make_reading(MeterType::Electricity, 100.0, "2023-12-05 08:00"),
            make_reading(MeterType::Electricity, 110.0, "2023-12-28 08:00"),
            make_reading(MeterType::ColdWater, 10.0, "2023-12-06 08:00"),
            make_reading(MeterType::ColdWater, 15.0, "2023-12-27 08:00"),
            make_reading(MeterType::Electricity, 120.0, "2024-01-05 08:00"),
            make_reading(MeterType::Electricity, 150.0, "2024-01-20 08:00"),
        ];
        let stats = StatisticsAggregator::aggregate(&readings, january(), None);
        // Electricity 10 + cold water 5, not coldwater-last minus elec-first.
        assert_eq!(stats.comparison.previous, 15.0);
    }

    #[test]
    fn test_previous_period_respects_type_filter() {
        let readings = vec![
            make_reading(MeterType::Electricity, 100.0, "2023-12-05 08:00"),
            make_reading(MeterType::Electricity, 110.0, "2023-12-28 08:00"),
            make_reading(MeterType::ColdWater, 10.0, "2023-12-06 08:00"),
            make_reading(MeterType::ColdWater, 90.0, "2023-12-27 08:00"),
            make_reading(MeterType::Electricity, 120.0, "2024-01-05 08:00"),
            make_reading(MeterType::Electricity, 150.0, "2024-01-20 08:00"),
        ];
        let stats =
            StatisticsAggregator::aggregate(&readings, january(), Some(MeterType::Electricity));
        assert_eq!(stats.comparison.previous, 10.0);
        assert!((stats.comparison.change_percentage - 200.0).abs() < 1e-9);
    }

    // ── Determinism ───────────────────────────────────────────────────────

    #[test]
    fn test_aggregate_is_idempotent() {
        let readings = vec![
            make_reading(MeterType::Electricity, 10.0, "2024-01-05 08:00"),
            make_reading(MeterType::Electricity, 25.0, "2024-01-20 08:00"),
            make_reading(MeterType::HotWater, 3.0, "2024-01-10 08:00"),
        ];
        let first = StatisticsAggregator::aggregate(&readings, january(), None);
        let second = StatisticsAggregator::aggregate(&readings, january(), None);
        assert_eq!(first, second);
    }
}
