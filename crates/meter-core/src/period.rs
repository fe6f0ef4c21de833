use chrono::{Duration, Months, NaiveDate, Utc};

use crate::models::{DateRange, Period};

// ── PeriodResolver ────────────────────────────────────────────────────────────

/// Stateless mapping from a [`Period`] selector to its default [`DateRange`].
///
/// The reference date is an explicit parameter so the resolver stays a pure
/// function; [`PeriodResolver::default_range_now`] is the wall-clock
/// convenience for callers that do want "today".
pub struct PeriodResolver;

impl PeriodResolver {
    /// Default inclusive range for `period`, anchored at `today`.
    ///
    /// * `Daily` → `[today, today]`
    /// * `Weekly` → `[today - 7 days, today]`
    /// * `Monthly` → `[today - 1 calendar month, today]`
    /// * `Yearly` → `[today - 12 calendar months, today]`
    /// * `Custom` → same as `Monthly`; a seed value callers override with
    ///   an explicit user-chosen range.
    ///
    /// Calendar subtraction clamps to the last valid day of the target
    /// month (Mar 31 → Feb 28/29). No error conditions.
    pub fn default_range(period: Period, today: NaiveDate) -> DateRange {
        let start = match period {
            Period::Daily => today,
            Period::Weekly => today - Duration::days(7),
            Period::Monthly | Period::Custom => {
                today.checked_sub_months(Months::new(1)).unwrap_or(today)
            }
            Period::Yearly => today.checked_sub_months(Months::new(12)).unwrap_or(today),
        };
        DateRange::new(start, today)
    }

    /// [`PeriodResolver::default_range`] anchored at the current UTC date.
    pub fn default_range_now(period: Period) -> DateRange {
        Self::default_range(period, Utc::now().date_naive())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
