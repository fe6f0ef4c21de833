use chrono::NaiveDate;

/// Short axis label for a chart point.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use meter_core::formatting::chart_label;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// assert_eq!(chart_label(date), "05.01");
/// ```
pub fn chart_label(date: NaiveDate) -> String {
    date.format("%d.%m").to_string()
}

/// Format a consumption figure with one decimal place and its unit, when one
/// applies. Multi-type aggregates have no single unit and print bare.
///
/// # Examples
///
/// ```
/// use meter_core::formatting::format_consumption;
///
/// assert_eq!(format_consumption(15.5, Some("kWh")), "15.5 kWh");
/// assert_eq!(format_consumption(3.0, Some("m³")), "3.0 m³");
/// assert_eq!(format_consumption(42.25, None), "42.2");
/// ```
pub fn format_consumption(value: f64, unit: Option<&str>) -> String {
    match unit {
        Some(u) => format!("{:.1} {}", value, u),
        None => format!("{:.1}", value),
    }
}

/// Format a period-over-period percentage change with an explicit sign for
/// increases.
///
/// # Examples
///
/// ```
/// use meter_core::formatting::format_change;
///
/// assert_eq!(format_change(12.5), "+12.5%");
/// assert_eq!(format_change(-3.0), "-3.0%");
/// assert_eq!(format_change(0.0), "0.0%");
/// ```
pub fn format_change(pct: f64) -> String {
    if pct > 0.0 {
        format!("+{:.1}%", pct)
    } else {
        format!("{:.1}%", pct)
    }
}
