//! Analytics layer over cumulative utility-meter readings.
//!
//! Consumes an in-memory reading collection plus filter parameters and
//! derives period-scoped statistics: KPI totals, previous-period
//! comparison, per-type distribution and chart-ready point series. Pure
//! request/response computation; acquisition, persistence and rendering
//! are external collaborators.

pub mod aggregator;
pub mod chart;
pub mod report;

pub use meter_core as core;
