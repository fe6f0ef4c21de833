//! Domain model and leaf utilities for meter analytics.
//!
//! Defines the reading/period/date-range types shared across the workspace,
//! the error taxonomy, timestamp parsing and display formatting. Everything
//! here is a pure value type or a pure function; computation over readings
//! lives in the `meter-stats` crate.

pub mod error;
pub mod formatting;
pub mod models;
pub mod period;
pub mod time_utils;

pub use error::{MeterError, Result};
