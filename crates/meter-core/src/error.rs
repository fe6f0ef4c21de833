use thiserror::Error;

/// All errors produced by the meter analytics crates.
///
/// The aggregation operations themselves are total and never raise; this
/// type serves the parsing seams callers use when turning external data
/// (stored strings, user selections) into domain values.
#[derive(Error, Debug)]
pub enum MeterError {
    /// A timestamp string did not match any recognised format.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// A meter type string is not one of the recognised utility types.
    #[error("Unknown meter type: {0}")]
    UnknownMeterType(String),

    /// A period name string is not one of the recognised periods.
    #[error("Unknown period: {0}")]
    UnknownPeriod(String),

    /// A JSON document (e.g. a serialised reading collection) could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the meter crates.
pub type Result<T> = std::result::Result<T, MeterError>;
