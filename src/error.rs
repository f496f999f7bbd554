// File: ./src/error.rs
use thiserror::Error;

/// Failures of the value-level helpers (dates, timezones, encodings).
///
/// Filesystem and configuration code reports through `anyhow` instead, with
/// the offending path attached as context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown timezone: {name}")]
    UnknownTimezone { name: String },

    #[error("Could not parse '{input}' with format {format}")]
    Unparseable { input: String, format: String },

    #[error("Invalid {field}: {value}")]
    InvalidField { field: &'static str, value: i64 },

    #[error("Local time {local} does not exist in {timezone}")]
    NonexistentLocalTime { local: String, timezone: String },

    #[error("Date out of range")]
    OutOfRange,
}

pub type Result<T> = std::result::Result<T, Error>;
