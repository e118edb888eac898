use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Invalid configuration for {key}: {details}")]
    Config { key: String, details: String },

    #[error("Invalid year {0}: must be between 1900 and 9999")]
    InvalidYear(i32),

    #[error("Invalid month {0}: must be between 1 and 12")]
    InvalidMonth(u32),

    #[error("Request to {endpoint} failed with status {status}: {body}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Page {page} could not be fetched: {reason}")]
    PageFetch { page: u32, reason: String },

    #[cfg(feature = "api")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

/// Why a single record was left out of an aggregation.
///
/// These never escape the aggregator; they are collected as diagnostics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("account code is missing")]
    MissingAccount,

    #[error("month is missing")]
    MissingMonth,

    #[error("month {0} is not an integer")]
    UnparsableMonth(String),

    #[error("month {0} is outside 1..=12")]
    MonthOutOfRange(i64),

    #[error("field {field} holds a non-numeric value: {value}")]
    InvalidAmount { field: &'static str, value: String },
}
