//! Error types for Attrition Insight

use serde::Serialize;
use thiserror::Error;

/// Errors that abort a load or a report computation
#[derive(Debug, Error)]
pub enum AttritionError {
    #[error("Failed to load dataset: {0}")]
    DataLoad(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid filter value for {dimension}: {value}")]
    InvalidFilter { dimension: String, value: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Row-level problems found while deriving columns.
///
/// These never abort a load: the offending row is dropped and the error is
/// kept in the load report.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityError {
    #[error("Unrecognized {column} label: {value:?} (expected \"Yes\" or \"No\")")]
    UnrecognizedLabel { column: String, value: String },

    #[error("Missing value in column {column}")]
    MissingValue { column: String },

    #[error("Non-numeric value in column {column}: {value:?}")]
    NotNumeric { column: String, value: String },

    #[error("Negative value in column {column}: {value}")]
    Negative { column: String, value: f64 },

    #[error("Value in column {column} exceeds {max}: {value}")]
    OutOfRange { column: String, value: f64, max: f64 },
}
