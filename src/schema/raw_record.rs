//! Raw employee row as it appears in the source file

use crate::error::AttritionError;
use csv::StringRecord;
use serde::{Deserialize, Serialize};

/// Columns that must be present in the header row
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "Attrition",
    "OverTime",
    "JobRole",
    "JobLevel",
    "Gender",
    "DistanceFromHome",
    "YearsAtCompany",
    "EmployeeNumber",
    "Department",
];

/// One row of the employee table, before any typing.
///
/// Every field is optional so that an empty cell surfaces as a row-level
/// quality problem instead of a fatal parse error. Columns not listed here
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEmployeeRecord {
    #[serde(rename = "EmployeeNumber")]
    pub employee_number: Option<String>,
    #[serde(rename = "Attrition")]
    pub attrition: Option<String>,
    #[serde(rename = "OverTime")]
    pub overtime: Option<String>,
    #[serde(rename = "Department")]
    pub department: Option<String>,
    #[serde(rename = "JobRole")]
    pub job_role: Option<String>,
    #[serde(rename = "JobLevel")]
    pub job_level: Option<String>,
    #[serde(rename = "Gender")]
    pub gender: Option<String>,
    #[serde(rename = "DistanceFromHome")]
    pub distance_from_home: Option<String>,
    #[serde(rename = "YearsAtCompany")]
    pub years_at_company: Option<String>,
}

/// A raw record with its 1-based data row number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub row: usize,
    pub record: RawEmployeeRecord,
}

/// Fail with `MissingColumn` if any required column is absent from the header
pub fn check_headers(headers: &StringRecord) -> Result<(), AttritionError> {
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h.trim() == column) {
            return Err(AttritionError::MissingColumn(column.to_string()));
        }
    }
    Ok(())
}
