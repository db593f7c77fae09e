//! Derived-column builder
//!
//! This module turns raw string rows into typed employee rows.
//! - Attrition and OverTime labels mapped from "Yes"/"No" to booleans
//! - Numeric columns parsed and checked for sign
//! - Tenure bucket assigned from years at company
//!
//! Rows that fail any check are dropped with a warning and recorded, so an
//! unrecognized label never turns into an undefined rate downstream.

use crate::config::MAX_DISTANCE_FROM_HOME;
use crate::error::DataQualityError;
use crate::schema::{RawEmployeeRecord, RawRow};
use crate::types::{Employee, TenureBucket};
use serde::Serialize;

/// A row removed during normalization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedRow {
    /// 1-based data row number in the source file
    pub row: usize,
    pub employee_id: Option<String>,
    pub error: DataQualityError,
}

/// Output of normalizing a whole table
#[derive(Debug, Clone, Default)]
pub struct NormalizedTable {
    /// Valid rows in source order
    pub employees: Vec<Employee>,
    /// Rows that failed a quality check
    pub dropped: Vec<DroppedRow>,
}

/// Normalizer for converting raw rows to employee rows
pub struct Normalizer;

impl Normalizer {
    /// Normalize a single raw record
    pub fn normalize(raw: &RawEmployeeRecord) -> Result<Employee, DataQualityError> {
        let employee_id = required("EmployeeNumber", &raw.employee_number)?;
        let attrition = yes_no("Attrition", &raw.attrition)?;
        let overtime = yes_no("OverTime", &raw.overtime)?;
        let department = required("Department", &raw.department)?;
        let job_role = required("JobRole", &raw.job_role)?;
        let gender = required("Gender", &raw.gender)?;
        let job_level = job_level(&raw.job_level)?;
        let distance_from_home = non_negative("DistanceFromHome", &raw.distance_from_home)?;
        if distance_from_home > MAX_DISTANCE_FROM_HOME {
            return Err(DataQualityError::OutOfRange {
                column: "DistanceFromHome".to_string(),
                value: distance_from_home,
                max: MAX_DISTANCE_FROM_HOME,
            });
        }
        let years_at_company = non_negative("YearsAtCompany", &raw.years_at_company)?;

        // non_negative already rejected NaN and negatives
        let tenure_bucket =
            TenureBucket::from_years(years_at_company).ok_or(DataQualityError::Negative {
                column: "YearsAtCompany".to_string(),
                value: years_at_company,
            })?;

        Ok(Employee {
            employee_id: employee_id.to_string(),
            department: department.to_string(),
            job_role: job_role.to_string(),
            gender: gender.to_string(),
            job_level,
            distance_from_home,
            years_at_company,
            attrition,
            overtime,
            tenure_bucket,
        })
    }

    /// Normalize every row, keeping source order and dropping bad rows
    pub fn normalize_all(rows: &[RawRow]) -> NormalizedTable {
        let mut table = NormalizedTable {
            employees: Vec::with_capacity(rows.len()),
            dropped: Vec::new(),
        };

        for raw in rows {
            match Self::normalize(&raw.record) {
                Ok(employee) => table.employees.push(employee),
                Err(error) => {
                    tracing::warn!(row = raw.row, reason = %error, "dropping employee row");
                    table.dropped.push(DroppedRow {
                        row: raw.row,
                        employee_id: raw.record.employee_number.clone(),
                        error,
                    });
                }
            }
        }

        table
    }
}

fn required<'a>(column: &str, value: &'a Option<String>) -> Result<&'a str, DataQualityError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DataQualityError::MissingValue {
            column: column.to_string(),
        }),
    }
}

fn yes_no(column: &str, value: &Option<String>) -> Result<bool, DataQualityError> {
    match required(column, value)? {
        "Yes" => Ok(true),
        "No" => Ok(false),
        other => Err(DataQualityError::UnrecognizedLabel {
            column: column.to_string(),
            value: other.to_string(),
        }),
    }
}

fn non_negative(column: &str, value: &Option<String>) -> Result<f64, DataQualityError> {
    let text = required(column, value)?;
    let parsed: f64 = text.parse().map_err(|_| DataQualityError::NotNumeric {
        column: column.to_string(),
        value: text.to_string(),
    })?;
    if !parsed.is_finite() {
        return Err(DataQualityError::NotNumeric {
            column: column.to_string(),
            value: text.to_string(),
        });
    }
    if parsed < 0.0 {
        return Err(DataQualityError::Negative {
            column: column.to_string(),
            value: parsed,
        });
    }
    Ok(parsed)
}

fn job_level(value: &Option<String>) -> Result<u32, DataQualityError> {
    let text = required("JobLevel", value)?;
    text.parse::<u32>().map_err(|_| DataQualityError::NotNumeric {
        column: "JobLevel".to_string(),
        value: text.to_string(),
    })
}
