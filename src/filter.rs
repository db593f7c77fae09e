//! Dashboard filter selections
//!
//! The presentation layer offers four filter dropdowns, each with an "All"
//! entry. `FilterSelection` carries the raw dropdown strings; parsing it yields
//! a typed `DashboardFilter`. Each dashboard section only reads the dimension
//! it is wired to.

use crate::error::AttritionError;
use crate::types::{Employee, TenureBucket};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Dropdown value meaning "no constraint"
pub const ALL: &str = "All";

/// Typed filter state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardFilter {
    /// Department, `None` for all
    pub department: Option<String>,
    /// Overtime flag, `None` for all
    pub overtime: Option<bool>,
    /// Job level, `None` for all
    pub job_level: Option<u32>,
    /// Tenure bucket, `None` for all
    pub tenure: Option<TenureBucket>,
}

impl DashboardFilter {
    /// A filter that keeps every row
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_overtime(mut self, overtime: bool) -> Self {
        self.overtime = Some(overtime);
        self
    }

    pub fn with_job_level(mut self, level: u32) -> Self {
        self.job_level = Some(level);
        self
    }

    pub fn with_tenure(mut self, bucket: TenureBucket) -> Self {
        self.tenure = Some(bucket);
        self
    }

    pub fn department_matches(&self, employee: &Employee) -> bool {
        self.department
            .as_deref()
            .map_or(true, |d| employee.department == d)
    }

    pub fn overtime_matches(&self, employee: &Employee) -> bool {
        self.overtime.map_or(true, |o| employee.overtime == o)
    }

    pub fn job_level_matches(&self, employee: &Employee) -> bool {
        self.job_level.map_or(true, |l| employee.job_level == l)
    }

    pub fn tenure_matches(&self, employee: &Employee) -> bool {
        self.tenure.map_or(true, |t| employee.tenure_bucket == t)
    }
}

/// Raw dropdown strings, each defaulting to "All"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSelection {
    pub department: String,
    pub overtime: String,
    pub job_level: String,
    pub tenure: String,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            department: ALL.to_string(),
            overtime: ALL.to_string(),
            job_level: ALL.to_string(),
            tenure: ALL.to_string(),
        }
    }
}

impl FilterSelection {
    /// Parse a JSON object of dropdown strings; missing keys mean "All"
    pub fn from_json(json: &str) -> Result<Self, AttritionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse into a typed filter.
    ///
    /// Unknown overtime, job level or tenure values are an error. Any
    /// department string is accepted; one with no rows yields empty sections.
    pub fn parse(&self) -> Result<DashboardFilter, AttritionError> {
        let department = match self.department.trim() {
            ALL | "" => None,
            d => Some(d.to_string()),
        };

        let overtime = match self.overtime.trim() {
            ALL | "" => None,
            "Yes" => Some(true),
            "No" => Some(false),
            other => return Err(invalid("overtime", other)),
        };

        let job_level = match self.job_level.trim() {
            ALL | "" => None,
            other => Some(other.parse::<u32>().map_err(|_| invalid("job_level", other))?),
        };

        let tenure = match self.tenure.trim() {
            ALL | "" => None,
            other => Some(TenureBucket::from_label(other).ok_or_else(|| invalid("tenure", other))?),
        };

        Ok(DashboardFilter {
            department,
            overtime,
            job_level,
            tenure,
        })
    }
}

fn invalid(dimension: &str, value: &str) -> AttritionError {
    AttritionError::InvalidFilter {
        dimension: dimension.to_string(),
        value: value.to_string(),
    }
}

/// Values offered by each dropdown, "All" first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub departments: Vec<String>,
    pub overtime: Vec<String>,
    pub job_levels: Vec<String>,
    pub tenure: Vec<String>,
}

impl FilterOptions {
    /// Build dropdown options from the loaded table
    pub fn from_employees(employees: &[Employee]) -> Self {
        let departments: BTreeSet<&str> =
            employees.iter().map(|e| e.department.as_str()).collect();
        let levels: BTreeSet<u32> = employees.iter().map(|e| e.job_level).collect();

        Self {
            departments: std::iter::once(ALL.to_string())
                .chain(departments.into_iter().map(str::to_string))
                .collect(),
            overtime: vec![ALL.to_string(), "Yes".to_string(), "No".to_string()],
            job_levels: std::iter::once(ALL.to_string())
                .chain(levels.into_iter().map(|l| l.to_string()))
                .collect(),
            tenure: std::iter::once(ALL.to_string())
                .chain(TenureBucket::ALL.iter().map(|b| b.label().to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn employee(department: &str, level: u32, overtime: bool, years: f64) -> Employee {
        Employee {
            employee_id: "1".to_string(),
            department: department.to_string(),
            job_role: "Analyst".to_string(),
            gender: "Male".to_string(),
            job_level: level,
            distance_from_home: 1.0,
            years_at_company: years,
            attrition: false,
            overtime,
            tenure_bucket: TenureBucket::from_years(years).unwrap(),
        }
    }

    #[test]
    fn test_default_selection_is_unfiltered() {
        let filter = FilterSelection::default().parse().unwrap();
        assert_eq!(filter, DashboardFilter::all());
        let e = employee("Sales", 1, true, 0.0);
        assert!(filter.department_matches(&e));
        assert!(filter.overtime_matches(&e));
        assert!(filter.job_level_matches(&e));
        assert!(filter.tenure_matches(&e));
    }

    #[test]
    fn test_parse_selection() {
        let selection = FilterSelection {
            department: "Sales".to_string(),
            overtime: "No".to_string(),
            job_level: "2".to_string(),
            tenure: "5–10 years".to_string(),
        };
        let filter = selection.parse().unwrap();
        assert_eq!(
            filter,
            DashboardFilter::all()
                .with_department("Sales")
                .with_overtime(false)
                .with_job_level(2)
                .with_tenure(TenureBucket::FiveToTen)
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let selection = FilterSelection {
            overtime: "Sometimes".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            selection.parse(),
            Err(AttritionError::InvalidFilter { .. })
        ));

        let selection = FilterSelection {
            job_level: "senior".to_string(),
            ..Default::default()
        };
        assert!(selection.parse().is_err());

        let selection = FilterSelection {
            tenure: "20+ years".to_string(),
            ..Default::default()
        };
        assert!(selection.parse().is_err());
    }

    #[test]
    fn test_selection_from_partial_json() {
        let selection = FilterSelection::from_json(r#"{"department": "Human Resources"}"#).unwrap();
        assert_eq!(selection.overtime, ALL);
        assert_eq!(
            selection.parse().unwrap().department.as_deref(),
            Some("Human Resources")
        );
    }

    #[test]
    fn test_dimension_matching() {
        let filter = DashboardFilter::all().with_department("Sales").with_job_level(1);
        assert!(filter.department_matches(&employee("Sales", 1, false, 3.0)));
        assert!(filter.job_level_matches(&employee("Sales", 1, false, 3.0)));
        assert!(!filter.job_level_matches(&employee("Sales", 2, false, 3.0)));
        assert!(!filter.department_matches(&employee("Research & Development", 1, false, 3.0)));
        assert!(filter.tenure_matches(&employee("HR", 3, true, 40.0)));
        assert!(filter.overtime_matches(&employee("HR", 3, true, 3.0)));
    }

    #[test]
    fn test_filter_options() {
        let employees = vec![
            employee("Sales", 2, false, 1.0),
            employee("Human Resources", 1, true, 4.0),
            employee("Sales", 3, false, 11.0),
        ];
        let options = FilterOptions::from_employees(&employees);

        assert_eq!(options.departments, vec!["All", "Human Resources", "Sales"]);
        assert_eq!(options.overtime, vec!["All", "Yes", "No"]);
        assert_eq!(options.job_levels, vec!["All", "1", "2", "3"]);
        assert_eq!(
            options.tenure,
            vec!["All", "0–2 years", "2–5 years", "5–10 years", "10+ years"]
        );
    }
}
