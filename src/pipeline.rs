//! Pipeline orchestration
//!
//! This module provides the public API for Attrition Insight.
//! It loads the employee table once and computes every dashboard section from
//! that immutable table for a given filter state.

use crate::aggregate::{
    group_keyed_rates, group_rates, job_level_tenure_heatmap, overall_rate, rank_by_left_rate,
    sort_by_key, suppress_small_groups, tenure_summary,
};
use crate::bucketing::DistanceBucketer;
use crate::config::{AggregatorConfig, LoaderOptions};
use crate::encoder::ReportEncoder;
use crate::error::AttritionError;
use crate::filter::{DashboardFilter, FilterOptions, FilterSelection};
use crate::normalizer::{DroppedRow, Normalizer};
use crate::schema::{CsvRecordAdapter, RawRow};
use crate::types::{
    DashboardSections, DistanceRoleChart, DistanceRoleKey, Employee, HeatmapPivot, KpiSummary,
    OvertimeLabel, RateRow, RoleRisk, TenureBucket, TenureSummaryEntry,
};
use std::path::Path;

/// The employee table after loading and derivation. Immutable once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: String,
    rows_read: usize,
    employees: Vec<Employee>,
    dropped: Vec<DroppedRow>,
}

impl Dataset {
    /// Load a file, choosing the delimiter from its extension
    pub fn load(path: &Path) -> Result<Self, AttritionError> {
        Self::load_with(path, LoaderOptions::for_path(path))
    }

    /// Load a file with explicit reader options
    pub fn load_with(path: &Path, options: LoaderOptions) -> Result<Self, AttritionError> {
        let rows = CsvRecordAdapter::read_path(path, options)?;
        Ok(Self::from_rows(path.display().to_string(), &rows))
    }

    /// Load from in-memory delimited text
    pub fn from_csv_str(data: &str, options: LoaderOptions) -> Result<Self, AttritionError> {
        let rows = CsvRecordAdapter::read_str(data, options)?;
        Ok(Self::from_rows("<memory>".to_string(), &rows))
    }

    /// Wrap already-derived employees
    pub fn from_employees(employees: Vec<Employee>) -> Self {
        Self {
            source: "<memory>".to_string(),
            rows_read: employees.len(),
            employees,
            dropped: Vec::new(),
        }
    }

    fn from_rows(source: String, rows: &[RawRow]) -> Self {
        let table = Normalizer::normalize_all(rows);
        tracing::info!(
            source = %source,
            loaded = table.employees.len(),
            dropped = table.dropped.len(),
            "loaded employee table"
        );
        Self {
            source,
            rows_read: rows.len(),
            employees: table.employees,
            dropped: table.dropped,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Data rows present in the file, including dropped ones
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    /// Rows that failed validation
    pub fn dropped(&self) -> &[DroppedRow] {
        &self.dropped
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Dropdown values for the presentation layer
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::from_employees(&self.employees)
    }
}

/// Computes dashboard sections under one configuration
#[derive(Debug, Clone, Default)]
pub struct AttritionAggregator {
    config: AggregatorConfig,
}

impl AttritionAggregator {
    /// Create an aggregator with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an aggregator with a validated configuration
    pub fn with_config(config: AggregatorConfig) -> Result<Self, AttritionError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Headline KPIs over the whole table
    pub fn kpis(&self, employees: &[Employee]) -> KpiSummary {
        let entry_level = employees
            .iter()
            .filter(|e| e.job_level == self.config.entry_job_level);
        let early_tenure = employees
            .iter()
            .filter(|e| e.years_at_company <= self.config.early_tenure_max_years);

        let highest_risk_role = self.job_role_table(employees).first().map(|top| RoleRisk {
            job_role: top.key.clone(),
            left_rate: top.left_rate,
        });

        KpiSummary {
            overall_attrition_rate: overall_rate(employees),
            entry_level_attrition_rate: overall_rate(entry_level),
            early_tenure_attrition_rate: overall_rate(early_tenure),
            highest_risk_role,
        }
    }

    /// Job roles ranked by left-rate, highest first
    pub fn job_role_table(&self, employees: &[Employee]) -> Vec<RateRow<String>> {
        rank_by_left_rate(group_rates(employees, |e| e.job_role.clone()))
    }

    /// Ranked job roles within the filter's department
    pub fn job_role_chart(
        &self,
        employees: &[Employee],
        filter: &DashboardFilter,
    ) -> Vec<RateRow<String>> {
        let filtered = employees.iter().filter(|e| filter.department_matches(e));
        rank_by_left_rate(group_rates(filtered, |e| e.job_role.clone()))
    }

    /// Rates by gender
    pub fn gender_rates(&self, employees: &[Employee]) -> Vec<RateRow<String>> {
        sort_by_key(group_rates(employees, |e| e.gender.clone()))
    }

    /// Rates by commute distance bucket and job role within the filter's
    /// department. Small cells are suppressed. `None` when the department
    /// has no employees.
    pub fn distance_by_role(
        &self,
        employees: &[Employee],
        filter: &DashboardFilter,
    ) -> Option<DistanceRoleChart> {
        let filtered: Vec<&Employee> = employees
            .iter()
            .filter(|e| filter.department_matches(e))
            .collect();

        let bucketer = DistanceBucketer::new(self.config.distance_bucket_width);
        let buckets = bucketer.buckets(filtered.iter().map(|e| e.distance_from_home))?;

        let keyed = filtered.iter().filter_map(|e| {
            let idx = bucketer.assign(&buckets, e.distance_from_home)?;
            let key = DistanceRoleKey {
                bucket_index: idx,
                distance_range: buckets[idx].label.clone(),
                job_role: e.job_role.clone(),
            };
            Some((key, *e))
        });

        let rows = group_keyed_rates(keyed);
        let (rows, suppressed_cells) =
            suppress_small_groups(sort_by_key(rows), self.config.min_group_size);

        tracing::debug!(
            buckets = buckets.len(),
            cells = rows.len(),
            suppressed_cells,
            "computed distance by role chart"
        );

        Some(DistanceRoleChart {
            buckets,
            rows,
            suppressed_cells,
        })
    }

    /// Left/stayed split by overtime participation
    pub fn overtime_split(
        &self,
        employees: &[Employee],
        filter: &DashboardFilter,
    ) -> Vec<RateRow<OvertimeLabel>> {
        let filtered = employees.iter().filter(|e| filter.overtime_matches(e));
        sort_by_key(group_rates(filtered, |e| OvertimeLabel::from_flag(e.overtime)))
    }

    /// Left/stayed split by job level
    pub fn job_level_split(
        &self,
        employees: &[Employee],
        filter: &DashboardFilter,
    ) -> Vec<RateRow<u32>> {
        let filtered = employees.iter().filter(|e| filter.job_level_matches(e));
        sort_by_key(group_rates(filtered, |e| e.job_level))
    }

    /// Left/stayed split by tenure bucket
    pub fn tenure_split(
        &self,
        employees: &[Employee],
        filter: &DashboardFilter,
    ) -> Vec<RateRow<TenureBucket>> {
        let filtered = employees.iter().filter(|e| filter.tenure_matches(e));
        sort_by_key(group_rates(filtered, |e| e.tenure_bucket))
    }

    /// Attrition rate for all four tenure buckets
    pub fn tenure_summary(&self, employees: &[Employee]) -> Vec<TenureSummaryEntry> {
        tenure_summary(employees)
    }

    /// Job level by tenure heatmap
    pub fn heatmap(&self, employees: &[Employee]) -> HeatmapPivot {
        job_level_tenure_heatmap(employees)
    }

    /// Every section for one filter state
    pub fn sections(&self, dataset: &Dataset, filter: &DashboardFilter) -> DashboardSections {
        let employees = dataset.employees();
        tracing::debug!(rows = employees.len(), ?filter, "computing dashboard sections");
        DashboardSections {
            kpis: self.kpis(employees),
            job_role_table: self.job_role_table(employees),
            job_role_chart: self.job_role_chart(employees, filter),
            gender: self.gender_rates(employees),
            distance_by_role: self.distance_by_role(employees, filter),
            overtime: self.overtime_split(employees, filter),
            job_level: self.job_level_split(employees, filter),
            tenure: self.tenure_split(employees, filter),
            tenure_summary: self.tenure_summary(employees),
            heatmap: self.heatmap(employees),
        }
    }
}

/// Load a file and produce the full report as JSON (stateless, one-shot).
///
/// # Arguments
/// * `path` - Employee CSV/TSV file
/// * `selection` - Dropdown selections; `FilterSelection::default()` for none
///
/// # Example
/// ```ignore
/// let json = report_from_path(Path::new("united.csv"), &FilterSelection::default())?;
/// ```
pub fn report_from_path(path: &Path, selection: &FilterSelection) -> Result<String, AttritionError> {
    let filter = selection.parse()?;
    let dataset = Dataset::load(path)?;
    let aggregator = AttritionAggregator::new();
    let encoder = ReportEncoder::new();
    let report = encoder.encode(&dataset, &aggregator, &filter);
    encoder.to_json(&report, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str =
        "EmployeeNumber,Attrition,OverTime,Department,JobRole,JobLevel,Gender,DistanceFromHome,YearsAtCompany";

    fn sample_csv() -> String {
        let rows = [
            "1,Yes,Yes,Sales,Sales Representative,1,Male,2,1",
            "2,Yes,Yes,Sales,Sales Representative,1,Female,20,0",
            "3,No,No,Sales,Sales Executive,2,Female,5,6",
            "4,No,No,Sales,Sales Executive,2,Male,9,3",
            "5,Yes,No,Research & Development,Research Scientist,1,Male,1,1",
            "6,No,No,Research & Development,Research Scientist,1,Female,3,12",
            "7,No,Yes,Research & Development,Laboratory Technician,1,Male,15,2",
            "8,Yes,No,Research & Development,Laboratory Technician,2,Female,24,4",
            "9,No,No,Human Resources,Human Resources,3,Female,7,15",
            "10,No,No,Human Resources,Manager,4,Male,4,20",
        ];
        format!("{HEADER}\n{}\n", rows.join("\n"))
    }

    fn sample_dataset() -> Dataset {
        Dataset::from_csv_str(&sample_csv(), LoaderOptions::default()).unwrap()
    }

    fn uniform_rows(department: &str, role: &str, distance: u32, total: usize, left: usize) -> Vec<String> {
        (0..total)
            .map(|i| {
                format!(
                    "{role}{distance}{i},{},No,{department},{role},1,Male,{distance},3",
                    if i < left { "Yes" } else { "No" }
                )
            })
            .collect()
    }

    #[test]
    fn test_overall_kpi_four_of_ten() {
        let dataset = sample_dataset();
        let kpis = AttritionAggregator::new().kpis(dataset.employees());

        assert_eq!(kpis.overall_attrition_rate, 40.0);
        // level 1: rows 1,2,5,6,7 -> 3 of 5 left
        assert_eq!(kpis.entry_level_attrition_rate, 60.0);
        // years <= 2: rows 1,2,5,7 -> 3 of 4 left
        assert_eq!(kpis.early_tenure_attrition_rate, 75.0);
        assert_eq!(
            kpis.highest_risk_role,
            Some(RoleRisk {
                job_role: "Sales Representative".to_string(),
                left_rate: 100.0,
            })
        );
    }

    #[test]
    fn test_kpis_on_empty_table() {
        let kpis = AttritionAggregator::new().kpis(&[]);
        assert_eq!(kpis.overall_attrition_rate, 0.0);
        assert_eq!(kpis.entry_level_attrition_rate, 0.0);
        assert_eq!(kpis.early_tenure_attrition_rate, 0.0);
        assert_eq!(kpis.highest_risk_role, None);
    }

    #[test]
    fn test_job_role_table_ranked_with_stable_ties() {
        let dataset = sample_dataset();
        let table = AttritionAggregator::new().job_role_table(dataset.employees());
        let order: Vec<(&str, f64)> = table.iter().map(|r| (r.key.as_str(), r.left_rate)).collect();

        assert_eq!(
            order,
            vec![
                ("Sales Representative", 100.0),
                ("Research Scientist", 50.0),
                ("Laboratory Technician", 50.0),
                ("Sales Executive", 0.0),
                ("Human Resources", 0.0),
                ("Manager", 0.0),
            ]
        );
    }

    #[test]
    fn test_department_filter_with_no_rows() {
        let dataset = sample_dataset();
        let aggregator = AttritionAggregator::new();
        let filter = DashboardFilter::all().with_department("Legal");

        assert!(aggregator.job_role_chart(dataset.employees(), &filter).is_empty());
        assert_eq!(aggregator.distance_by_role(dataset.employees(), &filter), None);

        let filtered: Vec<Employee> = dataset
            .employees()
            .iter()
            .filter(|e| filter.department_matches(e))
            .cloned()
            .collect();
        assert_eq!(aggregator.kpis(&filtered).overall_attrition_rate, 0.0);
    }

    #[test]
    fn test_job_role_chart_respects_department() {
        let dataset = sample_dataset();
        let filter = DashboardFilter::all().with_department("Sales");
        let chart = AttritionAggregator::new().job_role_chart(dataset.employees(), &filter);
        let roles: Vec<&str> = chart.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(roles, vec!["Sales Representative", "Sales Executive"]);
    }

    #[test]
    fn test_distance_by_role_suppression() {
        let mut rows = uniform_rows("Sales", "Seven", 3, 7, 2);
        rows.extend(uniform_rows("Sales", "Eight", 3, 8, 2));
        rows.extend(uniform_rows("Sales", "Eight", 16, 9, 3));
        let csv = format!("{HEADER}\n{}\n", rows.join("\n"));
        let dataset = Dataset::from_csv_str(&csv, LoaderOptions::default()).unwrap();

        let chart = AttritionAggregator::new()
            .distance_by_role(dataset.employees(), &DashboardFilter::all())
            .unwrap();

        let labels: Vec<&str> = chart.buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["3–9", "10–16"]);
        assert_eq!(chart.suppressed_cells, 1);

        let cells: Vec<(&str, &str, usize)> = chart
            .rows
            .iter()
            .map(|r| (r.key.distance_range.as_str(), r.key.job_role.as_str(), r.count))
            .collect();
        assert_eq!(cells, vec![("3–9", "Eight", 8), ("10–16", "Eight", 9)]);
        assert_eq!(chart.rows[0].left_rate, 25.0);
    }

    #[test]
    fn test_distance_buckets_follow_filter() {
        let dataset = sample_dataset();
        let aggregator = AttritionAggregator::new();

        let all = aggregator
            .distance_by_role(dataset.employees(), &DashboardFilter::all())
            .unwrap();
        let hr = aggregator
            .distance_by_role(
                dataset.employees(),
                &DashboardFilter::all().with_department("Human Resources"),
            )
            .unwrap();

        assert_eq!(all.buckets.first().unwrap().lower, 1);
        assert_eq!(hr.buckets.first().unwrap().lower, 4);
        // every cell in the small sample is below the default threshold
        assert!(all.rows.is_empty());
    }

    #[test]
    fn test_overtime_split() {
        let dataset = sample_dataset();
        let aggregator = AttritionAggregator::new();

        let split = aggregator.overtime_split(dataset.employees(), &DashboardFilter::all());
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].key, OvertimeLabel::DidNotDoOvertime);
        assert_eq!(split[1].key, OvertimeLabel::DidOvertime);
        // overtime: rows 1,2,7 -> 2 of 3 left
        assert!((split[1].left_rate - 200.0 / 3.0).abs() < 1e-9);

        let only_yes = aggregator.overtime_split(
            dataset.employees(),
            &DashboardFilter::all().with_overtime(true),
        );
        assert_eq!(only_yes.len(), 1);
        assert_eq!(only_yes[0].key, OvertimeLabel::DidOvertime);
    }

    #[test]
    fn test_job_level_and_tenure_splits() {
        let dataset = sample_dataset();
        let aggregator = AttritionAggregator::new();

        let levels = aggregator.job_level_split(dataset.employees(), &DashboardFilter::all());
        let keys: Vec<u32> = levels.iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![1, 2, 3, 4]);

        let level_two = aggregator.job_level_split(
            dataset.employees(),
            &DashboardFilter::all().with_job_level(2),
        );
        assert_eq!(level_two.len(), 1);
        assert_eq!(level_two[0].count, 3);
        assert!((level_two[0].left_rate - 100.0 / 3.0).abs() < 1e-9);
        assert!((level_two[0].stayed_rate - 200.0 / 3.0).abs() < 1e-9);

        let tenure = aggregator.tenure_split(dataset.employees(), &DashboardFilter::all());
        let buckets: Vec<TenureBucket> = tenure.iter().map(|r| r.key).collect();
        assert_eq!(buckets, TenureBucket::ALL.to_vec());

        let early = aggregator.tenure_split(
            dataset.employees(),
            &DashboardFilter::all().with_tenure(TenureBucket::UnderTwo),
        );
        assert_eq!(early.len(), 1);
        assert_eq!(early[0].count, 3);
    }

    #[test]
    fn test_sections_idempotent() {
        let dataset = sample_dataset();
        let aggregator = AttritionAggregator::new();
        let filter = DashboardFilter::all().with_department("Sales");
        assert_eq!(
            aggregator.sections(&dataset, &filter),
            aggregator.sections(&dataset, &filter)
        );
    }

    #[test]
    fn test_dataset_drops_bad_rows() {
        let csv = format!(
            "{HEADER}\n1,Yes,No,Sales,Manager,1,Male,2,1\n2,Unknown,No,Sales,Manager,1,Male,2,1\n3,No,No,Sales,Manager,1,Male,2,\n"
        );
        let dataset = Dataset::from_csv_str(&csv, LoaderOptions::default()).unwrap();

        assert_eq!(dataset.rows_read(), 3);
        assert_eq!(dataset.employees().len(), 1);
        let dropped_rows: Vec<usize> = dataset.dropped().iter().map(|d| d.row).collect();
        assert_eq!(dropped_rows, vec![2, 3]);
    }

    #[test]
    fn test_implausible_distance_dropped_before_bucketing() {
        let csv = format!(
            "{}\n11,No,No,Sales,Manager,1,Male,100000000,1\n12,No,No,Sales,Manager,1,Male,9300000000000000000,1\n",
            sample_csv().trim_end()
        );
        let dataset = Dataset::from_csv_str(&csv, LoaderOptions::default()).unwrap();

        assert_eq!(dataset.employees().len(), 10);
        let dropped_rows: Vec<usize> = dataset.dropped().iter().map(|d| d.row).collect();
        assert_eq!(dropped_rows, vec![11, 12]);

        let chart = AttritionAggregator::new()
            .distance_by_role(dataset.employees(), &DashboardFilter::all())
            .unwrap();
        assert_eq!(chart.buckets.len(), 4);
    }

    #[test]
    fn test_custom_config_changes_threshold() {
        let config = AggregatorConfig {
            min_group_size: 1,
            ..Default::default()
        };
        let aggregator = AttritionAggregator::with_config(config).unwrap();
        let dataset = sample_dataset();
        let chart = aggregator
            .distance_by_role(dataset.employees(), &DashboardFilter::all())
            .unwrap();
        assert_eq!(chart.suppressed_cells, 0);
        assert!(!chart.rows.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AggregatorConfig {
            distance_bucket_width: 0,
            ..Default::default()
        };
        assert!(AttritionAggregator::with_config(config).is_err());
    }

    #[test]
    fn test_report_from_missing_path() {
        let result = report_from_path(
            Path::new("/nonexistent/united.csv"),
            &FilterSelection::default(),
        );
        assert!(matches!(result, Err(AttritionError::DataLoad(_))));
    }
}
