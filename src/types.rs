//! Core types for the Attrition Insight pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: derived employee rows, grouping keys, aggregate rows, pivots and
//! the report payload handed to the presentation layer.

use serde::{Deserialize, Serialize};

/// Tenure bucket over years at company.
///
/// The four half-open ranges `[0,2)`, `[2,5)`, `[5,10)` and `[10,inf)`
/// partition the non-negative reals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TenureBucket {
    #[serde(rename = "0–2 years")]
    UnderTwo,
    #[serde(rename = "2–5 years")]
    TwoToFive,
    #[serde(rename = "5–10 years")]
    FiveToTen,
    #[serde(rename = "10+ years")]
    TenPlus,
}

impl TenureBucket {
    /// All buckets in ascending order
    pub const ALL: [TenureBucket; 4] = [
        TenureBucket::UnderTwo,
        TenureBucket::TwoToFive,
        TenureBucket::FiveToTen,
        TenureBucket::TenPlus,
    ];

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            TenureBucket::UnderTwo => "0–2 years",
            TenureBucket::TwoToFive => "2–5 years",
            TenureBucket::FiveToTen => "5–10 years",
            TenureBucket::TenPlus => "10+ years",
        }
    }

    /// Bucket for a tenure in years; `None` for negative or NaN input
    pub fn from_years(years: f64) -> Option<Self> {
        if years.is_nan() || years < 0.0 {
            None
        } else if years < 2.0 {
            Some(TenureBucket::UnderTwo)
        } else if years < 5.0 {
            Some(TenureBucket::TwoToFive)
        } else if years < 10.0 {
            Some(TenureBucket::FiveToTen)
        } else {
            Some(TenureBucket::TenPlus)
        }
    }

    /// Parse a display label. Accepts a plain hyphen in place of the en dash.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().replace('-', "–");
        Self::ALL.into_iter().find(|b| b.label() == normalized)
    }
}

impl std::fmt::Display for TenureBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Overtime participation label used by the overtime split
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OvertimeLabel {
    #[serde(rename = "Did Not Do Overtime")]
    DidNotDoOvertime,
    #[serde(rename = "Did Overtime")]
    DidOvertime,
}

impl OvertimeLabel {
    pub fn from_flag(overtime: bool) -> Self {
        if overtime {
            OvertimeLabel::DidOvertime
        } else {
            OvertimeLabel::DidNotDoOvertime
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OvertimeLabel::DidNotDoOvertime => "Did Not Do Overtime",
            OvertimeLabel::DidOvertime => "Did Overtime",
        }
    }
}

impl std::fmt::Display for OvertimeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One employee with derived columns applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// EmployeeNumber, kept verbatim
    pub employee_id: String,
    pub department: String,
    pub job_role: String,
    pub gender: String,
    /// Ordinal job level
    pub job_level: u32,
    /// Commute distance (non-negative)
    pub distance_from_home: f64,
    /// Tenure in years (non-negative)
    pub years_at_company: f64,
    /// Whether the employee left
    pub attrition: bool,
    /// Whether the employee worked overtime
    pub overtime: bool,
    /// Derived tenure bucket
    pub tenure_bucket: TenureBucket,
}

/// Attrition counts and rates for one group.
///
/// `left_rate` and `stayed_rate` are percentages computed independently from
/// the counts; together they sum to 100 for any emitted row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRow<K> {
    /// Grouping key
    pub key: K,
    /// Members in the group
    pub count: usize,
    /// Members who left
    pub left: usize,
    /// Members who stayed
    pub stayed: usize,
    /// Percentage who left (0-100)
    pub left_rate: f64,
    /// Percentage who stayed (0-100)
    pub stayed_rate: f64,
}

/// Half-open commute distance bucket `[lower, upper)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DistanceBucket {
    pub lower: i64,
    pub upper: i64,
    pub label: String,
}

impl DistanceBucket {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower as f64 && value < self.upper as f64
    }
}

/// Key of the distance by job role chart
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DistanceRoleKey {
    /// Position of the bucket in the bucket list
    #[serde(skip)]
    pub bucket_index: usize,
    pub distance_range: String,
    pub job_role: String,
}

/// Distance by job role chart input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRoleChart {
    /// Bucket edges computed for this filter state
    pub buckets: Vec<DistanceBucket>,
    /// Cells that passed the minimum group size, in bucket then role order
    pub rows: Vec<RateRow<DistanceRoleKey>>,
    /// Cells removed for being smaller than the minimum group size
    pub suppressed_cells: usize,
}

/// Attrition rate per tenure bucket, with every bucket present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenureSummaryEntry {
    pub tenure_bucket: TenureBucket,
    pub count: usize,
    /// `None` when no employee falls in the bucket
    pub attrition_rate: Option<f64>,
}

/// Heatmap row: one job level across every tenure bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapRow {
    pub job_level: u32,
    /// Left-rate per column; `None` means no members, distinct from 0%
    pub cells: Vec<Option<f64>>,
}

/// Job level by tenure bucket pivot of left-rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPivot {
    pub columns: Vec<TenureBucket>,
    pub rows: Vec<HeatmapRow>,
}

impl HeatmapPivot {
    /// Look up a single cell
    pub fn cell(&self, job_level: u32, bucket: TenureBucket) -> Option<f64> {
        let col = self.columns.iter().position(|c| *c == bucket)?;
        self.rows
            .iter()
            .find(|r| r.job_level == job_level)
            .and_then(|r| r.cells.get(col).copied().flatten())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Role with the highest left-rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRisk {
    pub job_role: String,
    pub left_rate: f64,
}

/// Headline KPI block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    /// Overall attrition rate (%), 0.0 for an empty table
    pub overall_attrition_rate: f64,
    /// Attrition among entry-level employees (%)
    pub entry_level_attrition_rate: f64,
    /// Attrition among early tenure employees (%)
    pub early_tenure_attrition_rate: f64,
    /// `None` when there is no data
    pub highest_risk_role: Option<RoleRisk>,
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Report provenance information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProvenance {
    pub source: String,
    pub rows_read: usize,
    pub rows_loaded: usize,
    pub rows_dropped: usize,
    pub computed_at_utc: String,
}

/// Every dashboard section for one filter state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSections {
    pub kpis: KpiSummary,
    pub job_role_table: Vec<RateRow<String>>,
    pub job_role_chart: Vec<RateRow<String>>,
    pub gender: Vec<RateRow<String>>,
    /// `None` when the filtered table is empty
    pub distance_by_role: Option<DistanceRoleChart>,
    pub overtime: Vec<RateRow<OvertimeLabel>>,
    pub job_level: Vec<RateRow<u32>>,
    pub tenure: Vec<RateRow<TenureBucket>>,
    pub tenure_summary: Vec<TenureSummaryEntry>,
    pub heatmap: HeatmapPivot,
}

/// Complete report payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub filter: crate::filter::DashboardFilter,
    pub config: crate::config::AggregatorConfig,
    pub sections: DashboardSections,
}
