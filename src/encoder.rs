//! Report encoding
//!
//! This module packages dashboard sections into a report payload with
//! producer and provenance metadata, and serializes it as JSON. Flat tables
//! can also be exported as CSV for spreadsheet users.

use crate::error::AttritionError;
use crate::filter::DashboardFilter;
use crate::pipeline::{AttritionAggregator, Dataset};
use crate::types::{
    DashboardReport, DashboardSections, DistanceRoleChart, HeatmapPivot, RateRow,
    ReportProducer, ReportProvenance, TenureSummaryEntry,
};
use crate::{CRATE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use std::fmt::Display;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder for producing report payloads
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Compute every section for `filter` and wrap it in a report
    pub fn encode(
        &self,
        dataset: &Dataset,
        aggregator: &AttritionAggregator,
        filter: &DashboardFilter,
    ) -> DashboardReport {
        let sections = aggregator.sections(dataset, filter);
        self.wrap(dataset, aggregator, filter, sections)
    }

    /// Wrap already computed sections in a report
    pub fn wrap(
        &self,
        dataset: &Dataset,
        aggregator: &AttritionAggregator,
        filter: &DashboardFilter,
        sections: DashboardSections,
    ) -> DashboardReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: CRATE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = ReportProvenance {
            source: dataset.source().to_string(),
            rows_read: dataset.rows_read(),
            rows_loaded: dataset.employees().len(),
            rows_dropped: dataset.dropped().len(),
            computed_at_utc: Utc::now().to_rfc3339(),
        };

        DashboardReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            provenance,
            filter: filter.clone(),
            config: aggregator.config().clone(),
            sections,
        }
    }

    /// Serialize a report to JSON
    pub fn to_json(&self, report: &DashboardReport, pretty: bool) -> Result<String, AttritionError> {
        let json = if pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(json)
    }
}

/// Write a flat rate table as CSV
pub fn write_rate_table_csv<K, W>(
    rows: &[RateRow<K>],
    key_header: &str,
    writer: W,
) -> Result<(), AttritionError>
where
    K: Display,
    W: Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([key_header, "count", "left", "stayed", "left_rate", "stayed_rate"])?;
    for row in rows {
        wtr.write_record(&[
            row.key.to_string(),
            row.count.to_string(),
            row.left.to_string(),
            row.stayed.to_string(),
            format!("{:.6}", row.left_rate),
            format!("{:.6}", row.stayed_rate),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the distance by role cells as CSV
pub fn write_distance_chart_csv<W: Write>(
    chart: &DistanceRoleChart,
    writer: W,
) -> Result<(), AttritionError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["distance_range", "job_role", "count", "left", "left_rate"])?;
    for row in &chart.rows {
        wtr.write_record(&[
            row.key.distance_range.clone(),
            row.key.job_role.clone(),
            row.count.to_string(),
            row.left.to_string(),
            format!("{:.6}", row.left_rate),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the tenure summary as CSV; empty buckets have an empty rate
pub fn write_tenure_summary_csv<W: Write>(
    summary: &[TenureSummaryEntry],
    writer: W,
) -> Result<(), AttritionError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["tenure_bucket", "count", "attrition_rate"])?;
    for entry in summary {
        wtr.write_record(&[
            entry.tenure_bucket.to_string(),
            entry.count.to_string(),
            entry
                .attrition_rate
                .map(|r| format!("{r:.6}"))
                .unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the heatmap as a grid; cells with no members are left blank
pub fn write_heatmap_csv<W: Write>(pivot: &HeatmapPivot, writer: W) -> Result<(), AttritionError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["job_level".to_string()];
    header.extend(pivot.columns.iter().map(|c| c.to_string()));
    wtr.write_record(&header)?;

    for row in &pivot.rows {
        let mut record = vec![row.job_level.to_string()];
        record.extend(
            row.cells
                .iter()
                .map(|c| c.map(|r| format!("{r:.6}")).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write every flat table of `sections` into `dir`, one CSV per section.
///
/// Returns the paths written. The distance chart file is skipped when the
/// filter selected no rows.
pub fn export_sections_csv(
    sections: &DashboardSections,
    dir: &Path,
) -> Result<Vec<PathBuf>, AttritionError> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let mut create = |name: &str| -> Result<fs::File, AttritionError> {
        let path = dir.join(name);
        let file = fs::File::create(&path)?;
        written.push(path);
        Ok(file)
    };

    write_rate_table_csv(&sections.job_role_table, "job_role", create("job_role_table.csv")?)?;
    write_rate_table_csv(&sections.job_role_chart, "job_role", create("job_role_chart.csv")?)?;
    write_rate_table_csv(&sections.gender, "gender", create("gender.csv")?)?;
    if let Some(chart) = &sections.distance_by_role {
        write_distance_chart_csv(chart, create("distance_by_role.csv")?)?;
    }
    write_rate_table_csv(&sections.overtime, "overtime", create("overtime.csv")?)?;
    write_rate_table_csv(&sections.job_level, "job_level", create("job_level.csv")?)?;
    write_rate_table_csv(&sections.tenure, "tenure_bucket", create("tenure.csv")?)?;
    write_tenure_summary_csv(&sections.tenure_summary, create("tenure_summary.csv")?)?;
    write_heatmap_csv(&sections.heatmap, create("heatmap.csv")?)?;

    tracing::debug!(files = written.len(), dir = %dir.display(), "exported section tables");
    Ok(written)
}
