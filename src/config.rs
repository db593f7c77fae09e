//! Aggregation configuration
//!
//! Tunables shared by every dashboard section. Defaults reproduce the
//! dashboard's fixed constants; a JSON file can override any subset.

use crate::error::AttritionError;
use serde::{Deserialize, Serialize};

/// Width of each commute distance bucket
pub const DEFAULT_DISTANCE_BUCKET_WIDTH: u32 = 7;

/// Smallest (distance bucket, job role) cell that is still reported.
///
/// Cells below this size produce rates too noisy to chart, so they are
/// suppressed rather than drawn.
pub const DEFAULT_MIN_GROUP_SIZE: usize = 8;

/// Largest DistanceFromHome accepted at load; rows above it are dropped.
///
/// Bounds the number of distance buckets any filter state can produce.
pub const MAX_DISTANCE_FROM_HOME: f64 = 10_000.0;

/// Job level treated as entry level by the KPI block
pub const DEFAULT_ENTRY_JOB_LEVEL: u32 = 1;

/// Upper bound (inclusive) on years at company for the early tenure KPI
pub const DEFAULT_EARLY_TENURE_MAX_YEARS: f64 = 2.0;

/// Configuration for the aggregation pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Distance bucket width (same units as DistanceFromHome)
    pub distance_bucket_width: u32,
    /// Minimum members for a distance/role cell to be reported
    pub min_group_size: usize,
    /// Job level used for the entry-level KPI
    pub entry_job_level: u32,
    /// Inclusive tenure cap (years) for the early tenure KPI
    pub early_tenure_max_years: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            distance_bucket_width: DEFAULT_DISTANCE_BUCKET_WIDTH,
            min_group_size: DEFAULT_MIN_GROUP_SIZE,
            entry_job_level: DEFAULT_ENTRY_JOB_LEVEL,
            early_tenure_max_years: DEFAULT_EARLY_TENURE_MAX_YEARS,
        }
    }
}

impl AggregatorConfig {
    /// Load a configuration from JSON, filling unspecified fields with defaults
    pub fn from_json(json: &str) -> Result<Self, AttritionError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to pretty JSON
    pub fn to_json(&self) -> Result<String, AttritionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject settings the aggregators cannot work with
    pub fn validate(&self) -> Result<(), AttritionError> {
        if self.distance_bucket_width == 0 {
            return Err(AttritionError::InvalidConfig(
                "distance_bucket_width must be at least 1".to_string(),
            ));
        }
        if self.min_group_size == 0 {
            return Err(AttritionError::InvalidConfig(
                "min_group_size must be at least 1".to_string(),
            ));
        }
        if !self.early_tenure_max_years.is_finite() || self.early_tenure_max_years < 0.0 {
            return Err(AttritionError::InvalidConfig(format!(
                "early_tenure_max_years must be a non-negative number, got {}",
                self.early_tenure_max_years
            )));
        }
        Ok(())
    }
}

/// Options controlling how the input file is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Field delimiter byte
    pub delimiter: u8,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl LoaderOptions {
    /// Pick a delimiter from the file extension (`.tsv` means tab)
    pub fn for_path(path: &std::path::Path) -> Self {
        let is_tsv = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("tsv"))
            .unwrap_or(false);
        if is_tsv {
            Self { delimiter: b'\t' }
        } else {
            Self::default()
        }
    }
}
