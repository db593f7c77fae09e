//! Attrition Insight - aggregation engine for HR attrition dashboards
//!
//! Attrition Insight turns an employee table into the inputs of an attrition
//! dashboard through a deterministic pipeline: CSV adaptation → derived columns
//! → filtering → bucketing → grouped rate aggregation → report encoding.
//!
//! ## Modules
//!
//! - **Loading**: read and validate the employee CSV, dropping bad rows with a reason
//! - **Aggregation**: KPIs, ranked role tables, rate splits, distance buckets and the
//!   job level by tenure heatmap

pub mod aggregate;
pub mod bucketing;
pub mod config;
pub mod encoder;
pub mod error;
pub mod filter;
pub mod normalizer;
pub mod pipeline;
pub mod schema;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::{AggregatorConfig, LoaderOptions};
pub use encoder::ReportEncoder;
pub use error::{AttritionError, DataQualityError};
pub use filter::{DashboardFilter, FilterOptions, FilterSelection};
pub use pipeline::{report_from_path, AttritionAggregator, Dataset};
pub use types::{DashboardReport, DashboardSections, TenureBucket};

/// Crate version embedded in every report
pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "attrition-insight";
