//! Employee table input schema
//!
//! This module defines the raw row layout of the employee CSV and the adapter
//! that reads it. Rows are read as loosely typed strings; typing and label
//! validation happen in the normalizer so that one bad row never aborts a load.

mod adapter;
mod raw_record;

pub use adapter::*;
pub use raw_record::*;
