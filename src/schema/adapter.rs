//! Adapter for reading the employee CSV into raw rows

use crate::config::LoaderOptions;
use crate::error::AttritionError;
use crate::schema::raw_record::{check_headers, RawEmployeeRecord, RawRow};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Adapter for converting delimited text into raw employee rows
pub struct CsvRecordAdapter;

impl CsvRecordAdapter {
    /// Read every row of a file on disk
    pub fn read_path(path: &Path, options: LoaderOptions) -> Result<Vec<RawRow>, AttritionError> {
        let file = File::open(path).map_err(|e| {
            AttritionError::DataLoad(format!("failed to open {}: {}", path.display(), e))
        })?;
        Self::read(file, options).map_err(|e| match e {
            AttritionError::Csv(err) => {
                AttritionError::DataLoad(format!("{}: {}", path.display(), err))
            }
            other => other,
        })
    }

    /// Read every row from an in-memory string
    pub fn read_str(data: &str, options: LoaderOptions) -> Result<Vec<RawRow>, AttritionError> {
        Self::read(data.as_bytes(), options)
    }

    /// Read every row from any reader.
    ///
    /// The header row must contain every required column. A row with the wrong
    /// number of fields is a fatal error; empty cells are not.
    pub fn read<R: Read>(reader: R, options: LoaderOptions) -> Result<Vec<RawRow>, AttritionError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        if headers.is_empty() {
            return Err(AttritionError::DataLoad("file has no columns".to_string()));
        }
        check_headers(&headers)?;

        let mut rows = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result?;
            let raw: RawEmployeeRecord = record.deserialize(Some(&headers))?;
            rows.push(RawRow {
                row: idx + 1,
                record: raw,
            });
        }

        tracing::debug!(rows = rows.len(), "read employee rows");
        Ok(rows)
    }
}
