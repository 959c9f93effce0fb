//! Delimited-file directory backend
//!
//! Each object is one `<object>.csv` file directly inside the base directory.
//! The header row names the columns. Values are read as strings and an empty
//! field reads as absent (`Null`).
//!
//! ## Security
//!
//! Object names are resolved inside the base directory only. Names containing
//! path separators or ".." are rejected.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::{Filter, RecordSource, RecordTarget, Row, StorageError, StorageResult, cell_text, matches_filter};

pub struct CsvDirectoryBackend {
    base_path: PathBuf,
    delimiter: u8,
}

impl CsvDirectoryBackend {
    /// Create a backend rooted at `base_path` using `,` as delimiter
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the file backing `object`
    pub fn object_path(&self, object: &str) -> StorageResult<PathBuf> {
        if object.is_empty() {
            return Err(StorageError::ObjectNotFound(object.to_string()));
        }
        if object.contains("..") || object.contains('/') || object.contains('\\') {
            return Err(StorageError::PermissionDenied(format!(
                "Object name '{object}' must not contain path components"
            )));
        }
        Ok(self.base_path.join(format!("{object}.csv")))
    }

    fn csv_error(object: &str, err: csv::Error) -> StorageError {
        StorageError::CsvError {
            object: object.to_string(),
            message: err.to_string(),
        }
    }
}

impl RecordSource for CsvDirectoryBackend {
    fn read(&self, object: &str, filter: &Filter) -> StorageResult<Vec<Row>> {
        let path = self.object_path(object)?;
        if !path.exists() {
            debug!(object, path = %path.display(), "CSV file not found, reading as empty");
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .from_path(&path)
            .map_err(|e| Self::csv_error(object, e))?;
        let headers = reader
            .headers()
            .map_err(|e| Self::csv_error(object, e))?
            .clone();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| Self::csv_error(object, e))?;
            let row: Row = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_string(), field_value(v)))
                .collect();
            if matches_filter(&row, filter) {
                rows.push(row);
            }
        }
        debug!(object, rows = rows.len(), "Read CSV object");
        Ok(rows)
    }
}

impl RecordTarget for CsvDirectoryBackend {
    /// Replace `<object>.csv` with the batch; headers come from the first row
    fn write(&mut self, object: &str, rows: Vec<Row>) -> StorageResult<()> {
        let Some(first) = rows.first() else {
            return Ok(());
        };
        let path = self.object_path(object)?;
        std::fs::create_dir_all(&self.base_path)?;

        let headers: Vec<String> = first.keys().cloned().collect();
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_path(&path)
            .map_err(|e| Self::csv_error(object, e))?;
        writer
            .write_record(&headers)
            .map_err(|e| Self::csv_error(object, e))?;
        for row in &rows {
            let values: Vec<String> = headers
                .iter()
                .map(|h| row.get(h).and_then(cell_text).unwrap_or_default())
                .collect();
            writer
                .write_record(&values)
                .map_err(|e| Self::csv_error(object, e))?;
        }
        writer.flush()?;
        debug!(object, rows = rows.len(), path = %path.display(), "Wrote CSV object");
        Ok(())
    }
}

fn field_value(field: &str) -> Value {
    if field.is_empty() {
        Value::Null
    } else {
        Value::String(field.to_string())
    }
}
