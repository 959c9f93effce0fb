//! Backend abstraction
//!
//! Source and target backends only have to satisfy two narrow traits:
//! - [`RecordSource`]: read rows of a named object with an equality filter
//! - [`RecordTarget`]: write a batch of rows to a named object
//!
//! Implementations:
//! - [`MemoryBackend`]: in-process tables (tests, embedding)
//! - [`CsvDirectoryBackend`]: one `<object>.csv` file per object in a directory
//! - [`SqlBackend`]: any SQL connection, parameterized by an injected [`SqlDialect`]

use indexmap::IndexMap;
use serde_json::Value;

pub mod delimited;
pub mod memory;
pub mod sql;

#[cfg(feature = "duckdb-backend")]
pub mod duckdb_backend;

pub use delimited::CsvDirectoryBackend;
pub use memory::MemoryBackend;
pub use sql::{
    DuckDbDialect, GenericDialect, PostgresDialect, SqlBackend, SqlConnection, SqlDialect,
};

/// One backend row: column name to opaque scalar value, in column order
pub type Row = IndexMap<String, Value>;

/// Equality filter: column name to required literal, in declaration order
pub type Filter = IndexMap<String, String>;

/// Error type for backend operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("CSV error in {object}: {message}")]
    CsvError { object: String, message: String },
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::IoError(err.to_string())
    }
}

/// Result type for backend operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Reads raw rows from a source backend.
///
/// `object` maps to whatever physical resource the backend owns: a table, a
/// CSV file, a worksheet.
pub trait RecordSource {
    /// Read all rows of `object` whose columns equal every filter literal
    fn read(&self, object: &str, filter: &Filter) -> StorageResult<Vec<Row>>;
}

/// Writes rows to a target backend
pub trait RecordTarget {
    /// Write one batch to `object`. An empty batch may be a no-op.
    fn write(&mut self, object: &str, rows: Vec<Row>) -> StorageResult<()>;
}

impl<T: RecordSource + ?Sized> RecordSource for &T {
    fn read(&self, object: &str, filter: &Filter) -> StorageResult<Vec<Row>> {
        (**self).read(object, filter)
    }
}

impl<T: RecordTarget + ?Sized> RecordTarget for &mut T {
    fn write(&mut self, object: &str, rows: Vec<Row>) -> StorageResult<()> {
        (**self).write(object, rows)
    }
}

/// Look up a column, falling back to a case-insensitive match
pub fn lookup_column<'a>(row: &'a Row, column: &str) -> Option<&'a Value> {
    row.get(column).or_else(|| {
        row.iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    })
}

/// Whether a row has a column, case-insensitively
pub fn has_column(row: &Row, column: &str) -> bool {
    row.contains_key(column) || row.keys().any(|name| name.eq_ignore_ascii_case(column))
}

/// Textual form of a cell; `Null` is absent
pub fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Whether every filter literal equals the stringified row value
pub fn matches_filter(row: &Row, filter: &Filter) -> bool {
    filter.iter().all(|(column, literal)| {
        lookup_column(row, column).and_then(cell_text).as_deref() == Some(literal.as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> Row {
        let mut row = Row::new();
        row.insert("Id".to_string(), json!(7));
        row.insert("NAME".to_string(), json!("Ann"));
        row.insert("ACTIVE".to_string(), json!(true));
        row.insert("NOTE".to_string(), Value::Null);
        row
    }

    #[test]
    fn test_lookup_column_case_insensitive() {
        let row = row();
        assert_eq!(lookup_column(&row, "NAME"), Some(&json!("Ann")));
        assert_eq!(lookup_column(&row, "name"), Some(&json!("Ann")));
        assert_eq!(lookup_column(&row, "ID"), Some(&json!(7)));
        assert_eq!(lookup_column(&row, "missing"), None);
        assert!(has_column(&row, "nOtE"));
        assert!(!has_column(&row, "OTHER"));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!(7)), Some("7".to_string()));
        assert_eq!(cell_text(&json!("x")), Some("x".to_string()));
        assert_eq!(cell_text(&json!(false)), Some("false".to_string()));
        assert_eq!(cell_text(&Value::Null), None);
    }

    #[test]
    fn test_matches_filter() {
        let row = row();
        let mut filter = Filter::new();
        assert!(matches_filter(&row, &filter));
        filter.insert("id".to_string(), "7".to_string());
        assert!(matches_filter(&row, &filter));
        filter.insert("NAME".to_string(), "Bob".to_string());
        assert!(!matches_filter(&row, &filter));
    }
}
