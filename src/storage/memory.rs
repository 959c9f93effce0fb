//! In-memory backend
//!
//! Holds one ordered list of rows per object name. Reads apply the equality
//! filter on stringified cell values, writes append.

use indexmap::IndexMap;

use super::{Filter, RecordSource, RecordTarget, Row, StorageResult, matches_filter};

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    objects: IndexMap<String, Vec<Row>>,
    /// Number of `write` calls received per object, including empty batches
    write_calls: IndexMap<String, usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object with rows, chaining
    pub fn with_rows(mut self, object: impl Into<String>, rows: Vec<Row>) -> Self {
        self.objects.entry(object.into()).or_default().extend(rows);
        self
    }

    pub fn insert_rows(&mut self, object: impl Into<String>, rows: Vec<Row>) {
        self.objects.entry(object.into()).or_default().extend(rows);
    }

    /// Rows currently held for `object` (empty when unknown)
    pub fn rows(&self, object: &str) -> &[Row] {
        self.objects.get(object).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    pub fn write_calls(&self, object: &str) -> usize {
        self.write_calls.get(object).copied().unwrap_or(0)
    }
}

impl RecordSource for MemoryBackend {
    fn read(&self, object: &str, filter: &Filter) -> StorageResult<Vec<Row>> {
        Ok(self
            .rows(object)
            .iter()
            .filter(|row| matches_filter(row, filter))
            .cloned()
            .collect())
    }
}

impl RecordTarget for MemoryBackend {
    fn write(&mut self, object: &str, rows: Vec<Row>) -> StorageResult<()> {
        *self.write_calls.entry(object.to_string()).or_default() += 1;
        if rows.is_empty() {
            return Ok(());
        }
        self.objects.entry(object.to_string()).or_default().extend(rows);
        Ok(())
    }
}

/// Build a row from `(column, value)` pairs
pub fn row<K, V, I>(cells: I) -> Row
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    cells
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_applies_filter() {
        let backend = MemoryBackend::new().with_rows(
            "PERSON",
            vec![
                row([("ID", json!(1)), ("KIND", json!("A"))]),
                row([("ID", json!(2)), ("KIND", json!("B"))]),
            ],
        );
        let mut filter = Filter::new();
        filter.insert("KIND".to_string(), "B".to_string());
        let rows = backend.read("PERSON", &filter).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["ID"], json!(2));
        assert!(backend.read("UNKNOWN", &Filter::new()).unwrap().is_empty());
    }

    #[test]
    fn test_write_appends_and_counts_calls() {
        let mut backend = MemoryBackend::new();
        backend.write("OUT", vec![row([("A", "1")])]).unwrap();
        backend.write("OUT", vec![row([("A", "2")])]).unwrap();
        backend.write("EMPTY", Vec::new()).unwrap();
        assert_eq!(backend.rows("OUT").len(), 2);
        assert_eq!(backend.write_calls("OUT"), 2);
        assert_eq!(backend.write_calls("EMPTY"), 1);
        assert!(backend.rows("EMPTY").is_empty());
    }
}
