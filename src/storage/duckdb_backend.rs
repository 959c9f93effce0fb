//! DuckDB connection for [`SqlBackend`](super::SqlBackend)
//!
//! Enabled with the `duckdb-backend` feature.

use std::path::Path;

use duckdb::types::Value as DuckValue;
use serde_json::Value;

use super::sql::{DuckDbDialect, SqlBackend, SqlConnection};
use super::{Row, StorageError, StorageResult};

impl From<duckdb::Error> for StorageError {
    fn from(err: duckdb::Error) -> Self {
        StorageError::DatabaseError(err.to_string())
    }
}

/// Owned DuckDB connection
pub struct DuckDbConnection {
    conn: duckdb::Connection,
}

impl DuckDbConnection {
    /// Open or create a database file
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = duckdb::Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = duckdb::Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Run DDL or other statements without parameters
    pub fn execute_script(&self, sql: &str) -> StorageResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Wrap into a record backend using the DuckDB dialect
    pub fn into_backend(self) -> SqlBackend<Self, DuckDbDialect> {
        SqlBackend::new(self, DuckDbDialect)
    }
}

impl SqlConnection for DuckDbConnection {
    fn query(&self, sql: &str, params: &[String]) -> StorageResult<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(duckdb::params_from_iter(params.iter()))?;

        let column_count = rows.as_ref().map(|r| r.column_count()).unwrap_or(0);
        let column_names: Vec<String> = (0..column_count)
            .map(|i| {
                rows.as_ref()
                    .and_then(|r| r.column_name(i).ok())
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("col{}", i))
            })
            .collect();

        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut out = Row::new();
            for (i, name) in column_names.iter().enumerate() {
                let value: DuckValue = row.get(i)?;
                out.insert(name.clone(), to_json(value));
            }
            result.push(out);
        }
        Ok(result)
    }

    fn execute_batch(&mut self, sql: &str, param_sets: &[Vec<Value>]) -> StorageResult<u64> {
        let tx = self.conn.transaction()?;
        let mut written = 0u64;
        {
            let mut stmt = tx.prepare(sql)?;
            for params in param_sets {
                let values: Vec<DuckValue> = params.iter().map(to_duck).collect();
                written += stmt.execute(duckdb::params_from_iter(values.iter()))? as u64;
            }
        }
        tx.commit()?;
        Ok(written)
    }
}

fn to_json(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Bool(b),
        DuckValue::TinyInt(n) => Value::Number(n.into()),
        DuckValue::SmallInt(n) => Value::Number(n.into()),
        DuckValue::Int(n) => Value::Number(n.into()),
        DuckValue::BigInt(n) => Value::Number(n.into()),
        DuckValue::UTinyInt(n) => Value::Number(n.into()),
        DuckValue::USmallInt(n) => Value::Number(n.into()),
        DuckValue::UInt(n) => Value::Number(n.into()),
        DuckValue::UBigInt(n) => Value::Number(n.into()),
        DuckValue::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        DuckValue::Double(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        DuckValue::Text(s) => Value::String(s),
        other => Value::String(format!("{:?}", other)),
    }
}

fn to_duck(value: &Value) -> DuckValue {
    match value {
        Value::Null => DuckValue::Null,
        Value::Bool(b) => DuckValue::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => DuckValue::BigInt(i),
            None => n.as_f64().map(DuckValue::Double).unwrap_or(DuckValue::Null),
        },
        Value::String(s) => DuckValue::Text(s.clone()),
        other => DuckValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::row;
    use crate::storage::{Filter, RecordSource, RecordTarget};

    #[test]
    fn test_round_trip_through_duckdb() {
        let conn = DuckDbConnection::open_in_memory().unwrap();
        conn.execute_script("CREATE TABLE TGT (ID VARCHAR, NAME VARCHAR, AGE BIGINT);")
            .unwrap();
        let mut backend = conn.into_backend();

        backend
            .write(
                "TGT",
                vec![
                    row([("ID", Value::from("1")), ("NAME", Value::from("Ann")), ("AGE", Value::from(41))]),
                    row([("ID", Value::from("2")), ("NAME", Value::Null), ("AGE", Value::from(7))]),
                ],
            )
            .unwrap();

        let mut filter = Filter::new();
        filter.insert("ID".to_string(), "2".to_string());
        let rows = backend.read("TGT", &filter).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["NAME"], Value::Null);
        assert_eq!(rows[0]["AGE"], Value::from(7));
    }
}
