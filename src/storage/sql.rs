//! Generic SQL backend
//!
//! One adapter serves every SQL database. What differs between databases
//! (identifier quoting, parameter placeholders) lives in an injected
//! [`SqlDialect`]; statement execution lives behind [`SqlConnection`].

use serde_json::Value;
use tracing::debug;

use super::{Filter, RecordSource, RecordTarget, Row, StorageResult};

/// Database-specific SQL text generation
pub trait SqlDialect {
    fn name(&self) -> &'static str;

    /// Placeholder for the 1-based parameter `index`
    fn placeholder(&self, index: usize) -> String;

    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Quote one identifier segment when it is not a plain identifier
    fn quote_segment(&self, segment: &str) -> String {
        if is_plain_identifier(segment) {
            segment.to_string()
        } else {
            let q = self.identifier_quote();
            let escaped = segment.replace(q, &format!("{q}{q}"));
            format!("{q}{escaped}{q}")
        }
    }

    /// Quote a possibly schema-qualified object or column name
    fn quote_identifier(&self, name: &str) -> String {
        name.split('.')
            .map(|segment| self.quote_segment(segment))
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// ANSI SQL with `?` placeholders
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericDialect;

impl SqlDialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }
}

/// PostgreSQL: `$1`, `$2`, ...
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }
}

/// DuckDB: `?1`, `?2`, ...
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDbDialect;

impl SqlDialect for DuckDbDialect {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("?{index}")
    }
}

fn is_plain_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Minimal statement execution surface of a database connection
pub trait SqlConnection {
    /// Run a query with text parameters and return rows in column order
    fn query(&self, sql: &str, params: &[String]) -> StorageResult<Vec<Row>>;

    /// Execute one parameterized statement for each parameter set
    fn execute_batch(&mut self, sql: &str, param_sets: &[Vec<Value>]) -> StorageResult<u64>;
}

/// Record backend over any [`SqlConnection`] using dialect `D`
pub struct SqlBackend<C, D> {
    connection: C,
    dialect: D,
}

impl<C: SqlConnection, D: SqlDialect> SqlBackend<C, D> {
    pub fn new(connection: C, dialect: D) -> Self {
        Self {
            connection,
            dialect,
        }
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn into_connection(self) -> C {
        self.connection
    }

    /// `SELECT * FROM object [WHERE a = ? AND ...]` with filter literals as parameters
    pub fn select_statement(&self, object: &str, filter: &Filter) -> (String, Vec<String>) {
        let mut sql = format!("SELECT * FROM {}", self.dialect.quote_identifier(object));
        if !filter.is_empty() {
            let conditions: Vec<String> = filter
                .keys()
                .enumerate()
                .map(|(i, column)| {
                    format!(
                        "{} = {}",
                        self.dialect.quote_identifier(column),
                        self.dialect.placeholder(i + 1)
                    )
                })
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        (sql, filter.values().cloned().collect())
    }

    /// `INSERT INTO object (c1, c2) VALUES (?, ?)`
    pub fn insert_statement(&self, object: &str, columns: &[String]) -> String {
        let names: Vec<String> = columns
            .iter()
            .map(|c| self.dialect.quote_identifier(c))
            .collect();
        let placeholders: Vec<String> = (1..=columns.len())
            .map(|i| self.dialect.placeholder(i))
            .collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.dialect.quote_identifier(object),
            names.join(", "),
            placeholders.join(", ")
        )
    }
}

impl<C: SqlConnection, D: SqlDialect> RecordSource for SqlBackend<C, D> {
    fn read(&self, object: &str, filter: &Filter) -> StorageResult<Vec<Row>> {
        let (sql, params) = self.select_statement(object, filter);
        debug!(dialect = self.dialect.name(), %sql, "Reading SQL object");
        self.connection.query(&sql, &params)
    }
}

impl<C: SqlConnection, D: SqlDialect> RecordTarget for SqlBackend<C, D> {
    fn write(&mut self, object: &str, rows: Vec<Row>) -> StorageResult<()> {
        let Some(first) = rows.first() else {
            return Ok(());
        };
        let columns: Vec<String> = first.keys().cloned().collect();
        let sql = self.insert_statement(object, &columns);
        let param_sets: Vec<Vec<Value>> = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        debug!(dialect = self.dialect.name(), %sql, rows = param_sets.len(), "Writing SQL object");
        self.connection.execute_batch(&sql, &param_sets)?;
        Ok(())
    }
}
