//! Pre-execution check of source rows
//!
//! Reads every declaration's rows and reports columns the declaration expects
//! but the rows lack. Column names match case-insensitively. Each missing
//! column is reported once per object.

use indexmap::IndexSet;
use tracing::debug;

use crate::lm::LogicalModel;
use crate::storage::{Filter, RecordSource, Row, StorageResult, has_column};

pub struct SourceDataValidator;

impl SourceDataValidator {
    /// Fails only when the reader itself fails
    pub fn validate<S>(source: &S, lm: &LogicalModel) -> StorageResult<Vec<String>>
    where
        S: RecordSource + ?Sized,
    {
        let mut errors: IndexSet<String> = IndexSet::new();

        for decl in &lm.data_declarations {
            let rows = source.read(&decl.source_object, &decl.filter)?;
            let columns = decl.columns.iter().map(|c| c.source_column.as_str());
            check_rows(
                &mut errors,
                &rows,
                &decl.source_object,
                decl.ident_column.as_deref(),
                columns,
            );
        }

        for decl in &lm.inspections {
            let rows = source.read(&decl.source_object, &Filter::new())?;
            let columns = [
                decl.parent_column.as_deref(),
                decl.struct_attr_column.as_deref(),
                decl.class_column.as_deref(),
            ]
            .into_iter()
            .flatten()
            .chain(decl.columns.iter().map(|c| c.source_column.as_str()));
            check_rows(
                &mut errors,
                &rows,
                &decl.source_object,
                decl.ident_column.as_deref(),
                columns,
            );
        }

        debug!(lm = %lm.name, errors = errors.len(), "Validated source data");
        Ok(errors.into_iter().collect())
    }
}

fn check_rows<'a>(
    errors: &mut IndexSet<String>,
    rows: &[Row],
    object: &str,
    ident_column: Option<&str>,
    columns: impl Iterator<Item = &'a str> + Clone,
) {
    for row in rows {
        if let Some(ident) = ident_column
            && !has_column(row, ident)
        {
            errors.insert(format!("Missing ident column {ident} in source {object}"));
        }
        for column in columns.clone() {
            if !has_column(row, column) {
                errors.insert(format!("Missing column {column} in source {object}"));
            }
        }
    }
}
