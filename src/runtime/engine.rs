//! Conversion engine
//!
//! Runs a READ phase turning source rows into canonical records, then a WRITE
//! phase turning those records into target rows. All working state is local
//! to one call, so an engine can be shared between callers.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, info_span};

use crate::lm::{ColumnMapping, DataDeclaration, InspectionDeclaration, LogicalModel};
use crate::plan::{ConversionPlan, Phase};
use crate::storage::{Filter, RecordSource, RecordTarget, Row, cell_text, lookup_column};

use super::error::{ConversionResult, ResolutionError, ResolutionResult};
use super::ident::{IdentGenerator, UuidIdentGenerator};
use super::record::CanonicalRecord;
use super::trace::{NoTrace, TraceEvent, TraceSink};
use super::value_map::{forward_resolve, reverse_resolve};

/// Result of one conversion run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionOutput {
    pub records: Vec<CanonicalRecord>,
    /// Empty unless tracing was requested
    pub trace: Vec<TraceEvent>,
    /// Rows handed to the writer per target object
    pub rows_written: IndexMap<String, usize>,
}

#[derive(Clone)]
pub struct ConversionEngine {
    idents: Arc<dyn IdentGenerator>,
}

impl Default for ConversionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionEngine {
    /// Engine synthesizing UUID idents
    pub fn new() -> Self {
        Self {
            idents: Arc::new(UuidIdentGenerator),
        }
    }

    pub fn with_ident_generator(mut self, generator: impl IdentGenerator + 'static) -> Self {
        self.idents = Arc::new(generator);
        self
    }

    /// Execute a plan built by [`ConversionPlanner`](crate::plan::ConversionPlanner)
    pub fn convert_plan<S, T>(
        &self,
        source: &S,
        target: &mut T,
        plan: &ConversionPlan,
        trace: bool,
    ) -> ConversionResult<ConversionOutput>
    where
        S: RecordSource + ?Sized,
        T: RecordTarget + ?Sized,
    {
        self.convert(source, target, &plan.source_model, &plan.target_model, trace)
    }

    pub fn convert<S, T>(
        &self,
        source: &S,
        target: &mut T,
        source_lm: &LogicalModel,
        target_lm: &LogicalModel,
        trace: bool,
    ) -> ConversionResult<ConversionOutput>
    where
        S: RecordSource + ?Sized,
        T: RecordTarget + ?Sized,
    {
        let _span = info_span!(
            "convert",
            source_lm = %source_lm.name,
            target_lm = %target_lm.name,
            trace
        )
        .entered();

        let mut events: Vec<TraceEvent> = Vec::new();
        let mut no_trace = NoTrace;
        let sink: &mut dyn TraceSink = if trace { &mut events } else { &mut no_trace };

        let records = self.read_canonical(source, source_lm, sink)?;
        let rows_written = self.write_canonical(target, target_lm, &records, sink)?;

        info!(
            records = records.len(),
            rows = rows_written.values().sum::<usize>(),
            trace_events = events.len(),
            "Conversion completed"
        );
        Ok(ConversionOutput {
            records,
            trace: events,
            rows_written,
        })
    }

    /// READ phase: every DATA declaration in order, then every INSPECTION
    pub fn read_canonical<S>(
        &self,
        source: &S,
        lm: &LogicalModel,
        sink: &mut dyn TraceSink,
    ) -> ConversionResult<Vec<CanonicalRecord>>
    where
        S: RecordSource + ?Sized,
    {
        let mut out = Vec::new();
        for decl in &lm.data_declarations {
            self.read_data(source, lm, decl, sink, &mut out)?;
        }
        for decl in &lm.inspections {
            self.read_inspection(source, lm, decl, sink, &mut out)?;
        }
        Ok(out)
    }

    fn read_data<S>(
        &self,
        source: &S,
        lm: &LogicalModel,
        decl: &DataDeclaration,
        sink: &mut dyn TraceSink,
        out: &mut Vec<CanonicalRecord>,
    ) -> ConversionResult<()>
    where
        S: RecordSource + ?Sized,
    {
        let _span = info_span!("read_data", decl = %decl.name, object = %decl.source_object).entered();
        let rows = source.read(&decl.source_object, &decl.filter)?;
        let detail = format!("source={}", decl.source_object);

        for row in &rows {
            let ident = self.resolve_ident(row, decl.ident_column.as_deref(), &decl.source_object)?;
            let mut record = CanonicalRecord::new(&decl.class_name, ident);
            read_columns(lm, row, &decl.columns, &mut record, &detail, sink)?;
            out.push(record);
        }
        debug!(rows = rows.len(), class = %decl.class_name, "Read DATA declaration");
        Ok(())
    }

    fn read_inspection<S>(
        &self,
        source: &S,
        lm: &LogicalModel,
        decl: &InspectionDeclaration,
        sink: &mut dyn TraceSink,
        out: &mut Vec<CanonicalRecord>,
    ) -> ConversionResult<()>
    where
        S: RecordSource + ?Sized,
    {
        let _span =
            info_span!("read_inspection", decl = %decl.name, object = %decl.source_object).entered();
        let rows = source.read(&decl.source_object, &Filter::new())?;
        let detail = format!("inspection={}", decl.source_object);

        for row in &rows {
            let ident = self.resolve_ident(row, decl.ident_column.as_deref(), &decl.source_object)?;
            let parent = cell(row, decl.parent_column.as_deref());
            let struct_attr = forward_resolve(
                lm,
                decl.struct_attr_map.as_deref(),
                cell(row, decl.struct_attr_column.as_deref()).as_deref(),
            )?;
            let class_name = forward_resolve(
                lm,
                decl.class_map.as_deref(),
                cell(row, decl.class_column.as_deref()).as_deref(),
            )?
            .unwrap_or_else(|| decl.class_name.clone());

            let mut record = CanonicalRecord::new(class_name, ident);
            record.parent = parent;
            record.struct_attr = struct_attr;
            read_columns(lm, row, &decl.columns, &mut record, &detail, sink)?;
            out.push(record);
        }
        debug!(rows = rows.len(), "Read INSPECTION declaration");
        Ok(())
    }

    fn resolve_ident(
        &self,
        row: &Row,
        ident_column: Option<&str>,
        object: &str,
    ) -> ResolutionResult<String> {
        match ident_column {
            None => Ok(self.idents.next_ident()),
            Some(column) => cell(row, Some(column)).ok_or_else(|| ResolutionError::MissingIdent {
                object: object.to_string(),
                column: column.to_string(),
            }),
        }
    }

    /// WRITE phase: one writer call per target DATA declaration, even when no
    /// record matches its class. Returns rows written per object.
    pub fn write_canonical<T>(
        &self,
        target: &mut T,
        lm: &LogicalModel,
        records: &[CanonicalRecord],
        sink: &mut dyn TraceSink,
    ) -> ConversionResult<IndexMap<String, usize>>
    where
        T: RecordTarget + ?Sized,
    {
        let mut written: IndexMap<String, usize> = IndexMap::new();
        for decl in &lm.data_declarations {
            let _span =
                info_span!("write_data", decl = %decl.name, object = %decl.source_object).entered();
            let detail = format!("target={}", decl.source_object);

            let mut rows = Vec::new();
            for record in records.iter().filter(|r| r.class_name == decl.class_name) {
                let mut row = Row::new();
                if let Some(column) = &decl.ident_column {
                    row.insert(column.clone(), Value::String(record.ident.clone()));
                }
                for mapping in &decl.columns {
                    let value = reverse_resolve(
                        lm,
                        mapping.value_map.as_deref(),
                        record.field(&mapping.target_path),
                    )?;
                    if sink.enabled() {
                        sink.record(TraceEvent {
                            phase: Phase::Write,
                            class_name: record.class_name.clone(),
                            ident: record.ident.clone(),
                            source_column: mapping.target_path.clone(),
                            target_path: mapping.source_column.clone(),
                            value: cell_text(&value),
                            detail: detail.clone(),
                        });
                    }
                    row.insert(mapping.source_column.clone(), value);
                }
                rows.push(row);
            }

            let count = rows.len();
            target.write(&decl.source_object, rows)?;
            *written.entry(decl.source_object.clone()).or_default() += count;
            debug!(rows = count, class = %decl.class_name, "Wrote DATA declaration");
        }
        Ok(written)
    }
}

fn cell(row: &Row, column: Option<&str>) -> Option<String> {
    lookup_column(row, column?).and_then(cell_text)
}

fn read_columns(
    lm: &LogicalModel,
    row: &Row,
    columns: &[ColumnMapping],
    record: &mut CanonicalRecord,
    detail: &str,
    sink: &mut dyn TraceSink,
) -> ConversionResult<()> {
    for mapping in columns {
        let raw = cell(row, Some(&mapping.source_column));
        let mapped = forward_resolve(lm, mapping.value_map.as_deref(), raw.as_deref())?;
        if sink.enabled() {
            sink.record(TraceEvent {
                phase: Phase::Read,
                class_name: record.class_name.clone(),
                ident: record.ident.clone(),
                source_column: mapping.source_column.clone(),
                target_path: mapping.target_path.clone(),
                value: mapped.clone(),
                detail: detail.to_string(),
            });
        }
        if let Some(value) = mapped {
            record.values.insert(mapping.target_path.clone(), value);
        }
    }
    Ok(())
}
