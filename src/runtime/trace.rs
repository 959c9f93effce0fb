//! Trace events
//!
//! Tracing is purely additive: events are built only when the sink asks for
//! them and never feed back into records or rows.

use serde::{Deserialize, Serialize};

use crate::plan::Phase;

/// Path of one value from source column to target path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEvent {
    pub phase: Phase,
    pub class_name: String,
    pub ident: String,
    pub source_column: String,
    pub target_path: String,
    pub value: Option<String>,
    pub detail: String,
}

impl TraceEvent {
    /// `phase|className|ident|sourceColumn->targetPath|value|detail`
    pub fn to_line(&self) -> String {
        format!(
            "{}|{}|{}|{}->{}|{}|{}",
            self.phase,
            self.class_name,
            self.ident,
            self.source_column,
            self.target_path,
            self.value.as_deref().unwrap_or("null"),
            self.detail
        )
    }
}

/// Receiver of trace events
pub trait TraceSink {
    /// Events are only constructed when this returns true
    fn enabled(&self) -> bool {
        true
    }

    fn record(&mut self, event: TraceEvent);
}

impl TraceSink for Vec<TraceEvent> {
    fn record(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// Sink for runs without tracing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TraceSink for NoTrace {
    fn enabled(&self) -> bool {
        false
    }

    fn record(&mut self, _event: TraceEvent) {}
}
