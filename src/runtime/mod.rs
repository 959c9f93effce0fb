//! Conversion runtime
//!
//! Source rows become [`CanonicalRecord`]s keyed by schema class and target
//! path; target rows are built back from those records. The engine only talks
//! to backends through [`RecordSource`](crate::storage::RecordSource) and
//! [`RecordTarget`](crate::storage::RecordTarget).

mod engine;
mod error;
mod ident;
mod record;
mod trace;
pub mod value_map;

pub use engine::{ConversionEngine, ConversionOutput};
pub use error::{ConversionError, ConversionResult, ResolutionError, ResolutionResult};
pub use ident::{IdentGenerator, SequentialIdentGenerator, UuidIdentGenerator};
pub use record::CanonicalRecord;
pub use trace::{NoTrace, TraceEvent, TraceSink};
pub use value_map::{forward_resolve, reverse_resolve};
