//! ConvConf - declarative data conversion between storage backends
//!
//! Provides unified interfaces for:
//! - Parsing logical model (LM) mapping documents
//! - Checking LMs against a canonical schema
//! - Planning and executing conversions through canonical records
//! - Validating source rows and conversion results
//! - Reading and writing rows through storage backends

pub mod config;
pub mod lm;
pub mod plan;
pub mod runtime;
pub mod schema;
pub mod service;
pub mod storage;
pub mod validation;

pub use config::ConversionConfig;
pub use lm::{LmParser, LogicalModel, ParseError, ParseResult};
pub use plan::{ConversionPlan, ConversionPlanner, Phase, PlanStep};
pub use runtime::{
    CanonicalRecord, ConversionEngine, ConversionError, ConversionOutput, IdentGenerator,
    ResolutionError, SequentialIdentGenerator, TraceEvent, TraceSink, UuidIdentGenerator,
};
pub use schema::{AttributeInfo, CanonicalSchema, ClassInfo, SchemaError};
pub use service::{ConvConfService, ServiceError, ServiceResult};
pub use storage::{
    CsvDirectoryBackend, MemoryBackend, RecordSource, RecordTarget, Row, StorageError,
    StorageResult,
};
#[cfg(feature = "duckdb-backend")]
pub use storage::duckdb_backend::DuckDbConnection;
pub use validation::{ResultValidator, SemanticChecker, SourceDataValidator};
