//! Validation functionality
//!
//! Provides validation logic for:
//! - LM semantics against the canonical schema ([`SemanticChecker`])
//! - Source rows before a run ([`SourceDataValidator`])
//! - Canonical records after a run ([`ResultValidator`])
//!
//! All three collect human-readable messages instead of failing on the first one.

pub mod result;
pub mod semantic;
pub mod source_data;

pub use result::ResultValidator;
pub use semantic::SemanticChecker;
pub use source_data::SourceDataValidator;
