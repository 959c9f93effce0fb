//! Service facade
//!
//! A conversion run goes through three stages:
//! 1. Parse both LMs and check them against the canonical schema.
//! 2. Build a plan.
//! 3. Validate the source rows, execute the plan, validate the result.

use std::path::Path;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, info_span, warn};
use uuid::Uuid;

use crate::config::ConversionConfig;
use crate::lm::{LmParser, LogicalModel, ParseError};
use crate::plan::{ConversionPlan, ConversionPlanner};
use crate::runtime::{ConversionEngine, ConversionError, ConversionOutput};
use crate::schema::{CanonicalSchema, SchemaError};
use crate::storage::{RecordSource, RecordTarget, StorageError};
use crate::validation::{ResultValidator, SemanticChecker, SourceDataValidator};

/// Errors returned by [`ConvConfService`]
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("LM validation failed: {}", .0.join("; "))]
    SemanticErrors(Vec<String>),

    #[error("Source data validation failed: {}", .0.join("; "))]
    SourceValidation(Vec<String>),

    #[error("Result validation failed: {}", .0.join("; "))]
    ResultValidation(Vec<String>),
}

impl ServiceError {
    /// Collected findings for the validation variants
    pub fn messages(&self) -> &[String] {
        match self {
            ServiceError::SemanticErrors(m)
            | ServiceError::SourceValidation(m)
            | ServiceError::ResultValidation(m) => m,
            _ => &[],
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub struct ConvConfService {
    config: ConversionConfig,
    engine: ConversionEngine,
}

impl Default for ConvConfService {
    fn default() -> Self {
        Self {
            config: ConversionConfig::default(),
            engine: ConversionEngine::new(),
        }
    }
}

impl ConvConfService {
    pub fn new(config: ConversionConfig) -> ServiceResult<Self> {
        config.validate().map_err(ServiceError::ConfigError)?;
        Ok(Self {
            config,
            engine: ConversionEngine::new(),
        })
    }

    /// Replace the engine, e.g. to inject a deterministic ident generator
    pub fn with_engine(mut self, engine: ConversionEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Semantic errors of one LM; empty when valid
    pub fn check(&self, schema: &CanonicalSchema, lm: &LogicalModel) -> Vec<String> {
        let errors = SemanticChecker::check(lm, schema);
        info!(lm = %lm.name, errors = errors.len(), "Checked LM");
        errors
    }

    /// Load a schema document and an LM file, then check
    pub fn check_path(
        &self,
        schema_path: impl AsRef<Path>,
        lm_path: impl AsRef<Path>,
    ) -> ServiceResult<Vec<String>> {
        let schema = CanonicalSchema::from_path(schema_path)?;
        let lm = LmParser::parse_path(lm_path)?;
        Ok(self.check(&schema, &lm))
    }

    /// Check both models and build a plan
    pub fn plan(
        &self,
        km_name: &str,
        schema: &CanonicalSchema,
        source_lm: &LogicalModel,
        target_lm: &LogicalModel,
    ) -> ServiceResult<ConversionPlan> {
        let mut errors = self.check(schema, source_lm);
        errors.extend(self.check(schema, target_lm));
        if !errors.is_empty() {
            if self.config.fail_on_semantic_errors {
                return Err(ServiceError::SemanticErrors(errors));
            }
            warn!(errors = errors.len(), "Planning despite LM semantic errors");
        }

        let plan = ConversionPlanner::build(km_name, source_lm, target_lm);
        info!(km = km_name, steps = plan.steps.len(), "Plan built");
        Ok(plan)
    }

    /// Validate source rows, run the plan, validate the produced records
    pub fn execute_plan<S, T>(
        &self,
        schema: &CanonicalSchema,
        plan: &ConversionPlan,
        source: &S,
        target: &mut T,
    ) -> ServiceResult<ConversionOutput>
    where
        S: RecordSource + ?Sized,
        T: RecordTarget + ?Sized,
    {
        let run_id = Uuid::new_v4();
        let _span = info_span!(
            "conversion_run",
            run_id = %run_id,
            km = %plan.km_model,
            started_at = %chrono::Utc::now().to_rfc3339()
        )
        .entered();
        let start = Instant::now();

        if self.config.validate_source_data {
            let errors = SourceDataValidator::validate(source, &plan.source_model)?;
            if !errors.is_empty() {
                warn!(errors = errors.len(), "Source data validation failed");
                return Err(ServiceError::SourceValidation(errors));
            }
        }

        let output = self
            .engine
            .convert_plan(source, target, plan, self.config.trace)?;

        if self.config.validate_result {
            let errors = ResultValidator::validate(schema, &output.records);
            if !errors.is_empty() {
                warn!(errors = errors.len(), "Result validation failed");
                return Err(ServiceError::ResultValidation(errors));
            }
        }

        info!(
            run_id = %run_id,
            records = output.records.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Conversion run completed"
        );
        Ok(output)
    }

    /// [`plan`](Self::plan) followed by [`execute_plan`](Self::execute_plan)
    pub fn convert<S, T>(
        &self,
        km_name: &str,
        schema: &CanonicalSchema,
        source_lm: &LogicalModel,
        target_lm: &LogicalModel,
        source: &S,
        target: &mut T,
    ) -> ServiceResult<ConversionOutput>
    where
        S: RecordSource + ?Sized,
        T: RecordTarget + ?Sized,
    {
        let plan = self.plan(km_name, schema, source_lm, target_lm)?;
        self.execute_plan(schema, &plan, source, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeInfo, ClassInfo};
    use crate::storage::MemoryBackend;
    use crate::storage::memory::row;

    fn schema() -> CanonicalSchema {
        CanonicalSchema::new().with_class(
            ClassInfo::new("Ns.Person")
                .with_attribute(AttributeInfo::new("Name", "TEXT").mandatory()),
        )
    }

    fn lm(text: &str) -> LogicalModel {
        LmParser::parse_str("LM", text).unwrap()
    }

    #[test]
    fn test_plan_rejects_semantic_errors() {
        let service = ConvConfService::default();
        let bad = lm("DATA P FROM T CLASS Ns.Nope { IDENT ID; }");
        let err = service.plan("KM", &schema(), &bad, &bad).unwrap_err();
        assert_eq!(err.messages().len(), 2);
        assert!(err.to_string().starts_with("LM validation failed: Unknown class: Ns.Nope"));

        let lenient =
            ConvConfService::new(ConversionConfig::new().with_fail_on_semantic_errors(false))
                .unwrap();
        assert!(lenient.plan("KM", &schema(), &bad, &bad).is_ok());
    }

    #[test]
    fn test_source_validation_blocks_writes() {
        let service = ConvConfService::default();
        let source_lm = lm("DATA P FROM T CLASS Ns.Person { IDENT ID; COLUMN NAME -> Name; }");
        let target_lm = lm("DATA P FROM OUT CLASS Ns.Person { IDENT ID; COLUMN NAME -> Name; }");
        let source = MemoryBackend::new().with_rows("T", vec![row([("ID", "1")])]);
        let mut target = MemoryBackend::new();

        let err = service
            .convert("KM", &schema(), &source_lm, &target_lm, &source, &mut target)
            .unwrap_err();
        assert!(matches!(err, ServiceError::SourceValidation(_)));
        assert_eq!(target.write_calls("OUT"), 0);
    }

    #[test]
    fn test_result_validation_reports_mandatory_attribute() {
        let service = ConvConfService::default();
        let source_lm = lm("DATA P FROM T CLASS Ns.Person { IDENT ID; }");
        let target_lm = lm("DATA P FROM OUT CLASS Ns.Person { IDENT ID; }");
        let source = MemoryBackend::new().with_rows("T", vec![row([("ID", "9")])]);
        let mut target = MemoryBackend::new();

        let err = service
            .convert("KM", &schema(), &source_lm, &target_lm, &source, &mut target)
            .unwrap_err();
        assert_eq!(
            err.messages(),
            &["Mandatory attribute Ns.Person.Name is empty for ident 9".to_string()]
        );
    }
}
