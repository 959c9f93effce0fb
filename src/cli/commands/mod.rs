//! Subcommand handlers

pub mod check;
pub mod convert;
pub mod plan;

use std::path::Path;

use convconf::{CanonicalSchema, LmParser, LogicalModel, ServiceError};

use crate::error::CliError;

/// Parsed inputs shared by `plan` and `convert`
pub struct Models {
    pub km_name: String,
    pub schema: CanonicalSchema,
    pub source_lm: LogicalModel,
    pub target_lm: LogicalModel,
}

impl Models {
    pub fn load(km: &Path, source_lm: &Path, target_lm: &Path) -> Result<Self, CliError> {
        Ok(Self {
            km_name: km_name(km),
            schema: CanonicalSchema::from_path(km).map_err(ServiceError::from)?,
            source_lm: LmParser::parse_path(source_lm).map_err(ServiceError::from)?,
            target_lm: LmParser::parse_path(target_lm).map_err(ServiceError::from)?,
        })
    }
}

/// Schema file name, used as the KM model name in plans
pub fn km_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
