//! `plan` command

use std::path::Path;

use convconf::{ConvConfService, ConversionConfig};

use super::Models;
use crate::args::ModelArgs;
use crate::error::CliError;

pub fn handle_plan(models: &ModelArgs, out: &Path) -> Result<(), CliError> {
    let loaded = Models::load(&models.km, &models.source_lm, &models.target_lm)?;
    let service = ConvConfService::new(ConversionConfig::default())?;
    let plan = service.plan(
        &loaded.km_name,
        &loaded.schema,
        &loaded.source_lm,
        &loaded.target_lm,
    )?;

    let json = plan
        .to_json()
        .map_err(|e| CliError::InvalidArgument(format!("Failed to render plan: {e}")))?;
    std::fs::write(out, json).map_err(|e| CliError::FileWriteError(out.to_path_buf(), e.to_string()))?;
    println!("Plan written: {}", out.display());
    Ok(())
}
