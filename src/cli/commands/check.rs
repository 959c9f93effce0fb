//! `check-lm` command

use std::path::Path;

use convconf::{ConvConfService, ConversionConfig};

use crate::error::CliError;

pub fn handle_check(km: &Path, lm: &Path) -> Result<(), CliError> {
    let service = ConvConfService::new(ConversionConfig::default())?;
    let errors = service.check_path(km, lm)?;
    if errors.is_empty() {
        println!("LM valid");
        return Ok(());
    }
    for error in &errors {
        eprintln!("{error}");
    }
    Err(CliError::InvalidLm(errors))
}
