//! `convert` command

use std::path::Path;

use tracing::info;

use convconf::{
    ConvConfService, ConversionConfig, CsvDirectoryBackend, RecordSource, RecordTarget,
};

use super::Models;
use crate::args::{ConvertArgs, EndpointType};
use crate::error::CliError;

pub fn handle_convert(args: &ConvertArgs) -> Result<(), CliError> {
    let config = load_config(args)?;
    let loaded = Models::load(&args.models.km, &args.models.source_lm, &args.models.target_lm)?;

    let source = open_source(args.source_type, &args.source, args.delimiter)?;
    let mut target = open_target(args.target_type, &args.target, args.delimiter)?;

    let service = ConvConfService::new(config)?;
    let plan = service.plan(
        &loaded.km_name,
        &loaded.schema,
        &loaded.source_lm,
        &loaded.target_lm,
    )?;
    let output = service.execute_plan(&loaded.schema, &plan, source.as_ref(), target.as_mut())?;

    if let Some(path) = &args.trace_out {
        let mut text = String::new();
        for event in &output.trace {
            text.push_str(&event.to_line());
            text.push('\n');
        }
        std::fs::write(path, text)
            .map_err(|e| CliError::FileWriteError(path.clone(), e.to_string()))?;
        info!(path = %path.display(), events = output.trace.len(), "Trace written");
    }

    println!(
        "Converted {} record(s), wrote {} row(s)",
        output.records.len(),
        output.rows_written.values().sum::<usize>()
    );
    Ok(())
}

/// Options file first, then command-line flags on top
fn load_config(args: &ConvertArgs) -> Result<ConversionConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CliError::FileReadError(path.clone(), e.to_string()))?;
            toml::from_str(&text).map_err(|e| CliError::ConfigError(e.to_string()))?
        }
        None => ConversionConfig::default(),
    };
    if args.trace_out.is_some() {
        config = config.with_trace(true);
    }
    if args.no_validate {
        config = config.without_validation();
    }
    Ok(config)
}

fn delimiter_byte(delimiter: char) -> Result<u8, CliError> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| CliError::InvalidArgument(format!("Delimiter must be ASCII: {delimiter:?}")))
}

fn open_source(
    kind: EndpointType,
    path: &Path,
    delimiter: char,
) -> Result<Box<dyn RecordSource>, CliError> {
    match kind {
        EndpointType::Csv => Ok(Box::new(
            CsvDirectoryBackend::new(path).with_delimiter(delimiter_byte(delimiter)?),
        )),
        EndpointType::Duckdb => open_duckdb(path).map(|b| b as Box<dyn RecordSource>),
    }
}

fn open_target(
    kind: EndpointType,
    path: &Path,
    delimiter: char,
) -> Result<Box<dyn RecordTarget>, CliError> {
    match kind {
        EndpointType::Csv => Ok(Box::new(
            CsvDirectoryBackend::new(path).with_delimiter(delimiter_byte(delimiter)?),
        )),
        EndpointType::Duckdb => open_duckdb(path).map(|b| b as Box<dyn RecordTarget>),
    }
}

#[cfg(feature = "duckdb-backend")]
type DuckDbBackend = convconf::storage::SqlBackend<convconf::DuckDbConnection, convconf::storage::DuckDbDialect>;

#[cfg(feature = "duckdb-backend")]
fn open_duckdb(path: &Path) -> Result<Box<DuckDbBackend>, CliError> {
    let connection = convconf::DuckDbConnection::open(path)
        .map_err(|e| CliError::InvalidArgument(format!("{}: {e}", path.display())))?;
    Ok(Box::new(connection.into_backend()))
}

#[cfg(not(feature = "duckdb-backend"))]
fn open_duckdb(_path: &Path) -> Result<Box<CsvDirectoryBackend>, CliError> {
    Err(CliError::InvalidArgument(
        "duckdb endpoints require the duckdb-backend feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_must_be_ascii() {
        assert_eq!(delimiter_byte(';').unwrap(), b';');
        assert!(delimiter_byte('§').is_err());
    }
}
