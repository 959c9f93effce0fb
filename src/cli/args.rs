//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Top-level CLI parser for the `convconf` binary
#[derive(Debug, Parser)]
#[command(name = "convconf", version, about = "Declarative data conversion through canonical records")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check an LM against a canonical schema
    CheckLm {
        /// Canonical schema document (.json, .yaml)
        #[arg(long)]
        km: PathBuf,
        #[arg(long)]
        lm: PathBuf,
    },
    /// Write the conversion plan for a source and target LM
    Plan {
        #[command(flatten)]
        models: ModelArgs,
        /// Output file for the plan JSON
        #[arg(long)]
        out: PathBuf,
    },
    /// Convert data from a source backend to a target backend
    Convert(ConvertArgs),
}

#[derive(Debug, Args)]
pub struct ModelArgs {
    /// Canonical schema document (.json, .yaml)
    #[arg(long)]
    pub km: PathBuf,
    #[arg(long)]
    pub source_lm: PathBuf,
    #[arg(long)]
    pub target_lm: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EndpointType {
    /// Directory of `<object>.csv` files
    Csv,
    /// DuckDB database file
    Duckdb,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub models: ModelArgs,

    #[arg(long, value_enum, default_value = "csv")]
    pub source_type: EndpointType,
    #[arg(long, value_enum, default_value = "csv")]
    pub target_type: EndpointType,

    /// Source directory (csv) or database file (duckdb)
    #[arg(long)]
    pub source: PathBuf,
    /// Target directory (csv) or database file (duckdb)
    #[arg(long)]
    pub target: PathBuf,

    /// Field delimiter for csv endpoints
    #[arg(long, default_value = ",")]
    pub delimiter: char,

    /// Write trace events, one line each
    #[arg(long)]
    pub trace_out: Option<PathBuf>,

    /// Skip source data and result validation
    #[arg(long)]
    pub no_validate: bool,

    /// TOML file with conversion options
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert() {
        let cli = Cli::parse_from([
            "convconf",
            "convert",
            "--km",
            "km.json",
            "--source-lm",
            "src.lm",
            "--target-lm",
            "tgt.lm",
            "--source",
            "in",
            "--target",
            "out.duckdb",
            "--target-type",
            "duckdb",
            "--no-validate",
        ]);
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.source_type, EndpointType::Csv);
        assert_eq!(args.target_type, EndpointType::Duckdb);
        assert!(args.no_validate);
        assert_eq!(args.delimiter, ',');
    }
}
