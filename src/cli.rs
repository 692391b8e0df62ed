//! CLI argument parsing for Sourpea

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for balance reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "sourpea")]
#[command(version)]
#[command(about = "Counterbalancing validation for factorial experiment designs", long_about = None)]
pub struct Cli {
    /// Design file (TOML) declaring factors, levels and the block
    #[arg(short, long, value_name = "FILE")]
    pub design: PathBuf,

    /// Trial sequence (JSON array of factor -> level objects)
    #[arg(short, long, value_name = "FILE")]
    pub sequence: PathBuf,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Override the design file's significance level
    #[arg(short = 'a', long = "alpha", value_name = "ALPHA")]
    pub alpha: Option<f64>,

    /// Fail on trials that do not fit the design instead of skipping them
    #[arg(long)]
    pub strict: bool,

    /// Exit with status 1 if the sequence is unbalanced or a derivation fails
    #[arg(long = "fail-on-imbalance")]
    pub fail_on_imbalance: bool,

    /// Enable debug tracing on stderr
    #[arg(long)]
    pub debug: bool,
}
