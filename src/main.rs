use anyhow::{Context, Result};
use clap::Parser;
use sourpea::balance::{BalanceReport, DataPolicy};
use sourpea::cli::{Cli, OutputFormat};
use sourpea::design_dsl::DesignFile;
use sourpea::sequence::load_sequence;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn print_report(report: &BalanceReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", report.to_report_string()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(report).context("Failed to serialize report")?
        ),
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let mut design = DesignFile::from_file(&args.design)?;

    // Command-line flags override the design file's [config] table
    if let Some(alpha) = args.alpha {
        design.config.significance_level = alpha;
    }
    if args.strict {
        design.config.data_policy = DataPolicy::Strict;
    }

    let block = design
        .build()
        .with_context(|| format!("Invalid design in {}", args.design.display()))?;
    let sequence = load_sequence(&args.sequence)?;

    let report = block
        .test(&sequence)
        .with_context(|| format!("Failed to test {}", args.sequence.display()))?;

    print_report(&report, args.format)?;

    if args.fail_on_imbalance && !report.passed() {
        std::process::exit(1);
    }

    Ok(())
}
