use clap::{Parser, Subcommand};
use tracing::error;

mod config;
mod error;
mod logging;
mod pipeline;
mod schema;
mod table;

use std::path::PathBuf;

use crate::config::Config;
use crate::pipeline::{CleanReport, Pipeline};

#[derive(Parser)]
#[command(name = "finsurvey_cleaner")]
#[command(about = "Financial services usage survey data cleaner")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate, rename and recode a raw survey export, then write the cleaned CSV
    Clean {
        /// Raw survey CSV (defaults to config.toml's data.input_path)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Destination for the cleaned CSV (defaults to config.toml's data.output_path)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate a raw survey export without writing anything
    Check {
        /// Raw survey CSV (defaults to config.toml's data.input_path)
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

/// CLI flags win; anything not given on the command line comes from
/// config.toml.
fn resolve_paths(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> error::Result<(PathBuf, PathBuf)> {
    if let (Some(input), Some(output)) = (&input, &output) {
        return Ok((input.clone(), output.clone()));
    }

    let config = Config::load()?;
    Ok((
        input.unwrap_or_else(|| PathBuf::from(&config.data.input_path)),
        output.unwrap_or_else(|| PathBuf::from(&config.data.output_path)),
    ))
}

fn resolve_input(input: Option<PathBuf>) -> error::Result<PathBuf> {
    match input {
        Some(input) => Ok(input),
        None => Ok(PathBuf::from(Config::load()?.data.input_path)),
    }
}

fn print_summary(report: &CleanReport) {
    println!("\n📊 Cleaning Results:");
    println!("   Rows: {}", report.rows);
    println!("   Columns: {}", report.columns);
    println!("   Repaired cells: {}", report.repaired_cells);
    println!("   Gate-flagged rows: {}", report.gate_flagged_rows);
    if let Some(output_file) = &report.output_file {
        println!("   Output file: {}", output_file);
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();
    let pipeline = Pipeline::new()?;

    match cli.command {
        Commands::Clean { input, output } => {
            let (input, output) = resolve_paths(input, output)?;

            match pipeline.run(&input, &output) {
                Ok(report) => {
                    print_summary(&report);
                    println!("✅ Cleaning run completed successfully");
                }
                Err(e) => {
                    error!("Cleaning run failed: {}", e);
                    println!("❌ Cleaning run failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Check { input } => {
            let input = resolve_input(input)?;

            match pipeline.check(&input) {
                Ok(report) => {
                    print_summary(&report);
                    if report.repaired_cells == 0 && report.gate_flagged_rows == 0 {
                        println!("✅ Export is clean");
                    } else {
                        println!(
                            "⚠️  Export needs cleaning ({} repairs, {} gate-flagged rows)",
                            report.repaired_cells, report.gate_flagged_rows
                        );
                    }
                }
                Err(e) => {
                    error!("Check failed: {}", e);
                    println!("❌ Check failed: {}", e);
                    return Err(e.into());
                }
            }
        }
    }
    Ok(())
}
