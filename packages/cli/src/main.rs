#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for NYPD shooting incident trend analysis.
//!
//! Uses `indicatif-log-bridge` (via [`shooting_trends_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the row spinner never fight for the terminal.

mod pipeline;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shooting_trends_incident_models::Borough;
use shooting_trends_report::OutputFormat;
use shooting_trends_source::registry::{DEFAULT_DATASET_ID, all_datasets};
use shooting_trends_source_models::DateErrorPolicy;

use crate::pipeline::{RunArgs, parse_comparison, parse_date_policy, parse_format};

#[derive(Parser)]
#[command(
    name = "shooting_trends",
    about = "Trend analysis of NYPD shooting incident data"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the embedded dataset definitions
    Datasets,
    /// Download, clean and analyze a dataset, then render the report
    Run {
        /// Dataset ID to analyze (see `datasets`)
        #[arg(long, default_value = DEFAULT_DATASET_ID)]
        dataset: String,
        /// Read this local CSV instead of downloading the dataset
        #[arg(long)]
        input: Option<PathBuf>,
        /// Directory the report files are written to
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
        /// Maximum number of CSV rows to read (for testing)
        #[arg(long)]
        limit: Option<u64>,
        /// What to do with an unparseable occurrence date: `fatal` or `skip`
        #[arg(long, value_parser = parse_date_policy)]
        on_date_error: Option<DateErrorPolicy>,
        /// Borough pair `X:Y` regressing Y's yearly change on X's (repeatable)
        #[arg(long, value_parser = parse_comparison)]
        compare: Vec<(Borough, Borough)>,
        /// Comma-separated output formats: md, csv, json, svg
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "md,csv,json,svg",
            value_parser = parse_format
        )]
        format: Vec<OutputFormat>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = shooting_trends_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Datasets => {
            let datasets = all_datasets();
            println!("{:<28} NAME", "ID");
            println!("{}", "-".repeat(70));
            for dataset in &datasets {
                println!("{:<28} {}", dataset.id(), dataset.name());
            }
        }
        Commands::Run {
            dataset,
            input,
            output_dir,
            limit,
            on_date_error,
            compare,
            format,
        } => {
            let args = RunArgs {
                dataset,
                input,
                output_dir,
                limit,
                on_date_error,
                comparisons: compare,
                formats: format,
            };
            let files = pipeline::run(&multi, args).await?;
            for file in &files {
                println!("{}", file.display());
            }
        }
    }

    Ok(())
}
