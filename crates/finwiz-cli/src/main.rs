mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::fixed_income::{DurationArgs, ImmunizeArgs};
use commands::time_value::{AnnuityArgs, PerpetuityArgs};

/// Time-value-of-money and bond risk calculations
#[derive(Parser)]
#[command(
    name = "finwiz",
    version,
    about = "Time-value-of-money and bond risk calculations",
    long_about = "A CLI for closed-form financial calculations with decimal precision. \
                  Supports annuity payouts, present and future values, perpetuities, \
                  Macaulay/modified duration, convexity and two-asset immunization."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log debug detail to stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an annuity, lump sum or perpetuity request (JSON)
    Annuity(AnnuityArgs),
    /// Value a level perpetuity
    Perpetuity(PerpetuityArgs),
    /// Macaulay/modified duration and convexity of a cash-flow schedule
    Duration(DurationArgs),
    /// Two-asset immunization weights for a liability
    Immunize(ImmunizeArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Annuity(args) => commands::time_value::run_annuity(args),
        Commands::Perpetuity(args) => commands::time_value::run_perpetuity(args),
        Commands::Duration(args) => commands::fixed_income::run_duration(args),
        Commands::Immunize(args) => commands::fixed_income::run_immunize(args),
        Commands::Version => {
            println!("finwiz {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            debug!(format = ?cli.output, "rendering result");
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
