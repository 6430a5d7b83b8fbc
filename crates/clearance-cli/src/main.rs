//! # clearance CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use clearance_cli::customs::{run_customs_value, CustomsValueArgs};
use clearance_cli::incoterms::{run_incoterms, IncotermsArgs};
use clearance_cli::value::{run_value, ValueArgs};
use clearance_cli::Engine;

/// Customs valuation and import tax engine.
///
/// Computes the customs value of each line item under its Incoterm, layers
/// duty and VAT onto it, and totals the shipment with the deferred-VAT split.
#[derive(Parser, Debug)]
#[command(name = "clearance", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Valuation config YAML (insurance estimate rate, money scale, DDP rate source).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tariff table YAML used to fill rates by HS code.
    #[arg(long, global = true)]
    tariffs: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Value a shipment file.
    Value(ValueArgs),

    /// Compute the customs value and tax of a single item.
    CustomsValue(CustomsValueArgs),

    /// Print the supported Incoterms and their formulas.
    Incoterms(IncotermsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let load = || Engine::load(cli.config.as_deref(), cli.tariffs.as_deref());
    let result = match &cli.command {
        Commands::Value(args) => load().and_then(|engine| run_value(args, &engine)),
        Commands::CustomsValue(args) => load().and_then(|engine| run_customs_value(args, &engine)),
        Commands::Incoterms(args) => run_incoterms(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
