//! # Incoterms Subcommand
//!
//! Prints the rule table: each supported term, its customs value formula,
//! and the cost legs it reads.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use clearance_core::Incoterm;
use serde::Serialize;

use crate::OutputFormat;

/// Arguments for the `clearance incoterms` subcommand.
#[derive(Args, Debug, Default)]
pub struct IncotermsArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct RuleRow {
    code: &'static str,
    formula: &'static str,
    legs: Vec<&'static str>,
    requires_insurance: bool,
    reverses_embedded_taxes: bool,
}

fn rows() -> Vec<RuleRow> {
    Incoterm::all()
        .iter()
        .map(|term| {
            let rule = term.rule();
            RuleRow {
                code: term.as_str(),
                formula: term.formula(),
                legs: rule.legs().iter().map(|leg| leg.as_str()).collect(),
                requires_insurance: term.requires_insurance(),
                reverses_embedded_taxes: rule.reverses_embedded_taxes,
            }
        })
        .collect()
}

/// Execute the incoterms subcommand, printing to stdout.
pub fn run_incoterms(args: &IncotermsArgs) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_incoterms_to(args, &mut out)
}

/// Execute the incoterms subcommand, writing to `out`.
pub fn run_incoterms_to(args: &IncotermsArgs, out: &mut impl Write) -> Result<u8> {
    let rows = rows();
    match args.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &rows).context("failed to write rule table")?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            writeln!(out, "{:<5} {:<32} LEGS", "TERM", "CUSTOMS VALUE")?;
            for row in &rows {
                let mut legs = row.legs.join(", ");
                if row.legs.is_empty() {
                    legs.push('-');
                }
                writeln!(out, "{:<5} {:<32} {}", row.code, row.formula, legs)?;
            }
        }
    }
    Ok(0)
}
