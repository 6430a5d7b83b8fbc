//! # Value Subcommand
//!
//! Values a shipment file and prints the result as JSON (default) or as a
//! readable report.
//!
//! Exit codes: 0 when every item was valued, 2 when at least one item was
//! rejected (the rest are still valued and printed). Terms-level errors
//! such as an unknown Incoterm propagate as `Err` and exit 1.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use clearance_valuation::{value_shipment, ShipmentValuation};

use crate::{read_shipment, Engine, OutputFormat};

/// Arguments for the `clearance value` subcommand.
#[derive(Args, Debug)]
pub struct ValueArgs {
    /// Shipment file (JSON, or YAML with a .yaml/.yml extension).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

/// Execute the value subcommand, printing to stdout.
pub fn run_value(args: &ValueArgs, engine: &Engine) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_value_to(args, engine, &mut out)
}

/// Execute the value subcommand, writing to `out`.
pub fn run_value_to(args: &ValueArgs, engine: &Engine, out: &mut impl Write) -> Result<u8> {
    let request = read_shipment(&args.file)?;
    let valuation = value_shipment(&request, &engine.config, &engine.tariffs)
        .with_context(|| format!("cannot value {}", args.file.display()))?;

    tracing::info!(
        items = valuation.items.len(),
        failures = valuation.failures.len(),
        digest = %valuation.digest,
        "shipment valued"
    );

    match args.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &valuation)
                .context("failed to write valuation")?;
            writeln!(out)?;
        }
        OutputFormat::Text => write_report(&valuation, out)?,
    }

    Ok(if valuation.is_complete() { 0 } else { 2 })
}

fn write_report(v: &ShipmentValuation, out: &mut impl Write) -> Result<()> {
    let s = &v.summary;
    writeln!(
        out,
        "Incoterm {} ({})  clearance type {}",
        v.terms.incoterm,
        v.terms.incoterm.formula(),
        s.clearance_type
    )?;
    if v.insurance_estimated {
        writeln!(out, "Insurance estimated: {}", s.total_insurance)?;
    }
    writeln!(out)?;

    for item in &v.items {
        writeln!(
            out,
            "{:<12} value {:>12}  customs {:>12}  duty {:>10}  vat {:>10}  other {:>10}  \
             tax {:>10}",
            item.line_id,
            item.invoice_value,
            item.customs_value,
            item.tax.duty_amount,
            item.tax.vat_amount,
            item.tax.other_tax_amount,
            item.tax.total_tax,
        )?;
        for warning in &item.warnings {
            writeln!(out, "  WARN: {warning}")?;
        }
    }
    for failure in &v.failures {
        writeln!(
            out,
            "{:<12} FAIL [{}] {}",
            failure.line_id, failure.code, failure.message
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Items:              {}", s.item_count)?;
    writeln!(out, "Total value:        {}", s.total_value)?;
    writeln!(out, "Customs value:      {}", s.total_customs_value)?;
    writeln!(out, "Duty:               {}", s.total_duty)?;
    writeln!(out, "VAT:                {}", s.total_vat)?;
    writeln!(out, "Other taxes:        {}", s.total_other_tax)?;
    writeln!(out, "Total tax:          {}", s.total_tax)?;
    writeln!(out, "Payable VAT:        {}", s.payable_vat)?;
    writeln!(out, "Deferred VAT:       {}", s.deferred_vat)?;
    writeln!(out, "Payable total:      {}", s.payable_total)?;
    writeln!(out, "Prepaid applied:    {}", s.prepaid_duties_applied)?;
    writeln!(out, "Payable after:      {}", s.payable_after_prepaid)?;
    if !v.needs_review.is_empty() {
        writeln!(out, "Needs review:       {}", v.needs_review.join(", "))?;
    }
    writeln!(out, "Digest:             {}", v.digest)?;
    Ok(())
}
