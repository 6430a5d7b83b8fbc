//! # Customs-Value Subcommand
//!
//! Values a single line item from flags, as if it were the whole shipment,
//! and prints its customs value and line tax.

use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::Args;
use clearance_valuation::{
    value_line_items, RawAmount, RawLineItem, RawRates, RawTradeTerms, ValuedLineItem,
};
use serde::Serialize;

use crate::{Engine, OutputFormat};

/// Arguments for the `clearance customs-value` subcommand.
///
/// Amounts and rates are decimal strings; rates are percentages (19 = 19%).
#[derive(Args, Debug, Default)]
pub struct CustomsValueArgs {
    /// Incoterm (EXW, FCA, FAS, FOB, CFR, CIF, CPT, CIP, DAP, DPU, DDP, DDU).
    #[arg(long)]
    pub incoterm: String,

    /// Invoice value of the item.
    #[arg(long, value_name = "AMOUNT")]
    pub invoice_value: String,

    /// International freight.
    #[arg(long, value_name = "AMOUNT")]
    pub freight: Option<String>,

    /// Insurance cost. Estimated from the invoice value when the term needs it
    /// and it is omitted.
    #[arg(long, value_name = "AMOUNT")]
    pub insurance: Option<String>,

    /// Domestic freight in the export country.
    #[arg(long, value_name = "AMOUNT")]
    pub export_freight: Option<String>,

    /// Domestic freight in the import country.
    #[arg(long, value_name = "AMOUNT")]
    pub import_freight: Option<String>,

    /// Unloading cost at destination.
    #[arg(long, value_name = "AMOUNT")]
    pub unloading: Option<String>,

    /// Duty rate in percent.
    #[arg(long, value_name = "PERCENT")]
    pub duty_rate: Option<String>,

    /// VAT rate in percent.
    #[arg(long, value_name = "PERCENT")]
    pub vat_rate: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct CustomsValueReport<'a> {
    incoterm: &'static str,
    formula: &'static str,
    insurance_estimated: bool,
    #[serde(flatten)]
    item: &'a ValuedLineItem,
}

fn amount(raw: &Option<String>) -> Option<RawAmount> {
    raw.as_deref().map(RawAmount::from)
}

impl CustomsValueArgs {
    fn to_raw(&self) -> (RawTradeTerms, RawLineItem) {
        let terms = RawTradeTerms {
            incoterm: self.incoterm.clone(),
            international_freight: amount(&self.freight),
            insurance_cost: amount(&self.insurance),
            domestic_freight_export: amount(&self.export_freight),
            domestic_freight_import: amount(&self.import_freight),
            unloading_cost: amount(&self.unloading),
            ..RawTradeTerms::default()
        };
        let item = RawLineItem {
            line_id: Some("item".to_string()),
            invoice_value: Some(RawAmount::from(self.invoice_value.as_str())),
            rates: Some(RawRates {
                duty: amount(&self.duty_rate),
                vat: amount(&self.vat_rate),
                ..RawRates::default()
            }),
            ..RawLineItem::default()
        };
        (terms, item)
    }
}

/// Execute the customs-value subcommand, printing to stdout.
pub fn run_customs_value(args: &CustomsValueArgs, engine: &Engine) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_customs_value_to(args, engine, &mut out)
}

/// Execute the customs-value subcommand, writing to `out`.
pub fn run_customs_value_to(
    args: &CustomsValueArgs,
    engine: &Engine,
    out: &mut impl Write,
) -> Result<u8> {
    let (raw_terms, raw_item) = args.to_raw();
    let terms = raw_terms.parse().context("invalid trade terms")?;
    let item = raw_item.parse(0).context("invalid line item")?;
    let incoterm = terms.incoterm;

    let valuation = value_line_items(terms, vec![item], &engine.config, &engine.tariffs)
        .context("valuation failed")?;
    let Some(valued) = valuation.items.first() else {
        match valuation.failures.first() {
            Some(failure) => bail!("line item rejected: {}", failure.message),
            None => bail!("valuation produced no item"),
        }
    };

    match args.format {
        OutputFormat::Json => {
            let report = CustomsValueReport {
                incoterm: incoterm.as_str(),
                formula: incoterm.formula(),
                insurance_estimated: valuation.insurance_estimated,
                item: valued,
            };
            serde_json::to_writer_pretty(&mut *out, &report).context("failed to write report")?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            writeln!(out, "Incoterm:      {} ({})", incoterm, incoterm.formula())?;
            writeln!(out, "Invoice value: {}", valued.invoice_value)?;
            if valuation.insurance_estimated {
                writeln!(out, "Insurance:     {} (estimated)", valued.allocation.insurance)?;
            }
            writeln!(out, "Customs value: {}", valued.customs_value)?;
            writeln!(out, "Duty:          {}", valued.tax.duty_amount)?;
            writeln!(out, "VAT:           {}", valued.tax.vat_amount)?;
            writeln!(out, "Total tax:     {}", valued.tax.total_tax)?;
            for warning in &valued.warnings {
                writeln!(out, "WARN: {warning}")?;
            }
        }
    }
    Ok(0)
}
