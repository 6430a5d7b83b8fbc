//! # Shipment Pipeline
//!
//! The batch entry point the CLI and HTTP service call:
//!
//! ```text
//! ShipmentRequest
//!   → parse terms            (fatal on error)
//!   → parse items            (failures collected per item)
//!   → resolve rates          (tariff lookup fills gaps)
//!   → allocate_shipment_costs
//!   → compute_customs_value + compute_line_item_tax, per item
//!   → aggregate_shipment + prepaid duties
//!   → digest over {terms, items, summary}
//! ```
//!
//! Everything here is a pure function of its inputs; repeating a call
//! yields an identical [`ShipmentValuation`], digest included.

use clearance_core::{sha256_digest, CanonicalBytes};
use serde::Serialize;

use crate::allocation::allocate_shipment_costs;
use crate::config::ValuationConfig;
use crate::customs::compute_customs_value;
use crate::error::ValuationError;
use crate::input::ShipmentRequest;
use crate::model::{
    ItemFailure, LineItem, RateKind, ShipmentSummary, ShipmentValuation, TradeTerms,
    ValuationWarning, ValuedLineItem,
};
use crate::summary::aggregate_shipment;
use crate::tariff::TariffLookup;
use crate::tax::compute_line_item_tax;

/// Rates whose absence is worth flagging. Anti-dumping and countervailing
/// duties are absent for most goods.
const WARN_WHEN_MISSING: [RateKind; 2] = [RateKind::Duty, RateKind::Vat];

/// Parse and value a raw shipment.
///
/// Returns `Err` only for terms-level problems (unknown Incoterm, malformed
/// shipment cost). Item-level problems are reported in
/// [`ShipmentValuation::failures`].
pub fn value_shipment<L: TariffLookup + ?Sized>(
    request: &ShipmentRequest,
    config: &ValuationConfig,
    lookup: &L,
) -> Result<ShipmentValuation, ValuationError> {
    let terms = request.terms.parse()?;

    let mut items = Vec::with_capacity(request.items.len());
    let mut failures = Vec::new();
    for (index, raw) in request.items.iter().enumerate() {
        match raw.parse(index) {
            Ok(item) => items.push((index, item)),
            Err(err) => {
                let line_id = raw.line_id_or_position(index);
                tracing::warn!(%line_id, index, error = %err, "line item rejected");
                failures.push(ItemFailure::new(index, line_id, &err));
            }
        }
    }

    value_indexed(terms, items, failures, config, lookup)
}

/// Value already-typed line items.
///
/// Items are validated first; invalid ones become failures.
pub fn value_line_items<L: TariffLookup + ?Sized>(
    terms: TradeTerms,
    items: Vec<LineItem>,
    config: &ValuationConfig,
    lookup: &L,
) -> Result<ShipmentValuation, ValuationError> {
    terms.validate()?;
    let mut valid = Vec::with_capacity(items.len());
    let mut failures = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        match item.validate() {
            Ok(()) => valid.push((index, item)),
            Err(err) => {
                tracing::warn!(line_id = %item.line_id, index, error = %err, "line item rejected");
                failures.push(ItemFailure::new(index, item.line_id.clone(), &err));
            }
        }
    }
    value_indexed(terms, valid, failures, config, lookup)
}

#[derive(Serialize)]
struct DigestView<'a> {
    terms: &'a TradeTerms,
    items: &'a [ValuedLineItem],
    summary: &'a ShipmentSummary,
}

fn value_indexed<L: TariffLookup + ?Sized>(
    terms: TradeTerms,
    items: Vec<(usize, LineItem)>,
    failures: Vec<ItemFailure>,
    config: &ValuationConfig,
    lookup: &L,
) -> Result<ShipmentValuation, ValuationError> {
    tracing::debug!(
        incoterm = %terms.incoterm,
        items = items.len(),
        rejected = failures.len(),
        "valuing shipment"
    );

    let resolved: Vec<(usize, LineItem, Vec<ValuationWarning>)> = items
        .into_iter()
        .map(|(index, item)| {
            let (item, warnings) = resolve_rates(item, lookup);
            (index, item, warnings)
        })
        .collect();

    // Two phases: shipment-wide sums are reduced before any item is valued.
    let line_items: Vec<LineItem> = resolved.iter().map(|(_, item, _)| item.clone()).collect();
    let allocations = allocate_shipment_costs(&terms, &line_items, config);

    let mut valued = Vec::with_capacity(resolved.len());
    let mut flagged = Vec::new();
    let shares = allocations.shares.iter();
    for ((index, item, mut warnings), share) in resolved.into_iter().zip(shares) {
        let customs = compute_customs_value(&terms, &item, share, config);
        warnings.extend(customs.warnings);
        let tax = compute_line_item_tax(customs.customs_value, &item.rates, config);
        if !warnings.is_empty() {
            flagged.push((index, item.line_id.clone()));
        }
        valued.push(ValuedLineItem {
            line_id: item.line_id,
            invoice_value: item.invoice_value,
            allocation: *share,
            customs_value: customs.customs_value,
            rates: item.rates,
            tax,
            warnings,
        });
    }

    let prepaid = terms.prepaid_duties.map(|p| p.round_to(config.money_scale));
    let summary = aggregate_shipment(&valued, terms.clearance_type)
        .with_prepaid_duties(prepaid)
        .at_scale(config.money_scale);

    flagged.extend(failures.iter().map(|f| (f.index, f.line_id.clone())));
    flagged.sort_by_key(|(index, _)| *index);
    let needs_review = flagged.into_iter().map(|(_, line_id)| line_id).collect();

    let canonical = CanonicalBytes::new(&DigestView {
        terms: &terms,
        items: &valued,
        summary: &summary,
    })?;
    let digest = sha256_digest(&canonical);

    tracing::debug!(
        %digest,
        payable_total = %summary.payable_total,
        total_tax = %summary.total_tax,
        "shipment valued"
    );

    Ok(ShipmentValuation {
        terms,
        items: valued,
        failures,
        summary,
        insurance_estimated: allocations.insurance_estimated,
        needs_review,
        digest,
    })
}

/// Attach the tariff lookup's record as `declared_rates` (unless the caller
/// supplied one), fill unset applied rates from it, and warn for duty/VAT
/// still missing.
fn resolve_rates<L: TariffLookup + ?Sized>(
    mut item: LineItem,
    lookup: &L,
) -> (LineItem, Vec<ValuationWarning>) {
    if item.declared_rates.is_none() {
        if let Some(hs_code) = &item.hs_code {
            item.declared_rates = lookup.lookup(hs_code, item.origin_country.as_ref());
        }
    }
    if let Some(declared) = &item.declared_rates {
        item.rates = item.rates.or(declared);
    }

    let warnings = WARN_WHEN_MISSING
        .iter()
        .filter(|kind| item.rates.get(**kind).is_none())
        .map(|kind| ValuationWarning::MissingRateDefaultedToZero { rate: *kind })
        .collect();
    (item, warnings)
}
