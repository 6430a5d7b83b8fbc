//! # Customs Value
//!
//! Turns an item's invoice value into its dutiable value using the
//! Incoterm's [`clearance_core::ValuationRule`]:
//!
//! ```text
//! CIF, CIP        V
//! CFR, CPT        V + I
//! FOB, FCA, FAS   V + F + I
//! EXW             V + FE + F + I
//! DAP, DDU        V - FI
//! DPU             V - FI - U
//! DDP             (V - FI) / ((1 + d) * (1 + v))
//! ```

use clearance_core::Money;
use rust_decimal::Decimal;

use crate::config::{RateSource, ValuationConfig};
use crate::model::{
    CostAllocation, CustomsValue, LineItem, RateKind, TariffRates, TradeTerms, ValuationWarning,
};

/// Compute the customs value of one item given its cost shares.
///
/// Never fails: a negative result is clamped to zero with a
/// [`ValuationWarning::NegativeCustomsValueClamped`].
pub fn compute_customs_value(
    terms: &TradeTerms,
    item: &LineItem,
    allocation: &CostAllocation,
    config: &ValuationConfig,
) -> CustomsValue {
    let rule = terms.incoterm.rule();
    let mut warnings = Vec::new();

    let mut value = item.invoice_value;
    if rule.adds_export_freight {
        value += allocation.export_freight;
    }
    if rule.adds_freight {
        value += allocation.international_freight;
    }
    if rule.adds_insurance {
        value += allocation.insurance;
    }
    if rule.subtracts_import_freight {
        value = value - allocation.import_freight;
    }
    if rule.subtracts_unloading {
        value = value - allocation.unloading;
    }
    if rule.reverses_embedded_taxes {
        let rates = ddp_rates(item, config, &mut warnings);
        let duty = rates.rate_or_zero(RateKind::Duty).as_fraction();
        let vat = rates.rate_or_zero(RateKind::Vat).as_fraction();
        let divisor = (Decimal::ONE + duty) * (Decimal::ONE + vat);
        value = Money::new(value.amount() / divisor);
    }

    let rounded = value.round_to(config.money_scale);
    let customs_value = if rounded.is_negative() {
        tracing::warn!(
            line_id = %item.line_id,
            incoterm = %terms.incoterm,
            unclamped = %rounded,
            "customs value negative, clamped to zero"
        );
        warnings.push(ValuationWarning::NegativeCustomsValueClamped { unclamped: rounded });
        Money::ZERO
    } else {
        rounded
    };

    CustomsValue {
        customs_value,
        warnings,
    }
}

fn ddp_rates(
    item: &LineItem,
    config: &ValuationConfig,
    warnings: &mut Vec<ValuationWarning>,
) -> TariffRates {
    match (config.ddp_rate_source, &item.declared_rates) {
        (RateSource::Applied, _) => item.rates,
        (RateSource::Declared, Some(declared)) => *declared,
        (RateSource::Declared, None) => {
            warnings.push(ValuationWarning::DeclaredRatesUnavailable);
            item.rates
        }
    }
}
