//! # Line Tax
//!
//! Duty and other taxes are levied on the customs value; VAT is levied on
//! the customs value *plus* those taxes. Each layer is rounded before it
//! feeds the next, matching how the amounts appear on the declaration.

use clearance_core::Money;

use crate::config::ValuationConfig;
use crate::model::{LineItemTax, RateKind, TariffRates};

/// Layer duty, anti-dumping/countervailing and VAT onto a customs value.
///
/// Absent rates compute as zero; this never fails.
pub fn compute_line_item_tax(
    customs_value: Money,
    rates: &TariffRates,
    config: &ValuationConfig,
) -> LineItemTax {
    let scale = config.money_scale;

    let duty_amount = rates.rate_or_zero(RateKind::Duty).of(customs_value).round_to(scale);
    let other_rate =
        rates.rate_or_zero(RateKind::AntiDumping) + rates.rate_or_zero(RateKind::Countervailing);
    let other_tax_amount = other_rate.of(customs_value).round_to(scale);

    let vat_base = customs_value + duty_amount + other_tax_amount;
    let vat_amount = rates.rate_or_zero(RateKind::Vat).of(vat_base).round_to(scale);

    LineItemTax {
        duty_amount,
        vat_amount,
        other_tax_amount,
        total_tax: duty_amount + vat_amount + other_tax_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clearance_core::Percent;
    use rust_decimal_macros::dec;

    fn tax_of(customs_value: Money, rates: &TariffRates) -> LineItemTax {
        compute_line_item_tax(customs_value, rates, &ValuationConfig::default())
    }

    fn rates(duty: &str, vat: &str) -> TariffRates {
        TariffRates::default()
            .with_duty(Percent::parse("duty", duty).unwrap())
            .with_vat(Percent::parse("vat", vat).unwrap())
    }

    #[test]
    fn cascade_literal() {
        let tax = tax_of(Money::new(dec!(1000)), &rates("10", "19"));
        assert_eq!(tax.duty_amount, Money::new(dec!(100)));
        assert_eq!(tax.vat_amount, Money::new(dec!(209)));
        assert_eq!(tax.other_tax_amount, Money::ZERO);
        assert_eq!(tax.total_tax, Money::new(dec!(309)));
    }

    #[test]
    fn other_taxes_enter_vat_base() {
        let r = rates("10", "20")
            .with_anti_dumping(Percent::new(dec!(15)))
            .with_countervailing(Percent::new(dec!(5)));
        let tax = tax_of(Money::new(dec!(1000)), &r);
        assert_eq!(tax.other_tax_amount, Money::new(dec!(200)));
        // (1000 + 100 + 200) * 20%
        assert_eq!(tax.vat_amount, Money::new(dec!(260)));
        assert_eq!(tax.total_tax, Money::new(dec!(560)));
    }

    #[test]
    fn absent_rates_are_zero() {
        let tax = tax_of(Money::new(dec!(1000)), &TariffRates::default());
        assert_eq!(tax, LineItemTax::default());
    }

    #[test]
    fn each_layer_rounded_before_next() {
        // duty 3.3% of 10.15 = 0.33495 -> 0.33; VAT on 10.48 at 19% = 1.9912 -> 1.99
        let tax = tax_of(Money::new(dec!(10.15)), &rates("3.3", "19"));
        assert_eq!(tax.duty_amount, Money::new(dec!(0.33)));
        assert_eq!(tax.vat_amount, Money::new(dec!(1.99)));
        assert_eq!(tax.total_tax, Money::new(dec!(2.32)));
    }

    #[test]
    fn zero_customs_value_taxes_zero() {
        let tax = tax_of(Money::ZERO, &rates("10", "19"));
        assert_eq!(tax.total_tax, Money::ZERO);
    }
}
