//! Shipment aggregation and the payable/deferred VAT split.

use clearance_core::{ClearanceType, Money};

use crate::model::{ShipmentSummary, ValuedLineItem};

/// Sum valued items into shipment totals.
///
/// Under "42" VAT is deferred: it counts toward `total_tax` (the liability)
/// but not toward `payable_total`. An empty slice yields an all-zero
/// summary.
pub fn aggregate_shipment(
    items: &[ValuedLineItem],
    clearance_type: ClearanceType,
) -> ShipmentSummary {
    let mut summary = ShipmentSummary {
        clearance_type,
        item_count: items.len(),
        ..ShipmentSummary::default()
    };

    for item in items {
        summary.total_value += item.invoice_value;
        summary.total_freight += item.allocation.international_freight;
        summary.total_insurance += item.allocation.insurance;
        summary.total_customs_value += item.customs_value;
        summary.total_duty += item.tax.duty_amount;
        summary.total_vat += item.tax.vat_amount;
        summary.total_other_tax += item.tax.other_tax_amount;
    }

    summary.total_tax = summary.total_duty + summary.total_vat + summary.total_other_tax;
    if clearance_type.is_vat_deferred() {
        summary.payable_vat = Money::ZERO;
        summary.deferred_vat = summary.total_vat;
    } else {
        summary.payable_vat = summary.total_vat;
        summary.deferred_vat = Money::ZERO;
    }
    summary.payable_total = summary.total_duty + summary.total_other_tax + summary.payable_vat;
    summary.payable_after_prepaid = summary.payable_total;
    summary
}

impl ShipmentSummary {
    /// Apply duties already paid against the amount payable now.
    ///
    /// The applied amount never exceeds `payable_total`, so
    /// `payable_after_prepaid` is floored at zero. Liability totals are
    /// untouched.
    pub fn with_prepaid_duties(mut self, prepaid: Option<Money>) -> Self {
        let prepaid = prepaid.unwrap_or(Money::ZERO).floor_at_zero();
        self.prepaid_duties_applied = prepaid.min(self.payable_total);
        self.payable_after_prepaid = (self.payable_total - prepaid).floor_at_zero();
        self
    }

    /// Render every amount at `scale` decimal places, so an empty shipment
    /// reads `"0.00"` like any other.
    pub fn at_scale(mut self, scale: u32) -> Self {
        for amount in [
            &mut self.total_value,
            &mut self.total_freight,
            &mut self.total_insurance,
            &mut self.total_customs_value,
            &mut self.total_duty,
            &mut self.total_vat,
            &mut self.total_other_tax,
            &mut self.total_tax,
            &mut self.payable_vat,
            &mut self.deferred_vat,
            &mut self.payable_total,
            &mut self.prepaid_duties_applied,
            &mut self.payable_after_prepaid,
        ] {
            *amount = amount.round_to(scale);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CostAllocation, LineItemTax, TariffRates};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn valued(
        id: &str,
        cv: Decimal,
        duty: Decimal,
        vat: Decimal,
        other: Decimal,
    ) -> ValuedLineItem {
        ValuedLineItem {
            line_id: id.into(),
            invoice_value: Money::new(cv),
            allocation: CostAllocation::default(),
            customs_value: Money::new(cv),
            rates: TariffRates::default(),
            tax: LineItemTax {
                duty_amount: Money::new(duty),
                vat_amount: Money::new(vat),
                other_tax_amount: Money::new(other),
                total_tax: Money::new(duty + vat + other),
            },
            warnings: vec![],
        }
    }

    #[test]
    fn deferred_vat_literal() {
        let items = [valued("a", dec!(1000), dec!(100), dec!(209), dec!(0))];
        let s = aggregate_shipment(&items, ClearanceType::DeferredVat);
        assert_eq!(s.payable_vat, Money::ZERO);
        assert_eq!(s.deferred_vat, Money::new(dec!(209)));
        assert_eq!(s.payable_total, Money::new(dec!(100)));
        assert_eq!(s.total_tax, Money::new(dec!(309)));
    }

    #[test]
    fn standard_clearance_pays_vat_now() {
        let items = [valued("a", dec!(1000), dec!(100), dec!(209), dec!(0))];
        let s = aggregate_shipment(&items, ClearanceType::Standard);
        assert_eq!(s.payable_vat, Money::new(dec!(209)));
        assert_eq!(s.deferred_vat, Money::ZERO);
        assert_eq!(s.payable_total, Money::new(dec!(309)));
    }

    #[test]
    fn empty_is_all_zero() {
        let s = aggregate_shipment(&[], ClearanceType::Standard);
        assert_eq!(s, ShipmentSummary::default());
        assert_eq!(s.item_count, 0);
    }

    #[test]
    fn empty_summary_renders_at_money_scale() {
        let s = aggregate_shipment(&[], ClearanceType::DeferredVat).at_scale(2);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["total_tax"], "0.00");
        assert_eq!(json["payable_vat"], "0.00");
        assert_eq!(json["payable_after_prepaid"], "0.00");
    }

    #[test]
    fn at_scale_keeps_values() {
        let items = [valued("a", dec!(1000), dec!(100), dec!(209), dec!(0))];
        let s = aggregate_shipment(&items, ClearanceType::DeferredVat).at_scale(2);
        assert_eq!(s.total_tax, Money::new(dec!(309)));
        assert_eq!(s.payable_vat.to_string(), "0.00");
        assert_eq!(s.deferred_vat.to_string(), "209.00");
    }

    #[test]
    fn sums_across_items() {
        let items = [
            valued("a", dec!(500), dec!(50), dec!(104.5), dec!(10)),
            valued("b", dec!(250.25), dec!(12.51), dec!(0), dec!(0)),
        ];
        let s = aggregate_shipment(&items, ClearanceType::Standard);
        assert_eq!(s.item_count, 2);
        assert_eq!(s.total_customs_value, Money::new(dec!(750.25)));
        assert_eq!(s.total_duty, Money::new(dec!(62.51)));
        assert_eq!(s.total_other_tax, Money::new(dec!(10)));
        assert_eq!(s.total_tax, Money::new(dec!(177.01)));
    }

    #[test]
    fn idempotent() {
        let items = [valued("a", dec!(1000), dec!(100), dec!(209), dec!(0))];
        assert_eq!(
            aggregate_shipment(&items, ClearanceType::DeferredVat),
            aggregate_shipment(&items, ClearanceType::DeferredVat)
        );
    }

    #[test]
    fn prepaid_duties_reduce_payable_only() {
        let items = [valued("a", dec!(1000), dec!(100), dec!(209), dec!(0))];
        let s = aggregate_shipment(&items, ClearanceType::DeferredVat)
            .with_prepaid_duties(Some(Money::new(dec!(40))));
        assert_eq!(s.prepaid_duties_applied, Money::new(dec!(40)));
        assert_eq!(s.payable_after_prepaid, Money::new(dec!(60)));
        assert_eq!(s.payable_total, Money::new(dec!(100)));
        assert_eq!(s.total_tax, Money::new(dec!(309)));
    }

    #[test]
    fn prepaid_duties_floor_at_zero() {
        let items = [valued("a", dec!(1000), dec!(100), dec!(0), dec!(0))];
        let s = aggregate_shipment(&items, ClearanceType::Standard)
            .with_prepaid_duties(Some(Money::new(dec!(250))));
        assert_eq!(s.prepaid_duties_applied, Money::new(dec!(100)));
        assert_eq!(s.payable_after_prepaid, Money::ZERO);
    }
}
