//! # Valuation Data Model
//!
//! Typed shipment inputs ([`TradeTerms`], [`LineItem`], [`TariffRates`]) and
//! the derived records the engine produces. Derived records are recomputed
//! from inputs on every call and are never read back as inputs.

use clearance_core::{
    AllocationMethod, ClearanceType, ContentDigest, CostLeg, CountryCode, HsCode, Incoterm, Money,
    Percent, Weight,
};
use serde::{Deserialize, Serialize};

use crate::error::ValuationError;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Shipment-level trade terms, applied uniformly to every line item.
///
/// Absent costs are `None`, which is not the same as zero: an absent
/// `insurance_cost` triggers insurance estimation for terms that need it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeTerms {
    pub incoterm: Incoterm,
    pub international_freight: Option<Money>,
    pub domestic_freight_export: Option<Money>,
    pub domestic_freight_import: Option<Money>,
    pub unloading_cost: Option<Money>,
    pub insurance_cost: Option<Money>,
    /// Duties already paid (for example by a forwarder). Reduces the amount
    /// payable now, never the customs value or the liability.
    pub prepaid_duties: Option<Money>,
    #[serde(default)]
    pub freight_allocation_method: AllocationMethod,
    #[serde(default)]
    pub clearance_type: ClearanceType,
}

impl TradeTerms {
    /// Terms with no declared costs, value-based allocation and standard
    /// clearance.
    pub fn new(incoterm: Incoterm) -> Self {
        Self {
            incoterm,
            international_freight: None,
            domestic_freight_export: None,
            domestic_freight_import: None,
            unloading_cost: None,
            insurance_cost: None,
            prepaid_duties: None,
            freight_allocation_method: AllocationMethod::ByValue,
            clearance_type: ClearanceType::Standard,
        }
    }

    pub fn with_international_freight(mut self, amount: Money) -> Self {
        self.international_freight = Some(amount);
        self
    }

    pub fn with_export_freight(mut self, amount: Money) -> Self {
        self.domestic_freight_export = Some(amount);
        self
    }

    pub fn with_import_freight(mut self, amount: Money) -> Self {
        self.domestic_freight_import = Some(amount);
        self
    }

    pub fn with_unloading_cost(mut self, amount: Money) -> Self {
        self.unloading_cost = Some(amount);
        self
    }

    pub fn with_insurance(mut self, amount: Money) -> Self {
        self.insurance_cost = Some(amount);
        self
    }

    pub fn with_prepaid_duties(mut self, amount: Money) -> Self {
        self.prepaid_duties = Some(amount);
        self
    }

    pub fn with_allocation_method(mut self, method: AllocationMethod) -> Self {
        self.freight_allocation_method = method;
        self
    }

    pub fn with_clearance_type(mut self, clearance_type: ClearanceType) -> Self {
        self.clearance_type = clearance_type;
        self
    }

    /// The declared shipment cost for a leg, if any.
    pub fn declared_cost(&self, leg: CostLeg) -> Option<Money> {
        match leg {
            CostLeg::InternationalFreight => self.international_freight,
            CostLeg::Insurance => self.insurance_cost,
            CostLeg::ExportFreight => self.domestic_freight_export,
            CostLeg::ImportFreight => self.domestic_freight_import,
            CostLeg::Unloading => self.unloading_cost,
        }
    }

    /// Reject negative or oversized costs.
    pub fn validate(&self) -> Result<(), ValuationError> {
        let costs = [
            ("international_freight", self.international_freight),
            ("domestic_freight_export", self.domestic_freight_export),
            ("domestic_freight_import", self.domestic_freight_import),
            ("unloading_cost", self.unloading_cost),
            ("insurance_cost", self.insurance_cost),
            ("prepaid_duties", self.prepaid_duties),
        ];
        for (field, cost) in costs {
            if let Some(cost) = cost {
                Money::bounded(field, cost.amount())?;
            }
        }
        Ok(())
    }
}

/// The four rates layered onto a customs value. Each is optional; an absent
/// rate computes as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffRates {
    #[serde(default)]
    pub duty: Option<Percent>,
    #[serde(default)]
    pub vat: Option<Percent>,
    #[serde(default)]
    pub anti_dumping: Option<Percent>,
    #[serde(default)]
    pub countervailing: Option<Percent>,
}

impl TariffRates {
    pub fn with_duty(mut self, rate: Percent) -> Self {
        self.duty = Some(rate);
        self
    }

    pub fn with_vat(mut self, rate: Percent) -> Self {
        self.vat = Some(rate);
        self
    }

    pub fn with_anti_dumping(mut self, rate: Percent) -> Self {
        self.anti_dumping = Some(rate);
        self
    }

    pub fn with_countervailing(mut self, rate: Percent) -> Self {
        self.countervailing = Some(rate);
        self
    }

    /// The rate for `kind`, if set.
    pub fn get(&self, kind: RateKind) -> Option<Percent> {
        match kind {
            RateKind::Duty => self.duty,
            RateKind::Vat => self.vat,
            RateKind::AntiDumping => self.anti_dumping,
            RateKind::Countervailing => self.countervailing,
        }
    }

    /// The rate for `kind`, zero when absent.
    pub fn rate_or_zero(&self, kind: RateKind) -> Percent {
        self.get(kind).unwrap_or(Percent::ZERO)
    }

    /// Fill every unset rate from `other`; set rates are kept.
    pub fn or(self, other: &TariffRates) -> TariffRates {
        TariffRates {
            duty: self.duty.or(other.duty),
            vat: self.vat.or(other.vat),
            anti_dumping: self.anti_dumping.or(other.anti_dumping),
            countervailing: self.countervailing.or(other.countervailing),
        }
    }

    /// Reject negative or oversized rates.
    pub fn validate(&self, prefix: &str) -> Result<(), ValuationError> {
        for kind in RateKind::all() {
            if let Some(rate) = self.get(*kind) {
                Percent::bounded(&format!("{prefix}.{kind}"), rate.value())?;
            }
        }
        Ok(())
    }
}

/// Which rate a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKind {
    Duty,
    Vat,
    AntiDumping,
    Countervailing,
}

impl RateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Duty => "duty",
            Self::Vat => "vat",
            Self::AntiDumping => "anti_dumping",
            Self::Countervailing => "countervailing",
        }
    }

    pub fn all() -> &'static [RateKind] {
        &[Self::Duty, Self::Vat, Self::AntiDumping, Self::Countervailing]
    }
}

impl std::fmt::Display for RateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cargo line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Caller's identifier, echoed in results, failures and review lists.
    pub line_id: String,
    /// Quantity × unit price.
    pub invoice_value: Money,
    #[serde(default)]
    pub gross_weight: Weight,
    #[serde(default)]
    pub net_weight: Weight,
    #[serde(default)]
    pub origin_country: Option<CountryCode>,
    #[serde(default)]
    pub hs_code: Option<HsCode>,
    /// Rates applied to this line.
    #[serde(default)]
    pub rates: TariffRates,
    /// Official rate record for the matched HS code.
    #[serde(default)]
    pub declared_rates: Option<TariffRates>,
}

impl LineItem {
    pub fn new(line_id: impl Into<String>, invoice_value: Money) -> Self {
        Self {
            line_id: line_id.into(),
            invoice_value,
            gross_weight: Weight::ZERO,
            net_weight: Weight::ZERO,
            origin_country: None,
            hs_code: None,
            rates: TariffRates::default(),
            declared_rates: None,
        }
    }

    pub fn with_gross_weight(mut self, weight: Weight) -> Self {
        self.gross_weight = weight;
        self
    }

    pub fn with_net_weight(mut self, weight: Weight) -> Self {
        self.net_weight = weight;
        self
    }

    pub fn with_origin(mut self, origin: CountryCode) -> Self {
        self.origin_country = Some(origin);
        self
    }

    pub fn with_hs_code(mut self, hs_code: HsCode) -> Self {
        self.hs_code = Some(hs_code);
        self
    }

    pub fn with_rates(mut self, rates: TariffRates) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_declared_rates(mut self, rates: TariffRates) -> Self {
        self.declared_rates = Some(rates);
        self
    }

    /// Reject negative or oversized values, weights and rates.
    pub fn validate(&self) -> Result<(), ValuationError> {
        Money::bounded("invoice_value", self.invoice_value.amount())?;
        Weight::bounded("gross_weight", self.gross_weight.value())?;
        Weight::bounded("net_weight", self.net_weight.value())?;
        self.rates.validate("rates")?;
        if let Some(declared) = &self.declared_rates {
            declared.validate("declared_rates")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Derived records
// ---------------------------------------------------------------------------

/// One item's share of each shipment cost leg. Legs the Incoterm does not
/// use are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostAllocation {
    pub international_freight: Money,
    pub insurance: Money,
    pub export_freight: Money,
    pub import_freight: Money,
    pub unloading: Money,
}

impl CostAllocation {
    /// The share for `leg`.
    pub fn get(&self, leg: CostLeg) -> Money {
        match leg {
            CostLeg::InternationalFreight => self.international_freight,
            CostLeg::Insurance => self.insurance,
            CostLeg::ExportFreight => self.export_freight,
            CostLeg::ImportFreight => self.import_freight,
            CostLeg::Unloading => self.unloading,
        }
    }

    pub(crate) fn set(&mut self, leg: CostLeg, amount: Money) {
        let slot = match leg {
            CostLeg::InternationalFreight => &mut self.international_freight,
            CostLeg::Insurance => &mut self.insurance,
            CostLeg::ExportFreight => &mut self.export_freight,
            CostLeg::ImportFreight => &mut self.import_freight,
            CostLeg::Unloading => &mut self.unloading,
        };
        *slot = amount;
    }
}

/// Result of spreading shipment costs across items, index-aligned with the
/// items passed in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostAllocations {
    pub shares: Vec<CostAllocation>,
    /// The insurance total that was allocated (declared or estimated).
    pub insurance_total: Money,
    /// Whether `insurance_total` was estimated rather than declared.
    pub insurance_estimated: bool,
}

/// Dutiable value of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomsValue {
    pub customs_value: Money,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ValuationWarning>,
}

/// Tax layered onto one customs value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemTax {
    pub duty_amount: Money,
    pub vat_amount: Money,
    /// Anti-dumping plus countervailing.
    pub other_tax_amount: Money,
    pub total_tax: Money,
}

/// A fully valued line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuedLineItem {
    pub line_id: String,
    pub invoice_value: Money,
    pub allocation: CostAllocation,
    pub customs_value: Money,
    /// The rates the tax was computed with.
    pub rates: TariffRates,
    #[serde(flatten)]
    pub tax: LineItemTax,
    #[serde(default)]
    pub warnings: Vec<ValuationWarning>,
}

impl ValuedLineItem {
    /// Check a valued item supplied from outside the engine before it is
    /// summed. Invoice values and rates carry the input caps. Derived
    /// amounts (shares, customs value, taxes) may legitimately exceed the
    /// invoice cap under high rates, so they are held to a cap 10^6 times
    /// larger, which keeps a sum over any realistic batch in range.
    pub fn validate(&self, prefix: &str) -> Result<(), ValuationError> {
        Money::bounded(&format!("{prefix}.invoice_value"), self.invoice_value.amount())?;
        self.rates.validate(&format!("{prefix}.rates"))?;

        let derived_max = Money::MAX_INPUT * rust_decimal::Decimal::from(1_000_000);
        let derived = [
            ("international_freight", self.allocation.international_freight),
            ("insurance", self.allocation.insurance),
            ("export_freight", self.allocation.export_freight),
            ("import_freight", self.allocation.import_freight),
            ("unloading", self.allocation.unloading),
            ("customs_value", self.customs_value),
            ("duty_amount", self.tax.duty_amount),
            ("vat_amount", self.tax.vat_amount),
            ("other_tax_amount", self.tax.other_tax_amount),
            ("total_tax", self.tax.total_tax),
        ];
        for (field, amount) in derived {
            let field = format!("{prefix}.{field}");
            if amount.is_negative() {
                return Err(ValuationError::invalid_input(
                    field,
                    format!("must not be negative (got {amount})"),
                ));
            }
            if amount.amount() > derived_max {
                return Err(ValuationError::invalid_input(
                    field,
                    format!("must not exceed {derived_max} (got {amount})"),
                ));
            }
        }
        Ok(())
    }
}

/// Shipment totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentSummary {
    pub clearance_type: ClearanceType,
    pub item_count: usize,
    pub total_value: Money,
    pub total_freight: Money,
    pub total_insurance: Money,
    pub total_customs_value: Money,
    pub total_duty: Money,
    pub total_vat: Money,
    pub total_other_tax: Money,
    /// True liability: duty + VAT + other, regardless of deferral.
    pub total_tax: Money,
    pub payable_vat: Money,
    pub deferred_vat: Money,
    /// Due at the border: duty + other + payable VAT.
    pub payable_total: Money,
    pub prepaid_duties_applied: Money,
    pub payable_after_prepaid: Money,
}

/// Non-fatal condition attached to an item result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValuationWarning {
    /// The term's formula went negative; the customs value was set to zero.
    NegativeCustomsValueClamped { unclamped: Money },
    /// A rate was absent and computed as zero.
    MissingRateDefaultedToZero { rate: RateKind },
    /// Declared rates were configured for DDP but the item has none; the
    /// applied rates were used instead.
    DeclaredRatesUnavailable,
}

impl std::fmt::Display for ValuationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeCustomsValueClamped { unclamped } => {
                write!(f, "customs value {unclamped} clamped to 0")
            }
            Self::MissingRateDefaultedToZero { rate } => write!(f, "{rate} rate missing, using 0"),
            Self::DeclaredRatesUnavailable => {
                f.write_str("declared rates unavailable, applied rates used")
            }
        }
    }
}

/// An item that could not be valued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    /// Zero-based position in the request.
    pub index: usize,
    pub line_id: String,
    /// [`ValuationError::code`].
    pub code: String,
    pub message: String,
}

impl ItemFailure {
    pub fn new(index: usize, line_id: impl Into<String>, err: &ValuationError) -> Self {
        Self {
            index,
            line_id: line_id.into(),
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Complete result of valuing one shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentValuation {
    pub terms: TradeTerms,
    pub items: Vec<ValuedLineItem>,
    pub failures: Vec<ItemFailure>,
    pub summary: ShipmentSummary,
    pub insurance_estimated: bool,
    /// Line ids with a warning or a failure, in request order.
    pub needs_review: Vec<String>,
    /// SHA-256 over the canonical JSON of `{terms, items, summary}`.
    pub digest: ContentDigest,
}

impl ShipmentValuation {
    /// Whether every submitted item was valued.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
