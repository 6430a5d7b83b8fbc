//! # Raw Input Records
//!
//! Shapes accepted from files and HTTP bodies before validation. Incoterms
//! and procedure codes arrive as strings; amounts arrive as decimal strings,
//! integers or JSON numbers with a fraction. Decimal strings are preferred;
//! a fractional number is read through its shortest decimal text, so `13.5`
//! becomes exactly `13.5`. Every amount is checked against the caps in
//! [`clearance_core::Money`], so one bad number fails only its own line
//! item.

use clearance_core::{
    parse_decimal, AllocationMethod, ClearanceType, CountryCode, HsCode, Incoterm, Money, Percent,
    ValidationError, Weight,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValuationError;
use crate::model::{LineItem, TariffRates, TradeTerms};

/// A number as the caller sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl RawAmount {
    /// Convert to a decimal, rejecting malformed text.
    pub fn to_decimal(&self, field: &str) -> Result<Decimal, ValidationError> {
        match self {
            Self::Text(s) => parse_decimal(field, s),
            Self::Integer(i) => Ok(Decimal::from(*i)),
            // `f64`'s Display is the shortest text that round-trips.
            Self::Float(f) => parse_decimal(field, &f.to_string()),
        }
    }

    /// The value as text, for code-like fields such as `"42"` / `42`.
    pub fn as_code(&self) -> String {
        match self {
            Self::Text(s) => s.trim().to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
        }
    }
}

impl From<&str> for RawAmount {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for RawAmount {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

fn money(field: &str, raw: &Option<RawAmount>) -> Result<Option<Money>, ValuationError> {
    match raw {
        Some(r) => Ok(Some(Money::bounded(field, r.to_decimal(field)?)?)),
        None => Ok(None),
    }
}

fn percent(field: &str, raw: &Option<RawAmount>) -> Result<Option<Percent>, ValuationError> {
    match raw {
        Some(r) => Ok(Some(Percent::bounded(field, r.to_decimal(field)?)?)),
        None => Ok(None),
    }
}

fn weight(field: &str, raw: &Option<RawAmount>) -> Result<Weight, ValuationError> {
    match raw {
        Some(r) => Ok(Weight::bounded(field, r.to_decimal(field)?)?),
        None => Ok(Weight::ZERO),
    }
}

/// Shipment terms before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTradeTerms {
    pub incoterm: String,
    #[serde(default)]
    pub international_freight: Option<RawAmount>,
    #[serde(default)]
    pub domestic_freight_export: Option<RawAmount>,
    #[serde(default)]
    pub domestic_freight_import: Option<RawAmount>,
    #[serde(default)]
    pub unloading_cost: Option<RawAmount>,
    #[serde(default)]
    pub insurance_cost: Option<RawAmount>,
    #[serde(default)]
    pub prepaid_duties: Option<RawAmount>,
    #[serde(default)]
    pub freight_allocation_method: Option<String>,
    #[serde(default)]
    pub clearance_type: Option<RawAmount>,
}

impl RawTradeTerms {
    /// Validate into typed terms. Any error here is fatal for the shipment.
    pub fn parse(&self) -> Result<TradeTerms, ValuationError> {
        let incoterm: Incoterm = self.incoterm.parse()?;
        let freight_allocation_method = match &self.freight_allocation_method {
            Some(method) => method.parse::<AllocationMethod>()?,
            None => AllocationMethod::default(),
        };
        let clearance_type = match &self.clearance_type {
            Some(code) => code.as_code().parse::<ClearanceType>()?,
            None => ClearanceType::default(),
        };
        Ok(TradeTerms {
            incoterm,
            international_freight: money("international_freight", &self.international_freight)?,
            domestic_freight_export: money(
                "domestic_freight_export",
                &self.domestic_freight_export,
            )?,
            domestic_freight_import: money(
                "domestic_freight_import",
                &self.domestic_freight_import,
            )?,
            unloading_cost: money("unloading_cost", &self.unloading_cost)?,
            insurance_cost: money("insurance_cost", &self.insurance_cost)?,
            prepaid_duties: money("prepaid_duties", &self.prepaid_duties)?,
            freight_allocation_method,
            clearance_type,
        })
    }
}

/// Rates before validation, on the 0–100 scale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRates {
    #[serde(default)]
    pub duty: Option<RawAmount>,
    #[serde(default)]
    pub vat: Option<RawAmount>,
    #[serde(default)]
    pub anti_dumping: Option<RawAmount>,
    #[serde(default)]
    pub countervailing: Option<RawAmount>,
}

impl RawRates {
    /// Validate; field names in errors are prefixed with `prefix`.
    pub fn parse(&self, prefix: &str) -> Result<TariffRates, ValuationError> {
        Ok(TariffRates {
            duty: percent(&format!("{prefix}.duty"), &self.duty)?,
            vat: percent(&format!("{prefix}.vat"), &self.vat)?,
            anti_dumping: percent(&format!("{prefix}.anti_dumping"), &self.anti_dumping)?,
            countervailing: percent(&format!("{prefix}.countervailing"), &self.countervailing)?,
        })
    }
}

/// One line item before validation.
///
/// `invoice_value` may be omitted when `quantity` and `unit_price` are both
/// given; it is then their product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLineItem {
    #[serde(default)]
    pub line_id: Option<String>,
    #[serde(default)]
    pub invoice_value: Option<RawAmount>,
    #[serde(default)]
    pub quantity: Option<RawAmount>,
    #[serde(default)]
    pub unit_price: Option<RawAmount>,
    #[serde(default)]
    pub gross_weight: Option<RawAmount>,
    #[serde(default)]
    pub net_weight: Option<RawAmount>,
    #[serde(default)]
    pub origin_country: Option<String>,
    #[serde(default)]
    pub hs_code: Option<String>,
    #[serde(default)]
    pub rates: Option<RawRates>,
    #[serde(default)]
    pub declared_rates: Option<RawRates>,
}

impl RawLineItem {
    /// The caller's id, or a positional one (`#1`, `#2`, …).
    pub fn line_id_or_position(&self, index: usize) -> String {
        match &self.line_id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => format!("#{}", index + 1),
        }
    }

    /// Validate into a typed line item.
    pub fn parse(&self, index: usize) -> Result<LineItem, ValuationError> {
        let invoice_value = self.invoice_value()?;
        let origin_country = self
            .origin_country
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(CountryCode::new)
            .transpose()?;
        let hs_code = self
            .hs_code
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(HsCode::new)
            .transpose()?;
        let rates = match &self.rates {
            Some(raw) => raw.parse("rates")?,
            None => TariffRates::default(),
        };
        let declared_rates = self
            .declared_rates
            .as_ref()
            .map(|raw| raw.parse("declared_rates"))
            .transpose()?;

        Ok(LineItem {
            line_id: self.line_id_or_position(index),
            invoice_value,
            gross_weight: weight("gross_weight", &self.gross_weight)?,
            net_weight: weight("net_weight", &self.net_weight)?,
            origin_country,
            hs_code,
            rates,
            declared_rates,
        })
    }

    fn invoice_value(&self) -> Result<Money, ValuationError> {
        if let Some(value) = money("invoice_value", &self.invoice_value)? {
            return Ok(value);
        }
        match (&self.quantity, &self.unit_price) {
            (Some(quantity), Some(unit_price)) => {
                let quantity = Money::bounded("quantity", quantity.to_decimal("quantity")?)?;
                let unit_price =
                    Money::bounded("unit_price", unit_price.to_decimal("unit_price")?)?;
                let product = quantity
                    .amount()
                    .checked_mul(unit_price.amount())
                    .ok_or_else(|| {
                        ValuationError::invalid_input(
                            "invoice_value",
                            "quantity × unit_price overflows",
                        )
                    })?;
                Ok(Money::bounded("invoice_value", product)?)
            }
            _ => Err(ValuationError::invalid_input(
                "invoice_value",
                "missing (give invoice_value, or quantity and unit_price)",
            )),
        }
    }
}

/// A shipment submitted for valuation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRequest {
    pub terms: RawTradeTerms,
    #[serde(default)]
    pub items: Vec<RawLineItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn terms_json(extra: serde_json::Value) -> RawTradeTerms {
        let mut base = serde_json::json!({"incoterm": "FOB"});
        if let (Some(obj), Some(add)) = (base.as_object_mut(), extra.as_object()) {
            obj.extend(add.clone());
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn raw_amount_accepts_strings_and_integers() {
        let a: RawAmount = serde_json::from_str("\"1130.50\"").unwrap();
        let b: RawAmount = serde_json::from_str("1130").unwrap();
        assert_eq!(a.to_decimal("x").unwrap(), dec!(1130.50));
        assert_eq!(b.to_decimal("x").unwrap(), dec!(1130));
    }

    #[test]
    fn raw_amount_reads_fractional_numbers_exactly() {
        let f: RawAmount = serde_json::from_str("1130.5").unwrap();
        assert_eq!(f.to_decimal("invoice_value").unwrap(), dec!(1130.5));
        let vat: RawAmount = serde_json::from_str("13.5").unwrap();
        assert_eq!(vat.to_decimal("rates.vat").unwrap(), dec!(13.5));
        let cents: RawAmount = serde_json::from_str("0.1").unwrap();
        assert_eq!(cents.to_decimal("x").unwrap(), dec!(0.1));
    }

    #[test]
    fn numeric_vat_rate_is_accepted() {
        let raw: RawLineItem = serde_json::from_value(serde_json::json!({
            "invoice_value": "1000",
            "rates": {"duty": "10", "vat": 13.5},
        }))
        .unwrap();
        let item = raw.parse(0).unwrap();
        assert_eq!(item.rates.vat, Some(Percent::new(dec!(13.5))));
        assert_eq!(item.rates.duty, Some(Percent::new(dec!(10))));
    }

    #[test]
    fn oversized_amounts_are_invalid_input() {
        let raw = RawLineItem {
            invoice_value: Some("50000000000000000000000000000".into()),
            ..RawLineItem::default()
        };
        match raw.parse(0).unwrap_err() {
            ValuationError::InvalidInput { field, reason } => {
                assert_eq!(field, "invoice_value");
                assert!(reason.contains("must not exceed"), "{reason}");
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }

        let rate = RawLineItem {
            invoice_value: Some("10".into()),
            rates: Some(RawRates {
                duty: Some("10000.5".into()),
                ..RawRates::default()
            }),
            ..RawLineItem::default()
        };
        assert!(matches!(
            rate.parse(0),
            Err(ValuationError::InvalidInput { ref field, .. }) if field == "rates.duty"
        ));

        let freight = terms_json(serde_json::json!({"international_freight": 1e20}));
        assert!(matches!(
            freight.parse(),
            Err(ValuationError::InvalidInput { ref field, .. }) if field == "international_freight"
        ));
    }

    #[test]
    fn oversized_quantity_product_is_invalid_input() {
        let raw = RawLineItem {
            quantity: Some("1000000000".into()),
            unit_price: Some("1000000000".into()),
            ..RawLineItem::default()
        };
        assert!(matches!(
            raw.parse(0),
            Err(ValuationError::InvalidInput { ref field, .. }) if field == "invoice_value"
        ));
    }

    #[test]
    fn terms_parse_defaults() {
        let terms = terms_json(serde_json::json!({})).parse().unwrap();
        assert_eq!(terms.incoterm, Incoterm::Fob);
        assert_eq!(terms.freight_allocation_method, AllocationMethod::ByValue);
        assert_eq!(terms.clearance_type, ClearanceType::Standard);
        assert_eq!(terms.insurance_cost, None);
    }

    #[test]
    fn terms_parse_full() {
        let terms = terms_json(serde_json::json!({
            "international_freight": "100",
            "insurance_cost": 30,
            "freight_allocation_method": "by_weight",
            "clearance_type": 42,
        }))
        .parse()
        .unwrap();
        assert_eq!(terms.international_freight, Some(Money::new(dec!(100))));
        assert_eq!(terms.insurance_cost, Some(Money::new(dec!(30))));
        assert_eq!(terms.freight_allocation_method, AllocationMethod::ByWeight);
        assert_eq!(terms.clearance_type, ClearanceType::DeferredVat);
    }

    #[test]
    fn unknown_incoterm_is_fatal() {
        let raw = RawTradeTerms {
            incoterm: "XYZ".into(),
            ..RawTradeTerms::default()
        };
        assert!(matches!(raw.parse(), Err(ValuationError::InvalidIncoterm(ref c)) if c == "XYZ"));
    }

    #[test]
    fn negative_freight_is_invalid_input() {
        let err = terms_json(serde_json::json!({"international_freight": "-5"}))
            .parse()
            .unwrap_err();
        assert!(matches!(
            err,
            ValuationError::InvalidInput { ref field, .. } if field == "international_freight"
        ));
    }

    #[test]
    fn bad_clearance_type_rejected() {
        let err = terms_json(serde_json::json!({"clearance_type": "41"}))
            .parse()
            .unwrap_err();
        assert!(matches!(
            err,
            ValuationError::InvalidInput { ref field, .. } if field == "clearance_type"
        ));
    }

    #[test]
    fn line_item_parse() {
        let raw: RawLineItem = serde_json::from_value(serde_json::json!({
            "line_id": "L-7",
            "invoice_value": "1000.00",
            "gross_weight": "12.5",
            "origin_country": "cn",
            "hs_code": "8471.30",
            "rates": {"duty": "10", "vat": 19},
        }))
        .unwrap();
        let item = raw.parse(0).unwrap();
        assert_eq!(item.line_id, "L-7");
        assert_eq!(item.invoice_value, Money::new(dec!(1000)));
        assert_eq!(item.gross_weight, Weight::new(dec!(12.5)));
        assert_eq!(item.origin_country.unwrap().as_str(), "CN");
        assert_eq!(item.hs_code.unwrap().as_str(), "847130");
        assert_eq!(item.rates.vat, Some(Percent::new(dec!(19))));
        assert_eq!(item.rates.anti_dumping, None);
    }

    #[test]
    fn invoice_value_from_quantity_and_unit_price() {
        let raw = RawLineItem {
            quantity: Some("12".into()),
            unit_price: Some("2.50".into()),
            ..RawLineItem::default()
        };
        let item = raw.parse(4).unwrap();
        assert_eq!(item.invoice_value, Money::new(dec!(30)));
        assert_eq!(item.line_id, "#5");
    }

    #[test]
    fn missing_invoice_value_rejected() {
        let err = RawLineItem::default().parse(0).unwrap_err();
        assert!(matches!(
            err,
            ValuationError::InvalidInput { ref field, .. } if field == "invoice_value"
        ));
    }

    #[test]
    fn malformed_rate_names_nested_field() {
        let raw = RawLineItem {
            invoice_value: Some("10".into()),
            rates: Some(RawRates {
                vat: Some("nineteen".into()),
                ..RawRates::default()
            }),
            ..RawLineItem::default()
        };
        match raw.parse(0).unwrap_err() {
            ValuationError::InvalidInput { field, reason } => {
                assert_eq!(field, "rates.vat");
                assert_eq!(reason, "\"nineteen\" is not a decimal number");
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn shipment_request_from_yaml() {
        let yaml = r#"
terms:
  incoterm: DAP
  domestic_freight_import: "40"
items:
  - line_id: A
    invoice_value: "1000"
"#;
        let request: ShipmentRequest = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(request.items.len(), 1);
        let terms = request.terms.parse().unwrap();
        assert_eq!(terms.domestic_freight_import, Some(Money::new(dec!(40))));
    }
}
