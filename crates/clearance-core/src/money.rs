//! # Fixed-Point Amounts
//!
//! [`Money`], [`Percent`] and [`Weight`] wrap `rust_decimal::Decimal`.
//! Duty and VAT are layered on top of each other, so binary floating point
//! would let rounding drift compound across the cascade; decimal arithmetic
//! keeps recomputation bit-identical.
//!
//! All three serialize as decimal strings (`"1130.00"`), never as JSON
//! numbers, so they pass through [`crate::CanonicalBytes`] unchanged.
//!
//! Percentages are stored on a 0–100 scale: `Percent::new(dec!(19))` is 19 %.
//!
//! Caller-supplied values are capped ([`Money::MAX_INPUT`],
//! [`Percent::MAX_INPUT`], [`Weight::MAX_INPUT`]). Within those caps every
//! sum and product the engine forms stays inside `Decimal`'s 96-bit range.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Parse a decimal from caller-supplied text, naming the field on failure.
///
/// Surrounding whitespace is ignored. Scientific notation is accepted.
pub fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, ValidationError> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ValidationError::MalformedNumber {
            field: field.to_string(),
            value: raw.to_string(),
        })
}

fn ensure_in_range(field: &str, value: Decimal, max: Decimal) -> Result<Decimal, ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    if value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            max: max.to_string(),
        });
    }
    Ok(value)
}

// 10^15 as (lo, mid, hi) words.
const TEN_POW_15: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

/// A currency-agnostic monetary amount.
///
/// Intermediate results (for example a DDP reverse calculation before
/// clamping) may be negative; inputs are checked with
/// [`Money::bounded`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Largest amount accepted from a caller: 10^15.
    pub const MAX_INPUT: Decimal = TEN_POW_15;

    /// Wrap a decimal amount.
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Wrap a caller-supplied amount, rejecting negatives and anything
    /// above [`Money::MAX_INPUT`].
    pub fn bounded(field: &str, amount: Decimal) -> Result<Self, ValidationError> {
        ensure_in_range(field, amount, Self::MAX_INPUT).map(Self)
    }

    /// Parse a bounded amount from text.
    pub fn parse(field: &str, raw: &str) -> Result<Self, ValidationError> {
        Self::bounded(field, parse_decimal(field, raw)?)
    }

    /// The underlying decimal.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Whether the amount is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Round half away from zero to `scale` decimal places. The result
    /// always carries exactly `scale` places, so `1180` renders as
    /// `"1180.00"` at scale 2.
    pub fn round_to(self, scale: u32) -> Self {
        let mut amount = self
            .0
            .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(scale);
        Self(amount)
    }

    /// Replace a negative amount with zero.
    pub fn floor_at_zero(self) -> Self {
        if self.is_negative() {
            Self::ZERO
        } else {
            self
        }
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

// ---------------------------------------------------------------------------
// Percent
// ---------------------------------------------------------------------------

/// A percentage rate on the 0–100 scale (rates above 100 are legal; some
/// anti-dumping duties exceed the goods value).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Percent(Decimal);

impl Percent {
    /// 0 %.
    pub const ZERO: Percent = Percent(Decimal::ZERO);

    /// Largest rate accepted from a caller: 10 000 %.
    pub const MAX_INPUT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

    /// Wrap a percentage value (19 means 19 %).
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Wrap a caller-supplied rate, rejecting negatives and anything above
    /// [`Percent::MAX_INPUT`].
    pub fn bounded(field: &str, value: Decimal) -> Result<Self, ValidationError> {
        ensure_in_range(field, value, Self::MAX_INPUT).map(Self)
    }

    /// Parse a bounded percentage from text.
    pub fn parse(field: &str, raw: &str) -> Result<Self, ValidationError> {
        Self::bounded(field, parse_decimal(field, raw)?)
    }

    /// The percentage value on the 0–100 scale.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// The rate as a fraction (19 % → 0.19).
    pub fn as_fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// Apply the rate to an amount without rounding.
    pub fn of(&self, base: Money) -> Money {
        Money(base.0 * self.0 / Decimal::ONE_HUNDRED)
    }

    /// Whether the rate is below zero.
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl Add for Percent {
    type Output = Percent;

    fn add(self, rhs: Percent) -> Percent {
        Percent(self.0 + rhs.0)
    }
}

impl std::fmt::Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// ---------------------------------------------------------------------------
// Weight
// ---------------------------------------------------------------------------

/// A cargo weight. The unit is whatever the line-item store uses (kg in
/// practice); allocation only ever uses ratios of weights.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Weight(Decimal);

impl Weight {
    /// Zero weight.
    pub const ZERO: Weight = Weight(Decimal::ZERO);

    /// Largest weight accepted from a caller: 10^15.
    pub const MAX_INPUT: Decimal = TEN_POW_15;

    /// Wrap a weight value.
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Wrap a caller-supplied weight, rejecting negatives and anything
    /// above [`Weight::MAX_INPUT`].
    pub fn bounded(field: &str, value: Decimal) -> Result<Self, ValidationError> {
        ensure_in_range(field, value, Self::MAX_INPUT).map(Self)
    }

    /// Parse a bounded weight from text.
    pub fn parse(field: &str, raw: &str) -> Result<Self, ValidationError> {
        Self::bounded(field, parse_decimal(field, raw)?)
    }

    /// The underlying decimal.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Whether the weight is below zero.
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl std::fmt::Display for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_decimal_accepts_plain_and_scientific() {
        assert_eq!(parse_decimal("v", "1130.00").unwrap(), dec!(1130));
        assert_eq!(parse_decimal("v", " 42 ").unwrap(), dec!(42));
        assert_eq!(parse_decimal("v", "1.5e3").unwrap(), dec!(1500));
    }

    #[test]
    fn parse_decimal_rejects_garbage() {
        let err = parse_decimal("duty_rate", "ten").unwrap_err();
        assert_eq!(
            err,
            ValidationError::MalformedNumber {
                field: "duty_rate".into(),
                value: "ten".into(),
            }
        );
        assert!(parse_decimal("v", "").is_err());
    }

    #[test]
    fn money_parse_rejects_negative() {
        assert!(matches!(
            Money::parse("invoice_value", "-1"),
            Err(ValidationError::NegativeAmount { .. })
        ));
        assert_eq!(Money::parse("invoice_value", "0").unwrap(), Money::ZERO);
    }

    #[test]
    fn money_rounds_half_away_from_zero() {
        assert_eq!(Money::new(dec!(1.005)).round_to(2), Money::new(dec!(1.01)));
        assert_eq!(Money::new(dec!(-1.005)).round_to(2), Money::new(dec!(-1.01)));
        assert_eq!(Money::new(dec!(1.004)).round_to(2), Money::new(dec!(1.00)));
    }

    #[test]
    fn money_input_is_capped() {
        assert_eq!(Money::MAX_INPUT, dec!(1000000000000000));
        assert!(Money::parse("invoice_value", "1000000000000000").is_ok());
        assert_eq!(
            Money::parse("invoice_value", "50000000000000000000000000000").unwrap_err(),
            ValidationError::OutOfRange {
                field: "invoice_value".into(),
                value: "50000000000000000000000000000".into(),
                max: "1000000000000000".into(),
            }
        );
    }

    #[test]
    fn percent_and_weight_inputs_are_capped() {
        assert_eq!(Percent::MAX_INPUT, dec!(10000));
        assert!(Percent::parse("duty", "10000").is_ok());
        assert!(matches!(
            Percent::parse("duty", "10000.01"),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            Weight::parse("gross_weight", "1e16"),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn money_round_pads_to_scale() {
        assert_eq!(Money::new(dec!(1180)).round_to(2).to_string(), "1180.00");
        assert_eq!(Money::new(dec!(2.5)).round_to(0).to_string(), "3");
    }

    #[test]
    fn money_floor_at_zero() {
        assert_eq!(Money::new(dec!(-40)).floor_at_zero(), Money::ZERO);
        assert_eq!(Money::new(dec!(40)).floor_at_zero(), Money::new(dec!(40)));
    }

    #[test]
    fn money_arithmetic_and_sum() {
        let items = [
            Money::new(dec!(1.10)),
            Money::new(dec!(2.20)),
            Money::new(dec!(3.30)),
        ];
        let total: Money = items.iter().sum();
        assert_eq!(total, Money::new(dec!(6.60)));
        assert_eq!(total - Money::new(dec!(0.60)), Money::new(dec!(6)));
    }

    #[test]
    fn money_serializes_as_string() {
        let json = serde_json::to_string(&Money::new(dec!(1130.00))).unwrap();
        assert_eq!(json, "\"1130.00\"");
        let back: Money = serde_json::from_str("\"960\"").unwrap();
        assert_eq!(back, Money::new(dec!(960)));
    }

    #[test]
    fn percent_fraction_and_application() {
        let vat = Percent::new(dec!(19));
        assert_eq!(vat.as_fraction(), dec!(0.19));
        assert_eq!(vat.of(Money::new(dec!(1100))), Money::new(dec!(209)));
        assert_eq!(
            Percent::new(dec!(10)) + Percent::new(dec!(2.5)),
            Percent::new(dec!(12.5))
        );
        assert_eq!(vat.to_string(), "19%");
    }

    #[test]
    fn weight_parse() {
        assert_eq!(Weight::parse("gross_weight", "12.5").unwrap().value(), dec!(12.5));
        assert!(Weight::parse("gross_weight", "-0.1").is_err());
    }
}
