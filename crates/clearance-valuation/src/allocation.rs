//! # Cost Allocation
//!
//! Spreads shipment-level costs (freight legs, insurance, unloading) across
//! line items in two phases: first every shipment total is reduced, then
//! each leg is split by the largest-remainder method so the shares sum to
//! the leg cost exactly at the configured money scale.

use clearance_core::{AllocationMethod, CostLeg, Money};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::ValuationConfig;
use crate::model::{CostAllocation, CostAllocations, LineItem, TradeTerms};

/// Distribute the shipment's costs across `items`.
///
/// Only the legs the Incoterm's formula reads are allocated; the rest stay
/// zero. When insurance is needed but undeclared it is estimated from the
/// total invoice value.
pub fn allocate_shipment_costs(
    terms: &TradeTerms,
    items: &[LineItem],
    config: &ValuationConfig,
) -> CostAllocations {
    if items.is_empty() {
        return CostAllocations::default();
    }

    let scale = config.money_scale;
    let rule = terms.incoterm.rule();
    let basis = allocation_basis(terms.freight_allocation_method, items);
    let total_value: Money = items.iter().map(|item| item.invoice_value).sum();

    let mut shares = vec![CostAllocation::default(); items.len()];
    let mut insurance_total = Money::ZERO;
    let mut insurance_estimated = false;

    for leg in rule.legs() {
        let cost = match (leg, terms.declared_cost(leg)) {
            (_, Some(declared)) => declared.round_to(scale),
            (CostLeg::Insurance, None) => {
                insurance_estimated = true;
                config.insurance_estimate_rate.of(total_value).round_to(scale)
            }
            (_, None) => Money::ZERO,
        };
        if leg == CostLeg::Insurance {
            insurance_total = cost;
        }
        for (share, amount) in shares
            .iter_mut()
            .zip(split_largest_remainder(cost.amount(), &basis, scale))
        {
            share.set(leg, Money::new(amount));
        }
    }

    if insurance_estimated {
        tracing::debug!(
            incoterm = %terms.incoterm,
            insurance = %insurance_total,
            "insurance cost not declared, estimated from invoice value"
        );
    }

    CostAllocations {
        shares,
        insurance_total,
        insurance_estimated,
    }
}

fn allocation_basis(method: AllocationMethod, items: &[LineItem]) -> Vec<Decimal> {
    match method {
        AllocationMethod::ByValue => items.iter().map(|i| i.invoice_value.amount()).collect(),
        AllocationMethod::ByWeight => items.iter().map(|i| i.gross_weight.value()).collect(),
    }
}

/// Split `total` proportionally to `weights`, exactly, at `scale` decimal
/// places.
///
/// Each share is truncated to the scale; the leftover minor units go one at
/// a time to the largest truncation remainders, ties to the lower index.
/// A zero weight sum falls back to equal shares. `total` must already be
/// at `scale` and weights must be non-negative.
pub fn split_largest_remainder(total: Decimal, weights: &[Decimal], scale: u32) -> Vec<Decimal> {
    let n = weights.len();
    if n == 0 {
        return Vec::new();
    }
    if total.is_zero() {
        return vec![Decimal::ZERO; n];
    }

    let weight_sum: Decimal = weights.iter().sum();
    let equal = weight_sum.is_zero();

    let mut shares = Vec::with_capacity(n);
    let mut remainders = Vec::with_capacity(n);
    for weight in weights {
        let fraction = if equal {
            Decimal::ONE / Decimal::from(n)
        } else {
            weight / weight_sum
        };
        let exact = total * fraction;
        let truncated = exact.round_dp_with_strategy(scale, RoundingStrategy::ToZero);
        remainders.push(exact - truncated);
        shares.push(truncated);
    }

    let unit = Decimal::new(1, scale);
    let leftover = total - shares.iter().sum::<Decimal>();
    let units = (leftover / unit).round().to_usize().unwrap_or(0);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| remainders[b].cmp(&remainders[a]).then(a.cmp(&b)));
    for i in 0..units {
        shares[order[i % n]] += unit;
    }
    for share in &mut shares {
        share.rescale(scale);
    }
    shares
}
