//! # clearance-valuation: Customs Valuation & Tax Engine
//!
//! Derives the dutiable customs value of each cargo line from its invoice
//! price under the shipment's Incoterm, then layers duty, anti-dumping /
//! countervailing duty and VAT on top, and aggregates the shipment with
//! deferred-VAT handling for "42" clearance.
//!
//! ## Stages
//!
//! 1. [`allocate_shipment_costs`] spreads freight, insurance and unloading
//!    across items (by value or by weight), conserving every cost exactly.
//! 2. [`compute_customs_value`] applies the Incoterm's rule, clamping
//!    negative results to zero with a warning.
//! 3. [`compute_line_item_tax`] layers the taxes with a cascading VAT base.
//! 4. [`aggregate_shipment`] sums the shipment and splits payable from
//!    deferred VAT.
//!
//! [`value_shipment`] runs all four over a raw request and fingerprints the
//! result with a SHA-256 content digest.
//!
//! ## Determinism
//!
//! The engine holds no state. All arithmetic is `rust_decimal`, rounded half
//! away from zero at the configured money scale, so identical inputs give
//! identical outputs and identical digests.

pub mod allocation;
pub mod config;
pub mod customs;
pub mod error;
pub mod input;
pub mod model;
pub mod pipeline;
pub mod summary;
pub mod tariff;
pub mod tax;

pub use allocation::{allocate_shipment_costs, split_largest_remainder};
pub use config::{RateSource, ValuationConfig, MAX_MONEY_SCALE};
pub use customs::compute_customs_value;
pub use error::{ConfigError, ValuationError};
pub use input::{RawAmount, RawLineItem, RawRates, RawTradeTerms, ShipmentRequest};
pub use model::{
    CostAllocation, CostAllocations, CustomsValue, ItemFailure, LineItem, LineItemTax, RateKind,
    ShipmentSummary, ShipmentValuation, TariffRates, TradeTerms, ValuationWarning, ValuedLineItem,
};
pub use pipeline::{value_line_items, value_shipment};
pub use summary::aggregate_shipment;
pub use tariff::{TariffEntry, TariffLookup, TariffTable};
pub use tax::compute_line_item_tax;
