//! # clearance-core: Foundational Types for the Clearance Stack
//!
//! This crate is the leaf of the workspace DAG. It defines the domain
//! primitives every other crate speaks in: fixed-point money, percentage
//! rates, the closed Incoterm enum with its valuation rule table, customs
//! codes, and the canonical-bytes pipeline used to fingerprint computed
//! valuations.
//!
//! ## Key Design Principles
//!
//! 1. **No binary floats for money.** [`Money`], [`Percent`] and [`Weight`]
//!    wrap `rust_decimal::Decimal` and serialize as decimal strings.
//!
//! 2. **Single `Incoterm` enum.** One definition, twelve variants, exhaustive
//!    `match` everywhere. The formula each term implies lives next to the
//!    enum in [`ValuationRule`], so adding a term forces every consumer to
//!    decide how it values goods.
//!
//! 3. **Validated newtypes for codes.** [`HsCode`] and [`CountryCode`] reject
//!    malformed input at construction and at deserialization.
//!
//! 4. **`sha256_digest()` accepts only `&CanonicalBytes`.** Every valuation
//!    fingerprint flows through the same JCS canonicalization.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `clearance-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod codes;
pub mod digest;
pub mod error;
pub mod incoterm;
pub mod money;
pub mod terms;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use codes::{CountryCode, HsCode};
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::{CanonicalizationError, ValidationError};
pub use incoterm::{CostLeg, Incoterm, ValuationRule, INCOTERM_COUNT};
pub use money::{parse_decimal, Money, Percent, Weight};
pub use terms::{AllocationMethod, ClearanceType};
