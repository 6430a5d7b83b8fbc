//! # Route Modules

pub mod valuation;
