//! # Incoterms and Valuation Rules
//!
//! The twelve trade terms accepted at customs clearance, and the rule each
//! one implies for turning an invoice price into a dutiable customs value.
//!
//! The customs value is (roughly) the CIF price at the border of import.
//! Terms that stop short of the border (EXW, FCA, FAS, FOB, CFR, CPT) need
//! cost legs *added*; terms that reach past it (DAP, DPU, DDU, DDP) need
//! legs *subtracted*; CIF and CIP already are the customs value.
//!
//! [`ValuationRule`] is the single place where that table lives. Consumers
//! read the descriptor instead of comparing term strings, so adding a term
//! to [`Incoterm`] is a compile error until [`Incoterm::rule`] covers it.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Number of supported Incoterms.
pub const INCOTERM_COUNT: usize = 12;

/// International Commercial Terms recognised for valuation.
///
/// DDU was withdrawn in Incoterms 2010 but still appears on invoices; it is
/// valued identically to DAP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Incoterm {
    /// Ex Works.
    Exw,
    /// Free Carrier.
    Fca,
    /// Free Alongside Ship.
    Fas,
    /// Free On Board.
    Fob,
    /// Cost and Freight.
    Cfr,
    /// Cost, Insurance and Freight.
    Cif,
    /// Carriage Paid To.
    Cpt,
    /// Carriage and Insurance Paid To.
    Cip,
    /// Delivered At Place.
    Dap,
    /// Delivered at Place Unloaded.
    Dpu,
    /// Delivered Duty Paid.
    Ddp,
    /// Delivered Duty Unpaid (legacy).
    Ddu,
}

impl Incoterm {
    /// Canonical three-letter code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exw => "EXW",
            Self::Fca => "FCA",
            Self::Fas => "FAS",
            Self::Fob => "FOB",
            Self::Cfr => "CFR",
            Self::Cif => "CIF",
            Self::Cpt => "CPT",
            Self::Cip => "CIP",
            Self::Dap => "DAP",
            Self::Dpu => "DPU",
            Self::Ddp => "DDP",
            Self::Ddu => "DDU",
        }
    }

    /// All terms, in the order buyers' obligations grow.
    pub fn all() -> &'static [Incoterm] {
        &[
            Self::Exw,
            Self::Fca,
            Self::Fas,
            Self::Fob,
            Self::Cfr,
            Self::Cif,
            Self::Cpt,
            Self::Cip,
            Self::Dap,
            Self::Dpu,
            Self::Ddp,
            Self::Ddu,
        ]
    }

    /// The valuation rule this term implies.
    pub fn rule(&self) -> ValuationRule {
        match self {
            Self::Cif | Self::Cip => ValuationRule::NONE,
            Self::Cfr | Self::Cpt => ValuationRule {
                adds_insurance: true,
                ..ValuationRule::NONE
            },
            Self::Fob | Self::Fca | Self::Fas => ValuationRule {
                adds_freight: true,
                adds_insurance: true,
                ..ValuationRule::NONE
            },
            Self::Exw => ValuationRule {
                adds_export_freight: true,
                adds_freight: true,
                adds_insurance: true,
                ..ValuationRule::NONE
            },
            Self::Dap | Self::Ddu => ValuationRule {
                subtracts_import_freight: true,
                ..ValuationRule::NONE
            },
            Self::Dpu => ValuationRule {
                subtracts_import_freight: true,
                subtracts_unloading: true,
                ..ValuationRule::NONE
            },
            Self::Ddp => ValuationRule {
                subtracts_import_freight: true,
                reverses_embedded_taxes: true,
                ..ValuationRule::NONE
            },
        }
    }

    /// Whether the customs value needs an insurance component the invoice
    /// price does not already contain.
    pub fn requires_insurance(&self) -> bool {
        self.rule().adds_insurance
    }

    /// Human-readable customs value formula.
    pub fn formula(&self) -> &'static str {
        match self {
            Self::Cif | Self::Cip => "V",
            Self::Cfr | Self::Cpt => "V + I",
            Self::Fob | Self::Fca | Self::Fas => "V + F + I",
            Self::Exw => "V + FE + F + I",
            Self::Dap | Self::Ddu => "V - FI",
            Self::Dpu => "V - FI - U",
            Self::Ddp => "(V - FI) / ((1 + d) * (1 + v))",
        }
    }
}

impl std::fmt::Display for Incoterm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Incoterm {
    type Err = ValidationError;

    /// Case-insensitive; surrounding whitespace is ignored. Anything else is
    /// rejected, never defaulted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|term| term.as_str().eq_ignore_ascii_case(code))
            .ok_or_else(|| ValidationError::InvalidIncoterm(s.to_string()))
    }
}

/// A shipment-level cost that may be spread across line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostLeg {
    /// Main-carriage freight to the border (F).
    InternationalFreight,
    /// Cargo insurance (I).
    Insurance,
    /// Inland freight in the export country (FE).
    ExportFreight,
    /// Inland freight after the border (FI).
    ImportFreight,
    /// Unloading at destination (U).
    Unloading,
}

impl CostLeg {
    /// Stable identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InternationalFreight => "international_freight",
            Self::Insurance => "insurance",
            Self::ExportFreight => "export_freight",
            Self::ImportFreight => "import_freight",
            Self::Unloading => "unloading",
        }
    }

    /// All legs in formula order.
    pub fn all() -> &'static [CostLeg] {
        &[
            Self::ExportFreight,
            Self::InternationalFreight,
            Self::Insurance,
            Self::ImportFreight,
            Self::Unloading,
        ]
    }
}

impl std::fmt::Display for CostLeg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which cost legs a term adds to or removes from the invoice price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationRule {
    /// `+ FE`
    pub adds_export_freight: bool,
    /// `+ F`
    pub adds_freight: bool,
    /// `+ I`
    pub adds_insurance: bool,
    /// `- FI`
    pub subtracts_import_freight: bool,
    /// `- U`
    pub subtracts_unloading: bool,
    /// Divide out duty and VAT embedded in a delivered-duty-paid price.
    pub reverses_embedded_taxes: bool,
}

impl ValuationRule {
    /// Invoice value is the customs value.
    pub const NONE: ValuationRule = ValuationRule {
        adds_export_freight: false,
        adds_freight: false,
        adds_insurance: false,
        subtracts_import_freight: false,
        subtracts_unloading: false,
        reverses_embedded_taxes: false,
    };

    /// Whether this rule reads the given cost leg.
    pub fn uses(&self, leg: CostLeg) -> bool {
        match leg {
            CostLeg::InternationalFreight => self.adds_freight,
            CostLeg::Insurance => self.adds_insurance,
            CostLeg::ExportFreight => self.adds_export_freight,
            CostLeg::ImportFreight => self.subtracts_import_freight,
            CostLeg::Unloading => self.subtracts_unloading,
        }
    }

    /// The legs this rule reads, in formula order.
    pub fn legs(&self) -> Vec<CostLeg> {
        CostLeg::all()
            .iter()
            .copied()
            .filter(|leg| self.uses(*leg))
            .collect()
    }
}
