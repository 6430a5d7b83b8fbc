//! # Rule Table and Digest Vectors
//!
//! Pins the Incoterm rule table and the canonical digest of a small
//! valuation fragment. A change to either alters every stored valuation
//! fingerprint, so both are asserted against literal expectations.

use clearance_core::{
    sha256_digest, CanonicalBytes, CostLeg, Incoterm, Money, ValuationRule, INCOTERM_COUNT,
};
use rust_decimal_macros::dec;

fn legs(term: Incoterm) -> Vec<CostLeg> {
    term.rule().legs()
}

#[test]
fn rule_table_matches_formulas() {
    use CostLeg::*;
    let expected: [(Incoterm, Vec<CostLeg>); INCOTERM_COUNT] = [
        (Incoterm::Exw, vec![ExportFreight, InternationalFreight, Insurance]),
        (Incoterm::Fca, vec![InternationalFreight, Insurance]),
        (Incoterm::Fas, vec![InternationalFreight, Insurance]),
        (Incoterm::Fob, vec![InternationalFreight, Insurance]),
        (Incoterm::Cfr, vec![Insurance]),
        (Incoterm::Cif, vec![]),
        (Incoterm::Cpt, vec![Insurance]),
        (Incoterm::Cip, vec![]),
        (Incoterm::Dap, vec![ImportFreight]),
        (Incoterm::Dpu, vec![ImportFreight, Unloading]),
        (Incoterm::Ddp, vec![ImportFreight]),
        (Incoterm::Ddu, vec![ImportFreight]),
    ];
    for (term, want) in expected {
        assert_eq!(legs(term), want, "{term}");
    }
}

#[test]
fn every_formula_mentions_its_legs() {
    for term in Incoterm::all() {
        let formula = term.formula();
        let rule: ValuationRule = term.rule();
        assert!(formula.starts_with('V') || formula.starts_with('('), "{term}");
        assert_eq!(formula.contains("FE"), rule.adds_export_freight, "{term}");
        assert_eq!(formula.contains("FI"), rule.subtracts_import_freight, "{term}");
        assert_eq!(formula.contains(" U"), rule.subtracts_unloading, "{term}");
    }
}

#[test]
fn valuation_fragment_digest_vector() {
    let fragment = serde_json::json!({
        "incoterm": Incoterm::Fob,
        "customs_value": Money::new(dec!(1130.00)),
    });
    let cb = CanonicalBytes::new(&fragment).unwrap();
    assert_eq!(
        std::str::from_utf8(cb.as_bytes()).unwrap(),
        r#"{"customs_value":"1130.00","incoterm":"FOB"}"#
    );
    assert_eq!(
        sha256_digest(&cb).to_hex(),
        "778f51482ece17180800a1ba4d4d811c262e148fab03b4d2c4f7107ba8a43222"
    );
}
