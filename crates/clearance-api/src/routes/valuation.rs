//! # Valuation API
//!
//! Thin handlers over the valuation engine. Each parses the raw body,
//! calls one engine operation with the shared config and tariff table, and
//! wraps the result in the response envelope. No state is written.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use clearance_core::{ClearanceType, Incoterm, Money};
use clearance_valuation::{
    aggregate_shipment, compute_line_item_tax, value_line_items, value_shipment, CostAllocation,
    LineItemTax, RawAmount, RawLineItem, RawRates, RawTradeTerms, ShipmentRequest,
    ShipmentSummary, ShipmentValuation, TariffRates, ValuationError, ValuationWarning,
    ValuedLineItem,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::envelope::Envelope;
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, Validate};
use crate::state::AppState;

/// Upper bound on line items per request.
pub const MAX_ITEMS: usize = 10_000;

// -- Request / response DTOs -------------------------------------------------

/// Body of `POST /v1/valuation/shipments`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ValueShipmentRequest {
    /// Shipment-level trade terms: incoterm, costs, allocation method,
    /// clearance type.
    #[schema(value_type = Object)]
    pub terms: RawTradeTerms,
    #[schema(value_type = Vec<Object>)]
    #[serde(default)]
    pub items: Vec<RawLineItem>,
}

impl Validate for ValueShipmentRequest {
    fn validate(&self) -> Result<(), String> {
        if self.items.len() > MAX_ITEMS {
            return Err(format!("items must not exceed {MAX_ITEMS}, got {}", self.items.len()));
        }
        Ok(())
    }
}

/// Body of `POST /v1/valuation/customs-value`: one item valued under the
/// shipment's terms, as if it were the whole shipment.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CustomsValueRequest {
    #[schema(value_type = Object)]
    pub terms: RawTradeTerms,
    #[schema(value_type = Object)]
    pub item: RawLineItem,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomsValueResponse {
    pub line_id: String,
    pub incoterm: String,
    pub formula: String,
    #[schema(value_type = Object)]
    pub allocation: CostAllocation,
    #[schema(value_type = String)]
    pub customs_value: Money,
    #[schema(value_type = Object)]
    pub rates: TariffRates,
    pub insurance_estimated: bool,
    #[schema(value_type = Vec<Object>)]
    pub warnings: Vec<ValuationWarning>,
}

/// Body of `POST /v1/valuation/line-tax`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LineTaxRequest {
    #[schema(value_type = String)]
    pub customs_value: RawAmount,
    #[schema(value_type = Object)]
    #[serde(default)]
    pub rates: RawRates,
}

/// Body of `POST /v1/valuation/summary`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SummaryRequest {
    /// `"40"` (default) or `"42"`.
    #[schema(value_type = Option<String>)]
    #[serde(default)]
    pub clearance_type: Option<RawAmount>,
    #[schema(value_type = Option<String>)]
    #[serde(default)]
    pub prepaid_duties: Option<RawAmount>,
    #[schema(value_type = Vec<Object>)]
    #[serde(default)]
    pub items: Vec<ValuedLineItem>,
}

impl Validate for SummaryRequest {
    fn validate(&self) -> Result<(), String> {
        if self.items.len() > MAX_ITEMS {
            return Err(format!("items must not exceed {MAX_ITEMS}, got {}", self.items.len()));
        }
        for (index, item) in self.items.iter().enumerate() {
            item.validate(&format!("items[{index}]"))
                .map_err(|err| err.to_string())?;
        }
        Ok(())
    }
}

/// One row of the Incoterm rule table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct IncotermRuleResponse {
    pub code: String,
    pub formula: String,
    /// Cost legs the formula reads, in formula order.
    pub legs: Vec<String>,
    pub requires_insurance: bool,
    pub reverses_embedded_taxes: bool,
}

impl From<Incoterm> for IncotermRuleResponse {
    fn from(term: Incoterm) -> Self {
        let rule = term.rule();
        Self {
            code: term.as_str().to_string(),
            formula: term.formula().to_string(),
            legs: rule.legs().into_iter().map(|leg| leg.as_str().to_string()).collect(),
            requires_insurance: term.requires_insurance(),
            reverses_embedded_taxes: rule.reverses_embedded_taxes,
        }
    }
}

// -- Router ------------------------------------------------------------------

/// Build the valuation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/valuation/shipments", post(value_shipment_handler))
        .route("/v1/valuation/customs-value", post(customs_value_handler))
        .route("/v1/valuation/line-tax", post(line_tax_handler))
        .route("/v1/valuation/summary", post(summary_handler))
        .route("/v1/valuation/incoterms", get(list_incoterms))
}

// -- Handlers ----------------------------------------------------------------

/// POST /v1/valuation/shipments: value a whole shipment.
///
/// Item-level failures do not fail the request; they are listed in
/// `data.failures` and `data.needs_review`.
#[utoipa::path(
    post,
    path = "/v1/valuation/shipments",
    request_body = ValueShipmentRequest,
    responses(
        (status = 200, description = "Shipment valued", body = crate::envelope::EnvelopeDoc),
        (status = 422, description = "Unknown incoterm or malformed terms",
            body = crate::envelope::EnvelopeDoc),
    ),
    tag = "valuation"
)]
pub async fn value_shipment_handler(
    State(state): State<AppState>,
    body: Result<Json<ValueShipmentRequest>, JsonRejection>,
) -> Result<Json<Envelope<ShipmentValuation>>, AppError> {
    let body = extract_validated_json(body)?;
    let request = ShipmentRequest {
        terms: body.terms,
        items: body.items,
    };
    let valuation = value_shipment(&request, &state.valuation, state.tariffs.as_ref())?;
    tracing::info!(
        incoterm = %valuation.terms.incoterm,
        items = valuation.items.len(),
        failures = valuation.failures.len(),
        digest = %valuation.digest,
        "shipment valued"
    );
    Ok(Json(Envelope::ok(valuation)))
}

/// POST /v1/valuation/customs-value: customs value of a single item.
#[utoipa::path(
    post,
    path = "/v1/valuation/customs-value",
    request_body = CustomsValueRequest,
    responses(
        (status = 200, description = "Customs value computed",
            body = crate::envelope::EnvelopeDoc),
        (status = 422, description = "Invalid incoterm or item",
            body = crate::envelope::EnvelopeDoc),
    ),
    tag = "valuation"
)]
pub async fn customs_value_handler(
    State(state): State<AppState>,
    body: Result<Json<CustomsValueRequest>, JsonRejection>,
) -> Result<Json<Envelope<CustomsValueResponse>>, AppError> {
    let body = extract_json(body)?;
    let terms = body.terms.parse()?;
    let item = body.item.parse(0)?;

    let incoterm = terms.incoterm;
    let valuation = value_line_items(terms, vec![item], &state.valuation, state.tariffs.as_ref())?;
    if let Some(failure) = valuation.failures.first() {
        return Err(ValuationError::invalid_input("item", &failure.message).into());
    }
    let insurance_estimated = valuation.insurance_estimated;
    let valued = valuation
        .items
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Internal("single-item valuation produced no item".into()))?;

    Ok(Json(Envelope::ok(CustomsValueResponse {
        line_id: valued.line_id,
        incoterm: incoterm.as_str().to_string(),
        formula: incoterm.formula().to_string(),
        allocation: valued.allocation,
        customs_value: valued.customs_value,
        rates: valued.rates,
        insurance_estimated,
        warnings: valued.warnings,
    })))
}

/// POST /v1/valuation/line-tax: duty, VAT and other taxes on a customs value.
#[utoipa::path(
    post,
    path = "/v1/valuation/line-tax",
    request_body = LineTaxRequest,
    responses(
        (status = 200, description = "Line tax computed", body = crate::envelope::EnvelopeDoc),
        (status = 422, description = "Malformed amount or rate",
            body = crate::envelope::EnvelopeDoc),
    ),
    tag = "valuation"
)]
pub async fn line_tax_handler(
    State(state): State<AppState>,
    body: Result<Json<LineTaxRequest>, JsonRejection>,
) -> Result<Json<Envelope<LineItemTax>>, AppError> {
    let body = extract_json(body)?;
    let customs_value = parse_money("customs_value", &body.customs_value)?
        .round_to(state.valuation.money_scale);
    let rates = body.rates.parse("rates")?;
    let tax = compute_line_item_tax(customs_value, &rates, &state.valuation);
    Ok(Json(Envelope::ok(tax)))
}

/// POST /v1/valuation/summary: aggregate already-valued items.
#[utoipa::path(
    post,
    path = "/v1/valuation/summary",
    request_body = SummaryRequest,
    responses(
        (status = 200, description = "Shipment summary", body = crate::envelope::EnvelopeDoc),
        (status = 422, description = "Invalid clearance type, prepaid amount or item",
            body = crate::envelope::EnvelopeDoc),
    ),
    tag = "valuation"
)]
pub async fn summary_handler(
    State(state): State<AppState>,
    body: Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<Json<Envelope<ShipmentSummary>>, AppError> {
    let scale = state.valuation.money_scale;
    let body = extract_validated_json(body)?;
    let clearance_type = match &body.clearance_type {
        Some(code) => code
            .as_code()
            .parse::<ClearanceType>()
            .map_err(ValuationError::from)?,
        None => ClearanceType::default(),
    };
    let prepaid = match &body.prepaid_duties {
        Some(raw) => Some(parse_money("prepaid_duties", raw)?.round_to(scale)),
        None => None,
    };
    let summary = aggregate_shipment(&body.items, clearance_type)
        .with_prepaid_duties(prepaid)
        .at_scale(scale);
    Ok(Json(Envelope::ok(summary)))
}

/// GET /v1/valuation/incoterms: the supported Incoterms and their formulas.
#[utoipa::path(
    get,
    path = "/v1/valuation/incoterms",
    responses(
        (status = 200, description = "Incoterm rule table", body = crate::envelope::EnvelopeDoc),
    ),
    tag = "valuation"
)]
pub async fn list_incoterms() -> Json<Envelope<Vec<IncotermRuleResponse>>> {
    let rules = Incoterm::all().iter().copied().map(IncotermRuleResponse::from).collect();
    Json(Envelope::ok(rules))
}

fn parse_money(field: &str, raw: &RawAmount) -> Result<Money, ValuationError> {
    let amount = raw.to_decimal(field)?;
    Ok(Money::bounded(field, amount)?)
}
