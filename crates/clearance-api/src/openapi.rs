//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into one OpenAPI document served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the valuation service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clearance API: Customs Valuation & Tax Engine",
        version = "0.1.0",
        description = "Customs value under the twelve Incoterms, duty/VAT cascade, shipment totals."
    ),
    paths(
        crate::routes::valuation::value_shipment_handler,
        crate::routes::valuation::customs_value_handler,
        crate::routes::valuation::line_tax_handler,
        crate::routes::valuation::summary_handler,
        crate::routes::valuation::list_incoterms,
    ),
    components(schemas(
        crate::envelope::EnvelopeDoc,
        crate::routes::valuation::ValueShipmentRequest,
        crate::routes::valuation::CustomsValueRequest,
        crate::routes::valuation::CustomsValueResponse,
        crate::routes::valuation::LineTaxRequest,
        crate::routes::valuation::SummaryRequest,
        crate::routes::valuation::IncotermRuleResponse,
    )),
    tags(
        (name = "valuation", description = "Customs valuation and import tax"),
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
