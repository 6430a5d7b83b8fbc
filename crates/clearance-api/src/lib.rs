//! # clearance-api: HTTP Service for the Valuation Engine
//!
//! Exposes the customs valuation engine over HTTP for the back office:
//!
//! - `POST /v1/valuation/shipments` values a full shipment
//! - `POST /v1/valuation/customs-value` values one item
//! - `POST /v1/valuation/line-tax` runs the duty/VAT cascade on a customs value
//! - `POST /v1/valuation/summary` aggregates already-valued items
//! - `GET /v1/valuation/incoterms` lists the rule table
//!
//! Every JSON response is wrapped in the `{errCode, data, msg}` envelope
//! (see [`envelope`]). State is immutable and shared via `Arc`.

pub mod envelope;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::valuation::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe. State is loaded before the listener binds, so a
/// running server is ready.
async fn readiness() -> &'static str {
    "ready"
}
