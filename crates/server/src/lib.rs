//! # CalBridge Server
//!
//! HTTP surface for the reconciliation engine and booking orchestrator.
//!
//! Routes:
//! - `POST /webhooks/cal` - signature-checked provider webhook intake
//! - `POST /availability` - slot availability query, proxied to the provider
//! - `POST /bookings` - local-first booking creation
//! - `GET /health` - liveness probe with a database round-trip

pub mod routes;
pub mod state;

use axum::Router;

pub use state::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::webhooks::router())
        .merge(routes::availability::router())
        .merge(routes::bookings::router())
        .merge(routes::health::router())
        .with_state(state)
}
