//! Liveness endpoint

use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde_json::json;

use crate::routes::{ok, ApiError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health - includes a `SELECT 1` round-trip when a database is wired
async fn health(State(state): State<AppState>) -> Result<Response, ApiError> {
    if let Some(db) = &state.db {
        db.health_check()?;
    }
    Ok(ok(json!({ "status": "ok" })))
}
