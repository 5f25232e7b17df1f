//! Slot availability endpoint

use axum::extract::State;
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use calbridge_domain::CalBridgeError;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::routes::{ok, ApiError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/availability", post(query))
}

/// Request body. Fields are optional so a missing one produces a
/// field-specific validation message instead of a generic decode error.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityBody {
    event_type_id: Option<i64>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    time_zone: Option<String>,
}

fn required<T>(field: Option<T>, name: &str) -> Result<T, ApiError> {
    field.ok_or_else(|| CalBridgeError::InvalidInput(format!("{name} is required")).into())
}

/// POST /availability - exact-instant slot check against the provider
async fn query(
    State(state): State<AppState>,
    Json(body): Json<AvailabilityBody>,
) -> Result<Response, ApiError> {
    let event_type_id = required(body.event_type_id, "eventTypeId")?;
    let start = required(body.start, "start")?;
    let end = required(body.end, "end")?;

    let window = state
        .provider
        .query_availability(event_type_id, start, end, body.time_zone.as_deref())
        .await?;

    Ok(ok(window))
}
