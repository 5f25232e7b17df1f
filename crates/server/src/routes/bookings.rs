//! Booking creation endpoint

use axum::extract::State;
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use calbridge_domain::{BookingRequest, CalBridgeError, Invitee};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::routes::{ok, ApiError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/bookings", post(create))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InviteeBody {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

/// Request body. Fields are optional so a missing one produces a
/// field-specific validation message instead of a generic decode error.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBookingBody {
    event_type_id: Option<i64>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    invitee: Option<InviteeBody>,
    time_zone: Option<String>,
    notes: Option<String>,
}

fn required<T>(field: Option<T>, name: &str) -> Result<T, ApiError> {
    field.ok_or_else(|| CalBridgeError::InvalidInput(format!("{name} is required")).into())
}

/// POST /bookings - validate, resolve the service, book local-first
async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateBookingBody>,
) -> Result<Response, ApiError> {
    let event_type_id = required(body.event_type_id, "eventTypeId")?;
    let start = required(body.start, "start")?;
    let end = required(body.end, "end")?;
    let invitee = required(body.invitee, "invitee")?;
    let name = required(invitee.name, "invitee.name")?;

    // The wire shape speaks provider event types; the orchestrator speaks
    // services. Resolve the mapping here so an unmapped event type fails
    // before any write.
    let mapping = state.mappings.find_by_event_type(event_type_id).await?.ok_or_else(|| {
        CalBridgeError::InvalidInput(format!(
            "eventTypeId {event_type_id} has no service mapping"
        ))
    })?;

    let request = BookingRequest {
        service_id: mapping.service_id,
        start_ts: start,
        end_ts: end,
        invitee: Invitee { name, email: invitee.email, phone: invitee.phone },
        time_zone: body.time_zone,
        notes: body.notes,
    };

    let confirmation = state.bookings.book(&request).await?;
    Ok(ok(confirmation))
}
