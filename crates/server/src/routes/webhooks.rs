//! Provider webhook intake
//!
//! Signature verification runs against the raw body bytes before any JSON
//! parsing; re-serializing the parsed body would change the bytes and break
//! the HMAC.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::post;
use axum::Router;
use calbridge_core::verify_webhook_signature;
use calbridge_domain::{parse_webhook_event, CalBridgeError};
use tracing::{debug, info, warn};

use crate::routes::{acknowledged, ApiError};
use crate::state::AppState;

/// Header names the provider has used across webhook generations.
const SIGNATURE_HEADERS: [&str; 3] = ["x-cal-signature", "cal-signature-256", "cal-signature"];

pub fn router() -> Router<AppState> {
    Router::new().route("/webhooks/cal", post(receive))
}

fn signature_header(headers: &HeaderMap) -> Option<&str> {
    SIGNATURE_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|value| value.to_str().ok())
}

/// POST /webhooks/cal - verify, normalize, reconcile
async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let header_value = signature_header(&headers);
    if !verify_webhook_signature(&body, header_value, &state.webhook.secret) {
        warn!(header_present = header_value.is_some(), "webhook signature rejected");
        return Err(CalBridgeError::Auth("webhook signature verification failed".into()).into());
    }

    let payload: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        CalBridgeError::InvalidInput(format!("webhook body is not valid JSON: {e}"))
    })?;

    let event = parse_webhook_event(&payload);
    debug!(kind = ?event.kind, uid = ?event.uid, "webhook event normalized");

    let outcome = state.reconciler.apply(&event).await?;
    info!(?outcome, "webhook reconciled");

    Ok(acknowledged())
}
