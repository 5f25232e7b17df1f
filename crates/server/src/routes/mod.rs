//! Route modules and the shared response / error shapes.

pub mod availability;
pub mod bookings;
pub mod health;
pub mod webhooks;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use calbridge_domain::CalBridgeError;
use serde::Serialize;
use serde_json::json;

/// Success envelope: `{"ok": true, "data": ...}`.
pub fn ok<T: Serialize>(data: T) -> Response {
    Json(json!({ "ok": true, "data": data })).into_response()
}

/// Bare acknowledgement without a data payload: `{"ok": true}`.
pub fn acknowledged() -> Response {
    Json(json!({ "ok": true })).into_response()
}

/// Domain error carried out of a handler.
///
/// The conversion to a status code is the single place the error taxonomy
/// meets HTTP; handlers only ever speak `CalBridgeError`.
pub struct ApiError(pub CalBridgeError);

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            CalBridgeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CalBridgeError::Auth(_) => StatusCode::UNAUTHORIZED,
            CalBridgeError::NotFound(_) => StatusCode::NOT_FOUND,
            CalBridgeError::Conflict(_) => StatusCode::CONFLICT,
            CalBridgeError::Upstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "ok": false, "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl From<CalBridgeError> for ApiError {
    fn from(err: CalBridgeError) -> Self {
        Self(err)
    }
}
