//! Common data types used throughout the application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical appointment status.
///
/// Transitions are deliberately unconstrained: the provider is the calendar
/// authority, so a cancelled appointment can be resurrected by a later
/// reschedule event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Booked,
    Rescheduled,
    Cancelled,
    Inquiry,
}

impl AppointmentStatus {
    /// Stable string form used in the database and in API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::Rescheduled => "rescheduled",
            Self::Cancelled => "cancelled",
            Self::Inquiry => "inquiry",
        }
    }

    /// Parse the stable string form back into a status.
    ///
    /// Unknown strings map to `Inquiry` so a hand-edited row never breaks a
    /// read path.
    pub fn parse(value: &str) -> Self {
        match value {
            "booked" => Self::Booked,
            "rescheduled" => Self::Rescheduled,
            "cancelled" => Self::Cancelled,
            _ => Self::Inquiry,
        }
    }
}

/// Kind of provider lifecycle event, derived from the webhook trigger string.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Created,
    Rescheduled,
    Cancelled,
}

/// A locally stored appointment row.
///
/// Created either by the booking flow (no provider uid yet) or by the
/// reconciliation engine from a provider event. Rows are never deleted;
/// cancellation is a status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub business_id: String,
    pub service_id: Option<String>,
    /// Provider-assigned booking uid; replaced when a reschedule issues a
    /// fresh uid.
    pub provider_booking_uid: Option<String>,
    /// Locally assigned placeholder captured before provider confirmation.
    pub legacy_booking_id: Option<String>,
    pub status: AppointmentStatus,
    pub start_ts: DateTime<Utc>,
    pub end_ts: DateTime<Utc>,
    pub caller_name: Option<String>,
    pub caller_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a new appointment row.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub id: String,
    pub business_id: String,
    pub service_id: Option<String>,
    pub provider_booking_uid: Option<String>,
    pub legacy_booking_id: Option<String>,
    pub status: AppointmentStatus,
    pub start_ts: DateTime<Utc>,
    pub end_ts: DateTime<Utc>,
    pub caller_name: Option<String>,
    pub caller_phone: Option<String>,
}

/// Narrow update applied to an existing row when a provider event matches it.
///
/// Only the fields a webhook event owns; tenant and service assignment are
/// never rewritten by reconciliation.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub provider_booking_uid: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub start_ts: Option<DateTime<Utc>>,
    pub end_ts: Option<DateTime<Utc>>,
    pub caller_name: Option<String>,
    pub caller_phone: Option<String>,
}

/// One canonical record produced from a raw provider webhook payload.
///
/// The provider sends several synonym field names per concept; payload
/// normalization resolves them all before anything else runs, so no raw
/// heterogeneous maps travel past the webhook boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalEvent {
    pub kind: EventKind,
    pub uid: Option<String>,
    pub replaces_uid: Option<String>,
    pub event_type_id: Option<i64>,
    pub start_ts: Option<DateTime<Utc>>,
    pub end_ts: Option<DateTime<Utc>>,
    pub attendee_name: Option<String>,
    pub attendee_phone: Option<String>,
    pub raw_status: String,
}

/// Mapping between a local service definition and its provider event type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceMapping {
    pub service_id: String,
    pub business_id: String,
    pub provider_event_type_id: i64,
}

/// Attendee identity supplied by the booking flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitee {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A booking request entering the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub service_id: String,
    pub start_ts: DateTime<Utc>,
    pub end_ts: DateTime<Utc>,
    pub invitee: Invitee,
    pub time_zone: Option<String>,
    pub notes: Option<String>,
}

/// Confirmed provider booking returned by the proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderBooking {
    pub booking_id: String,
    pub booking_url: Option<String>,
    pub raw: serde_json::Value,
}

/// Availability answer for a requested slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub available: bool,
    pub slots: Vec<DateTime<Utc>>,
}
