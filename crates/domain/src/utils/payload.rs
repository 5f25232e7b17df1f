//! Webhook payload normalization.
//!
//! Provider webhooks carry the same information under several synonym field
//! names depending on API generation and event shape. This module resolves
//! every synonym (first present wins) into one [`CanonicalEvent`] so nothing
//! downstream ever touches the raw payload.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::status::{classify_trigger, normalize_status};
use crate::types::CanonicalEvent;

/// Normalize a raw webhook body into a canonical event record.
///
/// Total over any JSON value. Missing pieces come back as `None`; a payload
/// with no resolvable uid is still a valid event (the engine acknowledges it
/// as a no-op, matching the provider's occasional malformed test pings).
pub fn parse_webhook_event(body: &Value) -> CanonicalEvent {
    let trigger = first_str(body, &["type", "triggerEvent", "event"]).unwrap_or_default();

    let data = first_object(body, &["data", "payload", "booking"]);
    let empty = Value::Null;
    let data = data.unwrap_or(&empty);

    let uid = first_str(data, &["uid", "bookingUid"])
        .or_else(|| data.get("booking").and_then(|b| first_str(b, &["uid"])));

    let replaces_uid =
        first_str(data, &["replacesBookingUid", "replacedBookingUid", "oldBookingUid"]);

    let event_type_id = data
        .get("eventTypeId")
        .and_then(Value::as_i64)
        .or_else(|| data.get("eventType").and_then(|et| et.get("id")).and_then(Value::as_i64));

    let start_ts = first_str(data, &["startTime", "start"]).and_then(|s| parse_instant(&s));
    let end_ts = first_str(data, &["endTime", "end"]).and_then(|s| parse_instant(&s));

    let attendee = data.get("attendees").and_then(|a| a.get(0));
    let attendee_name = attendee.and_then(|a| first_str(a, &["name", "fullName"]));
    let attendee_phone = attendee.and_then(|a| first_str(a, &["phone"]));

    // The explicit booking status beats the trigger string when present.
    let raw_status = first_str(data, &["status"]).unwrap_or_else(|| trigger.clone());

    CanonicalEvent {
        kind: classify_trigger(&trigger),
        uid,
        replaces_uid,
        event_type_id,
        start_ts,
        end_ts,
        attendee_name,
        attendee_phone,
        raw_status,
    }
}

/// Convenience: the canonical status the event implies.
pub fn event_status(event: &CanonicalEvent) -> crate::types::AppointmentStatus {
    normalize_status(&event.raw_status)
}

fn first_str(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| value.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_object<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|key| value.get(*key)).find(|v| v.is_object())
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc))
}
