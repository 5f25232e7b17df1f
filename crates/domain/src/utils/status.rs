//! Provider status and trigger normalization.
//!
//! The provider describes the same lifecycle moment with several literal
//! strings (`BOOKING_CANCELLED`, `MEETING_CANCELLED`, `BOOKING_REJECTED`, ...)
//! and the set grows over time. Both functions here classify by
//! case-insensitive substring so new variants of an existing family keep
//! working without a code change.

use crate::types::{AppointmentStatus, EventKind};

/// Map a raw provider status or event-type string onto the canonical
/// appointment status.
///
/// Total function; unknown strings default to `Booked`. That default is
/// deliberate: the only unclassified strings that reach this path in practice
/// are creation-shaped event types.
pub fn normalize_status(raw: &str) -> AppointmentStatus {
    let lower = raw.to_lowercase();
    if lower.contains("cancel") {
        AppointmentStatus::Cancelled
    } else if lower.contains("resched") {
        AppointmentStatus::Rescheduled
    } else if lower.contains("reject") || lower.contains("delet") {
        AppointmentStatus::Cancelled
    } else {
        AppointmentStatus::Booked
    }
}

/// Classify a webhook trigger string into the event kind the reconciliation
/// engine consumes.
///
/// Mirrors the priority order of [`normalize_status`]: any cancellation-family
/// substring wins, then reschedule, everything else is treated as a creation.
pub fn classify_trigger(trigger: &str) -> EventKind {
    let lower = trigger.to_lowercase();
    if lower.contains("cancel") || lower.contains("reject") || lower.contains("delet") {
        EventKind::Cancelled
    } else if lower.contains("resched") {
        EventKind::Rescheduled
    } else {
        EventKind::Created
    }
}
