//! Reconciliation engine - core business logic
//!
//! Merges verified, normalized provider events into the local appointment
//! store. Correctness under at-least-once delivery comes from the
//! match-then-upsert logic being safe to replay, not from locking: every
//! lookup goes through the dual-key match (provider uid OR legacy booking id)
//! before any write, and a missing match is never an error.

use std::sync::Arc;

use calbridge_domain::{
    normalize_status, AppointmentStatus, CanonicalEvent, EventKind, EventPatch, NewAppointment,
    Result,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::ports::{AppointmentRepository, ServiceMappingRepository};

/// What the engine did with one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A brand-new row was inserted.
    Created { appointment_id: String },
    /// An existing row was matched and patched in place.
    Updated { appointment_id: String },
    /// A reschedule moved an existing row onto a fresh provider uid.
    Renamed { appointment_id: String },
    /// A cancellation landed on a known row.
    Cancelled { appointment_id: String },
    /// The event was acknowledged without writing anything.
    Skipped(SkipReason),
}

/// Why an event was acknowledged as a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Provider test pings carry no uid.
    MissingUid,
    /// No event-type mapping, so a brand-new row has no tenant to attach to.
    UnresolvedTenant,
    /// The uid matched no local row; routine under partial local history.
    NoMatchingRow,
    /// A create-shaped event arrived without usable timing fields.
    MissingSchedule,
}

impl SkipReason {
    /// Stable label for structured logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingUid => "missing_uid",
            Self::UnresolvedTenant => "unresolved_tenant",
            Self::NoMatchingRow => "no_matching_row",
            Self::MissingSchedule => "missing_schedule",
        }
    }
}

/// Reconciliation service
pub struct ReconciliationService {
    appointments: Arc<dyn AppointmentRepository>,
    mappings: Arc<dyn ServiceMappingRepository>,
}

impl ReconciliationService {
    /// Create a new reconciliation service
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        mappings: Arc<dyn ServiceMappingRepository>,
    ) -> Self {
        Self { appointments, mappings }
    }

    /// Apply one canonical event to the appointment store.
    ///
    /// Idempotent: replaying the same event produces the same final row
    /// state. Storage failures propagate; a missing match does not.
    pub async fn apply(&self, event: &CanonicalEvent) -> Result<ReconcileOutcome> {
        let Some(uid) = event.uid.clone() else {
            debug!(trigger = %event.raw_status, "event without uid acknowledged as no-op");
            return Ok(ReconcileOutcome::Skipped(SkipReason::MissingUid));
        };

        let outcome = match event.kind {
            EventKind::Created => self.create_or_update(&uid, event, None).await?,
            EventKind::Rescheduled => self.apply_rescheduled(&uid, event).await?,
            EventKind::Cancelled => self.apply_cancelled(&uid).await?,
        };

        info!(uid = %uid, kind = ?event.kind, outcome = ?outcome, "event reconciled");
        Ok(outcome)
    }

    /// Shared path for creation events and reschedule redelivery: match by
    /// either key and patch, or insert a fresh row when a tenant resolves.
    async fn create_or_update(
        &self,
        uid: &str,
        event: &CanonicalEvent,
        status_override: Option<AppointmentStatus>,
    ) -> Result<ReconcileOutcome> {
        let status = status_override.unwrap_or_else(|| normalize_status(&event.raw_status));

        if let Some(row) = self.appointments.find_by_any_uid(uid).await? {
            self.appointments.apply_event(&row.id, event_patch(uid, event, status)).await?;
            return Ok(ReconcileOutcome::Updated { appointment_id: row.id });
        }

        let mapping = match event.event_type_id {
            Some(event_type_id) => self.mappings.find_by_event_type(event_type_id).await?,
            None => None,
        };
        let Some(mapping) = mapping else {
            warn!(uid, event_type_id = ?event.event_type_id, "no tenant resolved; create suppressed");
            return Ok(ReconcileOutcome::Skipped(SkipReason::UnresolvedTenant));
        };

        let (Some(start_ts), Some(end_ts)) = (event.start_ts, event.end_ts) else {
            warn!(uid, "create-shaped event without timing fields; nothing to insert");
            return Ok(ReconcileOutcome::Skipped(SkipReason::MissingSchedule));
        };

        let appointment_id = Uuid::now_v7().to_string();
        self.appointments
            .insert(NewAppointment {
                id: appointment_id.clone(),
                business_id: mapping.business_id,
                service_id: Some(mapping.service_id),
                provider_booking_uid: Some(uid.to_string()),
                legacy_booking_id: None,
                status,
                start_ts,
                end_ts,
                caller_name: event.attendee_name.clone(),
                caller_phone: event.attendee_phone.clone(),
            })
            .await?;

        Ok(ReconcileOutcome::Created { appointment_id })
    }

    async fn apply_rescheduled(&self, uid: &str, event: &CanonicalEvent) -> Result<ReconcileOutcome> {
        if let Some(old_uid) = &event.replaces_uid {
            // Normal path: the provider issues a fresh uid per reschedule, so
            // the row lives under the old one. Rename it to the new uid.
            if let Some(row) = self.appointments.find_by_any_uid(old_uid).await? {
                self.appointments
                    .apply_event(&row.id, event_patch(uid, event, AppointmentStatus::Rescheduled))
                    .await?;
                return Ok(ReconcileOutcome::Renamed { appointment_id: row.id });
            }

            // Old uid unknown: a previous delivery already renamed the row, or
            // it was never local. Treat the new uid as a fresh create-or-update.
            debug!(old_uid = %old_uid, uid, "replaced uid not found; falling back to new uid");
            return self.create_or_update(uid, event, Some(AppointmentStatus::Rescheduled)).await;
        }

        // Some provider event shapes omit the old identifier entirely and
        // expect uid-based matching only.
        match self.appointments.find_by_any_uid(uid).await? {
            Some(row) => {
                self.appointments
                    .apply_event(&row.id, event_patch(uid, event, AppointmentStatus::Rescheduled))
                    .await?;
                Ok(ReconcileOutcome::Updated { appointment_id: row.id })
            }
            None => Ok(ReconcileOutcome::Skipped(SkipReason::NoMatchingRow)),
        }
    }

    async fn apply_cancelled(&self, uid: &str) -> Result<ReconcileOutcome> {
        match self.appointments.find_by_any_uid(uid).await? {
            Some(row) => {
                // Narrow write: only the status column. A concurrent booking
                // patch back-filling the provider uid must not clobber this.
                self.appointments.set_status(&row.id, AppointmentStatus::Cancelled).await?;
                Ok(ReconcileOutcome::Cancelled { appointment_id: row.id })
            }
            None => Ok(ReconcileOutcome::Skipped(SkipReason::NoMatchingRow)),
        }
    }
}

fn event_patch(uid: &str, event: &CanonicalEvent, status: AppointmentStatus) -> EventPatch {
    EventPatch {
        provider_booking_uid: Some(uid.to_string()),
        status: Some(status),
        start_ts: event.start_ts,
        end_ts: event.end_ts,
        caller_name: event.attendee_name.clone(),
        caller_phone: event.attendee_phone.clone(),
    }
}
