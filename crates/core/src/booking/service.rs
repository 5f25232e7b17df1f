//! Booking orchestrator - core business logic
//!
//! Local-first booking flow: validate, guard against overlap, insert the
//! local row, then confirm with the provider and back-fill the returned
//! booking uid. The overlap check and the insert are not atomic; true
//! slot-level exclusion belongs to the provider's calendar, which is only
//! consulted after the local row exists.

use std::sync::Arc;

use calbridge_domain::{
    AppointmentStatus, BookingRequest, CalBridgeError, NewAppointment, Result,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::ports::SchedulingProvider;
use crate::reconcile::ports::{AppointmentRepository, ServiceMappingRepository};

/// Result of a fully confirmed booking.
#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub appointment_id: String,
    pub booking_id: String,
    pub booking_url: Option<String>,
    /// Untouched provider response body, kept for operator debugging.
    pub raw: serde_json::Value,
}

/// Booking orchestration service
pub struct BookingService {
    appointments: Arc<dyn AppointmentRepository>,
    mappings: Arc<dyn ServiceMappingRepository>,
    provider: Arc<dyn SchedulingProvider>,
}

impl BookingService {
    /// Create a new booking service
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        mappings: Arc<dyn ServiceMappingRepository>,
        provider: Arc<dyn SchedulingProvider>,
    ) -> Self {
        Self { appointments, mappings, provider }
    }

    /// Book an appointment locally and confirm it with the provider.
    ///
    /// Failure semantics: a validation or overlap failure happens before any
    /// write or network call. A provider failure after the local insert
    /// leaves the row in place, `Booked` and unconfirmed; the provider may
    /// have been told nothing, but the attendee may already have been told
    /// the time is reserved, so the row is not rolled back.
    pub async fn book(&self, request: &BookingRequest) -> Result<BookingConfirmation> {
        self.validate(request)?;

        let mapping =
            self.mappings.find_by_service(&request.service_id).await?.ok_or_else(|| {
                CalBridgeError::InvalidInput(format!(
                    "service '{}' has no provider event type mapping",
                    request.service_id
                ))
            })?;

        // Best-effort overlap guard; see module docs for the accepted race.
        let overlapping = self
            .appointments
            .find_overlapping(&mapping.business_id, request.start_ts, request.end_ts)
            .await?;
        if !overlapping.is_empty() {
            return Err(CalBridgeError::Conflict(
                "requested time overlaps an existing appointment".into(),
            ));
        }

        let appointment_id = Uuid::now_v7().to_string();
        let legacy_booking_id = Uuid::new_v4().to_string();

        self.appointments
            .insert(NewAppointment {
                id: appointment_id.clone(),
                business_id: mapping.business_id.clone(),
                service_id: Some(mapping.service_id.clone()),
                provider_booking_uid: None,
                legacy_booking_id: Some(legacy_booking_id),
                status: AppointmentStatus::Booked,
                start_ts: request.start_ts,
                end_ts: request.end_ts,
                caller_name: Some(request.invitee.name.clone()),
                caller_phone: request.invitee.phone.clone(),
            })
            .await?;

        let booking = match self
            .provider
            .create_booking(mapping.provider_event_type_id, request)
            .await
        {
            Ok(booking) => booking,
            Err(err) => {
                // Accepted inconsistency: the local reservation stays visible
                // without a provider uid until confirmation is retried.
                warn!(
                    appointment_id = %appointment_id,
                    error = %err,
                    "provider confirmation failed; local appointment left unconfirmed"
                );
                return Err(err);
            }
        };

        self.appointments.set_provider_uid(&appointment_id, &booking.booking_id).await?;

        info!(
            appointment_id = %appointment_id,
            booking_id = %booking.booking_id,
            "booking confirmed with provider"
        );

        Ok(BookingConfirmation {
            appointment_id,
            booking_id: booking.booking_id,
            booking_url: booking.booking_url,
            raw: booking.raw,
        })
    }

    /// Fail fast with a field-specific message before any write or network
    /// call. Checked in the order the booking form presents the fields.
    fn validate(&self, request: &BookingRequest) -> Result<()> {
        if request.service_id.trim().is_empty() {
            return Err(CalBridgeError::InvalidInput("service is required".into()));
        }
        if request.end_ts <= request.start_ts {
            return Err(CalBridgeError::InvalidInput(
                "end time must be after start time".into(),
            ));
        }
        if request.invitee.name.trim().is_empty() {
            return Err(CalBridgeError::InvalidInput("attendee name is required".into()));
        }
        Ok(())
    }
}
