//! Mock repository implementations for testing
//!
//! Provides in-memory mocks for the record-store ports, enabling
//! deterministic unit tests without database dependencies.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use calbridge_core::{AppointmentRepository, ServiceMappingRepository};
use calbridge_domain::{
    Appointment, AppointmentStatus, EventPatch, NewAppointment, Result as DomainResult,
    ServiceMapping,
};
use chrono::{DateTime, Duration, Utc};

/// In-memory mock for `AppointmentRepository`.
///
/// Mirrors the SQLite repository's semantics: dual-key matching with a
/// most-recently-updated tie-break, narrow patch methods, interval overlap.
#[derive(Default, Clone)]
pub struct MockAppointmentRepository {
    rows: Arc<Mutex<Vec<Appointment>>>,
}

impl MockAppointmentRepository {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience helper for seeding a single appointment.
    pub fn with_appointment(self, appointment: Appointment) -> Self {
        self.rows.lock().unwrap().push(appointment);
        self
    }

    /// Snapshot of current rows, for assertions.
    pub fn rows(&self) -> Vec<Appointment> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl AppointmentRepository for MockAppointmentRepository {
    async fn find_by_any_uid(&self, uid: &str) -> DomainResult<Option<Appointment>> {
        let rows = self.rows.lock().unwrap();
        let mut matches: Vec<&Appointment> = rows
            .iter()
            .filter(|row| {
                row.provider_booking_uid.as_deref() == Some(uid)
                    || row.legacy_booking_id.as_deref() == Some(uid)
            })
            .collect();
        matches.sort_by_key(|row| std::cmp::Reverse(row.updated_at));
        Ok(matches.first().map(|row| (*row).clone()))
    }

    async fn insert(&self, appointment: NewAppointment) -> DomainResult<()> {
        let now = Utc::now();
        self.rows.lock().unwrap().push(Appointment {
            id: appointment.id,
            business_id: appointment.business_id,
            service_id: appointment.service_id,
            provider_booking_uid: appointment.provider_booking_uid,
            legacy_booking_id: appointment.legacy_booking_id,
            status: appointment.status,
            start_ts: appointment.start_ts,
            end_ts: appointment.end_ts,
            caller_name: appointment.caller_name,
            caller_phone: appointment.caller_phone,
            created_at: now,
            updated_at: now,
        });
        Ok(())
    }

    async fn apply_event(&self, id: &str, patch: EventPatch) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|row| row.id == id) {
            if let Some(uid) = patch.provider_booking_uid {
                row.provider_booking_uid = Some(uid);
            }
            if let Some(status) = patch.status {
                row.status = status;
            }
            if let Some(start_ts) = patch.start_ts {
                row.start_ts = start_ts;
            }
            if let Some(end_ts) = patch.end_ts {
                row.end_ts = end_ts;
            }
            if let Some(name) = patch.caller_name {
                row.caller_name = Some(name);
            }
            if let Some(phone) = patch.caller_phone {
                row.caller_phone = Some(phone);
            }
            // Bias the clock forward so tie-breaks are deterministic even
            // within one test's timestamp resolution.
            row.updated_at = Utc::now() + Duration::milliseconds(1);
        }
        Ok(())
    }

    async fn set_status(&self, id: &str, status: AppointmentStatus) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|row| row.id == id) {
            row.status = status;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_provider_uid(&self, id: &str, uid: &str) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|row| row.id == id) {
            row.provider_booking_uid = Some(uid.to_string());
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn find_overlapping(
        &self,
        business_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<Appointment>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|row| {
                row.business_id == business_id
                    && row.status != AppointmentStatus::Cancelled
                    && row.start_ts < end
                    && row.end_ts > start
            })
            .cloned()
            .collect())
    }

    async fn find_in_range(
        &self,
        business_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<Appointment>> {
        let rows = self.rows.lock().unwrap();
        let mut found: Vec<Appointment> = rows
            .iter()
            .filter(|row| {
                row.business_id == business_id && row.start_ts >= start && row.start_ts < end
            })
            .cloned()
            .collect();
        found.sort_by_key(|row| row.start_ts);
        Ok(found)
    }
}

/// In-memory mock for `ServiceMappingRepository`.
#[derive(Default, Clone)]
pub struct MockServiceMappingRepository {
    mappings: Arc<Vec<ServiceMapping>>,
}

impl MockServiceMappingRepository {
    /// Create a new mock seeded with the provided mappings.
    pub fn new(mappings: Vec<ServiceMapping>) -> Self {
        Self { mappings: Arc::new(mappings) }
    }
}

#[async_trait]
impl ServiceMappingRepository for MockServiceMappingRepository {
    async fn find_by_event_type(
        &self,
        provider_event_type_id: i64,
    ) -> DomainResult<Option<ServiceMapping>> {
        Ok(self
            .mappings
            .iter()
            .find(|m| m.provider_event_type_id == provider_event_type_id)
            .cloned())
    }

    async fn find_by_service(&self, service_id: &str) -> DomainResult<Option<ServiceMapping>> {
        Ok(self.mappings.iter().find(|m| m.service_id == service_id).cloned())
    }
}

/// Build an appointment row for seeding mocks.
pub fn appointment(
    id: &str,
    business_id: &str,
    status: AppointmentStatus,
    start_ts: DateTime<Utc>,
    end_ts: DateTime<Utc>,
) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: id.to_string(),
        business_id: business_id.to_string(),
        service_id: None,
        provider_booking_uid: None,
        legacy_booking_id: None,
        status,
        start_ts,
        end_ts,
        caller_name: None,
        caller_phone: None,
        created_at: now,
        updated_at: now,
    }
}
