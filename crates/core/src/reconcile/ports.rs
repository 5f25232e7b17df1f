//! Port interfaces for the appointment record store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use calbridge_domain::{
    Appointment, AppointmentStatus, EventPatch, NewAppointment, Result, ServiceMapping,
};

/// Trait for appointment persistence.
///
/// Write methods are deliberately narrow (one per write path) so concurrent
/// webhook and booking writes touch disjoint columns wherever possible.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Find the appointment matching `uid` against either the provider
    /// booking uid or the legacy booking id.
    ///
    /// When both keys could match different rows, the most recently updated
    /// row wins.
    async fn find_by_any_uid(&self, uid: &str) -> Result<Option<Appointment>>;

    /// Insert a new appointment row.
    async fn insert(&self, appointment: NewAppointment) -> Result<()>;

    /// Apply a provider event patch to an existing row. Fields left `None`
    /// in the patch keep their current values.
    async fn apply_event(&self, id: &str, patch: EventPatch) -> Result<()>;

    /// Set only the status of a row.
    async fn set_status(&self, id: &str, status: AppointmentStatus) -> Result<()>;

    /// Back-fill only the provider booking uid after the provider confirms a
    /// locally created booking.
    async fn set_provider_uid(&self, id: &str, uid: &str) -> Result<()>;

    /// Non-cancelled appointments of a tenant whose `[start_ts, end_ts)`
    /// interval intersects `[start, end)`.
    async fn find_overlapping(
        &self,
        business_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>>;

    /// All appointments of a tenant starting within `[start, end)`, ordered
    /// by start time.
    async fn find_in_range(
        &self,
        business_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>>;
}

/// Trait for the service ↔ provider event-type lookup table
#[async_trait]
pub trait ServiceMappingRepository: Send + Sync {
    /// Resolve a provider event-type id to the local service and tenant.
    async fn find_by_event_type(&self, provider_event_type_id: i64)
        -> Result<Option<ServiceMapping>>;

    /// Resolve a local service id to its provider event type.
    async fn find_by_service(&self, service_id: &str) -> Result<Option<ServiceMapping>>;
}
