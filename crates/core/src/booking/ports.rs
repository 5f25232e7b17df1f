//! Port interface for the outbound scheduling provider

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use calbridge_domain::{AvailabilityWindow, BookingRequest, ProviderBooking, Result};

/// Trait for the provider's calendar operations.
///
/// Implementations must carry a bounded timeout on every call; an exhausted
/// provider surfaces as `CalBridgeError::Upstream`, never as a hang.
#[async_trait]
pub trait SchedulingProvider: Send + Sync {
    /// Query candidate slots for an event type and report whether the exact
    /// requested start instant is among them.
    async fn query_availability(
        &self,
        event_type_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        time_zone: Option<&str>,
    ) -> Result<AvailabilityWindow>;

    /// Create a booking on the provider's calendar.
    async fn create_booking(
        &self,
        event_type_id: i64,
        request: &BookingRequest,
    ) -> Result<ProviderBooking>;
}
