//! Mock scheduling provider for testing

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use calbridge_core::SchedulingProvider;
use calbridge_domain::{
    AvailabilityWindow, BookingRequest, CalBridgeError, ProviderBooking, Result as DomainResult,
};
use chrono::{DateTime, Utc};
use serde_json::json;

/// In-memory mock for `SchedulingProvider`.
///
/// Records how many booking calls were made so tests can assert that the
/// orchestrator never reaches the provider on a rejected request.
#[derive(Default, Clone)]
pub struct MockSchedulingProvider {
    slots: Vec<DateTime<Utc>>,
    fail_bookings: bool,
    booking_calls: Arc<AtomicUsize>,
}

impl MockSchedulingProvider {
    /// Provider answering availability queries with the given slot list.
    pub fn with_slots(slots: Vec<DateTime<Utc>>) -> Self {
        Self { slots, ..Self::default() }
    }

    /// Provider whose booking calls always fail as upstream-unavailable.
    pub fn failing() -> Self {
        Self { fail_bookings: true, ..Self::default() }
    }

    /// Number of `create_booking` calls made against this mock.
    pub fn booking_calls(&self) -> usize {
        self.booking_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SchedulingProvider for MockSchedulingProvider {
    async fn query_availability(
        &self,
        _event_type_id: i64,
        start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _time_zone: Option<&str>,
    ) -> DomainResult<AvailabilityWindow> {
        Ok(AvailabilityWindow {
            available: self.slots.contains(&start),
            slots: self.slots.clone(),
        })
    }

    async fn create_booking(
        &self,
        event_type_id: i64,
        _request: &BookingRequest,
    ) -> DomainResult<ProviderBooking> {
        self.booking_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_bookings {
            return Err(CalBridgeError::Upstream("both provider API versions failed".into()));
        }
        Ok(ProviderBooking {
            booking_id: format!("prov-{event_type_id}"),
            booking_url: Some("https://cal.example/booking/prov".into()),
            raw: json!({"eventTypeId": event_type_id}),
        })
    }
}
