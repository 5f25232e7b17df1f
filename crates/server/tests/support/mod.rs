//! Shared test harness for route tests
//!
//! Routes run against the real SQLite repositories on a temporary database,
//! with only the outbound provider replaced by an in-memory double.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use calbridge_core::{BookingService, ReconciliationService, SchedulingProvider};
use calbridge_domain::{
    AvailabilityWindow, BookingRequest, CalBridgeError, ProviderBooking,
    Result as DomainResult, ServiceMapping, WebhookConfig,
};
use calbridge_infra::{DbManager, SqliteAppointmentRepository, SqliteServiceMappingRepository};
use calbridge_server::AppState;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sha2::Sha256;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "whsec_route_tests";
pub const EVENT_TYPE_ID: i64 = 42;

/// Outbound provider double.
///
/// Counts booking calls so tests can assert the orchestrator never reaches
/// the provider on a rejected request.
#[derive(Default)]
pub struct MockProvider {
    slots: Vec<DateTime<Utc>>,
    fail_availability: bool,
    fail_bookings: bool,
    booking_calls: AtomicUsize,
}

impl MockProvider {
    pub fn with_slots(slots: Vec<DateTime<Utc>>) -> Self {
        Self { slots, ..Self::default() }
    }

    pub fn unavailable() -> Self {
        Self { fail_availability: true, fail_bookings: true, ..Self::default() }
    }

    pub fn booking_calls(&self) -> usize {
        self.booking_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SchedulingProvider for MockProvider {
    async fn query_availability(
        &self,
        _event_type_id: i64,
        start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _time_zone: Option<&str>,
    ) -> DomainResult<AvailabilityWindow> {
        if self.fail_availability {
            return Err(CalBridgeError::Upstream("both provider API versions failed".into()));
        }
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
            raw: json!({ "eventTypeId": event_type_id }),
        })
    }
}

/// Fully wired application over a throwaway database.
pub struct Harness {
    pub app: Router,
    pub appointments: Arc<SqliteAppointmentRepository>,
    pub provider: Arc<MockProvider>,
    pub db: Arc<DbManager>,
    _tmp: TempDir,
}

pub fn harness(secret: &str, provider: MockProvider) -> Harness {
    let tmp = TempDir::new().unwrap();
    let db = Arc::new(DbManager::new(tmp.path().join("routes.db"), 2).unwrap());
    db.run_migrations().unwrap();

    let pool = Arc::new(db.pool().clone());
    let appointments = Arc::new(SqliteAppointmentRepository::new(pool.clone()));
    let mappings = Arc::new(SqliteServiceMappingRepository::new(pool));
    mappings
        .upsert(&ServiceMapping {
            service_id: "svc-consult".to_string(),
            business_id: "biz-1".to_string(),
            provider_event_type_id: EVENT_TYPE_ID,
        })
        .unwrap();

    let provider = Arc::new(provider);
    let reconciler =
        Arc::new(ReconciliationService::new(appointments.clone(), mappings.clone()));
    let bookings = Arc::new(BookingService::new(
        appointments.clone(),
        mappings.clone(),
        provider.clone(),
    ));

    let state = AppState {
        reconciler,
        bookings,
        provider: provider.clone(),
        mappings,
        webhook: WebhookConfig { secret: secret.to_string(), allow_insecure: secret.is_empty() },
        db: Some(db.clone()),
    };

    Harness { app: calbridge_server::router(state), appointments, provider, db, _tmp: tmp }
}

/// Compute the signature header value the provider would send.
pub fn sign(body: &[u8], secret: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

pub fn post_json(path: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
