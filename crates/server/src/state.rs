//! Shared application state

use std::sync::Arc;

use calbridge_core::{
    BookingService, ReconciliationService, SchedulingProvider, ServiceMappingRepository,
};
use calbridge_domain::WebhookConfig;
use calbridge_infra::DbManager;

/// Shared application state
///
/// Everything inside is either `Arc`'d or cheap to clone, so the state clones
/// per-request without copying the services themselves.
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<ReconciliationService>,
    pub bookings: Arc<BookingService>,
    pub provider: Arc<dyn SchedulingProvider>,
    pub mappings: Arc<dyn ServiceMappingRepository>,
    pub webhook: WebhookConfig,
    /// Absent when the routes run against in-memory test doubles.
    pub db: Option<Arc<DbManager>>,
}
