//! # CalBridge Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The reconciliation engine that merges provider webhook events into the
//!   local appointment store
//! - The booking orchestrator for the UI-driven booking path
//! - Port/adapter interfaces (traits) for the record store and the provider
//! - Webhook signature verification
//!
//! ## Architecture Principles
//! - Only depends on `calbridge-domain`
//! - No database or HTTP code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod booking;
pub mod reconcile;
pub mod webhook;

// Re-export specific items to avoid ambiguity
pub use booking::ports::SchedulingProvider;
pub use booking::{BookingConfirmation, BookingService};
pub use reconcile::ports::{AppointmentRepository, ServiceMappingRepository};
pub use reconcile::{ReconcileOutcome, ReconciliationService, SkipReason};
pub use webhook::verify_webhook_signature;
