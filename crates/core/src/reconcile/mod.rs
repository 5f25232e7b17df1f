//! Webhook event reconciliation

pub mod ports;
pub mod service;

pub use service::{ReconcileOutcome, ReconciliationService, SkipReason};
