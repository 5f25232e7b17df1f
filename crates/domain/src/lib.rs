//! # CalBridge Domain
//!
//! Business domain types and models for CalBridge.
//!
//! This crate contains:
//! - Domain data types (Appointment, CanonicalEvent, etc.)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Pure normalization utilities for provider payloads
//!
//! ## Architecture
//! - No dependencies on other CalBridge crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
// Re-export payload/status normalizers
pub use utils::payload::parse_webhook_event;
pub use utils::status::{classify_trigger, normalize_status};
