//! # CalBridge Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite repositories for appointments and service mappings
//! - The Cal.com provider client (v2 API with transparent v1 fallback)
//! - The configuration loader
//!
//! ## Architecture
//! - Implements traits defined in `calbridge-core`
//! - Contains all "impure" code (database, HTTP)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;

// Re-export commonly used items
pub use database::*;
pub use http::*;
pub use integrations::*;
