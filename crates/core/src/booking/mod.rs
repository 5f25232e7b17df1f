//! Client-driven booking orchestration

pub mod ports;
pub mod service;

pub use service::{BookingConfirmation, BookingService};
