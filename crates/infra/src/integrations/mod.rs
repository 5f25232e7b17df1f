//! External service integrations

pub mod calcom;

pub use calcom::CalComClient;
