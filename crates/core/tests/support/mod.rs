//! Shared test support for core service tests

pub mod provider;
pub mod repositories;
