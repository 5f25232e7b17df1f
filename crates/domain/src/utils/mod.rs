//! Pure domain utilities

pub mod payload;
pub mod status;
