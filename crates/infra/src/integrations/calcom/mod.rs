//! Cal.com provider client
//!
//! Two API generations exist in the wild with incompatible paths but
//! overlapping semantics. Rather than branching on an account-level version
//! flag that would drift out of sync, the client always prefers v2 and falls
//! back to v1 transparently when the v2 call does not succeed.

mod client;
mod types;

pub use client::CalComClient;
