//! Database layer: connection pool and repositories

pub mod appointment_repository;
pub mod manager;
pub mod service_mapping_repository;

pub use appointment_repository::SqliteAppointmentRepository;
pub use manager::{DbConnection, DbManager, DbPool};
pub use service_mapping_repository::SqliteServiceMappingRepository;
