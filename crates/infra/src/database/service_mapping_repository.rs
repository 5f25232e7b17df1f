//! SQLite-backed implementation of the ServiceMappingRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use calbridge_core::ServiceMappingRepository;
use calbridge_domain::{Result, ServiceMapping};
use rusqlite::{params, OptionalExtension, Row};
use tracing::instrument;

use super::manager::DbPool;
use crate::errors::InfraError;

/// SQLite implementation of ServiceMappingRepository
pub struct SqliteServiceMappingRepository {
    pool: Arc<DbPool>,
}

impl SqliteServiceMappingRepository {
    /// Create a new service mapping repository
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Insert or replace a mapping. Used by provisioning, not by the engine.
    pub fn upsert(&self, mapping: &ServiceMapping) -> Result<()> {
        let conn = self.pool.get().map_err(InfraError::from)?;
        conn.execute(
            "INSERT INTO service_mappings (service_id, business_id, provider_event_type_id)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(service_id) DO UPDATE SET
                business_id = excluded.business_id,
                provider_event_type_id = excluded.provider_event_type_id",
            params![mapping.service_id, mapping.business_id, mapping.provider_event_type_id],
        )
        .map_err(InfraError::from)?;
        Ok(())
    }
}

#[async_trait]
impl ServiceMappingRepository for SqliteServiceMappingRepository {
    #[instrument(skip(self))]
    async fn find_by_event_type(
        &self,
        provider_event_type_id: i64,
    ) -> Result<Option<ServiceMapping>> {
        let conn = self.pool.get().map_err(InfraError::from)?;
        let found = conn
            .query_row(
                "SELECT service_id, business_id, provider_event_type_id
                 FROM service_mappings WHERE provider_event_type_id = ?1",
                params![provider_event_type_id],
                map_mapping,
            )
            .optional()
            .map_err(InfraError::from)?;
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn find_by_service(&self, service_id: &str) -> Result<Option<ServiceMapping>> {
        let conn = self.pool.get().map_err(InfraError::from)?;
        let found = conn
            .query_row(
                "SELECT service_id, business_id, provider_event_type_id
                 FROM service_mappings WHERE service_id = ?1",
                params![service_id],
                map_mapping,
            )
            .optional()
            .map_err(InfraError::from)?;
        Ok(found)
    }
}

fn map_mapping(row: &Row<'_>) -> rusqlite::Result<ServiceMapping> {
    Ok(ServiceMapping {
        service_id: row.get(0)?,
        business_id: row.get(1)?,
        provider_event_type_id: row.get(2)?,
    })
}
