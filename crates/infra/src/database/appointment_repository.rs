//! SQLite-backed implementation of the AppointmentRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use calbridge_core::AppointmentRepository;
use calbridge_domain::{
    Appointment, AppointmentStatus, EventPatch, NewAppointment, Result,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, instrument};

use super::manager::DbPool;
use crate::errors::InfraError;

const APPOINTMENT_COLUMNS: &str = "id, business_id, service_id, provider_booking_uid, \
     legacy_booking_id, status, start_ts, end_ts, caller_name, caller_phone, \
     created_at, updated_at";

/// SQLite implementation of AppointmentRepository
pub struct SqliteAppointmentRepository {
    pool: Arc<DbPool>,
}

impl SqliteAppointmentRepository {
    /// Create a new appointment repository
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<super::manager::DbConnection> {
        Ok(self.pool.get().map_err(InfraError::from)?)
    }
}

#[async_trait]
impl AppointmentRepository for SqliteAppointmentRepository {
    #[instrument(skip(self))]
    async fn find_by_any_uid(&self, uid: &str) -> Result<Option<Appointment>> {
        let conn = self.conn()?;

        // Dual-key match; when both keys could satisfy the disjunction the
        // most recently updated row wins (documented tie-break).
        let found = conn
            .query_row(
                &format!(
                    "SELECT {APPOINTMENT_COLUMNS} FROM appointments
                     WHERE provider_booking_uid = ?1 OR legacy_booking_id = ?1
                     ORDER BY updated_at DESC, id DESC
                     LIMIT 1"
                ),
                params![uid],
                map_appointment,
            )
            .optional()
            .map_err(InfraError::from)?;

        debug!(uid, matched = found.is_some(), "dual-key appointment lookup");
        Ok(found)
    }

    #[instrument(skip(self, appointment), fields(id = %appointment.id))]
    async fn insert(&self, appointment: NewAppointment) -> Result<()> {
        let conn = self.conn()?;
        let now = Utc::now().timestamp();

        conn.execute(
            "INSERT INTO appointments (
                id, business_id, service_id, provider_booking_uid,
                legacy_booking_id, status, start_ts, end_ts,
                caller_name, caller_phone, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
            params![
                appointment.id,
                appointment.business_id,
                appointment.service_id,
                appointment.provider_booking_uid,
                appointment.legacy_booking_id,
                appointment.status.as_str(),
                appointment.start_ts.timestamp(),
                appointment.end_ts.timestamp(),
                appointment.caller_name,
                appointment.caller_phone,
                now,
            ],
        )
        .map_err(InfraError::from)?;

        debug!(id = %appointment.id, "inserted appointment");
        Ok(())
    }

    #[instrument(skip(self, patch))]
    async fn apply_event(&self, id: &str, patch: EventPatch) -> Result<()> {
        let conn = self.conn()?;
        let now = Utc::now().timestamp();

        // COALESCE keeps the stored value wherever the patch carries None,
        // so each event only rewrites the fields it actually owns.
        conn.execute(
            "UPDATE appointments SET
                provider_booking_uid = COALESCE(?2, provider_booking_uid),
                status = COALESCE(?3, status),
                start_ts = COALESCE(?4, start_ts),
                end_ts = COALESCE(?5, end_ts),
                caller_name = COALESCE(?6, caller_name),
                caller_phone = COALESCE(?7, caller_phone),
                updated_at = ?8
             WHERE id = ?1",
            params![
                id,
                patch.provider_booking_uid,
                patch.status.map(|s| s.as_str()),
                patch.start_ts.map(|t| t.timestamp()),
                patch.end_ts.map(|t| t.timestamp()),
                patch.caller_name,
                patch.caller_phone,
                now,
            ],
        )
        .map_err(InfraError::from)?;

        debug!(id, "applied event patch");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_status(&self, id: &str, status: AppointmentStatus) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE appointments SET status = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, status.as_str(), Utc::now().timestamp()],
        )
        .map_err(InfraError::from)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_provider_uid(&self, id: &str, uid: &str) -> Result<()> {
        let conn = self.conn()?;
        // Touches only the uid column; a webhook-driven status change landing
        // between the booking insert and this patch must survive.
        conn.execute(
            "UPDATE appointments SET provider_booking_uid = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, uid, Utc::now().timestamp()],
        )
        .map_err(InfraError::from)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_overlapping(
        &self,
        business_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {APPOINTMENT_COLUMNS} FROM appointments
                 WHERE business_id = ?1
                   AND status != 'cancelled'
                   AND start_ts < ?3
                   AND end_ts > ?2"
            ))
            .map_err(InfraError::from)?;

        let rows = stmt
            .query_map(params![business_id, start.timestamp(), end.timestamp()], map_appointment)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;

        debug!(business_id, count = rows.len(), "overlap query");
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn find_in_range(
        &self,
        business_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {APPOINTMENT_COLUMNS} FROM appointments
                 WHERE business_id = ?1 AND start_ts >= ?2 AND start_ts < ?3
                 ORDER BY start_ts ASC"
            ))
            .map_err(InfraError::from)?;

        let rows = stmt
            .query_map(params![business_id, start.timestamp(), end.timestamp()], map_appointment)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;

        Ok(rows)
    }
}

fn map_appointment(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: row.get(0)?,
        business_id: row.get(1)?,
        service_id: row.get(2)?,
        provider_booking_uid: row.get(3)?,
        legacy_booking_id: row.get(4)?,
        status: AppointmentStatus::parse(&row.get::<_, String>(5)?),
        start_ts: from_unix(row.get(6)?),
        end_ts: from_unix(row.get(7)?),
        caller_name: row.get(8)?,
        caller_phone: row.get(9)?,
        created_at: from_unix(row.get(10)?),
        updated_at: from_unix(row.get(11)?),
    })
}

// Timestamps are written by this repository, so out-of-range only means a
// hand-corrupted row; collapsing that to the epoch keeps reads total.
fn from_unix(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use calbridge_domain::CalBridgeError;
    use chrono::TimeZone;
    use tempfile::TempDir;
    use uuid::Uuid;

    use super::*;
    use crate::database::manager::DbManager;

    fn setup_test_db() -> (Arc<DbPool>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let manager = DbManager::new(temp_dir.path().join("test.db"), 2).unwrap();
        manager.run_migrations().unwrap();
        (Arc::new(manager.pool().clone()), temp_dir)
    }

    fn ts(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, minute, 0).single().unwrap()
    }

    fn new_appointment(provider_uid: Option<&str>, legacy_id: Option<&str>) -> NewAppointment {
        NewAppointment {
            id: Uuid::now_v7().to_string(),
            business_id: "biz-1".into(),
            service_id: Some("svc-haircut".into()),
            provider_booking_uid: provider_uid.map(Into::into),
            legacy_booking_id: legacy_id.map(Into::into),
            status: AppointmentStatus::Booked,
            start_ts: ts(10, 0),
            end_ts: ts(11, 0),
            caller_name: Some("Ada Lovelace".into()),
            caller_phone: None,
        }
    }

    #[tokio::test]
    async fn finds_row_by_either_key() {
        let (pool, _temp) = setup_test_db();
        let repo = SqliteAppointmentRepository::new(pool);

        let appt = new_appointment(Some("prov-1"), Some("legacy-1"));
        let id = appt.id.clone();
        repo.insert(appt).await.unwrap();

        let by_provider = repo.find_by_any_uid("prov-1").await.unwrap().unwrap();
        assert_eq!(by_provider.id, id);

        let by_legacy = repo.find_by_any_uid("legacy-1").await.unwrap().unwrap();
        assert_eq!(by_legacy.id, id);

        assert!(repo.find_by_any_uid("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ambiguous_dual_key_match_prefers_most_recently_updated() {
        let (pool, _temp) = setup_test_db();
        let repo = SqliteAppointmentRepository::new(pool);

        let older = new_appointment(Some("shared"), None);
        let older_id = older.id.clone();
        repo.insert(older).await.unwrap();

        let newer = new_appointment(None, Some("shared"));
        let newer_id = newer.id.clone();
        repo.insert(newer).await.unwrap();

        // Touch the first row last so it carries the freshest updated_at.
        repo.set_status(&older_id, AppointmentStatus::Rescheduled).await.unwrap();
        // Force a strictly newer timestamp despite second-level resolution.
        let conn = repo.conn().unwrap();
        conn.execute(
            "UPDATE appointments SET updated_at = updated_at + 10 WHERE id = ?1",
            params![older_id],
        )
        .unwrap();

        let found = repo.find_by_any_uid("shared").await.unwrap().unwrap();
        assert_eq!(found.id, older_id);
        assert_ne!(found.id, newer_id);
    }

    #[tokio::test]
    async fn duplicate_provider_uid_insert_is_a_constraint_failure() {
        let (pool, _temp) = setup_test_db();
        let repo = SqliteAppointmentRepository::new(pool);

        repo.insert(new_appointment(Some("prov-dup"), None)).await.unwrap();
        let err = repo.insert(new_appointment(Some("prov-dup"), None)).await.unwrap_err();
        assert!(matches!(err, CalBridgeError::Database(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn event_patch_leaves_unset_fields_alone() {
        let (pool, _temp) = setup_test_db();
        let repo = SqliteAppointmentRepository::new(pool);

        let appt = new_appointment(Some("prov-1"), None);
        let id = appt.id.clone();
        repo.insert(appt).await.unwrap();

        repo.apply_event(
            &id,
            EventPatch {
                provider_booking_uid: Some("prov-2".into()),
                status: Some(AppointmentStatus::Rescheduled),
                start_ts: Some(ts(14, 0)),
                end_ts: None,
                caller_name: None,
                caller_phone: None,
            },
        )
        .await
        .unwrap();

        let row = repo.find_by_any_uid("prov-2").await.unwrap().unwrap();
        assert_eq!(row.status, AppointmentStatus::Rescheduled);
        assert_eq!(row.start_ts, ts(14, 0));
        // Untouched by the patch:
        assert_eq!(row.end_ts, ts(11, 0));
        assert_eq!(row.caller_name.as_deref(), Some("Ada Lovelace"));
        // The old uid no longer matches anything.
        assert!(repo.find_by_any_uid("prov-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn uid_backfill_does_not_clobber_a_webhook_status_change() {
        let (pool, _temp) = setup_test_db();
        let repo = SqliteAppointmentRepository::new(pool);

        let appt = new_appointment(None, Some("legacy-1"));
        let id = appt.id.clone();
        repo.insert(appt).await.unwrap();

        // Webhook cancels while the booking flow is still waiting on the
        // provider; the late uid patch must not resurrect the row.
        repo.set_status(&id, AppointmentStatus::Cancelled).await.unwrap();
        repo.set_provider_uid(&id, "prov-late").await.unwrap();

        let row = repo.find_by_any_uid("prov-late").await.unwrap().unwrap();
        assert_eq!(row.status, AppointmentStatus::Cancelled);
    }

    #[tokio::test]
    async fn overlap_query_uses_interval_intersection() {
        let (pool, _temp) = setup_test_db();
        let repo = SqliteAppointmentRepository::new(pool);
        repo.insert(new_appointment(Some("prov-1"), None)).await.unwrap(); // [10:00, 11:00)

        let overlapping = repo.find_overlapping("biz-1", ts(10, 30), ts(11, 30)).await.unwrap();
        assert_eq!(overlapping.len(), 1);

        let adjacent = repo.find_overlapping("biz-1", ts(11, 0), ts(12, 0)).await.unwrap();
        assert!(adjacent.is_empty());

        let other_tenant = repo.find_overlapping("biz-2", ts(10, 0), ts(11, 0)).await.unwrap();
        assert!(other_tenant.is_empty());
    }

    #[tokio::test]
    async fn cancelled_rows_are_excluded_from_overlap() {
        let (pool, _temp) = setup_test_db();
        let repo = SqliteAppointmentRepository::new(pool);

        let appt = new_appointment(Some("prov-1"), None);
        let id = appt.id.clone();
        repo.insert(appt).await.unwrap();
        repo.set_status(&id, AppointmentStatus::Cancelled).await.unwrap();

        let overlapping = repo.find_overlapping("biz-1", ts(10, 0), ts(11, 0)).await.unwrap();
        assert!(overlapping.is_empty());
    }

    #[tokio::test]
    async fn range_query_orders_by_start() {
        let (pool, _temp) = setup_test_db();
        let repo = SqliteAppointmentRepository::new(pool);

        let mut late = new_appointment(Some("prov-late"), None);
        late.start_ts = ts(15, 0);
        late.end_ts = ts(16, 0);
        repo.insert(late).await.unwrap();
        repo.insert(new_appointment(Some("prov-early"), None)).await.unwrap();

        let rows = repo.find_in_range("biz-1", ts(0, 0), ts(23, 0)).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].provider_booking_uid.as_deref(), Some("prov-early"));
        assert_eq!(rows[1].provider_booking_uid.as_deref(), Some("prov-late"));
    }
}
