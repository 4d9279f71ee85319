//! SQL implementation of the schedule store ports
//!
//! Two tables back the scheduling routes:
//!
//! * `availability_windows`: one row per `(therapist_id, day_of_week)`, times as `HH:MM` text.
//! * `unavailability`: concrete blocked intervals, timestamps as RFC 3339 text.

use crate::client::{DbBackend, DbClient};
use crate::error::DbError;
use chrono::{DateTime, Duration, SecondsFormat, Utc, Weekday};
use mindmend_common::{
    AvailabilityStore, AvailabilityWindow, BoxFuture, BoxedError, ScheduleWriter,
    UnavailabilityRecord, UnavailabilityStore,
};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

// Widens the text range filter so rows stored with a local offset or a space
// separator are still returned; the slot calculator clamps them to the day.
const RANGE_MARGIN_DAYS: i64 = 2;

/// SQL implementation of the schedule store
#[derive(Debug, Clone)]
pub struct SqlScheduleRepository {
    db_client: DbClient,
}

impl SqlScheduleRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Creates the schedule tables if they don't already exist.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing schedule schema");

        let id_column = match self.db_client.backend() {
            DbBackend::Sqlite => "id INTEGER PRIMARY KEY AUTOINCREMENT",
            DbBackend::Postgres => "id BIGSERIAL PRIMARY KEY",
        };

        let windows = r#"
            CREATE TABLE IF NOT EXISTS availability_windows (
                therapist_id TEXT NOT NULL,
                day_of_week TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                UNIQUE(therapist_id, day_of_week)
            )
        "#;
        let unavailability = format!(
            r#"
            CREATE TABLE IF NOT EXISTS unavailability (
                {},
                therapist_id TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                reason TEXT,
                appointment_id TEXT
            )
        "#,
            id_column
        );
        let index = r#"
            CREATE INDEX IF NOT EXISTS idx_unavailability_therapist_start
            ON unavailability (therapist_id, start_time)
        "#;

        self.db_client.execute(windows).await?;
        self.db_client.execute(&unavailability).await?;
        self.db_client.execute(index).await?;

        info!("Schedule schema initialized successfully");
        Ok(())
    }

    async fn fetch_window(
        &self,
        therapist_id: &str,
        day_of_week: Weekday,
    ) -> Result<Option<AvailabilityWindow>, DbError> {
        debug!(
            "Finding availability window for therapist {} on {}",
            therapist_id, day_of_week
        );

        let query = r#"
            SELECT therapist_id, day_of_week, start_time, end_time
            FROM availability_windows
            WHERE therapist_id = $1 AND day_of_week = $2
        "#;

        let row = sqlx::query(query)
            .bind(therapist_id)
            .bind(day_of_week.to_string())
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find availability window: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        row.map(|row| window_from_row(&row)).transpose()
    }

    async fn fetch_overlapping(
        &self,
        therapist_id: &str,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<Vec<UnavailabilityRecord>, DbError> {
        debug!(
            "Finding unavailability for therapist {} in {} - {}",
            therapist_id, range_start, range_end
        );

        let query = r#"
            SELECT id, therapist_id, start_time, end_time,
                   COALESCE(reason, '') AS reason,
                   COALESCE(appointment_id, '') AS appointment_id
            FROM unavailability
            WHERE therapist_id = $1 AND start_time < $2 AND end_time > $3
            ORDER BY start_time
        "#;

        let upper = range_end + Duration::days(RANGE_MARGIN_DAYS);
        let lower = range_start - Duration::days(RANGE_MARGIN_DAYS);

        let rows = sqlx::query(query)
            .bind(therapist_id)
            .bind(upper.to_rfc3339_opts(SecondsFormat::Secs, true))
            .bind(lower.to_rfc3339_opts(SecondsFormat::Secs, true))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find unavailability: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(record_from_row).collect()
    }

    async fn store_window(&self, window: AvailabilityWindow) -> Result<AvailabilityWindow, DbError> {
        debug!(
            "Upserting availability window for therapist {} on {}",
            window.therapist_id, window.day_of_week
        );

        let query = r#"
            INSERT INTO availability_windows (therapist_id, day_of_week, start_time, end_time)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (therapist_id, day_of_week)
            DO UPDATE SET start_time = excluded.start_time, end_time = excluded.end_time
        "#;

        sqlx::query(query)
            .bind(&window.therapist_id)
            .bind(window.day_of_week.to_string())
            .bind(&window.start_time)
            .bind(&window.end_time)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to upsert availability window: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(window)
    }

    async fn insert_record(
        &self,
        mut record: UnavailabilityRecord,
    ) -> Result<UnavailabilityRecord, DbError> {
        debug!(
            "Blocking {} - {} for therapist {}",
            record.start_time, record.end_time, record.therapist_id
        );

        let query = r#"
            INSERT INTO unavailability (therapist_id, start_time, end_time, reason, appointment_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
        "#;

        let row = sqlx::query(query)
            .bind(&record.therapist_id)
            .bind(&record.start_time)
            .bind(&record.end_time)
            .bind(record.reason.clone().filter(|reason| !reason.is_empty()))
            .bind(record.appointment_id.clone().filter(|id| !id.is_empty()))
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert unavailability: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        record.id = Some(row.try_get::<i64, _>("id")?);
        Ok(record)
    }

    async fn delete_for_appointment(&self, appointment_id: &str) -> Result<u64, DbError> {
        debug!("Releasing unavailability for appointment {}", appointment_id);

        let query = "DELETE FROM unavailability WHERE appointment_id = $1";
        let result = sqlx::query(query)
            .bind(appointment_id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to release appointment {}: {}", appointment_id, e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(result.rows_affected())
    }
}

fn window_from_row(row: &AnyRow) -> Result<AvailabilityWindow, DbError> {
    let day: String = row.try_get("day_of_week")?;
    let day_of_week = day
        .parse::<Weekday>()
        .map_err(|_| DbError::InvalidRow(format!("unknown day_of_week {:?}", day)))?;

    Ok(AvailabilityWindow {
        therapist_id: row.try_get("therapist_id")?,
        day_of_week,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
    })
}

// The `Any` driver cannot decode NULL into `Option<String>`, so nullable
// columns are selected through COALESCE and empty text maps back to `None`.
fn record_from_row(row: &AnyRow) -> Result<UnavailabilityRecord, DbError> {
    Ok(UnavailabilityRecord {
        id: Some(row.try_get::<i64, _>("id")?),
        therapist_id: row.try_get("therapist_id")?,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
        reason: non_empty(row.try_get("reason")?),
        appointment_id: non_empty(row.try_get("appointment_id")?),
    })
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

impl AvailabilityStore for SqlScheduleRepository {
    fn find_window(
        &self,
        therapist_id: &str,
        day_of_week: Weekday,
    ) -> BoxFuture<'_, Option<AvailabilityWindow>, BoxedError> {
        let therapist_id = therapist_id.to_string();
        Box::pin(async move { Ok(self.fetch_window(&therapist_id, day_of_week).await?) })
    }
}

impl UnavailabilityStore for SqlScheduleRepository {
    fn find_overlapping(
        &self,
        therapist_id: &str,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<UnavailabilityRecord>, BoxedError> {
        let therapist_id = therapist_id.to_string();
        Box::pin(async move {
            Ok(self
                .fetch_overlapping(&therapist_id, range_start, range_end)
                .await?)
        })
    }
}

impl ScheduleWriter for SqlScheduleRepository {
    fn upsert_window(
        &self,
        window: AvailabilityWindow,
    ) -> BoxFuture<'_, AvailabilityWindow, BoxedError> {
        Box::pin(async move { Ok(self.store_window(window).await?) })
    }

    fn block_interval(
        &self,
        record: UnavailabilityRecord,
    ) -> BoxFuture<'_, UnavailabilityRecord, BoxedError> {
        Box::pin(async move { Ok(self.insert_record(record).await?) })
    }

    fn release_appointment(&self, appointment_id: &str) -> BoxFuture<'_, u64, BoxedError> {
        let appointment_id = appointment_id.to_string();
        Box::pin(async move { Ok(self.delete_for_appointment(&appointment_id).await?) })
    }
}
