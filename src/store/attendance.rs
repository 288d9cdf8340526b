use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::MySqlPool;
use tracing::debug;

use super::AttendanceStore;
use crate::{
    error::{AppError, AppResult},
    model::attendance::{AttendanceRecord, AttendanceRow, NewCheckIn},
};

const SELECT_BY_USER_AND_DATE: &str = r#"
    SELECT
      id, user_id, work_date,
      check_in_at, check_in_lat, check_in_lng, check_in_photo_url, check_in_ip,
      check_out_at, check_out_ip, total_minutes, status, activity,
      created_at, updated_at
    FROM attendances
    WHERE user_id = ? AND work_date = ?
    LIMIT 1
"#;

// The unique key (user_id, work_date) decides the race: a losing insert
// affects no row and the caller falls through to the update, so 1 row
// affected always means "created".
const INSERT_CHECK_IN: &str = r#"
    INSERT IGNORE INTO attendances
      (user_id, work_date, check_in_at, check_in_lat, check_in_lng, check_in_photo_url,
       check_in_ip, status, activity, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const UPDATE_CHECK_IN: &str = r#"
    UPDATE attendances
    SET
      check_in_at        = COALESCE(check_in_at, ?),
      check_in_lat       = COALESCE(?, check_in_lat),
      check_in_lng       = COALESCE(?, check_in_lng),
      check_in_photo_url = COALESCE(?, check_in_photo_url),
      check_in_ip        = COALESCE(?, check_in_ip),
      status             = ?,
      activity           = ?,
      updated_at         = ?
    WHERE user_id = ? AND work_date = ? AND check_out_at IS NULL
"#;

const CHECK_OUT: &str = r#"
    UPDATE attendances
    SET
      check_out_at  = ?,
      check_out_ip  = ?,
      total_minutes = COALESCE(GREATEST(0, TIMESTAMPDIFF(MINUTE, check_in_at, ?)), 0),
      updated_at    = ?
    WHERE user_id = ? AND work_date = ? AND check_in_at IS NOT NULL AND check_out_at IS NULL
"#;

#[derive(Clone)]
pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    // Each statement commits on its own: a transaction holding the share lock
    // from a duplicate INSERT IGNORE while waiting for the UPDATE's row lock
    // deadlocks against a concurrent check-in doing the same.
    async fn try_upsert_check_in(&self, check_in: &NewCheckIn) -> AppResult<(AttendanceRecord, bool)> {
        let inserted = sqlx::query(INSERT_CHECK_IN)
            .bind(check_in.user_id)
            .bind(check_in.work_date)
            .bind(check_in.at)
            .bind(check_in.lat)
            .bind(check_in.lng)
            .bind(&check_in.photo_url)
            .bind(&check_in.ip)
            .bind(check_in.status.as_ref())
            .bind(&check_in.activity)
            .bind(check_in.at)
            .bind(check_in.at)
            .execute(&self.pool)
            .await?
            .rows_affected()
            == 1;

        if !inserted {
            debug!(user_id = check_in.user_id, work_date = %check_in.work_date, "Record exists, updating check-in");

            sqlx::query(UPDATE_CHECK_IN)
                .bind(check_in.at)
                .bind(check_in.lat)
                .bind(check_in.lng)
                .bind(&check_in.photo_url)
                .bind(&check_in.ip)
                .bind(check_in.status.as_ref())
                .bind(&check_in.activity)
                .bind(check_in.at)
                .bind(check_in.user_id)
                .bind(check_in.work_date)
                .execute(&self.pool)
                .await?;
        }

        let row = sqlx::query_as::<_, AttendanceRow>(SELECT_BY_USER_AND_DATE)
            .bind(check_in.user_id)
            .bind(check_in.work_date)
            .fetch_one(&self.pool)
            .await?;

        Ok((row.try_into()?, inserted))
    }
}

/// ER_LOCK_DEADLOCK (1213) reports SQLSTATE 40001.
fn is_deadlock(err: &AppError) -> bool {
    match err {
        AppError::Database(sqlx::Error::Database(db_err)) => db_err.code().as_deref() == Some("40001"),
        _ => false,
    }
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn upsert_check_in(&self, check_in: NewCheckIn) -> AppResult<(AttendanceRecord, bool)> {
        match self.try_upsert_check_in(&check_in).await {
            Err(e) if is_deadlock(&e) => {
                debug!(user_id = check_in.user_id, "Check-in deadlocked, retrying once");
                self.try_upsert_check_in(&check_in).await
            }
            other => other,
        }
    }

    async fn get_by_user_and_date(
        &self,
        user_id: u64,
        work_date: NaiveDate,
    ) -> AppResult<Option<AttendanceRecord>> {
        sqlx::query_as::<_, AttendanceRow>(SELECT_BY_USER_AND_DATE)
            .bind(user_id)
            .bind(work_date)
            .fetch_optional(&self.pool)
            .await?
            .map(AttendanceRecord::try_from)
            .transpose()
    }

    async fn check_out(
        &self,
        user_id: u64,
        work_date: NaiveDate,
        ip: Option<String>,
        at: DateTime<Utc>,
    ) -> AppResult<Option<AttendanceRecord>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(CHECK_OUT)
            .bind(at)
            .bind(&ip)
            .bind(at)
            .bind(at)
            .bind(user_id)
            .bind(work_date)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if updated == 0 {
            // not checked in, or somebody else already closed the day
            tx.rollback().await?;
            return Ok(None);
        }

        let row = sqlx::query_as::<_, AttendanceRow>(SELECT_BY_USER_AND_DATE)
            .bind(user_id)
            .bind(work_date)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(row.try_into()?))
    }
}
