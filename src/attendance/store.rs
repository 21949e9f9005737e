use chrono::{NaiveDate, NaiveDateTime};
use derive_more::Display;
use sqlx::MySqlPool;

use crate::model::attendance::{Attendance, AttendanceCategory, CheckInStatus, CheckOutStatus};

/// Failures surfaced by the attendance persistence layer.
///
/// `Conflict` is the unique-key violation on `(employee_id, work_date)`: two
/// concurrent first scans race, one inserts, the other gets this and is
/// retried by the engine as a check-out path.
#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "attendance record already exists for this employee and day")]
    Conflict,
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Conflict => None,
            StoreError::Database(e) => Some(e),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        // MySQL reports duplicate-key violations as SQLSTATE 23000.
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23000") {
                return StoreError::Conflict;
            }
        }
        StoreError::Database(e)
    }
}

/// Fields written by the opening scan.
#[derive(Debug, Clone, Copy)]
pub struct NewCheckIn<'a> {
    pub employee_id: u64,
    pub device_code: Option<&'a str>,
    pub at: NaiveDateTime,
    pub status: CheckInStatus,
}

/// Fields written together by the closing scan.
#[derive(Debug, Clone, Copy)]
pub struct CheckOutUpdate {
    pub at: NaiveDateTime,
    pub status: CheckOutStatus,
    pub category: AttendanceCategory,
}

/// Persistence contract consumed by the engine. One row per employee per
/// calendar day; the store enforces that atomically via the unique key so a
/// duplicate insert is always a detectable [`StoreError::Conflict`].
pub trait AttendanceStore {
    async fn find_for_day(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> Result<Option<Attendance>, StoreError>;

    async fn insert_check_in(&self, check_in: NewCheckIn<'_>) -> Result<u64, StoreError>;

    /// Completes the not-yet-closed record for the employee/day. Returns
    /// false when no open record matched (already completed or never opened).
    async fn complete_check_out(
        &self,
        employee_id: u64,
        day: NaiveDate,
        update: CheckOutUpdate,
    ) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl AttendanceStore for MySqlAttendanceStore {
    async fn find_for_day(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> Result<Option<Attendance>, StoreError> {
        let record = sqlx::query_as::<_, Attendance>(
            r#"
            SELECT id, employee_id, device_code, check_in, check_out,
                   status_check_in, status_check_out, category
            FROM attendance
            WHERE employee_id = ? AND DATE(check_in) = ?
            "#,
        )
        .bind(employee_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn insert_check_in(&self, check_in: NewCheckIn<'_>) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, device_code, check_in, status_check_in)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(check_in.employee_id)
        .bind(check_in.device_code)
        .bind(check_in.at)
        .bind(check_in.status)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id())
    }

    async fn complete_check_out(
        &self,
        employee_id: u64,
        day: NaiveDate,
        update: CheckOutUpdate,
    ) -> Result<bool, StoreError> {
        // `check_out IS NULL` makes completion single-shot under concurrency:
        // a second closer matches zero rows.
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET check_out = ?, status_check_out = ?, category = ?
            WHERE employee_id = ? AND DATE(check_in) = ? AND check_out IS NULL
            "#,
        )
        .bind(update.at)
        .bind(update.status)
        .bind(update.category)
        .bind(employee_id)
        .bind(day)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
