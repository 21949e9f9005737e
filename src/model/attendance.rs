use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Punctuality of the opening scan of the day.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CheckInStatus {
    OnTime,
    Late,
}

/// Punctuality of the closing scan of the day.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CheckOutStatus {
    Early,
    OnTime,
    Late,
}

/// Daily discipline classification, derived from both scan statuses once the
/// record is completed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AttendanceCategory {
    Discipline,
    Undiscipline,
    Overtime,
}

/// One row per employee per calendar day of `check_in`.
///
/// `check_in` is written once at creation; `check_out`, `status_check_out`
/// and `category` are written together by the closing scan and never touched
/// again.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 42,
    "device_code": "GATE-01",
    "check_in": "2026-02-03T07:52:10",
    "check_out": "2026-02-03T17:09:31",
    "status_check_in": "on_time",
    "status_check_out": "on_time",
    "category": "discipline"
}))]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub employee_id: u64,

    #[schema(example = "GATE-01", nullable = true)]
    pub device_code: Option<String>,

    #[schema(example = "2026-02-03T07:52:10", value_type = String, format = "date-time")]
    pub check_in: NaiveDateTime,

    #[schema(example = "2026-02-03T17:09:31", value_type = String, format = "date-time", nullable = true)]
    pub check_out: Option<NaiveDateTime>,

    #[schema(example = "on_time")]
    pub status_check_in: CheckInStatus,

    #[schema(example = "on_time", nullable = true)]
    pub status_check_out: Option<CheckOutStatus>,

    #[schema(example = "discipline", nullable = true)]
    pub category: Option<AttendanceCategory>,
}

impl Attendance {
    /// A record is complete once the closing scan has been written.
    pub fn is_completed(&self) -> bool {
        self.check_out.is_some()
    }
}
