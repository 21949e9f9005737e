use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

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
pub enum UnknownSerialStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A badge that scanned in without a matching employee, queued for
/// administrative review. At most one pending row per serial.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct UnknownSerial {
    #[schema(example = 5)]
    pub id: u64,
    #[schema(example = "04FFEEDDCC")]
    pub serial_id: String,
    #[schema(example = "pending")]
    pub status: UnknownSerialStatus,
    #[schema(example = "first seen at GATE-01", nullable = true)]
    pub note: Option<String>,
    #[schema(example = "2026-02-03T08:02:44", value_type = String, format = "date-time", nullable = true)]
    pub detected_at: Option<NaiveDateTime>,
}
