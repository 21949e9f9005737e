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
pub enum DeviceStatus {
    Active,
    Inactive,
}

/// A badge-scan device installed at an office entrance.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Device {
    #[schema(example = "GATE-01")]
    pub device_code: String,
    #[schema(example = "Main gate reader")]
    pub device_name: String,
    #[schema(example = "active")]
    pub status: DeviceStatus,
    #[schema(example = "Head Office lobby")]
    pub location: String,
    #[schema(example = "2026-01-15T09:00:00", value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<NaiveDateTime>,
}
