use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct OnLeave {
    #[schema(example = 10)]
    pub id: u64,
    #[schema(example = 42)]
    pub employee_id: u64,
    #[schema(example = "2026-02-10", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-02-12", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    /// annual, sick, maternity or other.
    #[schema(example = "annual")]
    pub leave_type: String,
    #[schema(example = "Family matters", nullable = true)]
    pub reason: Option<String>,
}
