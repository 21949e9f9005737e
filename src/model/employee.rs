use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 42,
        "serial_id": "04A1B2C3D4",
        "office_id": 1,
        "division_id": 3,
        "supervisor_id": 7,
        "full_name": "Jane Doe",
        "position": "Field Engineer",
        "email": "jane.doe@company.com",
        "phone": "+628123456789",
        "is_active": "active"
    })
)]
pub struct Employee {
    #[schema(example = 42)]
    pub id: u64,

    /// Badge identifier presented at a scan device. Unique per employee.
    #[schema(example = "04A1B2C3D4")]
    pub serial_id: String,

    #[schema(example = 1)]
    pub office_id: u64,

    #[schema(example = 3, nullable = true)]
    pub division_id: Option<u64>,

    #[schema(example = 7, nullable = true)]
    pub supervisor_id: Option<u64>,

    #[schema(example = "Jane Doe")]
    pub full_name: String,

    #[schema(example = "Field Engineer")]
    pub position: String,

    #[schema(example = "jane.doe@company.com")]
    pub email: String,

    #[schema(example = "+628123456789", nullable = true)]
    pub phone: Option<String>,

    /// "active" or "on_leave".
    #[schema(example = "active")]
    pub is_active: String,
}
