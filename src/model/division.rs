use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Division {
    #[schema(example = 3)]
    pub id: u64,
    #[schema(example = 1)]
    pub office_id: u64,
    #[schema(example = "Engineering")]
    pub name: String,
}

/// List row joined with the owning office.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct DivisionWithOffice {
    pub id: u64,
    pub office_id: u64,
    pub name: String,
    pub office_name: String,
    pub office_address: String,
}
