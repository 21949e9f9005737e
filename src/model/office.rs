use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Office {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Head Office")]
    pub name: String,
    #[schema(example = "Jakarta")]
    pub city: String,
    #[schema(example = "Jl. Sudirman No. 1")]
    pub address: String,
}
