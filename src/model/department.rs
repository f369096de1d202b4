use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Department {
    #[schema(example = 1)]
    pub department_id: u64,

    #[schema(example = "Engineering")]
    pub department_name: String,

    #[schema(example = "ENG")]
    pub department_code: String,

    #[schema(example = "Product engineering", nullable = true)]
    pub description: Option<String>,
}
