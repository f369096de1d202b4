use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Directory entry for a user. One user has at most one manager;
/// `user_level` is the role id (1 = HR, 2 = Manager, 3 = Employee).
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "user_id": 7,
        "email": "jane.doe@company.com",
        "full_name": "Jane Doe",
        "user_level": 3,
        "manager_id": 2,
        "department_id": 1,
        "created_at": "2026-01-01T00:00:00Z"
    })
)]
pub struct User {
    #[schema(example = 7)]
    pub user_id: u64,

    #[schema(example = "jane.doe@company.com")]
    pub email: String,

    #[schema(example = "Jane Doe")]
    pub full_name: String,

    #[schema(example = 3)]
    pub user_level: u8,

    #[schema(example = 2, nullable = true)]
    pub manager_id: Option<u64>,

    #[schema(example = 1, nullable = true)]
    pub department_id: Option<u64>,

    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}
