use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Immutable catalog entry, seeded once (see schema.sql).
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveType {
    #[schema(example = 1)]
    pub leave_type_id: u64,

    #[schema(example = "Annual Leave")]
    pub leave_type_name: String,

    #[schema(example = "Planned yearly leave", nullable = true)]
    pub description: Option<String>,
}
