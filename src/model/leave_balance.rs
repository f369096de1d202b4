use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-(user, leave type, year) entitlement record.
///
/// `available_days == total_days - used_days` holds after every debit/credit;
/// an HR manual override may break it on purpose (see `leave::ledger`).
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "balance_id": 12,
        "user_id": 7,
        "leave_type_id": 1,
        "leave_type_name": "Annual Leave",
        "total_days": "20.0",
        "used_days": "3.0",
        "available_days": "17.0",
        "year": 2026
    })
)]
pub struct BalanceRecord {
    #[schema(example = 12)]
    pub balance_id: u64,

    #[schema(example = 7)]
    pub user_id: u64,

    #[schema(example = 1)]
    pub leave_type_id: u64,

    #[schema(example = "Annual Leave")]
    pub leave_type_name: String,

    #[schema(example = "20.0", value_type = String)]
    pub total_days: Decimal,

    #[schema(example = "3.0", value_type = String)]
    pub used_days: Decimal,

    #[schema(example = "17.0", value_type = String)]
    pub available_days: Decimal,

    #[schema(example = 2026)]
    pub year: i16,
}
