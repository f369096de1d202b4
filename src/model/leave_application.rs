use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::leave::category::{HalfDayPeriod, LeaveCategory};

/// Workflow status. Pending is the only state with outgoing transitions;
/// Approved and Rejected are terminal.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// A leave application row joined with the names the UI needs and the
/// owner's manager id (used by the scope resolver).
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "application_id": 42,
        "user_id": 7,
        "employee_name": "Jane Doe",
        "manager_id": 2,
        "leave_type_id": 1,
        "leave_type_name": "Annual Leave",
        "leave_category": "Full Day",
        "start_date": "2026-03-02",
        "end_date": "2026-03-04",
        "total_days": "3.0",
        "reason": "Family visit",
        "status": "Pending",
        "created_at": "2026-02-20T09:15:00Z"
    })
)]
pub struct LeaveApplication {
    #[schema(example = 42)]
    pub application_id: u64,

    #[schema(example = 7)]
    pub user_id: u64,

    #[schema(example = "Jane Doe")]
    pub employee_name: String,

    /// Manager of the employee who filed the request, if any.
    #[schema(example = 2, nullable = true)]
    pub manager_id: Option<u64>,

    #[schema(example = 1)]
    pub leave_type_id: u64,

    #[schema(example = "Annual Leave")]
    pub leave_type_name: String,

    #[schema(example = "Full Day")]
    pub leave_category: LeaveCategory,

    #[schema(example = "2026-03-02", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-03-04", value_type = String, format = "date", nullable = true)]
    pub end_date: Option<NaiveDate>,

    #[schema(example = "Morning", nullable = true)]
    pub half_day_period: Option<HalfDayPeriod>,

    #[schema(example = "10:00:00", value_type = String, nullable = true)]
    pub short_leave_start_time: Option<NaiveTime>,

    #[schema(example = "12:00:00", value_type = String, nullable = true)]
    pub short_leave_end_time: Option<NaiveTime>,

    #[schema(example = "3.0", value_type = String)]
    pub total_days: Decimal,

    #[schema(example = "Family visit")]
    pub reason: String,

    #[schema(example = "Pending")]
    pub status: LeaveStatus,

    #[schema(example = 2, nullable = true)]
    pub approved_by: Option<u64>,

    #[schema(example = "2026-02-21T10:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub approved_at: Option<DateTime<Utc>>,

    #[schema(example = "Team is short-staffed that week", nullable = true)]
    pub rejection_reason: Option<String>,

    #[schema(example = "2026-02-20T09:15:00Z", value_type = String, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}
