use chrono::{Datelike, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Granularity of a leave request. Stored as the display string
/// ("Full Day" etc.) in the `leave_applications.leave_category` column.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
pub enum LeaveCategory {
    #[serde(rename = "Full Day")]
    #[sqlx(rename = "Full Day")]
    #[strum(serialize = "Full Day")]
    FullDay,

    #[serde(rename = "Half Day")]
    #[sqlx(rename = "Half Day")]
    #[strum(serialize = "Half Day")]
    HalfDay,

    #[serde(rename = "Short Leave")]
    #[sqlx(rename = "Short Leave")]
    #[strum(serialize = "Short Leave")]
    ShortLeave,
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
pub enum HalfDayPeriod {
    Morning,
    Afternoon,
}

/// Creation input, tagged by category so each variant only carries the
/// fields that are valid for it. A Half Day request physically cannot
/// smuggle in an `end_date`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "leave_category")]
pub enum LeavePlan {
    #[serde(rename = "Full Day")]
    FullDay {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    #[serde(rename = "Half Day")]
    HalfDay {
        start_date: NaiveDate,
        half_day_period: HalfDayPeriod,
    },
    #[serde(rename = "Short Leave")]
    ShortLeave {
        start_date: NaiveDate,
        short_leave_start_time: Option<NaiveTime>,
        short_leave_end_time: Option<NaiveTime>,
    },
}

const HALF_DAY: Decimal = Decimal::from_parts(5, 0, 0, false, 1); // 0.5
const SHORT_LEAVE: Decimal = Decimal::from_parts(25, 0, 0, false, 2); // 0.25

impl LeavePlan {
    pub fn category(&self) -> LeaveCategory {
        match self {
            LeavePlan::FullDay { .. } => LeaveCategory::FullDay,
            LeavePlan::HalfDay { .. } => LeaveCategory::HalfDay,
            LeavePlan::ShortLeave { .. } => LeaveCategory::ShortLeave,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        match *self {
            LeavePlan::FullDay { start_date, .. }
            | LeavePlan::HalfDay { start_date, .. }
            | LeavePlan::ShortLeave { start_date, .. } => start_date,
        }
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        match *self {
            LeavePlan::FullDay { end_date, .. } => Some(end_date),
            _ => None,
        }
    }

    pub fn half_day_period(&self) -> Option<HalfDayPeriod> {
        match *self {
            LeavePlan::HalfDay {
                half_day_period, ..
            } => Some(half_day_period),
            _ => None,
        }
    }

    pub fn short_leave_window(&self) -> (Option<NaiveTime>, Option<NaiveTime>) {
        match *self {
            LeavePlan::ShortLeave {
                short_leave_start_time,
                short_leave_end_time,
                ..
            } => (short_leave_start_time, short_leave_end_time),
            _ => (None, None),
        }
    }

    /// Number of days this request consumes. This becomes
    /// `total_days` on the application and is the amount later debited.
    ///
    /// Full Day spans are inclusive of both endpoints: 1st..3rd = 3 days.
    pub fn day_count(&self) -> AppResult<Decimal> {
        match *self {
            LeavePlan::FullDay {
                start_date,
                end_date,
            } => {
                let span = (end_date - start_date).num_days();
                if span < 0 {
                    return Err(AppError::Validation(
                        "end_date must not be before start_date".into(),
                    ));
                }
                Ok(Decimal::from(span + 1))
            }
            LeavePlan::HalfDay { .. } => Ok(HALF_DAY),
            LeavePlan::ShortLeave {
                short_leave_start_time,
                short_leave_end_time,
                ..
            } => {
                if let (Some(from), Some(to)) = (short_leave_start_time, short_leave_end_time) {
                    if to <= from {
                        return Err(AppError::Validation(
                            "short leave end time must be after start time".into(),
                        ));
                    }
                }
                Ok(SHORT_LEAVE)
            }
        }
    }

    /// True if start and end fall in different (year, month) pairs.
    /// Only Full Day requests can span more than one day.
    pub fn crosses_month(&self) -> bool {
        match *self {
            LeavePlan::FullDay {
                start_date,
                end_date,
            } => (start_date.year(), start_date.month()) != (end_date.year(), end_date.month()),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn full_day_span_is_inclusive() {
        let plan = LeavePlan::FullDay {
            start_date: date(2024, 3, 1),
            end_date: date(2024, 3, 3),
        };
        assert_eq!(plan.day_count().unwrap(), dec!(3));
    }

    #[test]
    fn single_day_counts_as_one() {
        let plan = LeavePlan::FullDay {
            start_date: date(2024, 3, 1),
            end_date: date(2024, 3, 1),
        };
        assert_eq!(plan.day_count().unwrap(), dec!(1));
    }

    #[test]
    fn reversed_span_is_invalid() {
        let plan = LeavePlan::FullDay {
            start_date: date(2024, 3, 5),
            end_date: date(2024, 3, 1),
        };
        assert!(matches!(plan.day_count(), Err(AppError::Validation(_))));
    }

    #[test]
    fn half_day_is_constant() {
        let plan = LeavePlan::HalfDay {
            start_date: date(2024, 3, 1),
            half_day_period: HalfDayPeriod::Morning,
        };
        assert_eq!(plan.day_count().unwrap(), dec!(0.5));
    }

    #[test]
    fn short_leave_is_constant() {
        let plan = LeavePlan::ShortLeave {
            start_date: date(2024, 3, 1),
            short_leave_start_time: None,
            short_leave_end_time: None,
        };
        assert_eq!(plan.day_count().unwrap(), dec!(0.25));
    }

    #[test]
    fn short_leave_window_must_be_ordered() {
        let plan = LeavePlan::ShortLeave {
            start_date: date(2024, 3, 1),
            short_leave_start_time: NaiveTime::from_hms_opt(12, 0, 0),
            short_leave_end_time: NaiveTime::from_hms_opt(10, 0, 0),
        };
        assert!(matches!(plan.day_count(), Err(AppError::Validation(_))));
    }

    #[test]
    fn cross_month_detection() {
        let crossing = LeavePlan::FullDay {
            start_date: date(2024, 1, 30),
            end_date: date(2024, 2, 2),
        };
        assert!(crossing.crosses_month());

        let same_month = LeavePlan::FullDay {
            start_date: date(2024, 1, 2),
            end_date: date(2024, 1, 30),
        };
        assert!(!same_month.crosses_month());

        // Same month number, different year
        let year_boundary = LeavePlan::FullDay {
            start_date: date(2023, 12, 30),
            end_date: date(2024, 12, 30),
        };
        assert!(year_boundary.crosses_month());
    }

    #[test]
    fn tagged_payloads_deserialize_per_category() {
        let full: LeavePlan = serde_json::from_str(
            r#"{"leave_category":"Full Day","start_date":"2026-03-02","end_date":"2026-03-04"}"#,
        )
        .unwrap();
        assert_eq!(full.category(), LeaveCategory::FullDay);

        let half: LeavePlan = serde_json::from_str(
            r#"{"leave_category":"Half Day","start_date":"2026-03-02","half_day_period":"Afternoon"}"#,
        )
        .unwrap();
        assert_eq!(half.half_day_period(), Some(HalfDayPeriod::Afternoon));

        // A Half Day payload cannot carry an end_date anywhere the code can see
        assert_eq!(half.end_date(), None);
    }
}
