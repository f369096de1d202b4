//! Policy checks run before a Pending application is created.
//!
//! All functions here are pure; the workflow fetches the inputs (existing
//! short-leave count, balance snapshot) and calls [`validate`], which
//! short-circuits: cross-month, then short-leave cap, then sufficiency.

use rust_decimal::Decimal;

use crate::error::{AppError, AppResult};
use crate::leave::category::{LeaveCategory, LeavePlan};

/// Max Pending/Approved Short Leave requests per employee per calendar month.
pub const SHORT_LEAVES_PER_MONTH: i64 = 2;

/// Snapshot of everything the rules need to judge a request.
#[derive(Debug)]
pub struct RuleInputs {
    /// Pending + Approved Short Leave applications by the same employee whose
    /// start_date falls in the same (year, month) as the new request.
    pub short_leaves_this_month: i64,
    /// `available_days` of the matching balance record at submit time. This
    /// is a UX gate only; the ledger re-checks at debit time.
    pub available_days: Decimal,
}

pub fn check_cross_month(plan: &LeavePlan) -> AppResult<()> {
    if plan.crosses_month() {
        return Err(AppError::CrossMonthNotAllowed);
    }
    Ok(())
}

pub fn check_short_leave_cap(plan: &LeavePlan, existing_this_month: i64) -> AppResult<()> {
    if plan.category() == LeaveCategory::ShortLeave
        && existing_this_month >= SHORT_LEAVES_PER_MONTH
    {
        return Err(AppError::ShortLeaveLimitExceeded);
    }
    Ok(())
}

pub fn check_sufficiency(available_days: Decimal, requested_days: Decimal) -> AppResult<()> {
    if available_days < requested_days {
        return Err(AppError::InsufficientBalance);
    }
    Ok(())
}

/// Runs all checks in order and returns the day count the application
/// should be created with.
pub fn validate(plan: &LeavePlan, inputs: &RuleInputs) -> AppResult<Decimal> {
    let requested = plan.day_count()?;
    check_cross_month(plan)?;
    check_short_leave_cap(plan, inputs.short_leaves_this_month)?;
    check_sufficiency(inputs.available_days, requested)?;
    Ok(requested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leave::category::HalfDayPeriod;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn full_day(start: NaiveDate, end: NaiveDate) -> LeavePlan {
        LeavePlan::FullDay {
            start_date: start,
            end_date: end,
        }
    }

    fn short_leave() -> LeavePlan {
        LeavePlan::ShortLeave {
            start_date: date(2024, 3, 11),
            short_leave_start_time: None,
            short_leave_end_time: None,
        }
    }

    fn inputs(short_leaves: i64, available: Decimal) -> RuleInputs {
        RuleInputs {
            short_leaves_this_month: short_leaves,
            available_days: available,
        }
    }

    #[test]
    fn cross_month_full_day_is_rejected() {
        let plan = full_day(date(2024, 1, 30), date(2024, 2, 2));
        let err = validate(&plan, &inputs(0, dec!(20))).unwrap_err();
        assert!(matches!(err, AppError::CrossMonthNotAllowed));
    }

    #[test]
    fn half_day_never_crosses_month() {
        let plan = LeavePlan::HalfDay {
            start_date: date(2024, 1, 31),
            half_day_period: HalfDayPeriod::Morning,
        };
        assert_eq!(validate(&plan, &inputs(0, dec!(20))).unwrap(), dec!(0.5));
    }

    #[test]
    fn third_short_leave_in_month_is_rejected() {
        let err = validate(&short_leave(), &inputs(2, dec!(20))).unwrap_err();
        assert!(matches!(err, AppError::ShortLeaveLimitExceeded));
    }

    #[test]
    fn second_short_leave_in_month_is_allowed() {
        assert_eq!(
            validate(&short_leave(), &inputs(1, dec!(20))).unwrap(),
            dec!(0.25)
        );
    }

    #[test]
    fn cap_only_applies_to_short_leave() {
        // Two short leaves this month must not block a full-day request
        let plan = full_day(date(2024, 3, 4), date(2024, 3, 5));
        assert_eq!(validate(&plan, &inputs(2, dec!(20))).unwrap(), dec!(2));
    }

    #[test]
    fn insufficient_balance_is_rejected() {
        let plan = full_day(date(2024, 3, 4), date(2024, 3, 5));
        let err = validate(&plan, &inputs(0, dec!(1.0))).unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance));
    }

    #[test]
    fn exact_balance_is_sufficient() {
        let plan = full_day(date(2024, 3, 4), date(2024, 3, 5));
        assert_eq!(validate(&plan, &inputs(0, dec!(2.0))).unwrap(), dec!(2));
    }

    #[test]
    fn checks_short_circuit_in_order() {
        // Both cross-month and insufficient: cross-month wins
        let plan = full_day(date(2024, 1, 30), date(2024, 2, 2));
        let err = validate(&plan, &inputs(0, dec!(0))).unwrap_err();
        assert!(matches!(err, AppError::CrossMonthNotAllowed));

        // Both cap and insufficient: cap wins
        let err = validate(&short_leave(), &inputs(5, dec!(0))).unwrap_err();
        assert!(matches!(err, AppError::ShortLeaveLimitExceeded));
    }

    #[test]
    fn malformed_span_fails_before_policy() {
        let plan = full_day(date(2024, 2, 2), date(2024, 1, 30));
        let err = validate(&plan, &inputs(0, dec!(20))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
