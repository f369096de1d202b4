//! Leave application state machine: Pending -> Approved | Rejected.
//!
//! Approval couples the status flip and the ledger debit in one transaction.
//! The flip is a compare-and-set on `status = 'Pending'`, so two concurrent
//! decisions on the same application produce exactly one success; a failed
//! debit rolls the flip back and the application stays Pending.

use chrono::Datelike;
use sqlx::MySqlPool;
use tracing::info;

use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::leave::category::{LeaveCategory, LeavePlan};
use crate::leave::{ledger, rules};
use crate::model::leave_application::{LeaveApplication, LeaveStatus};
use crate::model::role::Role;

const SELECT_APPLICATION: &str = r#"
SELECT
    la.application_id,
    la.user_id,
    u.full_name AS employee_name,
    u.manager_id,
    la.leave_type_id,
    lt.leave_type_name,
    la.leave_category,
    la.start_date,
    la.end_date,
    la.half_day_period,
    la.short_leave_start_time,
    la.short_leave_end_time,
    la.total_days,
    la.reason,
    la.status,
    la.approved_by,
    la.approved_at,
    la.rejection_reason,
    la.created_at
FROM leave_applications la
JOIN users u ON la.user_id = u.user_id
JOIN leave_types lt ON la.leave_type_id = lt.leave_type_id
"#;

/// Rejection requires a reason the employee can act on.
fn validate_reason(reason: &str) -> AppResult<&str> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("rejection reason is required".into()));
    }
    Ok(trimmed)
}

pub async fn find(pool: &MySqlPool, application_id: u64) -> AppResult<LeaveApplication> {
    let sql = format!("{SELECT_APPLICATION} WHERE la.application_id = ?");

    sqlx::query_as::<_, LeaveApplication>(&sql)
        .bind(application_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("leave application"))
}

/// Pending + Approved Short Leave applications by `user_id` starting in the
/// same calendar month as `plan`. Pending ones count so an employee cannot
/// over-book before a manager acts.
async fn short_leaves_in_month(
    pool: &MySqlPool,
    user_id: u64,
    plan: &LeavePlan,
) -> AppResult<i64> {
    let start = plan.start_date();

    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM leave_applications
        WHERE user_id = ?
          AND leave_category = 'Short Leave'
          AND status IN ('Pending', 'Approved')
          AND YEAR(start_date) = ? AND MONTH(start_date) = ?
        "#,
    )
    .bind(user_id)
    .bind(start.year())
    .bind(start.month())
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Validates the request against the policy rules and creates a Pending
/// application with `total_days` precomputed.
pub async fn submit(
    pool: &MySqlPool,
    user_id: u64,
    leave_type_id: u64,
    plan: LeavePlan,
    reason: &str,
) -> AppResult<LeaveApplication> {
    let reason = validate_reason(reason)
        .map_err(|_| AppError::Validation("reason is required".into()))?;

    let year = crate::leave::current_year();

    let inputs = rules::RuleInputs {
        short_leaves_this_month: if plan.category() == LeaveCategory::ShortLeave {
            short_leaves_in_month(pool, user_id, &plan).await?
        } else {
            0
        },
        // Snapshot for the submit-time gate; debit re-checks at approval
        available_days: ledger::available(pool, user_id, leave_type_id, year).await?,
    };

    let total_days = rules::validate(&plan, &inputs)?;

    let (window_start, window_end) = plan.short_leave_window();

    let result = sqlx::query(
        r#"
        INSERT INTO leave_applications
            (user_id, leave_type_id, leave_category, start_date, end_date,
             half_day_period, short_leave_start_time, short_leave_end_time,
             total_days, reason, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'Pending')
        "#,
    )
    .bind(user_id)
    .bind(leave_type_id)
    .bind(plan.category())
    .bind(plan.start_date())
    .bind(plan.end_date())
    .bind(plan.half_day_period())
    .bind(window_start)
    .bind(window_end)
    .bind(total_days)
    .bind(reason)
    .execute(pool)
    .await?;

    let application_id = result.last_insert_id();
    info!(application_id, user_id, %total_days, "Leave application submitted");

    find(pool, application_id).await
}

/// Approves a Pending application and debits the ledger atomically.
pub async fn approve(
    pool: &MySqlPool,
    application_id: u64,
    approver_id: u64,
) -> AppResult<LeaveApplication> {
    let application = find(pool, application_id).await?;
    let year = crate::leave::current_year();

    // The balance row must exist before the conditional debit so that zero
    // affected rows can only mean "insufficient".
    ledger::initialize(pool, application.user_id, year).await?;

    let mut tx = pool.begin().await?;

    let flipped = sqlx::query(
        r#"
        UPDATE leave_applications
        SET status = 'Approved',
            approved_by = ?,
            approved_at = NOW()
        WHERE application_id = ?
          AND status = 'Pending'
        "#,
    )
    .bind(approver_id)
    .bind(application_id)
    .execute(&mut *tx)
    .await?;

    if flipped.rows_affected() == 0 {
        // Lost the race or already decided; rollback on drop
        return Err(AppError::InvalidStateTransition);
    }

    // Fails the whole transaction if the balance ran out since submit
    ledger::debit(
        &mut tx,
        application.user_id,
        application.leave_type_id,
        year,
        application.total_days,
    )
    .await?;

    tx.commit().await?;

    info!(application_id, approver_id, "Leave application approved");

    find(pool, application_id).await
}

/// Rejects a Pending application. A Pending request never debited, so the
/// ledger is untouched.
pub async fn reject(
    pool: &MySqlPool,
    application_id: u64,
    approver_id: u64,
    reason: &str,
) -> AppResult<LeaveApplication> {
    let reason = validate_reason(reason)?;

    // Distinguish a missing application from a decided one
    find(pool, application_id).await?;

    let result = sqlx::query(
        r#"
        UPDATE leave_applications
        SET status = 'Rejected',
            approved_by = ?,
            approved_at = NOW(),
            rejection_reason = ?
        WHERE application_id = ?
          AND status = 'Pending'
        "#,
    )
    .bind(approver_id)
    .bind(reason)
    .bind(application_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::InvalidStateTransition);
    }

    info!(application_id, approver_id, "Leave application rejected");

    find(pool, application_id).await
}

#[derive(Debug, Default)]
pub struct ListFilter {
    pub status: Option<LeaveStatus>,
    /// HR may narrow to one employee; ignored for other roles.
    pub employee_id: Option<u64>,
    pub page: u64,
    pub per_page: u64,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(String),
}

/// Scope-filtered, paginated listing. The caller's role narrows the WHERE
/// clause: HR sees everything, a manager their reports and themselves, an
/// employee only their own rows.
pub async fn list(
    pool: &MySqlPool,
    caller: &AuthUser,
    filter: &ListFilter,
) -> AppResult<(Vec<LeaveApplication>, i64)> {
    let per_page = filter.per_page.clamp(1, 100);
    let page = filter.page.max(1);
    let offset = (page - 1) * per_page;

    let mut conditions: Vec<&str> = Vec::new();
    let mut args: Vec<FilterValue> = Vec::new();

    match caller.role {
        Role::Hr => {
            if let Some(employee_id) = filter.employee_id {
                conditions.push("la.user_id = ?");
                args.push(FilterValue::U64(employee_id));
            }
        }
        Role::Manager => {
            conditions.push("(u.manager_id = ? OR la.user_id = ?)");
            args.push(FilterValue::U64(caller.user_id));
            args.push(FilterValue::U64(caller.user_id));
        }
        Role::Employee => {
            conditions.push("la.user_id = ?");
            args.push(FilterValue::U64(caller.user_id));
        }
    }

    if let Some(status) = filter.status {
        conditions.push("la.status = ?");
        args.push(FilterValue::Str(status.to_string()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!(
        r#"
        SELECT COUNT(*)
        FROM leave_applications la
        JOIN users u ON la.user_id = u.user_id
        {where_clause}
        "#
    );

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(s.clone()),
        };
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "{SELECT_APPLICATION} {where_clause} ORDER BY la.created_at DESC LIMIT ? OFFSET ?"
    );

    let mut data_q = sqlx::query_as::<_, LeaveApplication>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let applications = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok((applications, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_reason_must_be_non_empty() {
        assert!(matches!(validate_reason(""), Err(AppError::Validation(_))));
        assert!(matches!(validate_reason("   "), Err(AppError::Validation(_))));
        assert_eq!(validate_reason("  short-staffed  ").unwrap(), "short-staffed");
    }
}

#[cfg(test)]
mod db_tests {
    //! Run against a disposable MySQL with `schema.sql` applied:
    //! `TEST_DATABASE_URL=mysql://... cargo test -- --ignored`

    use super::*;
    use crate::leave::ledger::db_tests::{seed_user, test_pool};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn full_day(start: NaiveDate, end: NaiveDate) -> LeavePlan {
        LeavePlan::FullDay {
            start_date: start,
            end_date: end,
        }
    }

    /// A two-day request inside the current month, so the cross-month rule
    /// never interferes with what the test is actually about.
    fn two_days_this_month() -> LeavePlan {
        let today = chrono::Utc::now().date_naive();
        let start = today.with_day(1).unwrap_or(today);
        full_day(start, start.succ_opt().unwrap())
    }

    async fn balance_for(pool: &MySqlPool, user_id: u64) -> crate::model::leave_balance::BalanceRecord {
        ledger::balances(pool, user_id, crate::leave::current_year())
            .await
            .unwrap()
            .into_iter()
            .find(|b| b.leave_type_id == 1)
            .unwrap()
    }

    #[actix_web::test]
    #[ignore]
    async fn submit_creates_pending_with_precomputed_days() {
        let pool = test_pool().await;
        let employee = seed_user(&pool, 3).await;

        let application = submit(&pool, employee, 1, two_days_this_month(), "family visit")
            .await
            .unwrap();

        assert_eq!(application.status, LeaveStatus::Pending);
        assert_eq!(application.total_days, dec!(2.0));
        assert!(application.approved_by.is_none());

        // Submission alone never touches the ledger
        assert_eq!(balance_for(&pool, employee).await.used_days, dec!(0.0));
    }

    #[actix_web::test]
    #[ignore]
    async fn approve_flips_status_and_debits_once() {
        let pool = test_pool().await;
        let employee = seed_user(&pool, 3).await;
        let manager = seed_user(&pool, 2).await;

        let application = submit(&pool, employee, 1, two_days_this_month(), "trip")
            .await
            .unwrap();

        let approved = approve(&pool, application.application_id, manager)
            .await
            .unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.approved_by, Some(manager));

        let balance = balance_for(&pool, employee).await;
        assert_eq!(balance.used_days, dec!(2.0));
        assert_eq!(balance.available_days, balance.total_days - dec!(2.0));
    }

    #[actix_web::test]
    #[ignore]
    async fn second_decision_on_same_application_conflicts() {
        let pool = test_pool().await;
        let employee = seed_user(&pool, 3).await;
        let manager = seed_user(&pool, 2).await;

        let application = submit(&pool, employee, 1, two_days_this_month(), "trip")
            .await
            .unwrap();

        approve(&pool, application.application_id, manager)
            .await
            .unwrap();

        let err = approve(&pool, application.application_id, manager)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition));

        let err = reject(&pool, application.application_id, manager, "late")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition));

        // Exactly one debit despite three decision attempts
        assert_eq!(balance_for(&pool, employee).await.used_days, dec!(2.0));
    }

    #[actix_web::test]
    #[ignore]
    async fn concurrent_approvals_produce_one_winner() {
        let pool = test_pool().await;
        let employee = seed_user(&pool, 3).await;
        let manager = seed_user(&pool, 2).await;

        let application = submit(&pool, employee, 1, two_days_this_month(), "trip")
            .await
            .unwrap();

        let id = application.application_id;
        let (a, b) = futures::future::join(
            approve(&pool, id, manager),
            approve(&pool, id, manager),
        )
        .await;

        let successes = [a.is_ok(), b.is_ok()].iter().filter(|&&ok| ok).count();
        assert_eq!(successes, 1);

        // The loser saw a non-Pending row
        for outcome in [a, b] {
            if let Err(err) = outcome {
                assert!(matches!(err, AppError::InvalidStateTransition));
            }
        }

        assert_eq!(balance_for(&pool, employee).await.used_days, dec!(2.0));
    }

    #[actix_web::test]
    #[ignore]
    async fn failed_debit_rolls_back_the_approval() {
        let pool = test_pool().await;
        let employee = seed_user(&pool, 3).await;
        let manager = seed_user(&pool, 2).await;

        let application = submit(&pool, employee, 1, two_days_this_month(), "trip")
            .await
            .unwrap();

        // Balance collapses between submit and approve
        let balance = balance_for(&pool, employee).await;
        ledger::set_manual(&pool, balance.balance_id, dec!(20.0), dec!(19.5), dec!(0.5))
            .await
            .unwrap();

        let err = approve(&pool, application.application_id, manager)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance));

        // The status flip rolled back with the debit
        let reloaded = find(&pool, application.application_id).await.unwrap();
        assert_eq!(reloaded.status, LeaveStatus::Pending);
        assert_eq!(balance_for(&pool, employee).await.used_days, dec!(19.5));
    }

    #[actix_web::test]
    #[ignore]
    async fn reject_records_reason_and_leaves_ledger_alone() {
        let pool = test_pool().await;
        let employee = seed_user(&pool, 3).await;
        let manager = seed_user(&pool, 2).await;

        let application = submit(&pool, employee, 1, two_days_this_month(), "trip")
            .await
            .unwrap();

        let rejected = reject(&pool, application.application_id, manager, "short-staffed")
            .await
            .unwrap();
        assert_eq!(rejected.status, LeaveStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("short-staffed"));

        assert_eq!(balance_for(&pool, employee).await.used_days, dec!(0.0));
    }

    #[actix_web::test]
    #[ignore]
    async fn third_short_leave_in_a_month_is_capped() {
        let pool = test_pool().await;
        let employee = seed_user(&pool, 3).await;

        let start = chrono::Utc::now().date_naive().with_day(1).unwrap();
        let short = |day: u32| LeavePlan::ShortLeave {
            start_date: start.with_day(day).unwrap(),
            short_leave_start_time: None,
            short_leave_end_time: None,
        };

        submit(&pool, employee, 1, short(2), "errand").await.unwrap();
        submit(&pool, employee, 1, short(3), "errand").await.unwrap();

        let err = submit(&pool, employee, 1, short(4), "errand")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ShortLeaveLimitExceeded));
    }
}
