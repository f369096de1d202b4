//! Balance ledger: the only code that mutates `leave_balances`.
//!
//! Every mutation is a single conditional UPDATE so concurrent approvals
//! serialize on the row; `debit` re-checks sufficiency atomically with the
//! mutation. `set_manual` is the explicit HR carve-out that stores whatever
//! triple it is given.

use rust_decimal::Decimal;
use sqlx::{MySql, MySqlPool, Transaction};

use crate::error::{AppError, AppResult};
use crate::model::leave_balance::BalanceRecord;

async fn user_exists(pool: &MySqlPool, user_id: u64) -> AppResult<bool> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = ?)")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Seeds a balance row per known leave type at 20.0/0/20.0 for every type
/// the user has no record for in `year`. Idempotent.
pub async fn initialize(pool: &MySqlPool, user_id: u64, year: i16) -> AppResult<()> {
    if !user_exists(pool, user_id).await? {
        return Err(AppError::NotFound("employee"));
    }

    sqlx::query(
        r#"
        INSERT INTO leave_balances (user_id, leave_type_id, total_days, used_days, available_days, year)
        SELECT ?, lt.leave_type_id, 20.0, 0.0, 20.0, ?
        FROM leave_types lt
        WHERE NOT EXISTS (
            SELECT 1 FROM leave_balances lb
            WHERE lb.user_id = ? AND lb.leave_type_id = lt.leave_type_id AND lb.year = ?
        )
        "#,
    )
    .bind(user_id)
    .bind(year)
    .bind(user_id)
    .bind(year)
    .execute(pool)
    .await?;

    Ok(())
}

/// All balance records for a user/year, lazily initialized on first access.
pub async fn balances(pool: &MySqlPool, user_id: u64, year: i16) -> AppResult<Vec<BalanceRecord>> {
    initialize(pool, user_id, year).await?;

    let records = sqlx::query_as::<_, BalanceRecord>(
        r#"
        SELECT
            lb.balance_id,
            lb.user_id,
            lb.leave_type_id,
            lt.leave_type_name,
            lb.total_days,
            lb.used_days,
            lb.available_days,
            lb.year
        FROM leave_balances lb
        JOIN leave_types lt ON lb.leave_type_id = lt.leave_type_id
        WHERE lb.user_id = ? AND lb.year = ?
        ORDER BY lb.leave_type_id
        "#,
    )
    .bind(user_id)
    .bind(year)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// Snapshot of `available_days` for one leave type, lazily initialized.
/// Used by the submit-time sufficiency check.
pub async fn available(
    pool: &MySqlPool,
    user_id: u64,
    leave_type_id: u64,
    year: i16,
) -> AppResult<Decimal> {
    initialize(pool, user_id, year).await?;

    sqlx::query_scalar::<_, Decimal>(
        "SELECT available_days FROM leave_balances WHERE user_id = ? AND leave_type_id = ? AND year = ?",
    )
    .bind(user_id)
    .bind(leave_type_id)
    .bind(year)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("leave type"))
}

/// Debits `days` inside the caller's transaction. The `available_days >= ?`
/// guard makes the sufficiency re-check atomic with the mutation: of two
/// racing debits only the first can match once the balance runs out.
///
/// The row must already exist (callers run [`initialize`] beforehand), so
/// zero affected rows means the balance is insufficient.
pub async fn debit(
    tx: &mut Transaction<'_, MySql>,
    user_id: u64,
    leave_type_id: u64,
    year: i16,
    days: Decimal,
) -> AppResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE leave_balances
        SET used_days = used_days + ?,
            available_days = total_days - (used_days + ?)
        WHERE user_id = ? AND leave_type_id = ? AND year = ?
          AND available_days >= ?
        "#,
    )
    .bind(days)
    .bind(days)
    .bind(user_id)
    .bind(leave_type_id)
    .bind(year)
    .bind(days)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::InsufficientBalance);
    }

    Ok(())
}

/// Reverses a prior debit. `used_days` is clamped at zero and
/// `available_days` recomputed from the clamped value.
///
/// No shipped transition calls this yet; it exists for a future
/// Approved -> Cancelled transition that must restore the balance.
pub async fn credit(
    pool: &MySqlPool,
    user_id: u64,
    leave_type_id: u64,
    year: i16,
    days: Decimal,
) -> AppResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE leave_balances
        SET used_days = GREATEST(used_days - ?, 0),
            available_days = total_days - GREATEST(used_days - ?, 0)
        WHERE user_id = ? AND leave_type_id = ? AND year = ?
        "#,
    )
    .bind(days)
    .bind(days)
    .bind(user_id)
    .bind(leave_type_id)
    .bind(year)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("balance record"));
    }

    Ok(())
}

/// HR override: stores the triple verbatim, no recomputation of
/// `available_days`. Mid-year policy corrections may legitimately need a
/// triple that does not satisfy the derived-field formula.
pub async fn set_manual(
    pool: &MySqlPool,
    balance_id: u64,
    total_days: Decimal,
    used_days: Decimal,
    available_days: Decimal,
) -> AppResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE leave_balances
        SET total_days = ?,
            used_days = ?,
            available_days = ?
        WHERE balance_id = ?
        "#,
    )
    .bind(total_days)
    .bind(used_days)
    .bind(available_days)
    .bind(balance_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("balance record"));
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod db_tests {
    //! Run against a disposable MySQL with `schema.sql` applied:
    //! `TEST_DATABASE_URL=mysql://... cargo test -- --ignored`

    use super::*;
    use rust_decimal_macros::dec;

    pub(crate) async fn test_pool() -> MySqlPool {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
        MySqlPool::connect(&url).await.expect("test db connect")
    }

    /// Inserts a throwaway employee and returns its id.
    pub(crate) async fn seed_user(pool: &MySqlPool, user_level: u8) -> u64 {
        let email = format!("{}@test.local", uuid::Uuid::new_v4());
        sqlx::query(
            "INSERT INTO users (email, password_hash, full_name, user_level) VALUES (?, 'x', 'Test User', ?)",
        )
        .bind(email)
        .bind(user_level)
        .execute(pool)
        .await
        .expect("seed user")
        .last_insert_id()
    }

    #[actix_web::test]
    #[ignore]
    async fn initialize_seeds_default_entitlement_once() {
        let pool = test_pool().await;
        let user_id = seed_user(&pool, 3).await;

        initialize(&pool, user_id, 2026).await.unwrap();
        initialize(&pool, user_id, 2026).await.unwrap(); // idempotent

        let records = balances(&pool, user_id, 2026).await.unwrap();
        assert!(!records.is_empty());
        for record in records {
            assert_eq!(record.total_days, dec!(20.0));
            assert_eq!(record.used_days, dec!(0.0));
            assert_eq!(record.available_days, dec!(20.0));
        }
    }

    #[actix_web::test]
    #[ignore]
    async fn initialize_rejects_unknown_user() {
        let pool = test_pool().await;
        let err = initialize(&pool, u64::MAX, 2026).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("employee")));
    }

    #[actix_web::test]
    #[ignore]
    async fn debit_and_credit_keep_available_derived() {
        let pool = test_pool().await;
        let user_id = seed_user(&pool, 3).await;
        initialize(&pool, user_id, 2026).await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        debit(&mut tx, user_id, 1, 2026, dec!(3.25)).await.unwrap();
        tx.commit().await.unwrap();

        let after_debit = balances(&pool, user_id, 2026)
            .await
            .unwrap()
            .into_iter()
            .find(|b| b.leave_type_id == 1)
            .unwrap();
        assert_eq!(after_debit.used_days, dec!(3.25));
        assert_eq!(
            after_debit.available_days,
            after_debit.total_days - after_debit.used_days
        );

        credit(&pool, user_id, 1, 2026, dec!(1.0)).await.unwrap();

        let after_credit = balances(&pool, user_id, 2026)
            .await
            .unwrap()
            .into_iter()
            .find(|b| b.leave_type_id == 1)
            .unwrap();
        assert_eq!(after_credit.used_days, dec!(2.25));
        assert_eq!(
            after_credit.available_days,
            after_credit.total_days - after_credit.used_days
        );
    }

    #[actix_web::test]
    #[ignore]
    async fn credit_clamps_used_days_at_zero() {
        let pool = test_pool().await;
        let user_id = seed_user(&pool, 3).await;
        initialize(&pool, user_id, 2026).await.unwrap();

        // Nothing was ever debited, so an oversized credit must not go negative
        credit(&pool, user_id, 1, 2026, dec!(5.0)).await.unwrap();

        let record = balances(&pool, user_id, 2026)
            .await
            .unwrap()
            .into_iter()
            .find(|b| b.leave_type_id == 1)
            .unwrap();
        assert_eq!(record.used_days, dec!(0.0));
        assert_eq!(record.available_days, record.total_days);
    }

    #[actix_web::test]
    #[ignore]
    async fn debit_fails_when_balance_insufficient() {
        let pool = test_pool().await;
        let user_id = seed_user(&pool, 3).await;
        initialize(&pool, user_id, 2026).await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let err = debit(&mut tx, user_id, 1, 2026, dec!(25.0)).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance));
        tx.rollback().await.unwrap();

        let record = balances(&pool, user_id, 2026)
            .await
            .unwrap()
            .into_iter()
            .find(|b| b.leave_type_id == 1)
            .unwrap();
        assert_eq!(record.available_days, dec!(20.0));
    }

    #[actix_web::test]
    #[ignore]
    async fn set_manual_stores_triple_verbatim() {
        let pool = test_pool().await;
        let user_id = seed_user(&pool, 3).await;
        initialize(&pool, user_id, 2026).await.unwrap();

        let record = balances(&pool, user_id, 2026)
            .await
            .unwrap()
            .into_iter()
            .find(|b| b.leave_type_id == 1)
            .unwrap();

        // A triple that deliberately violates total - used == available
        set_manual(&pool, record.balance_id, dec!(22.0), dec!(3.0), dec!(10.0))
            .await
            .unwrap();

        let updated = balances(&pool, user_id, 2026)
            .await
            .unwrap()
            .into_iter()
            .find(|b| b.leave_type_id == 1)
            .unwrap();
        assert_eq!(updated.total_days, dec!(22.0));
        assert_eq!(updated.used_days, dec!(3.0));
        assert_eq!(updated.available_days, dec!(10.0));
    }

    #[actix_web::test]
    #[ignore]
    async fn set_manual_unknown_record_is_not_found() {
        let pool = test_pool().await;
        let err = set_manual(&pool, u64::MAX, dec!(1.0), dec!(0.0), dec!(1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("balance record")));
    }
}
