use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::leave::{self, ledger};
use crate::model::leave_balance::BalanceRecord;
use actix_web::{HttpResponse, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct BalanceListResponse {
    pub balances: Vec<BalanceRecord>,
}

/// HR override payload. The triple is stored exactly as given; the ledger
/// does not recompute `available_days` on this path.
#[derive(Deserialize, ToSchema)]
pub struct UpdateBalance {
    #[schema(example = "22.0", value_type = String)]
    pub total_days: Decimal,
    #[schema(example = "3.0", value_type = String)]
    pub used_days: Decimal,
    #[schema(example = "19.0", value_type = String)]
    pub available_days: Decimal,
}

/// Caller's own balances for the current year, lazily initialized
#[utoipa::path(
    get,
    path = "/api/v1/balance",
    responses(
        (status = 200, description = "Balance records", body = BalanceListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Balance"
)]
pub async fn my_balances(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    let balances =
        ledger::balances(pool.get_ref(), auth.user_id, leave::current_year()).await?;

    Ok(HttpResponse::Ok().json(BalanceListResponse { balances }))
}

/// Any employee's balances (HR only)
#[utoipa::path(
    get,
    path = "/api/v1/balance/employee/{user_id}",
    params(
        ("user_id" = u64, Path, description = "Employee user ID")
    ),
    responses(
        (status = 200, description = "Balance records", body = BalanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Balance"
)]
pub async fn employee_balances(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr()?;

    let balances =
        ledger::balances(pool.get_ref(), path.into_inner(), leave::current_year()).await?;

    Ok(HttpResponse::Ok().json(BalanceListResponse { balances }))
}

/// Seed balance records for an employee (HR only, idempotent)
#[utoipa::path(
    post,
    path = "/api/v1/balance/employee/{user_id}/initialize",
    params(
        ("user_id" = u64, Path, description = "Employee user ID")
    ),
    responses(
        (status = 200, description = "Balances initialized", body = Object, example = json!({
            "message": "Leave balances initialized successfully"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Balance"
)]
pub async fn initialize_balances(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr()?;

    ledger::initialize(pool.get_ref(), path.into_inner(), leave::current_year()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave balances initialized successfully"
    })))
}

/// Manual balance override (HR only)
#[utoipa::path(
    put,
    path = "/api/v1/balance/{balance_id}",
    params(
        ("balance_id" = u64, Path, description = "Balance record ID")
    ),
    request_body = UpdateBalance,
    responses(
        (status = 200, description = "Balance updated", body = Object, example = json!({
            "message": "Leave balance updated successfully"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Balance record not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Balance"
)]
pub async fn update_balance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateBalance>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr()?;

    let balance_id = path.into_inner();

    ledger::set_manual(
        pool.get_ref(),
        balance_id,
        payload.total_days,
        payload.used_days,
        payload.available_days,
    )
    .await?;

    info!(balance_id, hr_user = auth.user_id, "Manual balance override applied");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave balance updated successfully"
    })))
}
