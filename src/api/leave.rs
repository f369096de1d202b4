use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::leave::category::LeavePlan;
use crate::leave::workflow::{self, ListFilter};
use crate::leave::scope;
use crate::model::leave_application::{LeaveApplication, LeaveStatus};
use crate::model::leave_type::LeaveType;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 1)]
    pub leave_type_id: u64,
    #[schema(example = "Family visit")]
    pub reason: String,
    /// Category-specific fields, tagged by `leave_category`
    #[serde(flatten)]
    pub plan: LeavePlan,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = "Pending")]
    /// Filter by leave status
    pub status: Option<LeaveStatus>,
    #[schema(example = 7)]
    /// Narrow to one employee (HR only; ignored for other roles)
    pub employee_id: Option<u64>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveApplication>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, ToSchema)]
pub struct RejectLeave {
    #[schema(example = "Team is short-staffed that week")]
    pub rejection_reason: String,
}

/* =========================
Submit leave request
========================= */
/// Validates the request (cross-month, short-leave cap, balance sufficiency,
/// in that order) and creates a Pending application for the caller.
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload, tagged by leave_category",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Pending application created", body = LeaveApplication),
        (status = 400, description = "Malformed input"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Policy rejection (cross-month, short-leave cap, insufficient balance)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn submit_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();

    let application = workflow::submit(
        pool.get_ref(),
        auth.user_id,
        payload.leave_type_id,
        payload.plan,
        &payload.reason,
    )
    .await?;

    Ok(HttpResponse::Ok().json(application))
}

/// Leave type catalog, needed to fill in `leave_type_id` on submission
#[utoipa::path(
    get,
    path = "/api/v1/leave/types",
    responses(
        (status = 200, description = "Leave type catalog", body = [LeaveType]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn list_leave_types(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    let types = sqlx::query_as::<_, LeaveType>(
        "SELECT leave_type_id, leave_type_name, description FROM leave_types ORDER BY leave_type_id",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(types))
}

/// Scope-filtered, paginated list of applications
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, AppError> {
    let filter = ListFilter {
        status: query.status,
        employee_id: query.employee_id,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(10),
    };

    let (data, total) = workflow::list(pool.get_ref(), &auth, &filter).await?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data,
        page: filter.page.max(1),
        per_page: filter.per_page.clamp(1, 100),
        total,
    }))
}

/// Fetch one application, scope-gated
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave application to fetch")
    ),
    responses(
        (status = 200, description = "Leave application found", body = LeaveApplication),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave application not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let application = workflow::find(pool.get_ref(), path.into_inner()).await?;

    scope::can_view(&auth, application.user_id, application.manager_id)?;

    Ok(HttpResponse::Ok().json(application))
}

/* =========================
Approve leave (HR / direct manager)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave application to approve")
    ),
    responses(
        (status = 200, description = "Leave approved, balance debited", body = LeaveApplication),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave application not found"),
        (status = 409, description = "Application is not pending"),
        (status = 422, description = "Balance became insufficient since submission")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let leave_id = path.into_inner();

    let application = workflow::find(pool.get_ref(), leave_id).await?;
    scope::can_decide(&auth, application.manager_id)?;

    let application = workflow::approve(pool.get_ref(), leave_id, auth.user_id).await?;

    Ok(HttpResponse::Ok().json(application))
}

/* =========================
Reject leave (HR / direct manager)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave application to reject")
    ),
    request_body = RejectLeave,
    responses(
        (status = 200, description = "Leave rejected", body = LeaveApplication),
        (status = 400, description = "Missing rejection reason"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave application not found"),
        (status = 409, description = "Application is not pending")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<RejectLeave>,
) -> Result<HttpResponse, AppError> {
    let leave_id = path.into_inner();

    let application = workflow::find(pool.get_ref(), leave_id).await?;
    scope::can_decide(&auth, application.manager_id)?;

    let application = workflow::reject(
        pool.get_ref(),
        leave_id,
        auth.user_id,
        &payload.rejection_reason,
    )
    .await?;

    Ok(HttpResponse::Ok().json(application))
}
