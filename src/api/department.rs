use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::department::Department;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateDepartment {
    #[schema(example = "Engineering")]
    pub department_name: String,
    #[schema(example = "ENG")]
    pub department_code: String,
    #[schema(example = "Product engineering", nullable = true)]
    pub description: Option<String>,
}

/// List departments
#[utoipa::path(
    get,
    path = "/api/v1/department",
    responses(
        (status = 200, description = "Department list", body = [Department]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Department"
)]
pub async fn list_departments(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    let departments = sqlx::query_as::<_, Department>(
        "SELECT department_id, department_name, department_code, description FROM departments ORDER BY department_name",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(departments))
}

/// Create a department (HR only)
#[utoipa::path(
    post,
    path = "/api/v1/department",
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 400, description = "Missing name or code"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Department"
)]
pub async fn create_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDepartment>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr()?;

    if payload.department_name.trim().is_empty() || payload.department_code.trim().is_empty() {
        return Err(AppError::Validation(
            "department name and code are required".into(),
        ));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO departments (department_name, department_code, description)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(payload.department_name.trim())
    .bind(payload.department_code.trim())
    .bind(&payload.description)
    .execute(pool.get_ref())
    .await?;

    let department = sqlx::query_as::<_, Department>(
        "SELECT department_id, department_name, department_code, description FROM departments WHERE department_id = ?",
    )
    .bind(result.last_insert_id())
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(department))
}

/// Delete a department (HR only)
#[utoipa::path(
    delete,
    path = "/api/v1/department/{department_id}",
    params(
        ("department_id" = u64, Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Department deleted", body = Object, example = json!({
            "message": "Department deleted successfully"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Department not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Department"
)]
pub async fn delete_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr()?;

    let result = sqlx::query("DELETE FROM departments WHERE department_id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("department"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Department deleted successfully"
    })))
}
