use crate::auth::auth::AuthUser;
use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::leave::{self, ledger};
use crate::model::role::Role;
use crate::model::user::User;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateUser {
    #[schema(example = "jane.doe@company.com", format = "email")]
    pub email: String,
    pub password: String,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    /// 1 = HR, 2 = Manager, 3 = Employee
    #[schema(example = 3)]
    pub user_level: u8,
    #[schema(example = 2, nullable = true)]
    pub manager_id: Option<u64>,
    #[schema(example = 1, nullable = true)]
    pub department_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct AssignManager {
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = 2)]
    pub manager_id: u64,
}

fn validate_new_user(payload: &CreateUser) -> AppResult<()> {
    if payload.email.trim().is_empty()
        || payload.password.is_empty()
        || payload.full_name.trim().is_empty()
    {
        return Err(AppError::Validation(
            "email, password and full_name are required".into(),
        ));
    }

    let role = Role::from_id(payload.user_level)
        .ok_or_else(|| AppError::Validation("user_level must be 1, 2 or 3".into()))?;

    // Managers anchor a team; a team lives in a department
    if role == Role::Manager && payload.department_id.is_none() {
        return Err(AppError::Validation(
            "department_id is required for managers".into(),
        ));
    }

    Ok(())
}

/// Create a user and seed their leave balances (HR only)
#[utoipa::path(
    post,
    path = "/api/v1/user",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created, balances seeded", body = User),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already registered")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "User"
)]
pub async fn create_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateUser>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr()?;
    validate_new_user(&payload)?;

    let hashed = hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;

    let result = sqlx::query(
        r#"
        INSERT INTO users (email, password_hash, full_name, user_level, manager_id, department_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.email.trim())
    .bind(&hashed)
    .bind(payload.full_name.trim())
    .bind(payload.user_level)
    .bind(payload.manager_id)
    .bind(payload.department_id)
    .execute(pool.get_ref())
    .await;

    let result = match result {
        Ok(r) => r,
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code() == Some("23000".into()) {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "error": "Email already registered"
                    })));
                }
            }
            error!(error = %e, "Failed to create user");
            return Err(AppError::Database(e));
        }
    };

    let user_id = result.last_insert_id();

    // New users start with the default entitlement per leave type
    ledger::initialize(pool.get_ref(), user_id, leave::current_year()).await?;

    info!(user_id, "User created");

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, email, full_name, user_level, manager_id, department_id, created_at
        FROM users
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(user))
}

/// List all users (HR only)
#[utoipa::path(
    get,
    path = "/api/v1/user",
    responses(
        (status = 200, description = "User directory", body = [User]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "User"
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr()?;

    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, email, full_name, user_level, manager_id, department_id, created_at
        FROM users
        ORDER BY user_level, user_id
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(users))
}

/// Assign or move an employee under a manager (HR only)
#[utoipa::path(
    put,
    path = "/api/v1/user/assign-manager",
    request_body = AssignManager,
    responses(
        (status = 200, description = "Manager assigned", body = Object, example = json!({
            "message": "Manager assigned successfully"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User or manager not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "User"
)]
pub async fn assign_manager(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<AssignManager>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr()?;

    let manager_exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE user_id = ? AND user_level = 2)",
    )
    .bind(payload.manager_id)
    .fetch_one(pool.get_ref())
    .await?;

    if !manager_exists {
        return Err(AppError::NotFound("manager"));
    }

    let result = sqlx::query("UPDATE users SET manager_id = ? WHERE user_id = ?")
        .bind(payload.manager_id)
        .bind(payload.user_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("user"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Manager assigned successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(user_level: u8, department_id: Option<u64>) -> CreateUser {
        CreateUser {
            email: "new.hire@company.com".into(),
            password: "hunter2hunter2".into(),
            full_name: "New Hire".into(),
            user_level,
            manager_id: None,
            department_id,
        }
    }

    #[test]
    fn manager_requires_department() {
        assert!(matches!(
            validate_new_user(&payload(2, None)),
            Err(AppError::Validation(_))
        ));
        assert!(validate_new_user(&payload(2, Some(1))).is_ok());
        assert!(validate_new_user(&payload(3, None)).is_ok());
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(matches!(
            validate_new_user(&payload(9, None)),
            Err(AppError::Validation(_))
        ));
    }
}
