use crate::api::balance::{BalanceListResponse, UpdateBalance};
use crate::api::department::CreateDepartment;
use crate::api::leave::{CreateLeave, LeaveFilter, LeaveListResponse, RejectLeave};
use crate::api::user::{AssignManager, CreateUser};
use crate::leave::category::{HalfDayPeriod, LeaveCategory, LeavePlan};
use crate::model::department::Department;
use crate::model::leave_application::{LeaveApplication, LeaveStatus};
use crate::model::leave_balance::BalanceRecord;
use crate::model::leave_type::LeaveType;
use crate::model::user::User;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Management API",
        version = "1.0.0",
        description = r#"
## Leave Management System

This API powers a **leave management** workflow for an organization.

### 🔹 Key Features
- **Leave Requests**
  - Submit Full Day / Half Day / Short Leave requests, approve or reject them
- **Balance Ledger**
  - Per-employee, per-leave-type yearly balances with atomic debits
- **Role Scoping**
  - HR sees everything, managers see their direct reports, employees see themselves
- **User & Department Directory**
  - HR-managed accounts, manager assignment, departments

### 🔐 Security
All endpoints except `/auth/*` are protected using **JWT Bearer authentication**.
HR-only operations require a level-1 account.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave::leave_list,
        crate::api::leave::list_leave_types,
        crate::api::leave::get_leave,
        crate::api::leave::submit_leave,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,

        crate::api::balance::my_balances,
        crate::api::balance::employee_balances,
        crate::api::balance::initialize_balances,
        crate::api::balance::update_balance,

        crate::api::user::create_user,
        crate::api::user::list_users,
        crate::api::user::assign_manager,

        crate::api::department::list_departments,
        crate::api::department::create_department,
        crate::api::department::delete_department
    ),
    components(
        schemas(
            LeaveApplication,
            LeaveStatus,
            LeaveCategory,
            HalfDayPeriod,
            LeavePlan,
            CreateLeave,
            LeaveFilter,
            LeaveListResponse,
            RejectLeave,
            LeaveType,
            BalanceRecord,
            BalanceListResponse,
            UpdateBalance,
            User,
            CreateUser,
            AssignManager,
            Department,
            CreateDepartment
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave request workflow APIs"),
        (name = "Balance", description = "Leave balance ledger APIs"),
        (name = "User", description = "User directory APIs"),
        (name = "Department", description = "Department APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
