//! Access scope resolver.
//!
//! Capability check, not a data filter: evaluated before any read or
//! transition on a single application. List endpoints narrow their WHERE
//! clause instead (see `leave::workflow::list`).
//!
//! HR sees and decides everything. A manager acts only on applications whose
//! owner reports to them. An employee may read their own applications and
//! decide nothing.

use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::role::Role;

/// May the caller read this application?
pub fn can_view(caller: &AuthUser, owner_id: u64, owner_manager_id: Option<u64>) -> AppResult<()> {
    let allowed = match caller.role {
        Role::Hr => true,
        Role::Manager => owner_manager_id == Some(caller.user_id) || owner_id == caller.user_id,
        Role::Employee => owner_id == caller.user_id,
    };
    if allowed { Ok(()) } else { Err(AppError::AccessDenied) }
}

/// May the caller approve or reject this application?
pub fn can_decide(caller: &AuthUser, owner_manager_id: Option<u64>) -> AppResult<()> {
    let allowed = match caller.role {
        Role::Hr => true,
        Role::Manager => owner_manager_id == Some(caller.user_id),
        Role::Employee => false,
    };
    if allowed { Ok(()) } else { Err(AppError::AccessDenied) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(user_id: u64, role: Role) -> AuthUser {
        AuthUser {
            user_id,
            email: format!("user{user_id}@company.com"),
            role,
        }
    }

    #[test]
    fn hr_is_unrestricted() {
        let hr = caller(1, Role::Hr);
        assert!(can_view(&hr, 99, None).is_ok());
        assert!(can_decide(&hr, None).is_ok());
    }

    #[test]
    fn manager_acts_on_direct_reports_only() {
        let mgr = caller(2, Role::Manager);
        assert!(can_view(&mgr, 7, Some(2)).is_ok());
        assert!(can_decide(&mgr, Some(2)).is_ok());

        // Someone else's report
        assert!(matches!(can_view(&mgr, 7, Some(5)), Err(AppError::AccessDenied)));
        assert!(matches!(can_decide(&mgr, Some(5)), Err(AppError::AccessDenied)));

        // Employee with no manager at all
        assert!(matches!(can_decide(&mgr, None), Err(AppError::AccessDenied)));
    }

    #[test]
    fn manager_can_read_own_applications() {
        let mgr = caller(2, Role::Manager);
        assert!(can_view(&mgr, 2, None).is_ok());
    }

    #[test]
    fn employee_reads_own_and_decides_nothing() {
        let emp = caller(7, Role::Employee);
        assert!(can_view(&emp, 7, Some(2)).is_ok());
        assert!(matches!(can_view(&emp, 8, Some(2)), Err(AppError::AccessDenied)));
        // Even their own application
        assert!(matches!(can_decide(&emp, Some(2)), Err(AppError::AccessDenied)));
    }
}
