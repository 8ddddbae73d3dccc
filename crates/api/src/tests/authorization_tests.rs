// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Permission matrix checks across every role.

use ce_ops_domain::{Role, TaskType};

use crate::error::ApiError;
use crate::{AuthenticatedActor, AuthorizationService};

fn actor(role: Role) -> AuthenticatedActor {
    AuthenticatedActor::new(1, format!("{}@example.com", role.as_str()), role)
}

fn allowed(
    roles: &[Role],
    check: impl Fn(&AuthenticatedActor) -> Result<(), ApiError>,
) -> Vec<Role> {
    roles
        .iter()
        .copied()
        .filter(|role| check(&actor(*role)).is_ok())
        .collect()
}

#[test]
fn test_only_admin_manages_users() {
    let roles = allowed(&Role::ALL, |a| {
        AuthorizationService::authorize_manage_users(a, "list_users").map_err(ApiError::from)
    });
    assert_eq!(roles, vec![Role::Admin]);
}

#[test]
fn test_bid_permissions() {
    let readers = allowed(&Role::ALL, |a| {
        AuthorizationService::authorize_read_bids(a).map_err(ApiError::from)
    });
    assert_eq!(readers, vec![Role::Admin, Role::Sales, Role::Ops]);

    let writers = allowed(&Role::ALL, |a| {
        AuthorizationService::authorize_write_bids(a, "create_bid").map_err(ApiError::from)
    });
    assert_eq!(writers, vec![Role::Admin, Role::Sales]);
}

#[test]
fn test_scheduling_permissions() {
    let schedulers = allowed(&Role::ALL, |a| {
        AuthorizationService::authorize_schedule(a, "create_task").map_err(ApiError::from)
    });
    assert_eq!(schedulers, vec![Role::Admin, Role::Ops]);
}

#[test]
fn test_purchasing_permissions() {
    let readers = allowed(&Role::ALL, |a| {
        AuthorizationService::authorize_read_purchasing(a).map_err(ApiError::from)
    });
    assert_eq!(readers, vec![Role::Admin, Role::Ops, Role::Purchasing]);

    let writers = allowed(&Role::ALL, |a| {
        AuthorizationService::authorize_write_purchasing(a, "receive_items")
            .map_err(ApiError::from)
    });
    assert_eq!(writers, vec![Role::Admin, Role::Purchasing]);
}

#[test]
fn test_each_field_role_reports_on_its_own_task_type() {
    let pairs = [
        (Role::Installer, TaskType::Install),
        (Role::Service, TaskType::Service),
        (Role::Manufacturing, TaskType::Manufacturing),
        (Role::Assembly, TaskType::Assembly),
        (Role::Delivery, TaskType::Delivery),
    ];

    for (role, own_type) in pairs {
        for task_type in TaskType::ALL {
            let result = AuthorizationService::authorize_report_task_event(&actor(role), task_type);
            assert_eq!(
                result.is_ok(),
                task_type == own_type,
                "{role} reporting on {}",
                task_type.as_str()
            );
        }
    }
}

#[test]
fn test_office_roles_report_only_when_scheduling() {
    for task_type in TaskType::ALL {
        assert!(
            AuthorizationService::authorize_report_task_event(&actor(Role::Ops), task_type)
                .is_ok()
        );
        assert!(
            AuthorizationService::authorize_report_task_event(&actor(Role::Sales), task_type)
                .is_err()
        );
        assert!(
            AuthorizationService::authorize_report_task_event(&actor(Role::Purchasing), task_type)
                .is_err()
        );
    }
}

#[test]
fn test_denial_names_action() {
    let err = AuthorizationService::authorize_schedule(&actor(Role::Installer), "delete_task")
        .map_err(ApiError::from)
        .unwrap_err();

    match err {
        ApiError::Unauthorized { action, .. } => assert_eq!(action, "delete_task"),
        other => panic!("Expected Unauthorized, got: {other:?}"),
    }
}
