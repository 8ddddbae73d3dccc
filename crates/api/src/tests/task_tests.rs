// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for install tasks, resources and field events.

use ce_ops_domain::{DependencyWarning, Role};

use super::helpers::{
    create_task_request, create_test_actor, create_test_admin, create_test_calendar,
    create_test_persistence, create_test_resource,
};
use crate::error::ApiError;
use crate::handlers::{resources, tasks};
use crate::{
    AssignTaskRequest, CreateResourceRequest, ListResourcesRequest, ListTasksRequest,
    RescheduleTaskRequest, TaskEventRequest, UpdateTaskRequest,
};

fn event_request(kind: &str) -> TaskEventRequest {
    TaskEventRequest {
        kind: kind.to_string(),
        note: None,
        photos: Vec::new(),
    }
}

fn reschedule_request(start: &str, end: &str) -> RescheduleTaskRequest {
    RescheduleTaskRequest {
        start: start.to_string(),
        end: end.to_string(),
        resource_id: None,
    }
}

#[test]
fn test_create_task_converts_local_times_to_utc() {
    let mut persistence = create_test_persistence();
    let ops = create_test_actor(&mut persistence, Role::Ops);
    let calendar = create_test_calendar();

    let task = tasks::create_task(
        &mut persistence,
        &calendar,
        &ops,
        &create_task_request("Hang uppers"),
    )
    .unwrap();

    assert_eq!(task.status, "scheduled");
    assert_eq!(task.start, "2026-03-10T13:00:00Z");
    assert_eq!(task.end, "2026-03-10T17:00:00Z");
    assert_eq!(task.created_by, Some(ops.user_id));
}

#[test]
fn test_create_task_rejects_inverted_window() {
    let mut persistence = create_test_persistence();
    let ops = create_test_actor(&mut persistence, Role::Ops);
    let calendar = create_test_calendar();
    let mut request = create_task_request("Backwards");
    request.end = String::from("2026-03-10T07:00");

    let result = tasks::create_task(&mut persistence, &calendar, &ops, &request);

    match result.unwrap_err() {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "end"),
        other => panic!("Expected InvalidInput, got: {other:?}"),
    }
}

#[test]
fn test_create_task_rejects_missing_references() {
    let mut persistence = create_test_persistence();
    let ops = create_test_actor(&mut persistence, Role::Ops);
    let calendar = create_test_calendar();

    let mut request = create_task_request("Orphan");
    request.bid_id = Some(77);
    let result = tasks::create_task(&mut persistence, &calendar, &ops, &request);
    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));

    let mut request = create_task_request("Orphan");
    request.depends_on_task_id = Some(77);
    let result = tasks::create_task(&mut persistence, &calendar, &ops, &request);
    match result.unwrap_err() {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "depends_on_task_id"),
        other => panic!("Expected InvalidInput, got: {other:?}"),
    }
}

#[test]
fn test_field_roles_cannot_schedule() {
    let mut persistence = create_test_persistence();
    let installer = create_test_actor(&mut persistence, Role::Installer);
    let calendar = create_test_calendar();

    let result = tasks::create_task(
        &mut persistence,
        &calendar,
        &installer,
        &create_task_request("Not mine"),
    );

    match result.unwrap_err() {
        ApiError::Unauthorized { action, .. } => assert_eq!(action, "create_task"),
        other => panic!("Expected Unauthorized, got: {other:?}"),
    }
}

#[test]
fn test_update_and_list_tasks() {
    let mut persistence = create_test_persistence();
    let ops = create_test_actor(&mut persistence, Role::Ops);
    let calendar = create_test_calendar();
    let task = tasks::create_task(
        &mut persistence,
        &calendar,
        &ops,
        &create_task_request("Measure"),
    )
    .unwrap();

    let updated = tasks::update_task(
        &mut persistence,
        &ops,
        task.task_id,
        &UpdateTaskRequest {
            title: String::from("Service call"),
            task_type: String::from("service"),
            notes: Some(String::from("Door alignment")),
        },
    )
    .unwrap();
    assert_eq!(updated.task_type, "service");
    assert_eq!(updated.notes.as_deref(), Some("Door alignment"));

    let service = tasks::list_tasks(
        &mut persistence,
        &ListTasksRequest {
            task_type: Some(String::from("service")),
            ..ListTasksRequest::default()
        },
    )
    .unwrap();
    assert_eq!(service.tasks.len(), 1);

    let install = tasks::list_tasks(
        &mut persistence,
        &ListTasksRequest {
            task_type: Some(String::from("install")),
            ..ListTasksRequest::default()
        },
    )
    .unwrap();
    assert!(install.tasks.is_empty());
}

#[test]
fn test_assignment_requires_active_resource() {
    let mut persistence = create_test_persistence();
    let ops = create_test_actor(&mut persistence, Role::Ops);
    let calendar = create_test_calendar();
    let crew = create_test_resource(&mut persistence, &ops, "Crew A");
    let task = tasks::create_task(
        &mut persistence,
        &calendar,
        &ops,
        &create_task_request("Hang"),
    )
    .unwrap();

    let assigned = tasks::assign_task(
        &mut persistence,
        &ops,
        task.task_id,
        &AssignTaskRequest {
            resource_id: Some(crew.resource_id),
        },
    )
    .unwrap();
    assert_eq!(assigned.resource_id, Some(crew.resource_id));

    resources::deactivate_resource(&mut persistence, &ops, crew.resource_id).unwrap();
    let result = tasks::assign_task(
        &mut persistence,
        &ops,
        task.task_id,
        &AssignTaskRequest {
            resource_id: Some(crew.resource_id),
        },
    );
    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));

    let unassigned = tasks::assign_task(
        &mut persistence,
        &ops,
        task.task_id,
        &AssignTaskRequest { resource_id: None },
    )
    .unwrap();
    assert_eq!(unassigned.resource_id, None);
}

#[test]
fn test_resources_are_unique_and_listable() {
    let mut persistence = create_test_persistence();
    let ops = create_test_actor(&mut persistence, Role::Ops);
    let crew = create_test_resource(&mut persistence, &ops, "Crew A");
    assert_eq!(crew.kind, "crew");
    assert!(crew.is_active);

    let duplicate = resources::create_resource(
        &mut persistence,
        &ops,
        &CreateResourceRequest {
            name: String::from("Crew A"),
            kind: String::from("individual"),
        },
    );
    assert!(matches!(duplicate, Err(ApiError::Conflict { .. })));

    resources::deactivate_resource(&mut persistence, &ops, crew.resource_id).unwrap();
    let active = resources::list_resources(&mut persistence, &ListResourcesRequest::default())
        .unwrap();
    assert!(active.resources.is_empty());
    let all = resources::list_resources(
        &mut persistence,
        &ListResourcesRequest {
            include_inactive: true,
        },
    )
    .unwrap();
    assert_eq!(all.resources.len(), 1);
}

#[test]
fn test_reschedule_reports_dependency_warnings() {
    let mut persistence = create_test_persistence();
    let ops = create_test_actor(&mut persistence, Role::Ops);
    let calendar = create_test_calendar();
    let delivery = tasks::create_task(
        &mut persistence,
        &calendar,
        &ops,
        &create_task_request("Deliver"),
    )
    .unwrap();
    let mut install_request = create_task_request("Install");
    install_request.start = String::from("2026-03-11T08:00");
    install_request.end = String::from("2026-03-11T15:00");
    install_request.depends_on_task_id = Some(delivery.task_id);
    let install = tasks::create_task(&mut persistence, &calendar, &ops, &install_request).unwrap();

    let clean = tasks::reschedule_task(
        &mut persistence,
        &calendar,
        &ops,
        install.task_id,
        &reschedule_request("2026-03-12T08:00", "2026-03-12T15:00"),
    )
    .unwrap();
    assert!(clean.warnings.is_empty());
    assert_eq!(clean.task.start, "2026-03-12T13:00:00Z");

    let early = tasks::reschedule_task(
        &mut persistence,
        &calendar,
        &ops,
        install.task_id,
        &reschedule_request("2026-03-10T09:00", "2026-03-10T11:00"),
    )
    .unwrap();
    assert_eq!(
        early.warnings,
        vec![DependencyWarning::StartsBeforePrerequisite {
            prerequisite_task_id: delivery.task_id,
            prerequisite_end: String::from("2026-03-10T17:00:00Z"),
        }]
    );

    let late_prerequisite = tasks::reschedule_task(
        &mut persistence,
        &calendar,
        &ops,
        delivery.task_id,
        &reschedule_request("2026-03-13T08:00", "2026-03-13T12:00"),
    )
    .unwrap();
    assert_eq!(
        late_prerequisite.warnings,
        vec![DependencyWarning::DependentStartsEarly {
            dependent_task_id: install.task_id,
            dependent_start: String::from("2026-03-10T14:00:00Z"),
        }]
    );
}

#[test]
fn test_field_events_advance_status() {
    let mut persistence = create_test_persistence();
    let ops = create_test_actor(&mut persistence, Role::Ops);
    let installer = create_test_actor(&mut persistence, Role::Installer);
    let calendar = create_test_calendar();
    let task = tasks::create_task(
        &mut persistence,
        &calendar,
        &ops,
        &create_task_request("Install"),
    )
    .unwrap();

    let on_the_way = tasks::record_task_event(
        &mut persistence,
        &installer,
        task.task_id,
        &event_request("on-the-way"),
    )
    .unwrap();
    assert_eq!(on_the_way.event.kind, "on_the_way");
    assert_eq!(on_the_way.task.status, "in_progress");

    let wip = tasks::record_task_event(
        &mut persistence,
        &installer,
        task.task_id,
        &TaskEventRequest {
            kind: String::from("wip"),
            note: Some(String::from("Uppers hung")),
            photos: vec![String::from("photos/1.jpg"), String::from("  ")],
        },
    )
    .unwrap();
    assert_eq!(wip.event.photos, vec!["photos/1.jpg"]);
    assert_eq!(wip.task.status, "in_progress");

    let complete = tasks::record_task_event(
        &mut persistence,
        &installer,
        task.task_id,
        &event_request("complete"),
    )
    .unwrap();
    assert_eq!(complete.task.status, "complete");

    let history = tasks::list_task_events(&mut persistence, task.task_id).unwrap();
    let kinds: Vec<&str> = history.events.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, vec!["on_the_way", "wip", "complete"]);
}

#[test]
fn test_completed_task_is_frozen() {
    let mut persistence = create_test_persistence();
    let ops = create_test_actor(&mut persistence, Role::Ops);
    let calendar = create_test_calendar();
    let task = tasks::create_task(
        &mut persistence,
        &calendar,
        &ops,
        &create_task_request("Install"),
    )
    .unwrap();
    tasks::record_task_event(
        &mut persistence,
        &ops,
        task.task_id,
        &event_request("complete"),
    )
    .unwrap();

    let moved = tasks::reschedule_task(
        &mut persistence,
        &calendar,
        &ops,
        task.task_id,
        &reschedule_request("2026-03-12T08:00", "2026-03-12T15:00"),
    );
    match moved.unwrap_err() {
        ApiError::DomainRuleViolation { rule, .. } => assert_eq!(rule, "task_complete"),
        other => panic!("Expected DomainRuleViolation, got: {other:?}"),
    }

    let event =
        tasks::record_task_event(&mut persistence, &ops, task.task_id, &event_request("wip"));
    match event.unwrap_err() {
        ApiError::DomainRuleViolation { rule, .. } => assert_eq!(rule, "invalid_task_transition"),
        other => panic!("Expected DomainRuleViolation, got: {other:?}"),
    }
}

#[test]
fn test_field_role_reports_only_on_own_task_type() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let delivery = create_test_actor(&mut persistence, Role::Delivery);
    let calendar = create_test_calendar();
    let task = tasks::create_task(
        &mut persistence,
        &calendar,
        &admin,
        &create_task_request("Install"),
    )
    .unwrap();

    let result = tasks::record_task_event(
        &mut persistence,
        &delivery,
        task.task_id,
        &event_request("arrived"),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_unknown_event_kind_is_invalid_input() {
    let mut persistence = create_test_persistence();
    let ops = create_test_actor(&mut persistence, Role::Ops);
    let calendar = create_test_calendar();
    let task = tasks::create_task(
        &mut persistence,
        &calendar,
        &ops,
        &create_task_request("Install"),
    )
    .unwrap();

    let result = tasks::record_task_event(
        &mut persistence,
        &ops,
        task.task_id,
        &event_request("paused"),
    );

    match result.unwrap_err() {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "kind"),
        other => panic!("Expected InvalidInput, got: {other:?}"),
    }
}

#[test]
fn test_delete_task_with_history_conflicts() {
    let mut persistence = create_test_persistence();
    let ops = create_test_actor(&mut persistence, Role::Ops);
    let calendar = create_test_calendar();
    let kept = tasks::create_task(
        &mut persistence,
        &calendar,
        &ops,
        &create_task_request("Kept"),
    )
    .unwrap();
    let dropped = tasks::create_task(
        &mut persistence,
        &calendar,
        &ops,
        &create_task_request("Dropped"),
    )
    .unwrap();
    tasks::record_task_event(
        &mut persistence,
        &ops,
        kept.task_id,
        &event_request("arrived"),
    )
    .unwrap();

    let result = tasks::delete_task(&mut persistence, &ops, kept.task_id);
    assert!(matches!(result, Err(ApiError::Conflict { .. })));

    tasks::delete_task(&mut persistence, &ops, dropped.task_id).unwrap();
    let missing = tasks::get_task(&mut persistence, dropped.task_id);
    assert!(matches!(missing, Err(ApiError::ResourceNotFound { .. })));
}
