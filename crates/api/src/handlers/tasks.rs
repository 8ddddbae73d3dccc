// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Install task handlers.

use ce_ops_domain::{
    BusinessCalendar, DependencyWarning, ScheduledTaskRef, TaskEventKind, TaskStatus, TaskType,
    TaskWindow, dependency_warnings, optional_text, require_text,
};
use ce_ops_persistence::{
    NewTask, NewTaskEvent, Persistence, TaskData, TaskDetails, TaskEventData, TaskFilter,
};
use tracing::info;

use super::{
    ensure_active_resource, ensure_bid_exists, load_task, parse_window, persistence_error,
    scheduled_ref,
};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::ApiError;
use crate::request_response::{
    AssignTaskRequest, CreateTaskRequest, ListTaskEventsResponse, ListTasksRequest,
    ListTasksResponse, MessageResponse, RescheduleTaskRequest, RescheduleTaskResponse,
    TaskDetailResponse, TaskEventRequest, TaskEventResponse, TaskInfo, UpdateTaskRequest,
};

/// Lists tasks matching the given filters.
///
/// # Errors
///
/// Returns an error if a status or task type filter is unknown.
pub fn list_tasks(
    persistence: &mut Persistence,
    request: &ListTasksRequest,
) -> Result<ListTasksResponse, ApiError> {
    let status: Option<TaskStatus> = request.status.as_deref().map(str::parse).transpose()?;
    let task_type: Option<TaskType> = request.task_type.as_deref().map(str::parse).transpose()?;

    let filter = TaskFilter {
        bid_id: request.bid_id,
        status: status.map(|s| s.as_str().to_string()),
        task_type: task_type.map(|t| t.as_str().to_string()),
        resource_id: request.resource_id,
        phase_group: request.phase_group.clone(),
        overlaps: None,
    };
    let tasks = persistence
        .list_tasks(&filter)
        .map_err(persistence_error("Task"))?;
    Ok(ListTasksResponse {
        tasks: tasks.into_iter().map(TaskInfo::from).collect(),
    })
}

/// Returns a task with its event history.
///
/// # Errors
///
/// Returns an error if the task does not exist.
pub fn get_task(
    persistence: &mut Persistence,
    task_id: i64,
) -> Result<TaskDetailResponse, ApiError> {
    let task: TaskData = load_task(persistence, task_id)?;
    let events: Vec<TaskEventData> = persistence
        .list_task_events(task_id)
        .map_err(persistence_error("Task"))?;
    Ok(TaskDetailResponse {
        task: TaskInfo::from(task),
        events,
    })
}

/// Creates a manually scheduled task.
///
/// # Errors
///
/// Returns an error if the actor may not schedule, the input is invalid,
/// or a referenced bid, resource or prerequisite does not exist.
pub fn create_task(
    persistence: &mut Persistence,
    calendar: &BusinessCalendar,
    actor: &AuthenticatedActor,
    request: &CreateTaskRequest,
) -> Result<TaskInfo, ApiError> {
    AuthorizationService::authorize_schedule(actor, "create_task")?;
    let task_type: TaskType = request.task_type.parse()?;
    let title: String = require_text("title", &request.title)?;
    let window: TaskWindow = parse_window(calendar, &request.start, &request.end)?;

    ensure_bid_exists(persistence, request.bid_id)?;
    ensure_active_resource(persistence, request.resource_id)?;
    if let Some(prerequisite_id) = request.depends_on_task_id {
        let prerequisite = persistence
            .get_task(prerequisite_id)
            .map_err(persistence_error("Task"))?;
        if prerequisite.is_none() {
            return Err(ApiError::InvalidInput {
                field: String::from("depends_on_task_id"),
                message: format!("Task {prerequisite_id} does not exist"),
            });
        }
    }

    let task = NewTask {
        bid_id: request.bid_id,
        task_type,
        title,
        window,
        resource_id: request.resource_id,
        depends_on_task_id: request.depends_on_task_id,
        notes: optional_text(request.notes.as_deref()),
        created_by: Some(actor.user_id),
    };
    let task_id: i64 = persistence
        .create_task(&task)
        .map_err(persistence_error("Task"))?;
    info!(
        actor_id = actor.user_id,
        task_id,
        task_type = task_type.as_str(),
        "Task created"
    );

    Ok(TaskInfo::from(load_task(persistence, task_id)?))
}

/// Updates a task's title, type and notes.
///
/// # Errors
///
/// Returns an error if the actor may not schedule, the input is invalid,
/// or the task does not exist.
pub fn update_task(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    task_id: i64,
    request: &UpdateTaskRequest,
) -> Result<TaskInfo, ApiError> {
    AuthorizationService::authorize_schedule(actor, "update_task")?;
    let details = TaskDetails {
        title: require_text("title", &request.title)?,
        task_type: request.task_type.parse()?,
        notes: optional_text(request.notes.as_deref()),
    };
    persistence
        .update_task_details(task_id, &details)
        .map_err(persistence_error("Task"))?;
    Ok(TaskInfo::from(load_task(persistence, task_id)?))
}

/// Deletes a task that has no events and no dependents.
///
/// # Errors
///
/// Returns an error if the actor may not schedule, the task does not
/// exist, or it has history or dependents.
pub fn delete_task(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    task_id: i64,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::authorize_schedule(actor, "delete_task")?;
    persistence
        .delete_task(task_id)
        .map_err(persistence_error("Task"))?;
    info!(actor_id = actor.user_id, task_id, "Task deleted");
    Ok(MessageResponse {
        message: format!("Task {task_id} has been deleted"),
    })
}

/// Assigns a task to a resource, or unassigns it.
///
/// # Errors
///
/// Returns an error if the actor may not schedule, the resource is
/// unknown or inactive, or the task does not exist.
pub fn assign_task(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    task_id: i64,
    request: &AssignTaskRequest,
) -> Result<TaskInfo, ApiError> {
    AuthorizationService::authorize_schedule(actor, "assign_task")?;
    ensure_active_resource(persistence, request.resource_id)?;
    persistence
        .assign_task(task_id, request.resource_id)
        .map_err(persistence_error("Task"))?;
    Ok(TaskInfo::from(load_task(persistence, task_id)?))
}

/// Moves a task and reports dependency-order warnings for the new window.
///
/// Shared by the task API and calendar drag/drop.
pub(crate) fn move_task(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    task_id: i64,
    window: &TaskWindow,
    resource_id: Option<i64>,
) -> Result<(TaskData, Vec<DependencyWarning>), ApiError> {
    AuthorizationService::authorize_schedule(actor, "reschedule_task")?;
    ensure_active_resource(persistence, resource_id)?;

    let moved: TaskData = persistence
        .reschedule_task(task_id, window, resource_id)
        .map_err(persistence_error("Task"))?;

    let prerequisite: Option<ScheduledTaskRef> = match moved.depends_on_task_id {
        Some(prerequisite_id) => persistence
            .get_task(prerequisite_id)
            .map_err(persistence_error("Task"))?
            .as_ref()
            .map(scheduled_ref)
            .transpose()?,
        None => None,
    };
    let dependents: Vec<ScheduledTaskRef> = persistence
        .list_dependents(task_id)
        .map_err(persistence_error("Task"))?
        .iter()
        .map(scheduled_ref)
        .collect::<Result<_, _>>()?;

    let warnings = dependency_warnings(*window, prerequisite.as_ref(), &dependents);
    info!(
        actor_id = actor.user_id,
        task_id,
        ?resource_id,
        warnings = warnings.len(),
        "Task moved"
    );
    Ok((moved, warnings))
}

/// Reschedules a task. Completed tasks cannot be moved.
///
/// # Errors
///
/// Returns an error if the actor may not schedule, the window is invalid,
/// the task does not exist or is complete.
pub fn reschedule_task(
    persistence: &mut Persistence,
    calendar: &BusinessCalendar,
    actor: &AuthenticatedActor,
    task_id: i64,
    request: &RescheduleTaskRequest,
) -> Result<RescheduleTaskResponse, ApiError> {
    let window: TaskWindow = parse_window(calendar, &request.start, &request.end)?;
    let (task, warnings) = move_task(persistence, actor, task_id, &window, request.resource_id)?;
    Ok(RescheduleTaskResponse {
        task: TaskInfo::from(task),
        warnings,
    })
}

/// # Errors
///
/// Returns an error if the task does not exist.
pub fn list_task_events(
    persistence: &mut Persistence,
    task_id: i64,
) -> Result<ListTaskEventsResponse, ApiError> {
    load_task(persistence, task_id)?;
    let events = persistence
        .list_task_events(task_id)
        .map_err(persistence_error("Task"))?;
    Ok(ListTaskEventsResponse { task_id, events })
}

/// Records a field event and advances the task status.
///
/// # Errors
///
/// Returns an error if the kind is unknown, the actor may not report on
/// this task type, the task does not exist, or the task is complete.
pub fn record_task_event(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    task_id: i64,
    request: &TaskEventRequest,
) -> Result<TaskEventResponse, ApiError> {
    let kind: TaskEventKind = request.kind.parse()?;
    let task: TaskData = load_task(persistence, task_id)?;
    let task_type: TaskType = task.task_type.parse()?;
    AuthorizationService::authorize_report_task_event(actor, task_type)?;

    let photos: Vec<String> = request
        .photos
        .iter()
        .filter_map(|photo| optional_text(Some(photo.as_str())))
        .collect();
    let event = NewTaskEvent {
        task_id,
        kind,
        note: optional_text(request.note.as_deref()),
        photos,
        actor_user_id: Some(actor.user_id),
    };

    let (event, task) = persistence
        .append_task_event(&event)
        .map_err(persistence_error("Task"))?;
    Ok(TaskEventResponse {
        event,
        task: TaskInfo::from(task),
    })
}
