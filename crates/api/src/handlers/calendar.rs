// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar feed handlers in the shape FullCalendar consumes.

use ce_ops_domain::{
    BusinessCalendar, CalendarEvent, CalendarResource, CalendarView, RESIZE_DEBOUNCE_MS,
    TaskType, TaskWindow, format_timestamp,
};
use ce_ops_persistence::{Persistence, TaskData, TaskFilter};
use tracing::debug;

use super::tasks::move_task;
use super::{parse_window, persistence_error};
use crate::auth::AuthenticatedActor;
use crate::error::ApiError;
use crate::request_response::{
    CalendarEventsRequest, CalendarViewRequest, CalendarViewResponse, IdValue, MoveEventRequest,
    MoveEventResponse,
};

fn to_event(task: &TaskData) -> Result<CalendarEvent, ApiError> {
    let install_task = task.to_install_task().map_err(persistence_error("Task"))?;
    Ok(CalendarEvent::from_task(&install_task))
}

fn parse_resource_id(value: &IdValue) -> Result<i64, ApiError> {
    match value {
        IdValue::Number(id) => Ok(*id),
        IdValue::Text(text) => text.trim().parse().map_err(|_| ApiError::InvalidInput {
            field: String::from("resource_id"),
            message: format!("'{text}' is not a resource identifier"),
        }),
    }
}

/// Returns events for tasks overlapping `[start, end)`.
///
/// # Errors
///
/// Returns an error if the range or task type is invalid.
pub fn list_events(
    persistence: &mut Persistence,
    calendar: &BusinessCalendar,
    request: &CalendarEventsRequest,
) -> Result<Vec<CalendarEvent>, ApiError> {
    let range: TaskWindow = parse_window(calendar, &request.start, &request.end)?;
    let task_type: Option<TaskType> = request.task_type.as_deref().map(str::parse).transpose()?;

    let filter = TaskFilter {
        resource_id: request.resource_id,
        task_type: task_type.map(|t| t.as_str().to_string()),
        overlaps: Some((format_timestamp(range.start()), format_timestamp(range.end()))),
        ..TaskFilter::default()
    };
    let tasks: Vec<TaskData> = persistence
        .list_tasks(&filter)
        .map_err(persistence_error("Task"))?;
    debug!(count = tasks.len(), "Calendar events loaded");

    tasks.iter().map(to_event).collect()
}

/// Returns active resources as calendar rows.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_resources(persistence: &mut Persistence) -> Result<Vec<CalendarResource>, ApiError> {
    let resources = persistence
        .list_resources(false)
        .map_err(persistence_error("Resource"))?;
    Ok(resources
        .iter()
        .map(|resource| CalendarResource::new(resource.resource_id, &resource.name))
        .collect())
}

/// Applies a drag/drop move. Last write wins.
///
/// # Errors
///
/// Returns an error if the actor may not schedule, the window or resource
/// is invalid, or the task does not exist or is complete.
pub fn move_event(
    persistence: &mut Persistence,
    calendar: &BusinessCalendar,
    actor: &AuthenticatedActor,
    task_id: i64,
    request: &MoveEventRequest,
) -> Result<MoveEventResponse, ApiError> {
    let window: TaskWindow = parse_window(calendar, &request.start, &request.end)?;
    let resource_id: Option<i64> = request
        .resource_id
        .as_ref()
        .map(parse_resource_id)
        .transpose()?;

    let (task, warnings) = move_task(persistence, actor, task_id, &window, resource_id)?;
    Ok(MoveEventResponse {
        event: to_event(&task)?,
        warnings,
    })
}

/// Picks the calendar view for a viewport width.
#[must_use]
pub fn view_for_width(request: &CalendarViewRequest) -> CalendarViewResponse {
    CalendarViewResponse {
        width: request.width,
        view: CalendarView::for_width(request.width).as_str().to_string(),
        resize_debounce_ms: RESIZE_DEBOUNCE_MS,
    }
}
