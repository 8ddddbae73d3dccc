// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions.
//!
//! Each handler authorizes the actor, validates its request against the
//! domain rules, calls persistence and builds a response. Handlers are
//! synchronous and take the persistence layer by `&mut`; the server holds
//! its lock for the duration of one call.

pub mod bids;
pub mod calendar;
pub mod purchasing;
pub mod resources;
pub mod tasks;
pub mod users;

use ce_ops_domain::{BusinessCalendar, ScheduledTaskRef, TaskWindow};
use ce_ops_persistence::{Persistence, PersistenceError, TaskData};

use crate::error::{ApiError, translate_persistence_error};

/// Returns a mapper that translates persistence errors for `resource_type`.
pub(crate) fn persistence_error(
    resource_type: &'static str,
) -> impl FnOnce(PersistenceError) -> ApiError {
    move |err| translate_persistence_error(err, resource_type)
}

pub(crate) fn not_found(resource_type: &str, message: String) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: resource_type.to_string(),
        message,
    }
}

/// Parses a client start/end pair into a validated window.
pub(crate) fn parse_window(
    calendar: &BusinessCalendar,
    start: &str,
    end: &str,
) -> Result<TaskWindow, ApiError> {
    let start = calendar.parse_client_timestamp(start)?;
    let end = calendar.parse_client_timestamp(end)?;
    Ok(TaskWindow::new(start, end)?)
}

pub(crate) fn load_task(persistence: &mut Persistence, task_id: i64) -> Result<TaskData, ApiError> {
    persistence
        .get_task(task_id)
        .map_err(persistence_error("Task"))?
        .ok_or_else(|| not_found("Task", format!("Task {task_id} not found")))
}

pub(crate) fn scheduled_ref(task: &TaskData) -> Result<ScheduledTaskRef, ApiError> {
    let install_task = task.to_install_task().map_err(persistence_error("Task"))?;
    Ok(ScheduledTaskRef {
        task_id: install_task.task_id,
        window: install_task.window,
    })
}

/// Rejects references to bids that do not exist.
pub(crate) fn ensure_bid_exists(
    persistence: &mut Persistence,
    bid_id: Option<i64>,
) -> Result<(), ApiError> {
    let Some(bid_id) = bid_id else {
        return Ok(());
    };
    let job_name = persistence
        .get_bid_job_name(bid_id)
        .map_err(persistence_error("Bid"))?;
    if job_name.is_none() {
        return Err(ApiError::InvalidInput {
            field: String::from("bid_id"),
            message: format!("Bid {bid_id} does not exist"),
        });
    }
    Ok(())
}

/// Rejects assignment to resources that are unknown or deactivated.
pub(crate) fn ensure_active_resource(
    persistence: &mut Persistence,
    resource_id: Option<i64>,
) -> Result<(), ApiError> {
    let Some(resource_id) = resource_id else {
        return Ok(());
    };
    let resource = persistence
        .get_resource(resource_id)
        .map_err(persistence_error("Resource"))?;
    match resource {
        Some(resource) if resource.is_active => Ok(()),
        Some(_) => Err(ApiError::InvalidInput {
            field: String::from("resource_id"),
            message: format!("Resource {resource_id} is inactive"),
        }),
        None => Err(ApiError::InvalidInput {
            field: String::from("resource_id"),
            message: format!("Resource {resource_id} does not exist"),
        }),
    }
}
