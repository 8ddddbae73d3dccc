// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Install task mutations: creation, scheduling, events and phase groups.

use ce_ops_domain::{PlannedPhase, TaskStatus, TaskWindow, ensure_movable, format_timestamp};
use diesel::dsl::count;
use diesel::prelude::*;
use diesel::{PgConnection, SqliteConnection};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{NewTask, NewTaskEvent, TaskData, TaskDetails, TaskEventData};
use crate::diesel_schema::{install_tasks, task_events};
use crate::error::PersistenceError;
use crate::now_timestamp;
use crate::queries::tasks::{TaskEventRow, TaskRow};

fn not_found(task_id: i64) -> PersistenceError {
    PersistenceError::NotFound(format!("Task {task_id} not found"))
}

backend_fn! {
/// Creates a scheduled task.
///
/// # Errors
///
/// Returns `PersistenceError::InvalidReference` if the bid, resource,
/// prerequisite task or creator does not exist.
pub fn create_task(conn: &mut _, task: &NewTask) -> Result<i64, PersistenceError> {
    let now = now_timestamp();

    diesel::insert_into(install_tasks::table)
        .values((
            install_tasks::bid_id.eq(task.bid_id),
            install_tasks::task_type.eq(task.task_type.as_str()),
            install_tasks::title.eq(task.title.as_str()),
            install_tasks::status.eq(TaskStatus::Scheduled.as_str()),
            install_tasks::window_start.eq(format_timestamp(task.window.start())),
            install_tasks::window_end.eq(format_timestamp(task.window.end())),
            install_tasks::resource_id.eq(task.resource_id),
            install_tasks::depends_on_task_id.eq(task.depends_on_task_id),
            install_tasks::notes.eq(task.notes.as_deref()),
            install_tasks::created_by.eq(task.created_by),
            install_tasks::created_at.eq(now.as_str()),
            install_tasks::updated_at.eq(now.as_str()),
        ))
        .execute(conn)?;

    let task_id: i64 = conn.get_last_insert_rowid()?;
    info!(task_id, task_type = task.task_type.as_str(), "Task created");
    Ok(task_id)
}
}

backend_fn! {
/// Updates the descriptive fields of a task.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the task does not exist.
pub fn update_task_details(
    conn: &mut _,
    task_id: i64,
    details: &TaskDetails,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(install_tasks::table.find(task_id))
        .set((
            install_tasks::title.eq(details.title.as_str()),
            install_tasks::task_type.eq(details.task_type.as_str()),
            install_tasks::notes.eq(details.notes.as_deref()),
            install_tasks::updated_at.eq(now_timestamp()),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(not_found(task_id));
    }
    Ok(())
}
}

backend_fn! {
/// Assigns a task to a resource, or unassigns it with `None`.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the task does not exist, or
/// `PersistenceError::InvalidReference` if the resource does not.
pub fn assign_task(
    conn: &mut _,
    task_id: i64,
    resource_id: Option<i64>,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(install_tasks::table.find(task_id))
        .set((
            install_tasks::resource_id.eq(resource_id),
            install_tasks::updated_at.eq(now_timestamp()),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(not_found(task_id));
    }
    info!(task_id, ?resource_id, "Task assignment changed");
    Ok(())
}
}

backend_fn! {
/// Moves a task to a new window, optionally reassigning it.
///
/// Completed tasks cannot be moved. Returns the updated task.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the task does not exist, or
/// `PersistenceError::RuleViolation` if it is already complete.
pub fn reschedule_task(
    conn: &mut _,
    task_id: i64,
    window: &TaskWindow,
    resource_id: Option<i64>,
) -> Result<TaskData, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let status: Option<String> = install_tasks::table
            .find(task_id)
            .select(install_tasks::status)
            .first(conn)
            .optional()?;
        let status: TaskStatus = status.ok_or_else(|| not_found(task_id))?.parse()?;
        ensure_movable(task_id, status)?;

        let now = now_timestamp();
        diesel::update(install_tasks::table.find(task_id))
            .set((
                install_tasks::window_start.eq(format_timestamp(window.start())),
                install_tasks::window_end.eq(format_timestamp(window.end())),
                install_tasks::updated_at.eq(now.as_str()),
            ))
            .execute(conn)?;
        if let Some(resource_id) = resource_id {
            diesel::update(install_tasks::table.find(task_id))
                .set(install_tasks::resource_id.eq(Some(resource_id)))
                .execute(conn)?;
        }

        let row: TaskRow = install_tasks::table
            .find(task_id)
            .select(TaskRow::as_select())
            .first(conn)?;

        info!(task_id, ?resource_id, "Task rescheduled");
        Ok(TaskData::from(row))
    })
}
}

backend_fn! {
/// Deletes a task that has no history and nothing depending on it.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the task does not exist, or
/// `PersistenceError::Conflict` if it has events or dependents.
pub fn delete_task(conn: &mut _, task_id: i64) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let exists: Option<i64> = install_tasks::table
            .find(task_id)
            .select(install_tasks::task_id)
            .first(conn)
            .optional()?;
        if exists.is_none() {
            return Err(not_found(task_id));
        }

        let events: i64 = task_events::table
            .filter(task_events::task_id.eq(task_id))
            .select(count(task_events::event_id))
            .first(conn)?;
        if events > 0 {
            return Err(PersistenceError::Conflict(format!(
                "Task {task_id} has {events} recorded event(s) and cannot be deleted"
            )));
        }

        let dependents: i64 = install_tasks::table
            .filter(install_tasks::depends_on_task_id.eq(task_id))
            .select(count(install_tasks::task_id))
            .first(conn)?;
        if dependents > 0 {
            return Err(PersistenceError::Conflict(format!(
                "Task {task_id} has {dependents} dependent task(s) and cannot be deleted"
            )));
        }

        diesel::delete(install_tasks::table.find(task_id)).execute(conn)?;
        info!(task_id, "Task deleted");
        Ok(())
    })
}
}

backend_fn! {
/// Appends a field event and advances the task status.
///
/// The event row and the status change commit together, so the task's
/// status always equals the `status_after` of its latest event.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the task does not exist, or
/// `PersistenceError::RuleViolation` if the event would move a completed
/// task.
pub fn append_task_event(
    conn: &mut _,
    event: &NewTaskEvent,
) -> Result<(TaskEventData, TaskData), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let task_id = event.task_id;
        let status: Option<String> = install_tasks::table
            .find(task_id)
            .select(install_tasks::status)
            .first(conn)
            .optional()?;
        let current: TaskStatus = status.ok_or_else(|| not_found(task_id))?.parse()?;
        let next = event.kind.apply_to(current)?;

        let now = now_timestamp();
        let photos_json = serde_json::to_string(&event.photos)?;

        diesel::insert_into(task_events::table)
            .values((
                task_events::task_id.eq(task_id),
                task_events::kind.eq(event.kind.as_str()),
                task_events::status_after.eq(next.as_str()),
                task_events::note.eq(event.note.as_deref()),
                task_events::photos_json.eq(photos_json.as_str()),
                task_events::actor_user_id.eq(event.actor_user_id),
                task_events::created_at.eq(now.as_str()),
            ))
            .execute(conn)?;
        let event_id: i64 = conn.get_last_insert_rowid()?;

        if next != current {
            diesel::update(install_tasks::table.find(task_id))
                .set((
                    install_tasks::status.eq(next.as_str()),
                    install_tasks::updated_at.eq(now.as_str()),
                ))
                .execute(conn)?;
        }

        let event_row: TaskEventRow = task_events::table
            .find(event_id)
            .select(TaskEventRow::as_select())
            .first(conn)?;
        let task_row: TaskRow = install_tasks::table
            .find(task_id)
            .select(TaskRow::as_select())
            .first(conn)?;

        info!(
            task_id,
            event_id,
            kind = event.kind.as_str(),
            from = current.as_str(),
            to = next.as_str(),
            "Task event recorded"
        );
        Ok((TaskEventData::try_from(event_row)?, TaskData::from(task_row)))
    })
}
}

backend_fn! {
/// Creates a chained phase group for a bid.
///
/// Each phase depends on the one before it. A bid may only have one
/// phase group in flight: if any earlier phase task is not complete the
/// request is rejected.
///
/// # Errors
///
/// Returns `PersistenceError::Conflict` if the bid already has an
/// unfinished phase group, or `PersistenceError::InvalidReference` if
/// the bid does not exist.
pub fn create_phase_group(
    conn: &mut _,
    bid_id: i64,
    phase_group: &str,
    phases: &[PlannedPhase],
    created_by: Option<i64>,
) -> Result<Vec<TaskData>, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let unfinished: i64 = install_tasks::table
            .filter(install_tasks::bid_id.eq(bid_id))
            .filter(install_tasks::phase_group.is_not_null())
            .filter(install_tasks::status.ne(TaskStatus::Complete.as_str()))
            .select(count(install_tasks::task_id))
            .first(conn)?;
        if unfinished > 0 {
            return Err(PersistenceError::Conflict(format!(
                "Bid {bid_id} already has {unfinished} unfinished phase task(s)"
            )));
        }

        let now = now_timestamp();
        let mut task_ids: Vec<i64> = Vec::with_capacity(phases.len());
        for phase in phases {
            let depends_on: Option<i64> = phase
                .depends_on_index
                .and_then(|index| task_ids.get(index).copied());

            diesel::insert_into(install_tasks::table)
                .values((
                    install_tasks::bid_id.eq(Some(bid_id)),
                    install_tasks::task_type.eq(phase.task_type.as_str()),
                    install_tasks::title.eq(phase.title.as_str()),
                    install_tasks::status.eq(TaskStatus::Scheduled.as_str()),
                    install_tasks::window_start.eq(format_timestamp(phase.window.start())),
                    install_tasks::window_end.eq(format_timestamp(phase.window.end())),
                    install_tasks::phase_group.eq(Some(phase_group)),
                    install_tasks::phase_order.eq(Some(phase.phase_order)),
                    install_tasks::depends_on_task_id.eq(depends_on),
                    install_tasks::created_by.eq(created_by),
                    install_tasks::created_at.eq(now.as_str()),
                    install_tasks::updated_at.eq(now.as_str()),
                ))
                .execute(conn)?;
            let task_id: i64 = conn.get_last_insert_rowid()?;
            debug!(
                task_id,
                phase_order = phase.phase_order,
                "Phase task created"
            );
            task_ids.push(task_id);
        }

        let rows: Vec<TaskRow> = install_tasks::table
            .filter(install_tasks::phase_group.eq(phase_group))
            .select(TaskRow::as_select())
            .order_by(install_tasks::phase_order.asc())
            .load(conn)?;

        info!(
            bid_id,
            phase_group,
            count = rows.len(),
            "Phase group created"
        );
        Ok(rows.into_iter().map(TaskData::from).collect())
    })
}
}
