// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Install task and task event queries.

use diesel::prelude::*;
use diesel::{PgConnection, SqliteConnection};
use tracing::debug;

use crate::data_models::{TaskData, TaskEventData, TaskFilter};
use crate::diesel_schema::{install_tasks, task_events};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = install_tasks)]
pub struct TaskRow {
    task_id: i64,
    bid_id: Option<i64>,
    task_type: String,
    title: String,
    status: String,
    window_start: String,
    window_end: String,
    resource_id: Option<i64>,
    phase_group: Option<String>,
    phase_order: Option<i32>,
    depends_on_task_id: Option<i64>,
    notes: Option<String>,
    created_by: Option<i64>,
    created_at: String,
    updated_at: String,
}

impl From<TaskRow> for TaskData {
    fn from(row: TaskRow) -> Self {
        Self {
            task_id: row.task_id,
            bid_id: row.bid_id,
            task_type: row.task_type,
            title: row.title,
            status: row.status,
            window_start: row.window_start,
            window_end: row.window_end,
            resource_id: row.resource_id,
            phase_group: row.phase_group,
            phase_order: row.phase_order,
            depends_on_task_id: row.depends_on_task_id,
            notes: row.notes,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = task_events)]
pub struct TaskEventRow {
    event_id: i64,
    task_id: i64,
    kind: String,
    status_after: String,
    note: Option<String>,
    photos_json: String,
    actor_user_id: Option<i64>,
    created_at: String,
}

impl TryFrom<TaskEventRow> for TaskEventData {
    type Error = PersistenceError;

    fn try_from(row: TaskEventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            event_id: row.event_id,
            task_id: row.task_id,
            kind: row.kind,
            status_after: row.status_after,
            note: row.note,
            photos: serde_json::from_str(&row.photos_json)?,
            actor_user_id: row.actor_user_id,
            created_at: row.created_at,
        })
    }
}

backend_fn! {
/// Retrieves a task by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_task(conn: &mut _, task_id: i64) -> Result<Option<TaskData>, PersistenceError> {
    debug!(task_id, "Looking up task");

    let row: Option<TaskRow> = install_tasks::table
        .find(task_id)
        .select(TaskRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(TaskData::from))
}
}

backend_fn! {
/// Lists tasks matching every filter that is set, ordered by start time.
///
/// The overlap filter compares stored UTC text, which sorts
/// chronologically because every value uses the same fixed format.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_tasks(conn: &mut _, filter: &TaskFilter) -> Result<Vec<TaskData>, PersistenceError> {
    debug!(?filter, "Listing tasks");

    let mut query = install_tasks::table.select(TaskRow::as_select()).into_boxed();
    if let Some(bid_id) = filter.bid_id {
        query = query.filter(install_tasks::bid_id.eq(bid_id));
    }
    if let Some(status) = &filter.status {
        query = query.filter(install_tasks::status.eq(status.as_str()));
    }
    if let Some(task_type) = &filter.task_type {
        query = query.filter(install_tasks::task_type.eq(task_type.as_str()));
    }
    if let Some(resource_id) = filter.resource_id {
        query = query.filter(install_tasks::resource_id.eq(resource_id));
    }
    if let Some(phase_group) = &filter.phase_group {
        query = query.filter(install_tasks::phase_group.eq(phase_group.as_str()));
    }
    if let Some((start, end)) = &filter.overlaps {
        query = query
            .filter(install_tasks::window_start.lt(end.as_str()))
            .filter(install_tasks::window_end.gt(start.as_str()));
    }

    let rows: Vec<TaskRow> = query
        .order_by((
            install_tasks::window_start.asc(),
            install_tasks::task_id.asc(),
        ))
        .load(conn)?;

    Ok(rows.into_iter().map(TaskData::from).collect())
}
}

backend_fn! {
/// Lists tasks that depend directly on `task_id`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_dependents(conn: &mut _, task_id: i64) -> Result<Vec<TaskData>, PersistenceError> {
    let rows: Vec<TaskRow> = install_tasks::table
        .filter(install_tasks::depends_on_task_id.eq(task_id))
        .select(TaskRow::as_select())
        .order_by(install_tasks::task_id.asc())
        .load(conn)?;

    Ok(rows.into_iter().map(TaskData::from).collect())
}
}

backend_fn! {
/// Lists a task's events in the order they were recorded.
///
/// # Errors
///
/// Returns an error if the query fails or a photo list does not decode.
pub fn list_task_events(
    conn: &mut _,
    task_id: i64,
) -> Result<Vec<TaskEventData>, PersistenceError> {
    debug!(task_id, "Listing task events");

    let rows: Vec<TaskEventRow> = task_events::table
        .filter(task_events::task_id.eq(task_id))
        .select(TaskEventRow::as_select())
        .order_by(task_events::event_id.asc())
        .load(conn)?;

    rows.into_iter().map(TaskEventData::try_from).collect()
}
}
