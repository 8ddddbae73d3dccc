// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Resource (crew) queries.

use diesel::prelude::*;
use diesel::{PgConnection, SqliteConnection};
use tracing::debug;

use crate::data_models::ResourceData;
use crate::diesel_schema::resources;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = resources)]
struct ResourceRow {
    resource_id: i64,
    name: String,
    kind: String,
    is_active: i32,
    created_at: String,
}

impl From<ResourceRow> for ResourceData {
    fn from(row: ResourceRow) -> Self {
        Self {
            resource_id: row.resource_id,
            name: row.name,
            kind: row.kind,
            is_active: row.is_active != 0,
            created_at: row.created_at,
        }
    }
}

backend_fn! {
/// Lists resources by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_resources(
    conn: &mut _,
    include_inactive: bool,
) -> Result<Vec<ResourceData>, PersistenceError> {
    debug!(include_inactive, "Listing resources");

    let mut query = resources::table.select(ResourceRow::as_select()).into_boxed();
    if !include_inactive {
        query = query.filter(resources::is_active.eq(1));
    }

    let rows: Vec<ResourceRow> = query.order_by(resources::name.asc()).load(conn)?;
    Ok(rows.into_iter().map(ResourceData::from).collect())
}
}

backend_fn! {
/// Retrieves a resource by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_resource(
    conn: &mut _,
    resource_id: i64,
) -> Result<Option<ResourceData>, PersistenceError> {
    let row: Option<ResourceRow> = resources::table
        .find(resource_id)
        .select(ResourceRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(ResourceData::from))
}
}
