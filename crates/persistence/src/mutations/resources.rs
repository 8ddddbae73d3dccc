// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Resource mutations.

use ce_ops_domain::ResourceKind;
use diesel::prelude::*;
use diesel::{PgConnection, SqliteConnection};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::resources;
use crate::error::PersistenceError;
use crate::now_timestamp;

backend_fn! {
/// Creates an active resource.
///
/// # Errors
///
/// Returns `PersistenceError::Conflict` if the name is already taken.
pub fn create_resource(
    conn: &mut _,
    name: &str,
    kind: ResourceKind,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(resources::table)
        .values((
            resources::name.eq(name),
            resources::kind.eq(kind.as_str()),
            resources::is_active.eq(1),
            resources::created_at.eq(now_timestamp()),
        ))
        .execute(conn)?;

    let resource_id: i64 = conn.get_last_insert_rowid()?;
    info!(resource_id, name, kind = kind.as_str(), "Resource created");
    Ok(resource_id)
}
}

backend_fn! {
/// Marks a resource inactive. Existing assignments are kept.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the resource does not exist.
pub fn deactivate_resource(conn: &mut _, resource_id: i64) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(resources::table.find(resource_id))
        .set(resources::is_active.eq(0))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Resource {resource_id} not found"
        )));
    }
    info!(resource_id, "Resource deactivated");
    Ok(())
}
}
