// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User, session and invitation queries.

use ce_ops_domain::Role;
use diesel::prelude::*;
use diesel::{PgConnection, SqliteConnection};
use tracing::debug;

use crate::data_models::{InvitationData, SessionData, UserData};
use crate::diesel_schema::{invitations, sessions, users};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
pub struct UserRow {
    user_id: i64,
    email: String,
    display_name: String,
    password_hash: String,
    role: String,
    is_disabled: i32,
    created_at: String,
    updated_at: String,
    disabled_at: Option<String>,
    last_login_at: Option<String>,
}

impl From<UserRow> for UserData {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            email: row.email,
            display_name: row.display_name,
            password_hash: row.password_hash,
            role: row.role,
            is_disabled: row.is_disabled != 0,
            created_at: row.created_at,
            updated_at: row.updated_at,
            disabled_at: row.disabled_at,
            last_login_at: row.last_login_at,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = sessions)]
struct SessionRow {
    session_id: i64,
    session_token: String,
    user_id: i64,
    created_at: String,
    last_activity_at: String,
    expires_at: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = invitations)]
pub struct InvitationRow {
    invitation_id: i64,
    token: String,
    email: String,
    role: String,
    invited_by: i64,
    created_at: String,
    expires_at: String,
    accepted_at: Option<String>,
    accepted_user_id: Option<i64>,
    revoked_at: Option<String>,
}

impl From<InvitationRow> for InvitationData {
    fn from(row: InvitationRow) -> Self {
        Self {
            invitation_id: row.invitation_id,
            token: row.token,
            email: row.email,
            role: row.role,
            invited_by: row.invited_by,
            created_at: row.created_at,
            expires_at: row.expires_at,
            accepted_at: row.accepted_at,
            accepted_user_id: row.accepted_user_id,
            revoked_at: row.revoked_at,
        }
    }
}

backend_fn! {
/// Retrieves a user by email.
///
/// The email must already be normalized (trimmed, lowercase).
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user_by_email(conn: &mut _, email: &str) -> Result<Option<UserData>, PersistenceError> {
    debug!(email, "Looking up user by email");

    let row: Option<UserRow> = users::table
        .filter(users::email.eq(email))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(UserData::from))
}
}

backend_fn! {
/// Retrieves a user by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user_by_id(conn: &mut _, user_id: i64) -> Result<Option<UserData>, PersistenceError> {
    debug!(user_id, "Looking up user by ID");

    let row: Option<UserRow> = users::table
        .find(user_id)
        .select(UserRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(UserData::from))
}
}

backend_fn! {
/// Lists all users ordered by display name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_users(conn: &mut _) -> Result<Vec<UserData>, PersistenceError> {
    debug!("Listing all users");

    let rows: Vec<UserRow> = users::table
        .select(UserRow::as_select())
        .order_by((users::display_name.asc(), users::user_id.asc()))
        .load(conn)?;

    Ok(rows.into_iter().map(UserData::from).collect())
}
}

backend_fn! {
/// Counts all user accounts, disabled ones included.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_users(conn: &mut _) -> Result<i64, PersistenceError> {
    use diesel::dsl::count;

    let total: i64 = users::table.select(count(users::user_id)).first(conn)?;

    debug!(total, "Counted users");
    Ok(total)
}
}

backend_fn! {
/// Counts enabled accounts with the admin role.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_active_admins(conn: &mut _) -> Result<i64, PersistenceError> {
    use diesel::dsl::count;

    let total: i64 = users::table
        .filter(users::role.eq(Role::Admin.as_str()))
        .filter(users::is_disabled.eq(0))
        .select(count(users::user_id))
        .first(conn)?;

    debug!(total, "Counted active admins");
    Ok(total)
}
}

backend_fn! {
/// Retrieves a session by token.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the session is not found.
pub fn get_session_by_token(
    conn: &mut _,
    session_token: &str,
) -> Result<Option<SessionData>, PersistenceError> {
    debug!("Looking up session by token");

    let row: Option<SessionRow> = sessions::table
        .filter(sessions::session_token.eq(session_token))
        .select(SessionRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(|row| SessionData {
        session_id: row.session_id,
        session_token: row.session_token,
        user_id: row.user_id,
        created_at: row.created_at,
        last_activity_at: row.last_activity_at,
        expires_at: row.expires_at,
    }))
}
}

backend_fn! {
/// Retrieves an invitation by its token.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_invitation_by_token(
    conn: &mut _,
    token: &str,
) -> Result<Option<InvitationData>, PersistenceError> {
    debug!("Looking up invitation by token");

    let row: Option<InvitationRow> = invitations::table
        .filter(invitations::token.eq(token))
        .select(InvitationRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(InvitationData::from))
}
}

backend_fn! {
/// Retrieves an invitation by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_invitation_by_id(
    conn: &mut _,
    invitation_id: i64,
) -> Result<Option<InvitationData>, PersistenceError> {
    let row: Option<InvitationRow> = invitations::table
        .find(invitation_id)
        .select(InvitationRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(InvitationData::from))
}
}

backend_fn! {
/// Lists invitations, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_invitations(conn: &mut _) -> Result<Vec<InvitationData>, PersistenceError> {
    debug!("Listing invitations");

    let rows: Vec<InvitationRow> = invitations::table
        .select(InvitationRow::as_select())
        .order_by(invitations::invitation_id.desc())
        .load(conn)?;

    Ok(rows.into_iter().map(InvitationData::from).collect())
}
}

/// Verifies a password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns an error if the hash is malformed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| PersistenceError::Other(format!("Failed to verify password: {e}")))
}
