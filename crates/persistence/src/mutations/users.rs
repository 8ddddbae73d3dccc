// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User, session and invitation mutations.

use ce_ops_domain::Role;
use diesel::prelude::*;
use diesel::{PgConnection, SqliteConnection};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::NewInvitation;
use crate::diesel_schema::{invitations, sessions, users};
use crate::error::PersistenceError;
use crate::now_timestamp;

/// Email, role, expiry, acceptance and revocation of an invitation.
type InvitationState = (String, String, String, Option<String>, Option<String>);

/// Hashes a password with bcrypt at the given cost.
///
/// # Errors
///
/// Returns an error if bcrypt rejects the cost or input.
pub fn hash_password(password: &str, cost: u32) -> Result<String, PersistenceError> {
    bcrypt::hash(password, cost)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))
}

backend_fn! {
/// Creates a user account.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `email` - Normalized (lowercase) email, unique
/// * `display_name` - The display name
/// * `password_hash` - A bcrypt hash from [`hash_password`]
/// * `role` - The account role
///
/// # Errors
///
/// Returns `PersistenceError::Conflict` if the email is already registered.
pub fn create_user(
    conn: &mut _,
    email: &str,
    display_name: &str,
    password_hash: &str,
    role: Role,
) -> Result<i64, PersistenceError> {
    let now = now_timestamp();

    diesel::insert_into(users::table)
        .values((
            users::email.eq(email),
            users::display_name.eq(display_name),
            users::password_hash.eq(password_hash),
            users::role.eq(role.as_str()),
            users::is_disabled.eq(0),
            users::created_at.eq(now.as_str()),
            users::updated_at.eq(now.as_str()),
        ))
        .execute(conn)?;

    let user_id: i64 = conn.get_last_insert_rowid()?;

    info!(user_id, email, role = role.as_str(), "User created");
    Ok(user_id)
}
}

backend_fn! {
/// Creates the first admin account.
///
/// Runs in a transaction so two concurrent bootstraps cannot both succeed.
///
/// # Errors
///
/// Returns `PersistenceError::Conflict` if any user already exists.
pub fn bootstrap_admin(
    conn: &mut _,
    email: &str,
    display_name: &str,
    password_hash: &str,
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        use diesel::dsl::count;

        let existing: i64 = users::table.select(count(users::user_id)).first(conn)?;
        if existing > 0 {
            return Err(PersistenceError::Conflict(String::from(
                "System is already bootstrapped",
            )));
        }

        let now = now_timestamp();
        diesel::insert_into(users::table)
            .values((
                users::email.eq(email),
                users::display_name.eq(display_name),
                users::password_hash.eq(password_hash),
                users::role.eq(Role::Admin.as_str()),
                users::is_disabled.eq(0),
                users::created_at.eq(now.as_str()),
                users::updated_at.eq(now.as_str()),
            ))
            .execute(conn)?;

        let user_id: i64 = conn.get_last_insert_rowid()?;
        info!(user_id, email, "Bootstrap admin created");
        Ok(user_id)
    })
}
}

backend_fn! {
/// Changes a user's role.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the user does not exist.
pub fn update_user_role(conn: &mut _, user_id: i64, role: Role) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(users::table.find(user_id))
        .set((
            users::role.eq(role.as_str()),
            users::updated_at.eq(now_timestamp()),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!("User {user_id} not found")));
    }

    info!(user_id, role = role.as_str(), "User role updated");
    Ok(())
}
}

backend_fn! {
/// Disables or re-enables a user.
///
/// Disabling records `disabled_at`; enabling clears it.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the user does not exist.
pub fn set_user_disabled(
    conn: &mut _,
    user_id: i64,
    disabled: bool,
) -> Result<(), PersistenceError> {
    let now = now_timestamp();
    let disabled_at: Option<&str> = if disabled { Some(now.as_str()) } else { None };

    let rows_affected: usize = diesel::update(users::table.find(user_id))
        .set((
            users::is_disabled.eq(i32::from(disabled)),
            users::disabled_at.eq(disabled_at),
            users::updated_at.eq(now.as_str()),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!("User {user_id} not found")));
    }

    info!(user_id, disabled, "User disabled flag updated");
    Ok(())
}
}

backend_fn! {
/// Records a successful login.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_last_login(conn: &mut _, user_id: i64) -> Result<(), PersistenceError> {
    debug!(user_id, "Updating last_login_at");

    diesel::update(users::table.find(user_id))
        .set(users::last_login_at.eq(Some(now_timestamp())))
        .execute(conn)?;

    Ok(())
}
}

backend_fn! {
/// Creates a session for a user.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_token` - The unique session token
/// * `user_id` - The user ID
/// * `expires_at` - Expiration in the stored UTC format
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut _,
    session_token: &str,
    user_id: i64,
    expires_at: &str,
) -> Result<i64, PersistenceError> {
    let now = now_timestamp();

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::user_id.eq(user_id),
            sessions::created_at.eq(now.as_str()),
            sessions::last_activity_at.eq(now.as_str()),
            sessions::expires_at.eq(expires_at),
        ))
        .execute(conn)?;

    let session_id: i64 = conn.get_last_insert_rowid()?;
    info!(session_id, user_id, "Session created");
    Ok(session_id)
}
}

backend_fn! {
/// Touches a session's last activity timestamp.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_session_activity(conn: &mut _, session_id: i64) -> Result<(), PersistenceError> {
    diesel::update(sessions::table.find(session_id))
        .set(sessions::last_activity_at.eq(now_timestamp()))
        .execute(conn)?;
    Ok(())
}
}

backend_fn! {
/// Deletes a session by token.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(conn: &mut _, session_token: &str) -> Result<(), PersistenceError> {
    diesel::delete(sessions::table.filter(sessions::session_token.eq(session_token)))
        .execute(conn)?;
    debug!("Session deleted");
    Ok(())
}
}

backend_fn! {
/// Deletes every session belonging to a user.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_sessions_for_user(conn: &mut _, user_id: i64) -> Result<usize, PersistenceError> {
    let deleted: usize =
        diesel::delete(sessions::table.filter(sessions::user_id.eq(user_id))).execute(conn)?;
    info!(user_id, deleted, "Deleted sessions for user");
    Ok(deleted)
}
}

backend_fn! {
/// Deletes sessions that expired before `now`.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(conn: &mut _, now: &str) -> Result<usize, PersistenceError> {
    let deleted: usize =
        diesel::delete(sessions::table.filter(sessions::expires_at.le(now))).execute(conn)?;
    debug!(deleted, "Deleted expired sessions");
    Ok(deleted)
}
}

backend_fn! {
/// Stores a new invitation.
///
/// # Errors
///
/// Returns `PersistenceError::InvalidReference` if `invited_by` is unknown.
pub fn create_invitation(
    conn: &mut _,
    invitation: &NewInvitation,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(invitations::table)
        .values((
            invitations::token.eq(invitation.token.as_str()),
            invitations::email.eq(invitation.email.as_str()),
            invitations::role.eq(invitation.role.as_str()),
            invitations::invited_by.eq(invitation.invited_by),
            invitations::created_at.eq(now_timestamp()),
            invitations::expires_at.eq(invitation.expires_at.as_str()),
        ))
        .execute(conn)?;

    let invitation_id: i64 = conn.get_last_insert_rowid()?;
    info!(
        invitation_id,
        email = invitation.email.as_str(),
        role = invitation.role.as_str(),
        "Invitation created"
    );
    Ok(invitation_id)
}
}

backend_fn! {
/// Revokes a pending invitation.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the invitation does not exist,
/// or `PersistenceError::Conflict` if it was already accepted or revoked.
pub fn revoke_invitation(conn: &mut _, invitation_id: i64) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let state: Option<(Option<String>, Option<String>)> = invitations::table
            .find(invitation_id)
            .select((invitations::accepted_at, invitations::revoked_at))
            .first(conn)
            .optional()?;

        match state {
            None => Err(PersistenceError::NotFound(format!(
                "Invitation {invitation_id} not found"
            ))),
            Some((Some(_), _)) => Err(PersistenceError::Conflict(format!(
                "Invitation {invitation_id} was already accepted"
            ))),
            Some((None, Some(_))) => Err(PersistenceError::Conflict(format!(
                "Invitation {invitation_id} was already revoked"
            ))),
            Some((None, None)) => {
                diesel::update(invitations::table.find(invitation_id))
                    .set(invitations::revoked_at.eq(Some(now_timestamp())))
                    .execute(conn)?;
                info!(invitation_id, "Invitation revoked");
                Ok(())
            }
        }
    })
}
}

backend_fn! {
/// Accepts an invitation by creating the invited account.
///
/// The account takes its email and role from the invitation. The user
/// insert and the acceptance stamp commit together.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` for an unknown invitation,
/// `PersistenceError::Conflict` if it is no longer pending or the email
/// is already registered.
pub fn accept_invitation(
    conn: &mut _,
    invitation_id: i64,
    display_name: &str,
    password_hash: &str,
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let now = now_timestamp();

        let invitation: Option<InvitationState> = invitations::table
            .find(invitation_id)
            .select((
                invitations::email,
                invitations::role,
                invitations::expires_at,
                invitations::accepted_at,
                invitations::revoked_at,
            ))
            .first(conn)
            .optional()?;

        let Some((email, role, expires_at, accepted_at, revoked_at)) = invitation else {
            return Err(PersistenceError::NotFound(format!(
                "Invitation {invitation_id} not found"
            )));
        };
        if accepted_at.is_some() || revoked_at.is_some() || expires_at <= now {
            return Err(PersistenceError::Conflict(format!(
                "Invitation {invitation_id} is no longer pending"
            )));
        }

        diesel::insert_into(users::table)
            .values((
                users::email.eq(email.as_str()),
                users::display_name.eq(display_name),
                users::password_hash.eq(password_hash),
                users::role.eq(role.as_str()),
                users::is_disabled.eq(0),
                users::created_at.eq(now.as_str()),
                users::updated_at.eq(now.as_str()),
            ))
            .execute(conn)?;
        let user_id: i64 = conn.get_last_insert_rowid()?;

        diesel::update(invitations::table.find(invitation_id))
            .set((
                invitations::accepted_at.eq(Some(now.as_str())),
                invitations::accepted_user_id.eq(Some(user_id)),
            ))
            .execute(conn)?;

        info!(
            invitation_id,
            user_id,
            email = email.as_str(),
            "Invitation accepted"
        );
        Ok(user_id)
    })
}
}
