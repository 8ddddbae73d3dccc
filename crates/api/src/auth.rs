// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use ce_ops_domain::{Role, TaskType, normalize_email};
use ce_ops_persistence::{Persistence, PersistenceError, SessionData, UserData};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use tracing::{debug, info, warn};

use crate::error::AuthError;

/// Stored timestamp layout shared with the persistence layer.
const STORED_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

/// Lifetimes of issued credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthConfig {
    /// How long a login session stays valid.
    pub session_duration: Duration,
    /// How long an invitation can be accepted.
    pub invitation_duration: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_duration: Duration::hours(12),
            invitation_duration: Duration::days(7),
        }
    }
}

/// An authenticated user and the role they act under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The user's database identifier.
    pub user_id: i64,
    /// The user's (lowercase) email address.
    pub email: String,
    /// The role assigned to this user.
    pub role: Role,
}

impl AuthenticatedActor {
    #[must_use]
    pub const fn new(user_id: i64, email: String, role: Role) -> Self {
        Self {
            user_id,
            email,
            role,
        }
    }

    fn from_user(user: &UserData) -> Result<Self, AuthError> {
        let role: Role = user
            .role
            .parse()
            .map_err(|_| AuthError::AuthenticationFailed {
                reason: format!("Invalid role: {}", user.role),
            })?;
        Ok(Self::new(user.user_id, user.email.clone(), role))
    }
}

/// Authorization service for enforcing the role permission matrix.
pub struct AuthorizationService;

impl AuthorizationService {
    fn require(
        actor: &AuthenticatedActor,
        allowed: bool,
        action: &str,
        required_role: &str,
    ) -> Result<(), AuthError> {
        if allowed {
            return Ok(());
        }
        warn!(
            user_id = actor.user_id,
            role = actor.role.as_str(),
            action,
            "Authorization denied"
        );
        Err(AuthError::Unauthorized {
            action: action.to_string(),
            required_role: required_role.to_string(),
        })
    }

    /// Users and invitations are managed by admins only.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an admin.
    pub fn authorize_manage_users(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), AuthError> {
        Self::require(actor, actor.role.can_manage_users(), action, "admin")
    }

    /// # Errors
    ///
    /// Returns an error unless the actor is admin, sales or ops.
    pub fn authorize_read_bids(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(
            actor,
            actor.role.can_read_bids(),
            "read_bids",
            "admin, sales or ops",
        )
    }

    /// # Errors
    ///
    /// Returns an error unless the actor is admin or sales.
    pub fn authorize_write_bids(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        Self::require(actor, actor.role.can_write_bids(), action, "admin or sales")
    }

    /// Covers task creation, edits, moves, assignment, deletion, phase
    /// generation and resource management.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is admin or ops.
    pub fn authorize_schedule(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        Self::require(
            actor,
            actor.role.can_schedule_tasks(),
            action,
            "admin or ops",
        )
    }

    /// Field roles may only report on the task type they own.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor's role may not report on `task_type`.
    pub fn authorize_report_task_event(
        actor: &AuthenticatedActor,
        task_type: TaskType,
    ) -> Result<(), AuthError> {
        let required = format!("admin, ops or the {} field", task_type.as_str());
        Self::require(
            actor,
            actor.role.can_report_on(task_type),
            "report_task_event",
            &required,
        )
    }

    /// # Errors
    ///
    /// Returns an error unless the actor is admin, purchasing or ops.
    pub fn authorize_read_purchasing(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(
            actor,
            actor.role.can_read_purchasing(),
            "read_purchase_orders",
            "admin, purchasing or ops",
        )
    }

    /// # Errors
    ///
    /// Returns an error unless the actor is admin or purchasing.
    pub fn authorize_write_purchasing(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), AuthError> {
        Self::require(
            actor,
            actor.role.can_write_purchasing(),
            action,
            "admin or purchasing",
        )
    }
}

/// Session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Verifies credentials and creates a session.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_actor`, `user`)
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are wrong, the account is
    /// disabled, or the session cannot be stored.
    pub fn login(
        persistence: &mut Persistence,
        email: &str,
        password: &str,
        config: &AuthConfig,
    ) -> Result<(String, AuthenticatedActor, UserData), AuthError> {
        let bad_credentials = || AuthError::AuthenticationFailed {
            reason: String::from("Invalid email or password"),
        };

        let email: String = normalize_email(email).map_err(|_| bad_credentials())?;
        let user: UserData = persistence
            .get_user_by_email(&email)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| {
                warn!(email = email.as_str(), "Login for unknown email");
                bad_credentials()
            })?;

        let verified: bool = persistence
            .verify_password(password, &user.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !verified {
            warn!(user_id = user.user_id, "Login with wrong password");
            return Err(bad_credentials());
        }

        if user.is_disabled {
            warn!(user_id = user.user_id, "Login for disabled account");
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Account is disabled"),
            });
        }

        let actor: AuthenticatedActor = AuthenticatedActor::from_user(&user)?;
        let session_token: String = Self::generate_token();
        let expires_at: String = Self::expiry_from_now(config.session_duration)?;

        persistence
            .create_session(&session_token, user.user_id, &expires_at)
            .map_err(Self::map_persistence_error)?;
        persistence
            .update_last_login(user.user_id)
            .map_err(Self::map_persistence_error)?;

        info!(
            user_id = user.user_id,
            role = actor.role.as_str(),
            "User logged in"
        );
        Ok((session_token, actor, user))
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or expired, or the
    /// account has been disabled since login.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
    ) -> Result<(AuthenticatedActor, UserData), AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime = Self::parse_stored(&session.expires_at)?;
        if OffsetDateTime::now_utc() >= expires_at {
            debug!(session_id = session.session_id, "Session expired");
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let user: UserData = persistence
            .get_user_by_id(session.user_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("User not found"),
            })?;

        if user.is_disabled {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Account is disabled"),
            });
        }

        let actor: AuthenticatedActor = AuthenticatedActor::from_user(&user)?;

        persistence
            .update_session_activity(session.session_id)
            .map_err(Self::map_persistence_error)?;

        Ok((actor, user))
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be deleted.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to delete session: {e}"),
            })?;
        Ok(())
    }

    /// Generates an opaque random token for sessions and invitations.
    #[must_use]
    pub fn generate_token() -> String {
        format!(
            "{:016x}{:016x}",
            rand::random::<u64>(),
            rand::random::<u64>()
        )
    }

    /// Formats `now + duration` in the stored timestamp layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the timestamp cannot be formatted.
    pub fn expiry_from_now(duration: Duration) -> Result<String, AuthError> {
        (OffsetDateTime::now_utc() + duration)
            .format(STORED_FORMAT)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to format expiration time: {e}"),
            })
    }

    fn parse_stored(value: &str) -> Result<OffsetDateTime, AuthError> {
        PrimitiveDateTime::parse(value, STORED_FORMAT)
            .map(PrimitiveDateTime::assume_utc)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to parse session expiration: {e}"),
            })
    }

    fn map_persistence_error(err: PersistenceError) -> AuthError {
        AuthError::AuthenticationFailed {
            reason: format!("Database error: {err}"),
        }
    }
}
