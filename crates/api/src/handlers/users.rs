// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication, account and invitation handlers.

use ce_ops_domain::{Role, TaskType, normalize_email, require_text};
use ce_ops_persistence::{InvitationData, NewInvitation, Persistence, UserData};
use time::Duration;
use tracing::info;

use super::{not_found, persistence_error};
use crate::auth::{AuthConfig, AuthenticatedActor, AuthenticationService, AuthorizationService};
use crate::error::ApiError;
use crate::password_policy::PasswordPolicy;
use crate::request_response::{
    AcceptInvitationRequest, BootstrapRequest, CreateInvitationRequest, InvitationInfo,
    ListInvitationsResponse, ListUsersResponse, LoginRequest, LoginResponse, MessageResponse,
    Permissions, UpdateUserRoleRequest, UserInfo, WhoAmIResponse,
};

fn stored_now() -> Result<String, ApiError> {
    Ok(AuthenticationService::expiry_from_now(Duration::ZERO)?)
}

fn load_user(persistence: &mut Persistence, user_id: i64) -> Result<UserData, ApiError> {
    persistence
        .get_user_by_id(user_id)
        .map_err(persistence_error("User"))?
        .ok_or_else(|| not_found("User", format!("User {user_id} not found")))
}

fn invitation_status(invitation: &InvitationData, now: &str) -> &'static str {
    if invitation.accepted_at.is_some() {
        "accepted"
    } else if invitation.revoked_at.is_some() {
        "revoked"
    } else if invitation.expires_at.as_str() <= now {
        "expired"
    } else {
        "pending"
    }
}

fn invitation_info(invitation: InvitationData, now: &str, include_token: bool) -> InvitationInfo {
    InvitationInfo {
        status: invitation_status(&invitation, now).to_string(),
        invitation_id: invitation.invitation_id,
        email: invitation.email,
        role: invitation.role,
        invited_by: invitation.invited_by,
        created_at: invitation.created_at,
        expires_at: invitation.expires_at,
        accepted_user_id: invitation.accepted_user_id,
        token: include_token.then_some(invitation.token),
    }
}

/// Guards the last active admin against demotion or disabling.
fn ensure_not_last_admin(persistence: &mut Persistence, target: &UserData) -> Result<(), ApiError> {
    if target.role != Role::Admin.as_str() || target.is_disabled {
        return Ok(());
    }
    let active_admins: i64 = persistence
        .count_active_admins()
        .map_err(persistence_error("User"))?;
    if active_admins <= 1 {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("last_active_admin"),
            message: String::from("Operation would leave the system without an active admin"),
        });
    }
    Ok(())
}

/// Creates the first admin account.
///
/// # Errors
///
/// Returns an error if any account already exists, the input is invalid,
/// or the password fails policy.
pub fn bootstrap(
    persistence: &mut Persistence,
    request: &BootstrapRequest,
) -> Result<UserInfo, ApiError> {
    let user_count: i64 = persistence.count_users().map_err(persistence_error("User"))?;
    if user_count > 0 {
        return Err(ApiError::Conflict {
            message: String::from("System is already bootstrapped"),
        });
    }

    let email: String = normalize_email(&request.email)?;
    let display_name: String = require_text("display_name", &request.display_name)?;
    PasswordPolicy::default().validate(
        &request.password,
        &request.password_confirmation,
        &email,
        &display_name,
    )?;

    let user_id: i64 = persistence
        .bootstrap_admin(&email, &display_name, &request.password)
        .map_err(persistence_error("User"))?;
    let user: UserData = load_user(persistence, user_id)?;

    info!(user_id, "First admin created");
    Ok(UserInfo::from(&user))
}

/// Verifies credentials and opens a session.
///
/// # Errors
///
/// Returns `ApiError::AuthenticationFailed` for bad credentials or a
/// disabled account.
pub fn login(
    persistence: &mut Persistence,
    request: &LoginRequest,
    config: &AuthConfig,
) -> Result<LoginResponse, ApiError> {
    let (session_token, actor, _user): (String, AuthenticatedActor, UserData) =
        AuthenticationService::login(persistence, &request.email, &request.password, config)?;
    let user: UserData = load_user(persistence, actor.user_id)?;

    let expires_at: String = persistence
        .get_session_by_token(&session_token)
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to retrieve session: {e}"),
        })?
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Session not found after creation"),
        })?
        .expires_at;

    Ok(LoginResponse {
        session_token,
        expires_at,
        user: UserInfo::from(&user),
    })
}

/// Ends a session.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Describes the current user and what they may do.
#[must_use]
pub fn whoami(actor: &AuthenticatedActor, user: &UserData) -> WhoAmIResponse {
    let role = actor.role;
    WhoAmIResponse {
        user: UserInfo::from(user),
        permissions: Permissions {
            manage_users: role.can_manage_users(),
            read_bids: role.can_read_bids(),
            write_bids: role.can_write_bids(),
            schedule_tasks: role.can_schedule_tasks(),
            report_task_types: TaskType::ALL
                .into_iter()
                .filter(|task_type| role.can_report_on(*task_type))
                .map(|task_type| task_type.as_str().to_string())
                .collect(),
            read_purchasing: role.can_read_purchasing(),
            write_purchasing: role.can_write_purchasing(),
        },
    }
}

/// Lists every account.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the query fails.
pub fn list_users(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListUsersResponse, ApiError> {
    AuthorizationService::authorize_manage_users(actor, "list_users")?;
    let users: Vec<UserData> = persistence.list_users().map_err(persistence_error("User"))?;
    Ok(ListUsersResponse {
        users: users.iter().map(UserInfo::from).collect(),
    })
}

/// Changes a user's role.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the role is unknown,
/// the user does not exist, or the change would demote the last active
/// admin.
pub fn update_user_role(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    user_id: i64,
    request: &UpdateUserRoleRequest,
) -> Result<UserInfo, ApiError> {
    AuthorizationService::authorize_manage_users(actor, "update_user_role")?;
    let role: Role = request.role.parse()?;

    let target: UserData = load_user(persistence, user_id)?;
    if role != Role::Admin {
        ensure_not_last_admin(persistence, &target)?;
    }

    persistence
        .update_user_role(user_id, role)
        .map_err(persistence_error("User"))?;
    info!(
        actor_id = actor.user_id,
        user_id,
        from = target.role.as_str(),
        to = role.as_str(),
        "User role changed"
    );

    let user: UserData = load_user(persistence, user_id)?;
    Ok(UserInfo::from(&user))
}

/// Disables or re-enables an account. Disabling ends the user's sessions.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, targets themselves, the
/// user does not exist, or the change would disable the last active admin.
pub fn set_user_disabled(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    user_id: i64,
    disabled: bool,
) -> Result<UserInfo, ApiError> {
    let action = if disabled { "disable_user" } else { "enable_user" };
    AuthorizationService::authorize_manage_users(actor, action)?;

    if disabled && user_id == actor.user_id {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("cannot_disable_self"),
            message: String::from("Users cannot disable their own account"),
        });
    }

    let target: UserData = load_user(persistence, user_id)?;
    if disabled {
        ensure_not_last_admin(persistence, &target)?;
    }

    persistence
        .set_user_disabled(user_id, disabled)
        .map_err(persistence_error("User"))?;
    if disabled {
        let ended: usize = persistence
            .delete_sessions_for_user(user_id)
            .map_err(persistence_error("User"))?;
        info!(
            actor_id = actor.user_id,
            user_id,
            sessions_ended = ended,
            "User disabled"
        );
    } else {
        info!(actor_id = actor.user_id, user_id, "User enabled");
    }

    let user: UserData = load_user(persistence, user_id)?;
    Ok(UserInfo::from(&user))
}

/// Lists invitations with their current status. Tokens are not included.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the query fails.
pub fn list_invitations(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<ListInvitationsResponse, ApiError> {
    AuthorizationService::authorize_manage_users(actor, "list_invitations")?;
    let now: String = stored_now()?;
    let invitations: Vec<InvitationData> = persistence
        .list_invitations()
        .map_err(persistence_error("Invitation"))?;
    Ok(ListInvitationsResponse {
        invitations: invitations
            .into_iter()
            .map(|invitation| invitation_info(invitation, &now, false))
            .collect(),
    })
}

/// Invites a new account. The response is the only place the token appears.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the email or role is
/// invalid, or an account with the email already exists.
pub fn create_invitation(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &CreateInvitationRequest,
    config: &AuthConfig,
) -> Result<InvitationInfo, ApiError> {
    AuthorizationService::authorize_manage_users(actor, "create_invitation")?;
    let email: String = normalize_email(&request.email)?;
    let role: Role = request.role.parse()?;

    let existing = persistence
        .get_user_by_email(&email)
        .map_err(persistence_error("User"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict {
            message: format!("An account for {email} already exists"),
        });
    }

    let invitation = NewInvitation {
        token: AuthenticationService::generate_token(),
        email,
        role,
        invited_by: actor.user_id,
        expires_at: AuthenticationService::expiry_from_now(config.invitation_duration)?,
    };
    let invitation_id: i64 = persistence
        .create_invitation(&invitation)
        .map_err(persistence_error("Invitation"))?;
    info!(
        actor_id = actor.user_id,
        invitation_id,
        role = role.as_str(),
        "Invitation created"
    );

    let created: InvitationData = persistence
        .get_invitation_by_id(invitation_id)
        .map_err(persistence_error("Invitation"))?
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Invitation not found after creation"),
        })?;
    Ok(invitation_info(created, &stored_now()?, true))
}

/// Revokes a pending invitation.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the invitation does not
/// exist, or it was already accepted or revoked.
pub fn revoke_invitation(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    invitation_id: i64,
) -> Result<MessageResponse, ApiError> {
    AuthorizationService::authorize_manage_users(actor, "revoke_invitation")?;
    persistence
        .revoke_invitation(invitation_id)
        .map_err(persistence_error("Invitation"))?;
    info!(
        actor_id = actor.user_id,
        invitation_id,
        "Invitation revoked"
    );
    Ok(MessageResponse {
        message: format!("Invitation {invitation_id} has been revoked"),
    })
}

/// Redeems an invitation token, creating the account.
///
/// # Errors
///
/// Returns an error if the token is unknown, the invitation is no longer
/// pending, or the password fails policy.
pub fn accept_invitation(
    persistence: &mut Persistence,
    request: &AcceptInvitationRequest,
) -> Result<UserInfo, ApiError> {
    let invitation: InvitationData = persistence
        .get_invitation_by_token(request.token.trim())
        .map_err(persistence_error("Invitation"))?
        .ok_or_else(|| not_found("Invitation", String::from("Unknown invitation token")))?;

    let now: String = stored_now()?;
    if !invitation.is_pending(&now) {
        return Err(ApiError::Conflict {
            message: format!(
                "Invitation is {} and can no longer be accepted",
                invitation_status(&invitation, &now)
            ),
        });
    }

    let display_name: String = require_text("display_name", &request.display_name)?;
    PasswordPolicy::default().validate(
        &request.password,
        &request.password_confirmation,
        &invitation.email,
        &display_name,
    )?;

    let user_id: i64 = persistence
        .accept_invitation(invitation.invitation_id, &display_name, &request.password)
        .map_err(persistence_error("Invitation"))?;
    info!(
        invitation_id = invitation.invitation_id,
        user_id, "Invitation accepted"
    );

    let user: UserData = load_user(persistence, user_id)?;
    Ok(UserInfo::from(&user))
}
