// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ce_ops_domain::Role;

use super::{create_test_admin, create_test_persistence};
use crate::{NewInvitation, PersistenceError};

#[test]
fn test_bootstrap_admin_only_succeeds_once() {
    let mut persistence = create_test_persistence();

    let admin_id = persistence
        .bootstrap_admin("owner@example.com", "Owner", "correct-horse-battery")
        .expect("first bootstrap succeeds");

    let admin = persistence.get_user_by_id(admin_id).unwrap().unwrap();
    assert_eq!(admin.role, "admin");
    assert!(!admin.is_disabled);

    let second = persistence.bootstrap_admin("other@example.com", "Other", "correct-horse-battery");
    assert!(matches!(second, Err(PersistenceError::Conflict(_))));
    assert_eq!(persistence.count_users().unwrap(), 1);
}

#[test]
fn test_duplicate_email_is_a_conflict() {
    let mut persistence = create_test_persistence();
    create_test_admin(&mut persistence);

    let result = persistence.create_user(
        "admin@example.com",
        "Again",
        "correct-horse-battery",
        Role::Ops,
    );
    assert!(matches!(result, Err(PersistenceError::Conflict(_))));
}

#[test]
fn test_password_is_hashed_and_verifiable() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_admin(&mut persistence);

    let user = persistence.get_user_by_id(user_id).unwrap().unwrap();
    assert_ne!(user.password_hash, "correct-horse-battery");
    assert!(persistence.verify_password("correct-horse-battery", &user.password_hash).unwrap());
    assert!(!persistence.verify_password("wrong", &user.password_hash).unwrap());
}

#[test]
fn test_disable_and_enable_user() {
    let mut persistence = create_test_persistence();
    create_test_admin(&mut persistence);
    let second = persistence
        .create_user(
            "ops@example.com",
            "Ops",
            "correct-horse-battery",
            Role::Admin,
        )
        .unwrap();
    assert_eq!(persistence.count_active_admins().unwrap(), 2);

    persistence.set_user_disabled(second, true).unwrap();
    let user = persistence.get_user_by_id(second).unwrap().unwrap();
    assert!(user.is_disabled);
    assert!(user.disabled_at.is_some());
    assert_eq!(persistence.count_active_admins().unwrap(), 1);

    persistence.set_user_disabled(second, false).unwrap();
    let user = persistence.get_user_by_id(second).unwrap().unwrap();
    assert!(!user.is_disabled);
    assert!(user.disabled_at.is_none());
}

#[test]
fn test_update_role_of_missing_user_is_not_found() {
    let mut persistence = create_test_persistence();
    let result = persistence.update_user_role(404, Role::Sales);
    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_session_lifecycle() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_admin(&mut persistence);

    persistence
        .create_session("live-token", user_id, "2999-01-01T00:00:00Z")
        .unwrap();
    persistence
        .create_session("stale-token", user_id, "2000-01-01T00:00:00Z")
        .unwrap();

    let session = persistence.get_session_by_token("live-token").unwrap().unwrap();
    assert_eq!(session.user_id, user_id);

    assert_eq!(persistence.delete_expired_sessions().unwrap(), 1);
    assert!(persistence.get_session_by_token("stale-token").unwrap().is_none());

    persistence.delete_session("live-token").unwrap();
    assert!(persistence.get_session_by_token("live-token").unwrap().is_none());
}

#[test]
fn test_delete_sessions_for_user() {
    let mut persistence = create_test_persistence();
    let user_id = create_test_admin(&mut persistence);
    persistence.create_session("a", user_id, "2999-01-01T00:00:00Z").unwrap();
    persistence.create_session("b", user_id, "2999-01-01T00:00:00Z").unwrap();

    assert_eq!(persistence.delete_sessions_for_user(user_id).unwrap(), 2);
}

fn invite(
    persistence: &mut crate::Persistence,
    invited_by: i64,
    token: &str,
    expires_at: &str,
) -> i64 {
    persistence
        .create_invitation(&NewInvitation {
            token: token.to_string(),
            email: format!("{token}@example.com"),
            role: Role::Installer,
            invited_by,
            expires_at: expires_at.to_string(),
        })
        .unwrap()
}

#[test]
fn test_accept_invitation_creates_user_with_invited_role() {
    let mut persistence = create_test_persistence();
    let admin_id = create_test_admin(&mut persistence);
    let invitation_id = invite(&mut persistence, admin_id, "crew1", "2999-01-01T00:00:00Z");

    let user_id = persistence
        .accept_invitation(invitation_id, "Crew One", "correct-horse-battery")
        .unwrap();

    let user = persistence.get_user_by_id(user_id).unwrap().unwrap();
    assert_eq!(user.email, "crew1@example.com");
    assert_eq!(user.role, "installer");

    let invitation = persistence.get_invitation_by_token("crew1").unwrap().unwrap();
    assert_eq!(invitation.accepted_user_id, Some(user_id));
    assert!(!invitation.is_pending("2026-01-01T00:00:00Z"));

    let again = persistence.accept_invitation(invitation_id, "Crew One", "correct-horse-battery");
    assert!(matches!(again, Err(PersistenceError::Conflict(_))));
}

#[test]
fn test_expired_invitation_cannot_be_accepted() {
    let mut persistence = create_test_persistence();
    let admin_id = create_test_admin(&mut persistence);
    let invitation_id = invite(&mut persistence, admin_id, "late", "2000-01-01T00:00:00Z");

    let result = persistence.accept_invitation(invitation_id, "Late", "correct-horse-battery");
    assert!(matches!(result, Err(PersistenceError::Conflict(_))));
    assert!(persistence.get_user_by_email("late@example.com").unwrap().is_none());
}

#[test]
fn test_revoke_invitation() {
    let mut persistence = create_test_persistence();
    let admin_id = create_test_admin(&mut persistence);
    let invitation_id = invite(&mut persistence, admin_id, "gone", "2999-01-01T00:00:00Z");

    persistence.revoke_invitation(invitation_id).unwrap();
    let invitation = persistence.get_invitation_by_id(invitation_id).unwrap().unwrap();
    assert!(invitation.revoked_at.is_some());

    assert!(matches!(
        persistence.revoke_invitation(invitation_id),
        Err(PersistenceError::Conflict(_))
    ));
    assert!(matches!(
        persistence.accept_invitation(invitation_id, "Gone", "correct-horse-battery"),
        Err(PersistenceError::Conflict(_))
    ));
    assert!(matches!(
        persistence.revoke_invitation(9999),
        Err(PersistenceError::NotFound(_))
    ));
}
