// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend validation tests.
//!
//! `SQLite` tests run normally via `cargo test`. `PostgreSQL` tests are
//! marked `#[ignore]` and run only via `cargo xtask test-postgres`, which
//! provisions a container and sets:
//!
//! - `DATABASE_URL`
//! - `CE_OPS_TEST_BACKEND=postgres`
//!
//! These tests cover schema compatibility (migrations, FK, UNIQUE and
//! CHECK enforcement, transactions). Business rules are covered by the
//! `SQLite` suite.

use ce_ops_domain::{ResourceKind, Role};
use diesel::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use std::env;

use crate::backend::{postgres, sqlite};
use crate::{Persistence, PersistenceError};

#[derive(QueryableByName)]
struct CountResult {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// # Panics
///
/// Panics if `DATABASE_URL` is not set, indicating missing infrastructure.
fn get_postgres_url() -> String {
    env::var("DATABASE_URL")
        .expect("DATABASE_URL not set - Postgres tests must be run via `cargo xtask test-postgres`")
}

/// # Panics
///
/// Panics if `CE_OPS_TEST_BACKEND` is not `postgres`.
fn verify_postgres_test_environment() {
    let backend = env::var("CE_OPS_TEST_BACKEND").expect(
        "CE_OPS_TEST_BACKEND not set - Postgres tests must be run via `cargo xtask test-postgres`",
    );
    assert_eq!(
        backend, "postgres",
        "CE_OPS_TEST_BACKEND must be 'postgres'"
    );
}

fn connect() -> PgConnection {
    verify_postgres_test_environment();
    postgres::initialize_database(&get_postgres_url()).expect("Failed to initialize Postgres")
}

#[test]
fn test_sqlite_migrations_enforce_foreign_keys() {
    let mut conn = sqlite::initialize_database(":memory:").expect("sqlite init");
    sqlite::verify_foreign_key_enforcement(&mut conn).expect("foreign keys enabled");

    let result = diesel::sql_query(
        "INSERT INTO sessions (session_token, user_id, created_at, last_activity_at, expires_at)
         VALUES ('t', 999, 'x', 'x', 'x')",
    )
    .execute(&mut conn);
    assert!(
        result.is_err(),
        "Session for a missing user must be rejected"
    );
}

#[test]
fn test_sqlite_check_constraint_rejects_inverted_window() {
    let mut conn = sqlite::initialize_database(":memory:").expect("sqlite init");

    let result = diesel::sql_query(
        "INSERT INTO install_tasks (task_type, title, status, window_start, window_end, created_at, updated_at)
         VALUES ('install', 'Backwards', 'scheduled', '2026-03-10T21:00:00Z', '2026-03-10T13:00:00Z', 'x', 'x')",
    )
    .execute(&mut conn);
    assert!(result.is_err(), "window_end must be after window_start");
}

#[test]
#[ignore = "requires Postgres via cargo xtask test-postgres"]
fn test_postgres_migrations_apply_cleanly() {
    let mut conn = connect();
    postgres::verify_foreign_key_enforcement(&mut conn).expect("foreign keys enforced");
}

#[test]
#[ignore = "requires Postgres via cargo xtask test-postgres"]
fn test_postgres_unique_email() {
    let mut conn = connect();
    conn.begin_test_transaction().expect("test transaction");

    let insert = "INSERT INTO users (email, display_name, password_hash, role, is_disabled, created_at, updated_at)
                  VALUES ('dup@example.com', 'Dup', 'hash', 'admin', 0, 'x', 'x')";
    diesel::sql_query(insert).execute(&mut conn).expect("first insert");
    assert!(diesel::sql_query(insert).execute(&mut conn).is_err());
}

#[test]
#[ignore = "requires Postgres via cargo xtask test-postgres"]
fn test_postgres_check_constraints() {
    let mut conn = connect();
    conn.begin_test_transaction().expect("test transaction");

    let bad_role = diesel::sql_query(
        "INSERT INTO users (email, display_name, password_hash, role, is_disabled, created_at, updated_at)
         VALUES ('role@example.com', 'Role', 'hash', 'foreman', 0, 'x', 'x')",
    )
    .execute(&mut conn);
    assert!(bad_role.is_err(), "unknown role must be rejected");
}

#[test]
#[ignore = "requires Postgres via cargo xtask test-postgres"]
fn test_postgres_transaction_rollback() {
    let mut conn = connect();
    conn.begin_test_transaction().expect("test transaction");

    diesel::sql_query(
        "INSERT INTO resources (name, kind, is_active, created_at) VALUES ('Rollback Crew', 'crew', 1, 'x')",
    )
    .execute(&mut conn)
    .expect("insert resource");

    let count: i64 = diesel::sql_query(
        "SELECT COUNT(*) AS count FROM resources WHERE name = 'Rollback Crew'",
    )
    .get_result::<CountResult>(&mut conn)
    .map(|r| r.count)
    .expect("count");
    assert_eq!(count, 1);
    drop(conn);

    let mut fresh = connect();
    let count_after: i64 = diesel::sql_query(
        "SELECT COUNT(*) AS count FROM resources WHERE name = 'Rollback Crew'",
    )
    .get_result::<CountResult>(&mut fresh)
    .map(|r| r.count)
    .expect("count");
    assert_eq!(count_after, 0, "test transaction must roll back");
}

#[test]
#[ignore = "requires Postgres via cargo xtask test-postgres"]
fn test_postgres_adapter_round_trip() {
    verify_postgres_test_environment();
    let mut persistence =
        Persistence::new_with_postgres(&get_postgres_url()).expect("Postgres adapter");
    persistence.set_password_cost(super::TEST_PASSWORD_COST);
    assert_eq!(persistence.backend_name(), "postgres");

    let suffix = rand_suffix();
    let user_id = persistence
        .create_user(
            &format!("pg-{suffix}@example.com"),
            "Pg",
            "correct-horse-battery",
            Role::Ops,
        )
        .expect("create user");
    assert!(persistence.get_user_by_id(user_id).expect("query").is_some());

    let name = format!("Crew {suffix}");
    persistence
        .create_resource(&name, ResourceKind::Crew)
        .expect("create resource");
    assert!(matches!(
        persistence.create_resource(&name, ResourceKind::Crew),
        Err(PersistenceError::Conflict(_))
    ));
}

fn rand_suffix() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
}
