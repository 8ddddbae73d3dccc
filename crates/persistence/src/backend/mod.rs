// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Database backend-specific code.
//!
//! Connection setup, migrations and the few helpers Diesel DSL cannot
//! express portably live here. Queries and mutations in `queries/` and
//! `mutations/` are written once and generated for each backend.
//!
//! - `sqlite` — development, tests, single-machine installs
//! - `postgres` — production

pub mod postgres;
pub mod sqlite;

use diesel::{Connection, PgConnection, SqliteConnection};

use crate::error::PersistenceError;

/// Backend-specific operations needed by the generated query functions.
pub trait PersistenceBackend: Connection {
    /// Retrieves the id generated by the most recent insert on this connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError>;

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError>;
}

impl PersistenceBackend for SqliteConnection {
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError> {
        sqlite::get_last_insert_rowid(self)
    }

    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        sqlite::verify_foreign_key_enforcement(self)
    }
}

impl PersistenceBackend for PgConnection {
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError> {
        postgres::get_last_insert_rowid(self)
    }

    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        postgres::verify_foreign_key_enforcement(self)
    }
}
