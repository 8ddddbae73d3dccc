// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! Every query is generated twice by `backend_fn!`: `_sqlite` and
//! `_postgres`. The `Persistence` adapter in `lib.rs` picks one based on
//! the open connection.
//!
//! - `users` — users, sessions, invitations
//! - `bids` — bids
//! - `resources` — crews and individuals
//! - `tasks` — install tasks and task events
//! - `purchasing` — purchase orders and line items

pub mod bids;
pub mod purchasing;
pub mod resources;
pub mod tasks;
pub mod users;
