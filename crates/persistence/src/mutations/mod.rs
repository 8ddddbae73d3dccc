// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! Operations that touch more than one row run inside a single Diesel
//! transaction and check the domain rules inside it, so a rejected write
//! leaves nothing behind.
//!
//! - `users` — accounts, sessions, invitations
//! - `bids` — bids, pricing, onboarding, documents
//! - `resources` — crews and individuals
//! - `tasks` — install tasks, events, phase groups
//! - `purchasing` — purchase orders and receipts

pub mod bids;
pub mod purchasing;
pub mod resources;
pub mod tasks;
pub mod users;
