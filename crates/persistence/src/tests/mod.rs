// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod backend_validation_tests;
mod user_tests;

use ce_ops_domain::{Role, TaskType, TaskWindow, parse_stored_timestamp};

use crate::{BidDetails, NewTask, Persistence};

/// Minimum bcrypt cost, so account creation stays fast under test.
pub const TEST_PASSWORD_COST: u32 = 4;

pub fn create_test_persistence() -> Persistence {
    let mut persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory database");
    persistence.set_password_cost(TEST_PASSWORD_COST);
    persistence
}

pub fn create_test_admin(persistence: &mut Persistence) -> i64 {
    persistence
        .create_user(
            "admin@example.com",
            "Admin",
            "correct-horse-battery",
            Role::Admin,
        )
        .expect("Failed to create admin")
}

pub fn create_test_bid(persistence: &mut Persistence, job_name: &str) -> i64 {
    persistence
        .create_bid(&BidDetails {
            customer_name: String::from("Pat Smith"),
            job_name: job_name.to_string(),
            address: Some(String::from("12 Elm St")),
            ..BidDetails::default()
        })
        .expect("Failed to create bid")
}

pub fn window(start: &str, end: &str) -> TaskWindow {
    TaskWindow::new(
        parse_stored_timestamp(start).expect("valid start"),
        parse_stored_timestamp(end).expect("valid end"),
    )
    .expect("valid window")
}

pub fn new_task(bid_id: Option<i64>, start: &str, end: &str) -> NewTask {
    NewTask {
        bid_id,
        task_type: TaskType::Install,
        title: String::from("Smith Kitchen"),
        window: window(start, end),
        resource_id: None,
        depends_on_task_id: None,
        notes: None,
        created_by: None,
    }
}
