// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use ce_ops_domain::{BusinessCalendar, Role};
use ce_ops_persistence::{BidData, Persistence};

use crate::handlers::{bids, resources};
use crate::{
    AuthConfig, AuthenticatedActor, BidRequest, CreateResourceRequest, CreateTaskRequest,
    ResourceInfo,
};

pub const TEST_PASSWORD: &str = "Walnut-Veneer-42";

/// In-memory persistence with a cheap bcrypt cost.
pub fn create_test_persistence() -> Persistence {
    let mut persistence = Persistence::new_in_memory().unwrap();
    persistence.set_password_cost(4);
    persistence
}

pub fn create_test_calendar() -> BusinessCalendar {
    BusinessCalendar::default()
}

pub fn create_test_auth_config() -> AuthConfig {
    AuthConfig::default()
}

/// Creates the first admin account and returns it as an actor.
pub fn create_test_admin(persistence: &mut Persistence) -> AuthenticatedActor {
    let user_id = persistence
        .bootstrap_admin("admin@example.com", "Shop Admin", TEST_PASSWORD)
        .unwrap();
    AuthenticatedActor::new(user_id, String::from("admin@example.com"), Role::Admin)
}

/// Creates an account with the given role and returns it as an actor.
pub fn create_test_actor(persistence: &mut Persistence, role: Role) -> AuthenticatedActor {
    let email = format!("{}@example.com", role.as_str());
    let user_id = persistence
        .create_user(
            &email,
            &format!("Test {}", role.as_str()),
            TEST_PASSWORD,
            role,
        )
        .unwrap();
    AuthenticatedActor::new(user_id, email, role)
}

pub fn create_bid_request(job_name: &str) -> BidRequest {
    BidRequest {
        customer_name: String::from("Harper Residence"),
        job_name: job_name.to_string(),
        address: Some(String::from("12 Elm St")),
        customer_email: Some(String::from("Owner@Example.com")),
        customer_phone: None,
        sales_rep_id: None,
        notes: None,
    }
}

pub fn create_test_bid(persistence: &mut Persistence, actor: &AuthenticatedActor) -> BidData {
    bids::create_bid(persistence, actor, &create_bid_request("Kitchen Remodel")).unwrap()
}

pub fn create_test_resource(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    name: &str,
) -> ResourceInfo {
    let request = CreateResourceRequest {
        name: name.to_string(),
        kind: String::from("crew"),
    };
    resources::create_resource(persistence, actor, &request).unwrap()
}

/// An install task on Tuesday 2026-03-10, 08:00 to 12:00 Chicago time.
pub fn create_task_request(title: &str) -> CreateTaskRequest {
    CreateTaskRequest {
        bid_id: None,
        task_type: String::from("install"),
        title: title.to_string(),
        start: String::from("2026-03-10T08:00"),
        end: String::from("2026-03-10T12:00"),
        resource_id: None,
        depends_on_task_id: None,
        notes: None,
    }
}
