// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for bid records, pricing, documents and phase generation.

use ce_ops_domain::{LineItem, Role};

use super::helpers::{
    create_bid_request, create_test_actor, create_test_admin, create_test_bid,
    create_test_calendar, create_test_persistence,
};
use crate::error::ApiError;
use crate::handlers::{bids, tasks};
use crate::{
    AddDocumentRequest, GeneratePhasesRequest, ListBidsRequest, TaskEventRequest,
    UpdateBidStatusRequest, UpdatePricingRequest,
};

fn status_request(status: &str) -> UpdateBidStatusRequest {
    UpdateBidStatusRequest {
        status: status.to_string(),
    }
}

#[test]
fn test_create_bid_starts_as_draft() {
    let mut persistence = create_test_persistence();
    let sales = create_test_actor(&mut persistence, Role::Sales);

    let bid = create_test_bid(&mut persistence, &sales);

    assert_eq!(bid.status, "draft");
    assert_eq!(bid.customer_email.as_deref(), Some("owner@example.com"));
    assert_eq!(bid.total_cents, 0);
    assert!(bid.documents.is_empty());
}

#[test]
fn test_create_bid_requires_job_name() {
    let mut persistence = create_test_persistence();
    let sales = create_test_actor(&mut persistence, Role::Sales);

    let result = bids::create_bid(&mut persistence, &sales, &create_bid_request("   "));

    match result.unwrap_err() {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "job_name"),
        other => panic!("Expected InvalidInput, got: {other:?}"),
    }
}

#[test]
fn test_create_bid_rejects_unknown_sales_rep() {
    let mut persistence = create_test_persistence();
    let sales = create_test_actor(&mut persistence, Role::Sales);
    let mut request = create_bid_request("Vanity");
    request.sales_rep_id = Some(9_999);

    let result = bids::create_bid(&mut persistence, &sales, &request);

    match result.unwrap_err() {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "sales_rep_id"),
        other => panic!("Expected InvalidInput, got: {other:?}"),
    }
}

#[test]
fn test_ops_reads_but_cannot_write_bids() {
    let mut persistence = create_test_persistence();
    let sales = create_test_actor(&mut persistence, Role::Sales);
    let ops = create_test_actor(&mut persistence, Role::Ops);
    let bid = create_test_bid(&mut persistence, &sales);

    let listed = bids::list_bids(&mut persistence, &ops, &ListBidsRequest::default()).unwrap();
    assert_eq!(listed.bids.len(), 1);

    let result =
        bids::update_bid_status(&mut persistence, &ops, bid.bid_id, &status_request("sent"));
    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_installer_cannot_read_bids() {
    let mut persistence = create_test_persistence();
    let sales = create_test_actor(&mut persistence, Role::Sales);
    let installer = create_test_actor(&mut persistence, Role::Installer);
    let bid = create_test_bid(&mut persistence, &sales);

    let result = bids::get_bid(&mut persistence, &installer, bid.bid_id);

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_bid_status_follows_lifecycle() {
    let mut persistence = create_test_persistence();
    let sales = create_test_actor(&mut persistence, Role::Sales);
    let bid = create_test_bid(&mut persistence, &sales);

    let response = bids::update_bid_status(
        &mut persistence,
        &sales,
        bid.bid_id,
        &status_request("sent"),
    )
    .unwrap();
    assert_eq!(response.previous_status, "draft");
    assert_eq!(response.status, "sent");

    let result = bids::update_bid_status(
        &mut persistence,
        &sales,
        bid.bid_id,
        &status_request("completed"),
    );
    match result.unwrap_err() {
        ApiError::DomainRuleViolation { rule, .. } => assert_eq!(rule, "invalid_bid_transition"),
        other => panic!("Expected DomainRuleViolation, got: {other:?}"),
    }
}

#[test]
fn test_list_bids_filters_by_status() {
    let mut persistence = create_test_persistence();
    let sales = create_test_actor(&mut persistence, Role::Sales);
    let first = create_test_bid(&mut persistence, &sales);
    create_test_bid(&mut persistence, &sales);
    bids::update_bid_status(
        &mut persistence,
        &sales,
        first.bid_id,
        &status_request("sent"),
    )
    .unwrap();

    let sent = bids::list_bids(
        &mut persistence,
        &sales,
        &ListBidsRequest {
            status: Some(String::from("sent")),
        },
    )
    .unwrap();
    assert_eq!(sent.bids.len(), 1);
    assert_eq!(sent.bids[0].bid_id, first.bid_id);

    let unknown = bids::list_bids(
        &mut persistence,
        &sales,
        &ListBidsRequest {
            status: Some(String::from("archived")),
        },
    );
    assert!(matches!(unknown, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_pricing_snapshot_totals() {
    let mut persistence = create_test_persistence();
    let sales = create_test_actor(&mut persistence, Role::Sales);
    let bid = create_test_bid(&mut persistence, &sales);
    let request = UpdatePricingRequest {
        line_items: vec![
            LineItem {
                description: String::from("Base cabinet"),
                quantity: 3,
                unit_price_cents: 12_500,
            },
            LineItem {
                description: String::from("Hardware kit"),
                quantity: 1,
                unit_price_cents: 4_999,
            },
        ],
        tax_rate_bps: 825,
    };

    let updated = bids::update_bid_pricing(&mut persistence, &sales, bid.bid_id, request).unwrap();

    assert_eq!(updated.subtotal_cents, 42_499);
    assert_eq!(updated.tax_cents, 3_506);
    assert_eq!(updated.total_cents, 46_005);
    assert_eq!(updated.pricing.unwrap().line_items.len(), 2);
}

#[test]
fn test_pricing_rejects_negative_quantity() {
    let mut persistence = create_test_persistence();
    let sales = create_test_actor(&mut persistence, Role::Sales);
    let bid = create_test_bid(&mut persistence, &sales);
    let request = UpdatePricingRequest {
        line_items: vec![LineItem {
            description: String::from("Credit"),
            quantity: -1,
            unit_price_cents: 100,
        }],
        tax_rate_bps: 0,
    };

    let result = bids::update_bid_pricing(&mut persistence, &sales, bid.bid_id, request);

    match result.unwrap_err() {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "pricing"),
        other => panic!("Expected InvalidInput, got: {other:?}"),
    }
}

#[test]
fn test_onboarding_must_be_object() {
    let mut persistence = create_test_persistence();
    let sales = create_test_actor(&mut persistence, Role::Sales);
    let bid = create_test_bid(&mut persistence, &sales);

    let rejected = bids::update_bid_onboarding(
        &mut persistence,
        &sales,
        bid.bid_id,
        &serde_json::json!(["not", "an", "object"]),
    );
    assert!(matches!(rejected, Err(ApiError::InvalidInput { .. })));

    let onboarding = serde_json::json!({"finish": "walnut", "soft_close": true});
    let updated =
        bids::update_bid_onboarding(&mut persistence, &sales, bid.bid_id, &onboarding).unwrap();
    assert_eq!(updated.onboarding, Some(onboarding));
}

#[test]
fn test_documents_append_in_order() {
    let mut persistence = create_test_persistence();
    let sales = create_test_actor(&mut persistence, Role::Sales);
    let bid = create_test_bid(&mut persistence, &sales);

    bids::add_bid_document(
        &mut persistence,
        &sales,
        bid.bid_id,
        &AddDocumentRequest {
            label: String::from("Drawings"),
            url: String::from("https://files.example.com/drawings.pdf"),
        },
    )
    .unwrap();
    let response = bids::add_bid_document(
        &mut persistence,
        &sales,
        bid.bid_id,
        &AddDocumentRequest {
            label: String::from("Contract"),
            url: String::from("https://files.example.com/contract.pdf"),
        },
    )
    .unwrap();

    let labels: Vec<&str> = response.documents.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["Drawings", "Contract"]);

    let rejected = bids::add_bid_document(
        &mut persistence,
        &sales,
        bid.bid_id,
        &AddDocumentRequest {
            label: String::from("Local"),
            url: String::from("file:///tmp/plan.pdf"),
        },
    );
    assert!(matches!(rejected, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_generate_phases_chains_tasks_back_from_install() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let calendar = create_test_calendar();
    let bid = create_test_bid(&mut persistence, &admin);

    let response = bids::generate_phases(
        &mut persistence,
        &calendar,
        &admin,
        bid.bid_id,
        &GeneratePhasesRequest {
            install_date: String::from("2026-03-20"),
        },
    )
    .unwrap();

    let types: Vec<&str> = response.tasks.iter().map(|t| t.task_type.as_str()).collect();
    assert_eq!(
        types,
        vec!["manufacturing", "assembly", "delivery", "install"]
    );
    assert!(response.phase_group.starts_with(&format!("pg-{}-", bid.bid_id)));

    // Manufacturing lands before the DST change, install after it.
    assert_eq!(response.tasks[0].start, "2026-03-06T13:00:00Z");
    assert_eq!(response.tasks[1].start, "2026-03-13T12:00:00Z");
    assert_eq!(response.tasks[2].start, "2026-03-19T12:00:00Z");
    assert_eq!(response.tasks[3].start, "2026-03-20T12:00:00Z");
    assert_eq!(response.tasks[3].end, "2026-03-20T21:00:00Z");
    assert_eq!(response.tasks[3].title, "Kitchen Remodel - Install");

    assert_eq!(response.tasks[0].depends_on_task_id, None);
    for pair in response.tasks.windows(2) {
        assert_eq!(pair[1].depends_on_task_id, Some(pair[0].task_id));
        assert_eq!(pair[1].phase_group, pair[0].phase_group);
    }
}

#[test]
fn test_generate_phases_rolls_weekend_install_to_monday() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let calendar = create_test_calendar();
    let bid = create_test_bid(&mut persistence, &admin);

    let response = bids::generate_phases(
        &mut persistence,
        &calendar,
        &admin,
        bid.bid_id,
        &GeneratePhasesRequest {
            install_date: String::from("2026-03-21"),
        },
    )
    .unwrap();

    assert_eq!(response.tasks[3].start, "2026-03-23T12:00:00Z");
}

#[test]
fn test_generate_phases_conflicts_while_group_unfinished() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let calendar = create_test_calendar();
    let bid = create_test_bid(&mut persistence, &admin);
    let request = GeneratePhasesRequest {
        install_date: String::from("2026-03-20"),
    };

    let first = bids::generate_phases(&mut persistence, &calendar, &admin, bid.bid_id, &request)
        .unwrap();
    let again = bids::generate_phases(&mut persistence, &calendar, &admin, bid.bid_id, &request);
    assert!(matches!(again, Err(ApiError::Conflict { .. })));

    for task in &first.tasks {
        tasks::record_task_event(
            &mut persistence,
            &admin,
            task.task_id,
            &TaskEventRequest {
                kind: String::from("complete"),
                note: None,
                photos: Vec::new(),
            },
        )
        .unwrap();
    }

    let regenerated =
        bids::generate_phases(&mut persistence, &calendar, &admin, bid.bid_id, &request).unwrap();
    assert_ne!(regenerated.phase_group, first.phase_group);
}

#[test]
fn test_generate_phases_requires_scheduler() {
    let mut persistence = create_test_persistence();
    let sales = create_test_actor(&mut persistence, Role::Sales);
    let calendar = create_test_calendar();
    let bid = create_test_bid(&mut persistence, &sales);

    let result = bids::generate_phases(
        &mut persistence,
        &calendar,
        &sales,
        bid.bid_id,
        &GeneratePhasesRequest {
            install_date: String::from("2026-03-20"),
        },
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_generate_phases_for_missing_bid() {
    let mut persistence = create_test_persistence();
    let admin = create_test_admin(&mut persistence);
    let calendar = create_test_calendar();

    let result = bids::generate_phases(
        &mut persistence,
        &calendar,
        &admin,
        404,
        &GeneratePhasesRequest {
            install_date: String::from("2026-03-20"),
        },
    );

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}
