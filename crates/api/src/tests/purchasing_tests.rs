// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for purchase orders, receipts and status roll-up.

use ce_ops_domain::Role;

use super::helpers::{create_test_actor, create_test_bid, create_test_persistence};
use crate::error::ApiError;
use crate::handlers::purchasing;
use crate::{
    CreatePurchaseOrderRequest, ListPurchaseOrdersRequest, PurchaseOrderInfo,
    PurchaseOrderItemRequest, ReceiptLine, ReceiveItemsRequest, UpdatePurchaseOrderItemRequest,
};

fn item(description: &str, qty_required: i64, qty_ordered: i64) -> PurchaseOrderItemRequest {
    PurchaseOrderItemRequest {
        description: description.to_string(),
        sku: None,
        qty_required,
        qty_ordered,
    }
}

fn order_request(items: Vec<PurchaseOrderItemRequest>) -> CreatePurchaseOrderRequest {
    CreatePurchaseOrderRequest {
        vendor: String::from("Hinge Supply Co"),
        bid_id: None,
        notes: None,
        items,
    }
}

fn receive(
    persistence: &mut ce_ops_persistence::Persistence,
    actor: &crate::AuthenticatedActor,
    order: &PurchaseOrderInfo,
    lines: &[(usize, i64)],
) -> Result<PurchaseOrderInfo, ApiError> {
    let receipts = lines
        .iter()
        .map(|(index, quantity)| ReceiptLine {
            item_id: order.items[*index].item_id,
            quantity: *quantity,
        })
        .collect();
    purchasing::receive_items(
        persistence,
        actor,
        order.po_id,
        &ReceiveItemsRequest { receipts },
    )
}

#[test]
fn test_order_rolls_up_through_receipts() {
    let mut persistence = create_test_persistence();
    let buyer = create_test_actor(&mut persistence, Role::Purchasing);

    let order = purchasing::create_purchase_order(
        &mut persistence,
        &buyer,
        &order_request(vec![item("Soft-close hinge", 10, 10), item("Drawer slide", 4, 4)]),
    )
    .unwrap();
    assert_eq!(order.status, "ordered");
    assert_eq!(order.items[0].qty_outstanding, 10);

    let partial = receive(&mut persistence, &buyer, &order, &[(0, 6)]).unwrap();
    assert_eq!(partial.status, "partial");
    assert_eq!(partial.items[0].qty_received, 6);
    assert_eq!(partial.items[0].qty_outstanding, 4);

    let received = receive(&mut persistence, &buyer, &order, &[(0, 4), (1, 4)]).unwrap();
    assert_eq!(received.status, "received");
    assert!(received.items.iter().all(|i| i.qty_outstanding == 0));
}

#[test]
fn test_order_without_ordered_quantities_is_open() {
    let mut persistence = create_test_persistence();
    let buyer = create_test_actor(&mut persistence, Role::Purchasing);

    let order = purchasing::create_purchase_order(
        &mut persistence,
        &buyer,
        &order_request(vec![item("Edge banding", 50, 0)]),
    )
    .unwrap();

    assert_eq!(order.status, "open");
}

#[test]
fn test_over_receipt_is_accepted() {
    let mut persistence = create_test_persistence();
    let buyer = create_test_actor(&mut persistence, Role::Purchasing);
    let order = purchasing::create_purchase_order(
        &mut persistence,
        &buyer,
        &order_request(vec![item("Shelf pin", 20, 20)]),
    )
    .unwrap();

    let updated = receive(&mut persistence, &buyer, &order, &[(0, 25)]).unwrap();

    assert_eq!(updated.status, "received");
    assert_eq!(updated.items[0].qty_received, 25);
    assert_eq!(updated.items[0].qty_outstanding, 0);
}

#[test]
fn test_receipts_apply_all_or_nothing() {
    let mut persistence = create_test_persistence();
    let buyer = create_test_actor(&mut persistence, Role::Purchasing);
    let order = purchasing::create_purchase_order(
        &mut persistence,
        &buyer,
        &order_request(vec![item("Knob", 12, 12)]),
    )
    .unwrap();

    let result = purchasing::receive_items(
        &mut persistence,
        &buyer,
        order.po_id,
        &ReceiveItemsRequest {
            receipts: vec![
                ReceiptLine {
                    item_id: order.items[0].item_id,
                    quantity: 5,
                },
                ReceiptLine {
                    item_id: 9_999,
                    quantity: 1,
                },
            ],
        },
    );
    assert!(result.is_err());

    let unchanged = purchasing::get_purchase_order(&mut persistence, &buyer, order.po_id).unwrap();
    assert_eq!(unchanged.items[0].qty_received, 0);
    assert_eq!(unchanged.status, "ordered");
}

#[test]
fn test_empty_or_negative_receipts_rejected() {
    let mut persistence = create_test_persistence();
    let buyer = create_test_actor(&mut persistence, Role::Purchasing);
    let order = purchasing::create_purchase_order(
        &mut persistence,
        &buyer,
        &order_request(vec![item("Pull", 8, 8)]),
    )
    .unwrap();

    let empty = receive(&mut persistence, &buyer, &order, &[]);
    match empty.unwrap_err() {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "receipts"),
        other => panic!("Expected InvalidInput, got: {other:?}"),
    }

    let negative = receive(&mut persistence, &buyer, &order, &[(0, -2)]);
    assert!(matches!(negative, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_cancel_rules() {
    let mut persistence = create_test_persistence();
    let buyer = create_test_actor(&mut persistence, Role::Purchasing);
    let untouched = purchasing::create_purchase_order(
        &mut persistence,
        &buyer,
        &order_request(vec![item("Toe kick", 6, 6)]),
    )
    .unwrap();
    let started = purchasing::create_purchase_order(
        &mut persistence,
        &buyer,
        &order_request(vec![item("Crown molding", 6, 6)]),
    )
    .unwrap();
    receive(&mut persistence, &buyer, &started, &[(0, 1)]).unwrap();

    let cancelled =
        purchasing::cancel_purchase_order(&mut persistence, &buyer, untouched.po_id).unwrap();
    assert_eq!(cancelled.status, "cancelled");
    let again =
        purchasing::cancel_purchase_order(&mut persistence, &buyer, untouched.po_id).unwrap();
    assert_eq!(again.status, "cancelled");

    let blocked = purchasing::cancel_purchase_order(&mut persistence, &buyer, started.po_id);
    match blocked.unwrap_err() {
        ApiError::DomainRuleViolation { rule, .. } => {
            assert_eq!(rule, "purchase_order_has_receipts");
        }
        other => panic!("Expected DomainRuleViolation, got: {other:?}"),
    }

    let after_cancel = receive(&mut persistence, &buyer, &untouched, &[(0, 1)]);
    match after_cancel.unwrap_err() {
        ApiError::DomainRuleViolation { rule, .. } => {
            assert_eq!(rule, "purchase_order_cancelled");
        }
        other => panic!("Expected DomainRuleViolation, got: {other:?}"),
    }
}

#[test]
fn test_items_can_be_added_and_updated() {
    let mut persistence = create_test_persistence();
    let buyer = create_test_actor(&mut persistence, Role::Purchasing);
    let order = purchasing::create_purchase_order(
        &mut persistence,
        &buyer,
        &order_request(Vec::new()),
    )
    .unwrap();
    assert_eq!(order.status, "open");

    let with_item = purchasing::add_purchase_order_item(
        &mut persistence,
        &buyer,
        order.po_id,
        &item("Lazy susan", 2, 0),
    )
    .unwrap();
    assert_eq!(with_item.items.len(), 1);
    assert_eq!(with_item.status, "open");

    let updated = purchasing::update_purchase_order_item(
        &mut persistence,
        &buyer,
        order.po_id,
        with_item.items[0].item_id,
        &UpdatePurchaseOrderItemRequest {
            description: None,
            sku: Some(String::from("LS-24")),
            qty_required: None,
            qty_ordered: Some(2),
        },
    )
    .unwrap();
    assert_eq!(updated.status, "ordered");
    assert_eq!(updated.items[0].sku.as_deref(), Some("LS-24"));
    assert_eq!(updated.items[0].description, "Lazy susan");

    let untouched = purchasing::update_purchase_order_item(
        &mut persistence,
        &buyer,
        order.po_id,
        with_item.items[0].item_id,
        &UpdatePurchaseOrderItemRequest::default(),
    )
    .unwrap();
    assert_eq!(untouched.items[0].sku.as_deref(), Some("LS-24"));

    let cleared = purchasing::update_purchase_order_item(
        &mut persistence,
        &buyer,
        order.po_id,
        with_item.items[0].item_id,
        &UpdatePurchaseOrderItemRequest {
            sku: Some(String::from("  ")),
            ..UpdatePurchaseOrderItemRequest::default()
        },
    )
    .unwrap();
    assert_eq!(cleared.items[0].sku, None);
    assert_eq!(cleared.items[0].qty_ordered, 2);
}

#[test]
fn test_list_filters_by_bid_and_status() {
    let mut persistence = create_test_persistence();
    let buyer = create_test_actor(&mut persistence, Role::Purchasing);
    let sales = create_test_actor(&mut persistence, Role::Sales);
    let bid = create_test_bid(&mut persistence, &sales);

    let mut linked = order_request(vec![item("Panel", 3, 3)]);
    linked.bid_id = Some(bid.bid_id);
    purchasing::create_purchase_order(&mut persistence, &buyer, &linked).unwrap();
    purchasing::create_purchase_order(
        &mut persistence,
        &buyer,
        &order_request(vec![item("Glue", 1, 0)]),
    )
    .unwrap();

    let for_bid = purchasing::list_purchase_orders(
        &mut persistence,
        &buyer,
        &ListPurchaseOrdersRequest {
            status: None,
            bid_id: Some(bid.bid_id),
        },
    )
    .unwrap();
    assert_eq!(for_bid.purchase_orders.len(), 1);
    assert_eq!(for_bid.purchase_orders[0].items.len(), 1);

    let open = purchasing::list_purchase_orders(
        &mut persistence,
        &buyer,
        &ListPurchaseOrdersRequest {
            status: Some(String::from("open")),
            bid_id: None,
        },
    )
    .unwrap();
    assert_eq!(open.purchase_orders.len(), 1);
    assert_eq!(open.purchase_orders[0].vendor, "Hinge Supply Co");
}

#[test]
fn test_purchase_order_with_unknown_bid_is_rejected() {
    let mut persistence = create_test_persistence();
    let buyer = create_test_actor(&mut persistence, Role::Purchasing);
    let mut request = order_request(vec![item("Veneer", 1, 1)]);
    request.bid_id = Some(31_337);

    let result = purchasing::create_purchase_order(&mut persistence, &buyer, &request);

    match result.unwrap_err() {
        ApiError::InvalidInput { field, .. } => assert_eq!(field, "bid_id"),
        other => panic!("Expected InvalidInput, got: {other:?}"),
    }
}

#[test]
fn test_sales_cannot_touch_purchasing() {
    let mut persistence = create_test_persistence();
    let sales = create_test_actor(&mut persistence, Role::Sales);

    let listed = purchasing::list_purchase_orders(
        &mut persistence,
        &sales,
        &ListPurchaseOrdersRequest {
            status: None,
            bid_id: None,
        },
    );
    assert!(matches!(listed, Err(ApiError::Unauthorized { .. })));

    let created = purchasing::create_purchase_order(
        &mut persistence,
        &sales,
        &order_request(vec![item("Sneaky", 1, 1)]),
    );
    assert!(matches!(created, Err(ApiError::Unauthorized { .. })));
}
