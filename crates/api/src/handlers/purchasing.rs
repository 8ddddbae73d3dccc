// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Purchase order handlers.

use ce_ops_domain::{PurchaseOrderStatus, optional_text, require_text};
use ce_ops_persistence::{
    NewPurchaseOrder, NewPurchaseOrderItem, Persistence, PurchaseOrderData,
    PurchaseOrderItemUpdate, TextUpdate,
};
use tracing::info;

use super::{ensure_bid_exists, not_found, persistence_error};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::ApiError;
use crate::request_response::{
    CreatePurchaseOrderRequest, ListPurchaseOrdersRequest, ListPurchaseOrdersResponse,
    PurchaseOrderInfo, PurchaseOrderItemRequest, ReceiveItemsRequest,
    UpdatePurchaseOrderItemRequest,
};

const RESOURCE: &str = "Purchase order";

fn load_order(persistence: &mut Persistence, po_id: i64) -> Result<PurchaseOrderInfo, ApiError> {
    let order: PurchaseOrderData = persistence
        .get_purchase_order(po_id)
        .map_err(persistence_error(RESOURCE))?
        .ok_or_else(|| not_found(RESOURCE, format!("Purchase order {po_id} not found")))?;
    let items = persistence
        .list_purchase_order_items(po_id)
        .map_err(persistence_error(RESOURCE))?;
    Ok(PurchaseOrderInfo::new(order, items))
}

/// Absent leaves the SKU alone; blank clears it.
fn sku_update(sku: Option<&str>) -> TextUpdate {
    match sku.map(str::trim) {
        None => TextUpdate::Keep,
        Some("") => TextUpdate::Clear,
        Some(sku) => TextUpdate::Set(sku.to_string()),
    }
}

fn new_item(request: &PurchaseOrderItemRequest) -> Result<NewPurchaseOrderItem, ApiError> {
    Ok(NewPurchaseOrderItem {
        description: require_text("description", &request.description)?,
        sku: optional_text(request.sku.as_deref()),
        qty_required: request.qty_required,
        qty_ordered: request.qty_ordered,
    })
}

/// Lists purchase orders with their items.
///
/// # Errors
///
/// Returns an error if the actor may not read purchasing or the status
/// filter is unknown.
pub fn list_purchase_orders(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &ListPurchaseOrdersRequest,
) -> Result<ListPurchaseOrdersResponse, ApiError> {
    AuthorizationService::authorize_read_purchasing(actor)?;
    let status: Option<PurchaseOrderStatus> =
        request.status.as_deref().map(str::parse).transpose()?;

    let orders: Vec<PurchaseOrderData> = persistence
        .list_purchase_orders(
            status.as_ref().map(PurchaseOrderStatus::as_str),
            request.bid_id,
        )
        .map_err(persistence_error(RESOURCE))?;

    let mut purchase_orders = Vec::with_capacity(orders.len());
    for order in orders {
        let items = persistence
            .list_purchase_order_items(order.po_id)
            .map_err(persistence_error(RESOURCE))?;
        purchase_orders.push(PurchaseOrderInfo::new(order, items));
    }
    Ok(ListPurchaseOrdersResponse { purchase_orders })
}

/// # Errors
///
/// Returns an error if the actor may not read purchasing or the order
/// does not exist.
pub fn get_purchase_order(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    po_id: i64,
) -> Result<PurchaseOrderInfo, ApiError> {
    AuthorizationService::authorize_read_purchasing(actor)?;
    load_order(persistence, po_id)
}

/// Creates an order with its initial items.
///
/// # Errors
///
/// Returns an error if the actor may not write purchasing, the input is
/// invalid, or the bid does not exist.
pub fn create_purchase_order(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &CreatePurchaseOrderRequest,
) -> Result<PurchaseOrderInfo, ApiError> {
    AuthorizationService::authorize_write_purchasing(actor, "create_purchase_order")?;
    let vendor: String = require_text("vendor", &request.vendor)?;
    ensure_bid_exists(persistence, request.bid_id)?;
    let items: Vec<NewPurchaseOrderItem> = request
        .items
        .iter()
        .map(new_item)
        .collect::<Result<_, _>>()?;

    let order = NewPurchaseOrder {
        vendor,
        bid_id: request.bid_id,
        notes: optional_text(request.notes.as_deref()),
        created_by: Some(actor.user_id),
        items,
    };
    let po_id: i64 = persistence
        .create_purchase_order(&order)
        .map_err(persistence_error(RESOURCE))?;
    info!(actor_id = actor.user_id, po_id, "Purchase order created");
    load_order(persistence, po_id)
}

/// Adds a line item.
///
/// # Errors
///
/// Returns an error if the actor may not write purchasing, the input is
/// invalid, or the order does not exist or is cancelled.
pub fn add_purchase_order_item(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    po_id: i64,
    request: &PurchaseOrderItemRequest,
) -> Result<PurchaseOrderInfo, ApiError> {
    AuthorizationService::authorize_write_purchasing(actor, "add_purchase_order_item")?;
    let item: NewPurchaseOrderItem = new_item(request)?;
    persistence
        .add_purchase_order_item(po_id, &item)
        .map_err(persistence_error(RESOURCE))?;
    load_order(persistence, po_id)
}

/// Applies a partial update to a line item.
///
/// # Errors
///
/// Returns an error if the actor may not write purchasing, the input is
/// invalid, or the order or item does not exist.
pub fn update_purchase_order_item(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    po_id: i64,
    item_id: i64,
    request: &UpdatePurchaseOrderItemRequest,
) -> Result<PurchaseOrderInfo, ApiError> {
    AuthorizationService::authorize_write_purchasing(actor, "update_purchase_order_item")?;
    let description: Option<String> = request
        .description
        .as_deref()
        .map(|description| require_text("description", description))
        .transpose()?;

    let update = PurchaseOrderItemUpdate {
        description,
        sku: sku_update(request.sku.as_deref()),
        qty_required: request.qty_required,
        qty_ordered: request.qty_ordered,
    };
    persistence
        .update_purchase_order_item(po_id, item_id, &update)
        .map_err(persistence_error(RESOURCE))?;
    load_order(persistence, po_id)
}

/// Records receipts for one or more items; all apply or none do.
///
/// # Errors
///
/// Returns an error if the actor may not write purchasing, no receipts
/// are given, a quantity is negative, an item is not on the order, or
/// the order is cancelled.
pub fn receive_items(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    po_id: i64,
    request: &ReceiveItemsRequest,
) -> Result<PurchaseOrderInfo, ApiError> {
    AuthorizationService::authorize_write_purchasing(actor, "receive_items")?;
    if request.receipts.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("receipts"),
            message: String::from("At least one receipt line is required"),
        });
    }

    let receipts: Vec<(i64, i64)> = request
        .receipts
        .iter()
        .map(|line| (line.item_id, line.quantity))
        .collect();
    let status: PurchaseOrderStatus = persistence
        .receive_purchase_order_items(po_id, &receipts)
        .map_err(persistence_error(RESOURCE))?;
    info!(
        actor_id = actor.user_id,
        po_id,
        status = status.as_str(),
        "Purchase order receipts recorded"
    );
    load_order(persistence, po_id)
}

/// Cancels an order that has received nothing.
///
/// # Errors
///
/// Returns an error if the actor may not write purchasing, the order does
/// not exist, or any item has been received.
pub fn cancel_purchase_order(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    po_id: i64,
) -> Result<PurchaseOrderInfo, ApiError> {
    AuthorizationService::authorize_write_purchasing(actor, "cancel_purchase_order")?;
    persistence
        .cancel_purchase_order(po_id)
        .map_err(persistence_error(RESOURCE))?;
    info!(actor_id = actor.user_id, po_id, "Purchase order cancelled");
    load_order(persistence, po_id)
}
