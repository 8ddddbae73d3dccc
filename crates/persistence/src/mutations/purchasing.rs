// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Purchase order mutations.
//!
//! Every mutation that touches line items recomputes the header status in
//! the same transaction, so the stored status never disagrees with the
//! items.

use ce_ops_domain::{
    DomainError, ItemQuantities, PurchaseOrderStatus, apply_receipt, roll_up_status,
    validate_cancel,
};
use diesel::prelude::*;
use diesel::{PgConnection, SqliteConnection};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{NewPurchaseOrder, NewPurchaseOrderItem, PurchaseOrderItemUpdate};
use crate::diesel_schema::{purchase_order_items, purchase_orders};
use crate::error::PersistenceError;
use crate::now_timestamp;

/// Recomputes and stores the status of `$po_id` from its items.
///
/// Expands inside a `backend_fn!` body so it works for either connection.
macro_rules! refresh_status {
    ($conn:ident, $po_id:expr, $current:expr) => {{
        let rows: Vec<(i64, i64, i64)> = purchase_order_items::table
            .filter(purchase_order_items::po_id.eq($po_id))
            .select((
                purchase_order_items::qty_required,
                purchase_order_items::qty_ordered,
                purchase_order_items::qty_received,
            ))
            .load($conn)?;
        let items: Vec<ItemQuantities> = rows
            .into_iter()
            .map(|(required, ordered, received)| ItemQuantities {
                required,
                ordered,
                received,
            })
            .collect();
        let next: PurchaseOrderStatus = roll_up_status($current, &items);

        diesel::update(purchase_orders::table.find($po_id))
            .set((
                purchase_orders::status.eq(next.as_str()),
                purchase_orders::updated_at.eq(now_timestamp()),
            ))
            .execute($conn)?;
        debug!(po_id = $po_id, status = next.as_str(), "Purchase order status rolled up");
        next
    }};
}

/// Loads the current status of `$po_id`, failing if it does not exist.
macro_rules! load_status {
    ($conn:ident, $po_id:expr) => {{
        let status: Option<String> = purchase_orders::table
            .find($po_id)
            .select(purchase_orders::status)
            .first($conn)
            .optional()?;
        let status: PurchaseOrderStatus = status
            .ok_or_else(|| {
                PersistenceError::NotFound(format!("Purchase order {} not found", $po_id))
            })?
            .parse()?;
        status
    }};
}

fn ensure_open(status: PurchaseOrderStatus) -> Result<(), PersistenceError> {
    if status == PurchaseOrderStatus::Cancelled {
        return Err(PersistenceError::RuleViolation(
            DomainError::PurchaseOrderCancelled,
        ));
    }
    Ok(())
}

backend_fn! {
/// Creates a purchase order with its initial items.
///
/// # Errors
///
/// Returns `PersistenceError::RuleViolation` for a negative quantity, or
/// `PersistenceError::InvalidReference` if the bid does not exist.
pub fn create_purchase_order(
    conn: &mut _,
    order: &NewPurchaseOrder,
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let now = now_timestamp();

        diesel::insert_into(purchase_orders::table)
            .values((
                purchase_orders::vendor.eq(order.vendor.as_str()),
                purchase_orders::bid_id.eq(order.bid_id),
                purchase_orders::status.eq(PurchaseOrderStatus::Open.as_str()),
                purchase_orders::notes.eq(order.notes.as_deref()),
                purchase_orders::created_by.eq(order.created_by),
                purchase_orders::created_at.eq(now.as_str()),
                purchase_orders::updated_at.eq(now.as_str()),
            ))
            .execute(conn)?;
        let po_id: i64 = conn.get_last_insert_rowid()?;

        for item in &order.items {
            ItemQuantities::new(item.qty_required, item.qty_ordered, 0)?;
            diesel::insert_into(purchase_order_items::table)
                .values((
                    purchase_order_items::po_id.eq(po_id),
                    purchase_order_items::description.eq(item.description.as_str()),
                    purchase_order_items::sku.eq(item.sku.as_deref()),
                    purchase_order_items::qty_required.eq(item.qty_required),
                    purchase_order_items::qty_ordered.eq(item.qty_ordered),
                    purchase_order_items::qty_received.eq(0_i64),
                    purchase_order_items::updated_at.eq(now.as_str()),
                ))
                .execute(conn)?;
        }

        let status = refresh_status!(conn, po_id, PurchaseOrderStatus::Open);
        info!(
            po_id,
            vendor = order.vendor.as_str(),
            items = order.items.len(),
            status = status.as_str(),
            "Purchase order created"
        );
        Ok(po_id)
    })
}
}

backend_fn! {
/// Adds a line item to an order that is not cancelled.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` for an unknown order, or
/// `PersistenceError::RuleViolation` if it is cancelled or a quantity is
/// negative.
pub fn add_purchase_order_item(
    conn: &mut _,
    po_id: i64,
    item: &NewPurchaseOrderItem,
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let current = load_status!(conn, po_id);
        ensure_open(current)?;
        ItemQuantities::new(item.qty_required, item.qty_ordered, 0)?;

        diesel::insert_into(purchase_order_items::table)
            .values((
                purchase_order_items::po_id.eq(po_id),
                purchase_order_items::description.eq(item.description.as_str()),
                purchase_order_items::sku.eq(item.sku.as_deref()),
                purchase_order_items::qty_required.eq(item.qty_required),
                purchase_order_items::qty_ordered.eq(item.qty_ordered),
                purchase_order_items::qty_received.eq(0_i64),
                purchase_order_items::updated_at.eq(now_timestamp()),
            ))
            .execute(conn)?;
        let item_id: i64 = conn.get_last_insert_rowid()?;

        refresh_status!(conn, po_id, current);
        info!(po_id, item_id, "Purchase order item added");
        Ok(item_id)
    })
}
}

backend_fn! {
/// Applies a partial update to a line item.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the order or item does not
/// exist, or `PersistenceError::RuleViolation` if the order is cancelled
/// or a quantity is negative.
pub fn update_purchase_order_item(
    conn: &mut _,
    po_id: i64,
    item_id: i64,
    update: &PurchaseOrderItemUpdate,
) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let current = load_status!(conn, po_id);
        ensure_open(current)?;

        let existing: Option<(String, Option<String>, i64, i64, i64)> = purchase_order_items::table
            .filter(purchase_order_items::item_id.eq(item_id))
            .filter(purchase_order_items::po_id.eq(po_id))
            .select((
                purchase_order_items::description,
                purchase_order_items::sku,
                purchase_order_items::qty_required,
                purchase_order_items::qty_ordered,
                purchase_order_items::qty_received,
            ))
            .first(conn)
            .optional()?;
        let Some((description, sku, qty_required, qty_ordered, qty_received)) = existing else {
            return Err(PersistenceError::NotFound(format!(
                "Item {item_id} not found on purchase order {po_id}"
            )));
        };

        let description = update.description.clone().unwrap_or(description);
        let sku = update.sku.apply(sku);
        let quantities = ItemQuantities::new(
            update.qty_required.unwrap_or(qty_required),
            update.qty_ordered.unwrap_or(qty_ordered),
            qty_received,
        )?;

        diesel::update(purchase_order_items::table.find(item_id))
            .set((
                purchase_order_items::description.eq(description.as_str()),
                purchase_order_items::sku.eq(sku.as_deref()),
                purchase_order_items::qty_required.eq(quantities.required),
                purchase_order_items::qty_ordered.eq(quantities.ordered),
                purchase_order_items::updated_at.eq(now_timestamp()),
            ))
            .execute(conn)?;

        refresh_status!(conn, po_id, current);
        info!(po_id, item_id, "Purchase order item updated");
        Ok(())
    })
}
}

backend_fn! {
/// Records received quantities for one or more items.
///
/// All receipts apply or none do. Returns the rolled-up order status.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the order or any item does not
/// exist, or `PersistenceError::RuleViolation` if the order is cancelled
/// or a quantity is negative.
pub fn receive_purchase_order_items(
    conn: &mut _,
    po_id: i64,
    receipts: &[(i64, i64)],
) -> Result<PurchaseOrderStatus, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let current = load_status!(conn, po_id);
        let now = now_timestamp();

        for &(item_id, quantity) in receipts {
            let existing: Option<(i64, i64, i64)> = purchase_order_items::table
                .filter(purchase_order_items::item_id.eq(item_id))
                .filter(purchase_order_items::po_id.eq(po_id))
                .select((
                    purchase_order_items::qty_required,
                    purchase_order_items::qty_ordered,
                    purchase_order_items::qty_received,
                ))
                .first(conn)
                .optional()?;
            let Some((required, ordered, received)) = existing else {
                return Err(PersistenceError::NotFound(format!(
                    "Item {item_id} not found on purchase order {po_id}"
                )));
            };

            let updated = apply_receipt(
                current,
                ItemQuantities {
                    required,
                    ordered,
                    received,
                },
                quantity,
            )?;

            diesel::update(purchase_order_items::table.find(item_id))
                .set((
                    purchase_order_items::qty_received.eq(updated.received),
                    purchase_order_items::updated_at.eq(now.as_str()),
                ))
                .execute(conn)?;
            debug!(
                po_id,
                item_id,
                quantity,
                received = updated.received,
                "Receipt applied"
            );
        }

        let status = refresh_status!(conn, po_id, current);
        info!(
            po_id,
            receipts = receipts.len(),
            status = status.as_str(),
            "Items received"
        );
        Ok(status)
    })
}
}

backend_fn! {
/// Cancels an order that has received nothing.
///
/// Cancelling an already cancelled order is a no-op.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` for an unknown order, or
/// `PersistenceError::RuleViolation` if any item has been received.
pub fn cancel_purchase_order(conn: &mut _, po_id: i64) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let current = load_status!(conn, po_id);
        if current == PurchaseOrderStatus::Cancelled {
            return Ok(());
        }

        let received: Vec<i64> = purchase_order_items::table
            .filter(purchase_order_items::po_id.eq(po_id))
            .select(purchase_order_items::qty_received)
            .load(conn)?;
        let items: Vec<ItemQuantities> = received
            .into_iter()
            .map(|received| ItemQuantities {
                required: 0,
                ordered: 0,
                received,
            })
            .collect();
        validate_cancel(&items)?;

        diesel::update(purchase_orders::table.find(po_id))
            .set((
                purchase_orders::status.eq(PurchaseOrderStatus::Cancelled.as_str()),
                purchase_orders::updated_at.eq(now_timestamp()),
            ))
            .execute(conn)?;

        info!(po_id, "Purchase order cancelled");
        Ok(())
    })
}
}
