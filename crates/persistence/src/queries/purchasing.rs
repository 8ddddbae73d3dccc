// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Purchase order queries.

use diesel::prelude::*;
use diesel::{PgConnection, SqliteConnection};
use tracing::debug;

use crate::data_models::{PurchaseOrderData, PurchaseOrderItemData};
use crate::diesel_schema::{purchase_order_items, purchase_orders};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = purchase_orders)]
pub struct PurchaseOrderRow {
    po_id: i64,
    vendor: String,
    bid_id: Option<i64>,
    status: String,
    notes: Option<String>,
    created_by: Option<i64>,
    created_at: String,
    updated_at: String,
}

impl From<PurchaseOrderRow> for PurchaseOrderData {
    fn from(row: PurchaseOrderRow) -> Self {
        Self {
            po_id: row.po_id,
            vendor: row.vendor,
            bid_id: row.bid_id,
            status: row.status,
            notes: row.notes,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = purchase_order_items)]
pub struct PurchaseOrderItemRow {
    item_id: i64,
    po_id: i64,
    description: String,
    sku: Option<String>,
    qty_required: i64,
    qty_ordered: i64,
    qty_received: i64,
    updated_at: String,
}

impl From<PurchaseOrderItemRow> for PurchaseOrderItemData {
    fn from(row: PurchaseOrderItemRow) -> Self {
        Self {
            item_id: row.item_id,
            po_id: row.po_id,
            description: row.description,
            sku: row.sku,
            qty_required: row.qty_required,
            qty_ordered: row.qty_ordered,
            qty_received: row.qty_received,
            updated_at: row.updated_at,
        }
    }
}

backend_fn! {
/// Retrieves a purchase order header by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_purchase_order(
    conn: &mut _,
    po_id: i64,
) -> Result<Option<PurchaseOrderData>, PersistenceError> {
    debug!(po_id, "Looking up purchase order");

    let row: Option<PurchaseOrderRow> = purchase_orders::table
        .find(po_id)
        .select(PurchaseOrderRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(PurchaseOrderData::from))
}
}

backend_fn! {
/// Lists purchase orders, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_purchase_orders(
    conn: &mut _,
    status: Option<&str>,
    bid_id: Option<i64>,
) -> Result<Vec<PurchaseOrderData>, PersistenceError> {
    debug!(?status, ?bid_id, "Listing purchase orders");

    let mut query = purchase_orders::table
        .select(PurchaseOrderRow::as_select())
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(purchase_orders::status.eq(status));
    }
    if let Some(bid_id) = bid_id {
        query = query.filter(purchase_orders::bid_id.eq(bid_id));
    }

    let rows: Vec<PurchaseOrderRow> = query.order_by(purchase_orders::po_id.desc()).load(conn)?;
    Ok(rows.into_iter().map(PurchaseOrderData::from).collect())
}
}

backend_fn! {
/// Lists the line items of a purchase order in insertion order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_purchase_order_items(
    conn: &mut _,
    po_id: i64,
) -> Result<Vec<PurchaseOrderItemData>, PersistenceError> {
    let rows: Vec<PurchaseOrderItemRow> = purchase_order_items::table
        .filter(purchase_order_items::po_id.eq(po_id))
        .select(PurchaseOrderItemRow::as_select())
        .order_by(purchase_order_items::item_id.asc())
        .load(conn)?;

    Ok(rows.into_iter().map(PurchaseOrderItemData::from).collect())
}
}
