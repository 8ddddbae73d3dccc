// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bid queries.

use ce_ops_domain::{DocumentLink, PricingSnapshot};
use diesel::prelude::*;
use diesel::{PgConnection, SqliteConnection};
use tracing::debug;

use crate::data_models::BidData;
use crate::diesel_schema::bids;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = bids)]
pub struct BidRow {
    bid_id: i64,
    customer_name: String,
    job_name: String,
    address: Option<String>,
    customer_email: Option<String>,
    customer_phone: Option<String>,
    status: String,
    sales_rep_id: Option<i64>,
    pricing_json: Option<String>,
    subtotal_cents: i64,
    tax_cents: i64,
    total_cents: i64,
    onboarding_json: Option<String>,
    documents_json: String,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<BidRow> for BidData {
    type Error = PersistenceError;

    fn try_from(row: BidRow) -> Result<Self, Self::Error> {
        let pricing: Option<PricingSnapshot> = row
            .pricing_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let onboarding: Option<serde_json::Value> = row
            .onboarding_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let documents: Vec<DocumentLink> = serde_json::from_str(&row.documents_json)?;

        Ok(Self {
            bid_id: row.bid_id,
            customer_name: row.customer_name,
            job_name: row.job_name,
            address: row.address,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            status: row.status,
            sales_rep_id: row.sales_rep_id,
            pricing,
            subtotal_cents: row.subtotal_cents,
            tax_cents: row.tax_cents,
            total_cents: row.total_cents,
            onboarding,
            documents,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

backend_fn! {
/// Retrieves a bid by ID.
///
/// # Errors
///
/// Returns an error if the query fails or a JSON column does not decode.
pub fn get_bid(conn: &mut _, bid_id: i64) -> Result<Option<BidData>, PersistenceError> {
    debug!(bid_id, "Looking up bid");

    let row: Option<BidRow> = bids::table
        .find(bid_id)
        .select(BidRow::as_select())
        .first(conn)
        .optional()?;

    row.map(BidData::try_from).transpose()
}
}

backend_fn! {
/// Lists bids, most recently updated first, optionally filtered by status.
///
/// # Errors
///
/// Returns an error if the query fails or a JSON column does not decode.
pub fn list_bids(conn: &mut _, status: Option<&str>) -> Result<Vec<BidData>, PersistenceError> {
    debug!(?status, "Listing bids");

    let mut query = bids::table.select(BidRow::as_select()).into_boxed();
    if let Some(status) = status {
        query = query.filter(bids::status.eq(status));
    }

    let rows: Vec<BidRow> = query
        .order_by((bids::updated_at.desc(), bids::bid_id.desc()))
        .load(conn)?;

    rows.into_iter().map(BidData::try_from).collect()
}
}

backend_fn! {
/// Returns the job name of a bid, used to title generated tasks.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_bid_job_name(conn: &mut _, bid_id: i64) -> Result<Option<String>, PersistenceError> {
    Ok(bids::table
        .find(bid_id)
        .select(bids::job_name)
        .first(conn)
        .optional()?)
}
}
