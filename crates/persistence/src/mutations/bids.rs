// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bid mutations.

use ce_ops_domain::{BidStatus, DocumentLink, PricingSnapshot};
use diesel::prelude::*;
use diesel::{PgConnection, SqliteConnection};
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::data_models::BidDetails;
use crate::diesel_schema::bids;
use crate::error::PersistenceError;
use crate::now_timestamp;

fn not_found(bid_id: i64) -> PersistenceError {
    PersistenceError::NotFound(format!("Bid {bid_id} not found"))
}

backend_fn! {
/// Creates a draft bid with an empty document list.
///
/// # Errors
///
/// Returns `PersistenceError::InvalidReference` if `sales_rep_id` is unknown.
pub fn create_bid(conn: &mut _, details: &BidDetails) -> Result<i64, PersistenceError> {
    let now = now_timestamp();

    diesel::insert_into(bids::table)
        .values((
            bids::customer_name.eq(details.customer_name.as_str()),
            bids::job_name.eq(details.job_name.as_str()),
            bids::address.eq(details.address.as_deref()),
            bids::customer_email.eq(details.customer_email.as_deref()),
            bids::customer_phone.eq(details.customer_phone.as_deref()),
            bids::status.eq(BidStatus::Draft.as_str()),
            bids::sales_rep_id.eq(details.sales_rep_id),
            bids::subtotal_cents.eq(0_i64),
            bids::tax_cents.eq(0_i64),
            bids::total_cents.eq(0_i64),
            bids::documents_json.eq("[]"),
            bids::notes.eq(details.notes.as_deref()),
            bids::created_at.eq(now.as_str()),
            bids::updated_at.eq(now.as_str()),
        ))
        .execute(conn)?;

    let bid_id: i64 = conn.get_last_insert_rowid()?;
    info!(bid_id, job_name = details.job_name.as_str(), "Bid created");
    Ok(bid_id)
}
}

backend_fn! {
/// Replaces the customer and job fields of a bid.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the bid does not exist.
pub fn update_bid_details(
    conn: &mut _,
    bid_id: i64,
    details: &BidDetails,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(bids::table.find(bid_id))
        .set((
            bids::customer_name.eq(details.customer_name.as_str()),
            bids::job_name.eq(details.job_name.as_str()),
            bids::address.eq(details.address.as_deref()),
            bids::customer_email.eq(details.customer_email.as_deref()),
            bids::customer_phone.eq(details.customer_phone.as_deref()),
            bids::sales_rep_id.eq(details.sales_rep_id),
            bids::notes.eq(details.notes.as_deref()),
            bids::updated_at.eq(now_timestamp()),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(not_found(bid_id));
    }
    info!(bid_id, "Bid details updated");
    Ok(())
}
}

backend_fn! {
/// Moves a bid to a new status after checking the transition.
///
/// Returns the previous status.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the bid does not exist, or
/// `PersistenceError::RuleViolation` if the transition is not allowed.
pub fn update_bid_status(
    conn: &mut _,
    bid_id: i64,
    next: BidStatus,
) -> Result<BidStatus, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let current: Option<String> = bids::table
            .find(bid_id)
            .select(bids::status)
            .first(conn)
            .optional()?;
        let current: BidStatus = current.ok_or_else(|| not_found(bid_id))?.parse()?;

        current.validate_transition(next)?;

        diesel::update(bids::table.find(bid_id))
            .set((
                bids::status.eq(next.as_str()),
                bids::updated_at.eq(now_timestamp()),
            ))
            .execute(conn)?;

        info!(
            bid_id,
            from = current.as_str(),
            to = next.as_str(),
            "Bid status changed"
        );
        Ok(current)
    })
}
}

backend_fn! {
/// Stores a computed pricing snapshot and its denormalized totals.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the bid does not exist.
pub fn update_bid_pricing(
    conn: &mut _,
    bid_id: i64,
    pricing: &PricingSnapshot,
) -> Result<(), PersistenceError> {
    let pricing_json = serde_json::to_string(pricing)?;

    let rows_affected: usize = diesel::update(bids::table.find(bid_id))
        .set((
            bids::pricing_json.eq(Some(pricing_json.as_str())),
            bids::subtotal_cents.eq(pricing.subtotal_cents),
            bids::tax_cents.eq(pricing.tax_cents),
            bids::total_cents.eq(pricing.total_cents),
            bids::updated_at.eq(now_timestamp()),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(not_found(bid_id));
    }
    info!(
        bid_id,
        total_cents = pricing.total_cents,
        "Bid pricing updated"
    );
    Ok(())
}
}

backend_fn! {
/// Replaces the onboarding questionnaire document.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the bid does not exist.
pub fn update_bid_onboarding(
    conn: &mut _,
    bid_id: i64,
    onboarding: &serde_json::Value,
) -> Result<(), PersistenceError> {
    let onboarding_json = serde_json::to_string(onboarding)?;

    let rows_affected: usize = diesel::update(bids::table.find(bid_id))
        .set((
            bids::onboarding_json.eq(Some(onboarding_json.as_str())),
            bids::updated_at.eq(now_timestamp()),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(not_found(bid_id));
    }
    info!(bid_id, "Bid onboarding updated");
    Ok(())
}
}

backend_fn! {
/// Appends a document link and returns the full list.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the bid does not exist.
pub fn add_bid_document(
    conn: &mut _,
    bid_id: i64,
    document: &DocumentLink,
) -> Result<Vec<DocumentLink>, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let documents_json: Option<String> = bids::table
            .find(bid_id)
            .select(bids::documents_json)
            .first(conn)
            .optional()?;
        let documents_json = documents_json.ok_or_else(|| not_found(bid_id))?;

        let mut documents: Vec<DocumentLink> = serde_json::from_str(&documents_json)?;
        documents.push(document.clone());
        let updated = serde_json::to_string(&documents)?;

        diesel::update(bids::table.find(bid_id))
            .set((
                bids::documents_json.eq(updated.as_str()),
                bids::updated_at.eq(now_timestamp()),
            ))
            .execute(conn)?;

        info!(bid_id, count = documents.len(), "Bid document added");
        Ok(documents)
    })
}
}
