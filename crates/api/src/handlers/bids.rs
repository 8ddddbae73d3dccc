// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bid handlers: customer/job records, pricing, documents, onboarding and
//! phase generation.

use ce_ops_domain::{
    BidStatus, BusinessCalendar, DEFAULT_PHASE_STEPS, DocumentLink, PlannedPhase,
    PricingSnapshot, normalize_email, optional_text, phase_group_token, plan_phases,
    require_text,
};
use ce_ops_persistence::{BidData, BidDetails, Persistence, TaskData};
use chrono::NaiveDate;
use tracing::info;

use super::{not_found, persistence_error};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::ApiError;
use crate::request_response::{
    AddDocumentRequest, BidRequest, DocumentsResponse, GeneratePhasesRequest,
    GeneratePhasesResponse, ListBidsRequest, ListBidsResponse, TaskInfo, UpdateBidStatusRequest,
    UpdateBidStatusResponse, UpdatePricingRequest,
};

fn load_bid(persistence: &mut Persistence, bid_id: i64) -> Result<BidData, ApiError> {
    persistence
        .get_bid(bid_id)
        .map_err(persistence_error("Bid"))?
        .ok_or_else(|| not_found("Bid", format!("Bid {bid_id} not found")))
}

/// Validates and normalizes the editable bid fields.
fn bid_details(
    persistence: &mut Persistence,
    request: &BidRequest,
) -> Result<BidDetails, ApiError> {
    let customer_email = optional_text(request.customer_email.as_deref())
        .map(|email| normalize_email(&email))
        .transpose()?;

    if let Some(sales_rep_id) = request.sales_rep_id {
        let sales_rep = persistence
            .get_user_by_id(sales_rep_id)
            .map_err(persistence_error("User"))?;
        if sales_rep.is_none() {
            return Err(ApiError::InvalidInput {
                field: String::from("sales_rep_id"),
                message: format!("User {sales_rep_id} does not exist"),
            });
        }
    }

    Ok(BidDetails {
        customer_name: require_text("customer_name", &request.customer_name)?,
        job_name: require_text("job_name", &request.job_name)?,
        address: optional_text(request.address.as_deref()),
        customer_email,
        customer_phone: optional_text(request.customer_phone.as_deref()),
        sales_rep_id: request.sales_rep_id,
        notes: optional_text(request.notes.as_deref()),
    })
}

/// Lists bids, optionally filtered by status.
///
/// # Errors
///
/// Returns an error if the actor may not read bids or the status is unknown.
pub fn list_bids(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &ListBidsRequest,
) -> Result<ListBidsResponse, ApiError> {
    AuthorizationService::authorize_read_bids(actor)?;
    let status: Option<BidStatus> = request
        .status
        .as_deref()
        .map(str::parse)
        .transpose()?;

    let bids = persistence
        .list_bids(status.as_ref().map(BidStatus::as_str))
        .map_err(persistence_error("Bid"))?;
    Ok(ListBidsResponse { bids })
}

/// # Errors
///
/// Returns an error if the actor may not read bids or the bid does not exist.
pub fn get_bid(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    bid_id: i64,
) -> Result<BidData, ApiError> {
    AuthorizationService::authorize_read_bids(actor)?;
    load_bid(persistence, bid_id)
}

/// Creates a draft bid.
///
/// # Errors
///
/// Returns an error if the actor may not write bids or the input is invalid.
pub fn create_bid(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &BidRequest,
) -> Result<BidData, ApiError> {
    AuthorizationService::authorize_write_bids(actor, "create_bid")?;
    let details: BidDetails = bid_details(persistence, request)?;
    let bid_id: i64 = persistence
        .create_bid(&details)
        .map_err(persistence_error("Bid"))?;
    info!(actor_id = actor.user_id, bid_id, "Bid created");
    load_bid(persistence, bid_id)
}

/// Replaces a bid's customer and job fields.
///
/// # Errors
///
/// Returns an error if the actor may not write bids, the input is invalid,
/// or the bid does not exist.
pub fn update_bid(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    bid_id: i64,
    request: &BidRequest,
) -> Result<BidData, ApiError> {
    AuthorizationService::authorize_write_bids(actor, "update_bid")?;
    let details: BidDetails = bid_details(persistence, request)?;
    persistence
        .update_bid_details(bid_id, &details)
        .map_err(persistence_error("Bid"))?;
    load_bid(persistence, bid_id)
}

/// Moves a bid through its lifecycle.
///
/// # Errors
///
/// Returns an error if the actor may not write bids, the status is
/// unknown, the bid does not exist, or the transition is not allowed.
pub fn update_bid_status(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    bid_id: i64,
    request: &UpdateBidStatusRequest,
) -> Result<UpdateBidStatusResponse, ApiError> {
    AuthorizationService::authorize_write_bids(actor, "update_bid_status")?;
    let next: BidStatus = request.status.parse()?;
    let previous: BidStatus = persistence
        .update_bid_status(bid_id, next)
        .map_err(persistence_error("Bid"))?;

    Ok(UpdateBidStatusResponse {
        bid_id,
        previous_status: previous.as_str().to_string(),
        status: next.as_str().to_string(),
    })
}

/// Recomputes and stores the pricing snapshot.
///
/// # Errors
///
/// Returns an error if the actor may not write bids, pricing is invalid,
/// or the bid does not exist.
pub fn update_bid_pricing(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    bid_id: i64,
    request: UpdatePricingRequest,
) -> Result<BidData, ApiError> {
    AuthorizationService::authorize_write_bids(actor, "update_bid_pricing")?;
    let pricing: PricingSnapshot =
        PricingSnapshot::compute(request.line_items, request.tax_rate_bps)?;
    persistence
        .update_bid_pricing(bid_id, &pricing)
        .map_err(persistence_error("Bid"))?;
    load_bid(persistence, bid_id)
}

/// Replaces the onboarding questionnaire. The body must be a JSON object.
///
/// # Errors
///
/// Returns an error if the actor may not write bids, the body is not an
/// object, or the bid does not exist.
pub fn update_bid_onboarding(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    bid_id: i64,
    onboarding: &serde_json::Value,
) -> Result<BidData, ApiError> {
    AuthorizationService::authorize_write_bids(actor, "update_bid_onboarding")?;
    if !onboarding.is_object() {
        return Err(ApiError::InvalidInput {
            field: String::from("onboarding"),
            message: String::from("Onboarding data must be a JSON object"),
        });
    }
    persistence
        .update_bid_onboarding(bid_id, onboarding)
        .map_err(persistence_error("Bid"))?;
    load_bid(persistence, bid_id)
}

/// Attaches a document link.
///
/// # Errors
///
/// Returns an error if the actor may not write bids, the link is invalid,
/// or the bid does not exist.
pub fn add_bid_document(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    bid_id: i64,
    request: &AddDocumentRequest,
) -> Result<DocumentsResponse, ApiError> {
    AuthorizationService::authorize_write_bids(actor, "add_bid_document")?;
    let document = DocumentLink::new(&request.label, &request.url)?;
    let documents = persistence
        .add_bid_document(bid_id, &document)
        .map_err(persistence_error("Bid"))?;
    Ok(DocumentsResponse { bid_id, documents })
}

/// Reads an install date as a plain date, or as a timestamp whose local
/// date in the business timezone is used.
fn parse_install_date(calendar: &BusinessCalendar, value: &str) -> Result<NaiveDate, ApiError> {
    if let Ok(date) = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        return Ok(date);
    }
    let instant = calendar.parse_client_timestamp(value)?;
    Ok(calendar.local_date(instant))
}

/// Generates the chained manufacturing → assembly → delivery → install
/// tasks for a bid.
///
/// # Errors
///
/// Returns an error if the actor may not schedule, the date is invalid,
/// the bid does not exist, or the bid already has an unfinished phase
/// group.
pub fn generate_phases(
    persistence: &mut Persistence,
    calendar: &BusinessCalendar,
    actor: &AuthenticatedActor,
    bid_id: i64,
    request: &GeneratePhasesRequest,
) -> Result<GeneratePhasesResponse, ApiError> {
    AuthorizationService::authorize_schedule(actor, "generate_phases")?;
    let install_date: NaiveDate = parse_install_date(calendar, &request.install_date)?;

    let job_name: String = persistence
        .get_bid_job_name(bid_id)
        .map_err(persistence_error("Bid"))?
        .ok_or_else(|| not_found("Bid", format!("Bid {bid_id} not found")))?;

    let phases: Vec<PlannedPhase> =
        plan_phases(install_date, &job_name, calendar, &DEFAULT_PHASE_STEPS)?;
    let phase_group: String = phase_group_token(bid_id, rand::random::<u64>());

    let tasks: Vec<TaskData> = persistence
        .create_phase_group(bid_id, &phase_group, &phases, Some(actor.user_id))
        .map_err(persistence_error("Bid"))?;
    info!(
        actor_id = actor.user_id,
        bid_id,
        phase_group = phase_group.as_str(),
        %install_date,
        "Phases generated"
    );

    Ok(GeneratePhasesResponse {
        bid_id,
        phase_group,
        tasks: tasks.into_iter().map(TaskInfo::from).collect(),
    })
}
