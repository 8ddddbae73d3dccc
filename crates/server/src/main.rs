// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod extract;
mod session;

use axum::{
    Json, Router,
    extract::{Path, State as AxumState},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use ce_ops_api::handlers::{bids, calendar, purchasing, resources, tasks, users};
use ce_ops_api::{
    AcceptInvitationRequest, AddDocumentRequest, ApiError, AssignTaskRequest, AuthConfig,
    BidRequest, BootstrapRequest, CalendarEventsRequest, CalendarViewRequest,
    CalendarViewResponse, CreateInvitationRequest, CreatePurchaseOrderRequest,
    CreateResourceRequest, CreateTaskRequest, DocumentsResponse, GeneratePhasesRequest,
    GeneratePhasesResponse, InvitationInfo, ListBidsRequest, ListBidsResponse,
    ListInvitationsResponse, ListPurchaseOrdersRequest, ListPurchaseOrdersResponse,
    ListResourcesRequest, ListResourcesResponse, ListTaskEventsResponse, ListTasksRequest,
    ListTasksResponse, ListUsersResponse, LoginRequest, LoginResponse, MessageResponse,
    MoveEventRequest, MoveEventResponse, PurchaseOrderInfo, PurchaseOrderItemRequest,
    ReceiveItemsRequest, RescheduleTaskRequest, RescheduleTaskResponse, ResourceInfo,
    TaskDetailResponse, TaskEventRequest, TaskEventResponse, TaskInfo, UpdateBidStatusRequest,
    UpdateBidStatusResponse, UpdatePricingRequest, UpdatePurchaseOrderItemRequest,
    UpdateTaskRequest, UpdateUserRoleRequest, UserInfo, WhoAmIResponse,
};
use ce_ops_domain::{BusinessCalendar, CalendarEvent, CalendarResource};
use ce_ops_persistence::{BidData, Persistence};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::extract::{ApiJson, ApiQuery};
use crate::session::{SessionUser, bearer_token};

/// How often expired sessions are purged.
const SESSION_SWEEP_INTERVAL: StdDuration = StdDuration::from_secs(15 * 60);

/// CE Ops Server - back-office HTTP API for bids, scheduling and purchasing
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// `postgres://` URL, or a path to a `SQLite` file. Uses in-memory
    /// `SQLite` if not provided.
    #[arg(long, env = "CE_OPS_DATABASE_URL")]
    database_url: Option<String>,

    /// Address to bind to
    #[arg(long, env = "CE_OPS_BIND", default_value = "127.0.0.1")]
    bind: String,

    /// Port to bind the server to
    #[arg(short, long, env = "CE_OPS_PORT", default_value_t = 3000)]
    port: u16,

    /// IANA timezone the business operates in
    #[arg(long, env = "CE_OPS_TIMEZONE", default_value = "America/Chicago")]
    timezone: String,

    /// Local hour the workday starts (phase tasks begin here)
    #[arg(long, env = "CE_OPS_WORKDAY_START_HOUR", default_value_t = 7)]
    workday_start_hour: u32,

    /// Local hour the workday ends
    #[arg(long, env = "CE_OPS_WORKDAY_END_HOUR", default_value_t = 16)]
    workday_end_hour: u32,

    /// Session lifetime in hours
    #[arg(long, env = "CE_OPS_SESSION_HOURS", default_value_t = 12)]
    session_hours: i64,

    /// Invitation lifetime in days
    #[arg(long, env = "CE_OPS_INVITE_DAYS", default_value_t = 7)]
    invite_days: i64,
}

/// Application state shared across handlers.
///
/// Handlers hold the persistence lock for the duration of one API call.
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<Persistence>>,
    calendar: BusinessCalendar,
    auth: AuthConfig,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Machine-readable error code.
    error: String,
    /// Human-readable message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
///
/// Also the rejection type of the `extract` module.
pub struct HttpError {
    status: StatusCode,
    code: String,
    message: String,
}

impl HttpError {
    fn new(status: StatusCode, code: &str, message: String) -> Self {
        Self {
            status,
            code: code.to_string(),
            message,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: self.code,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::AuthenticationFailed { .. } => {
                Self::new(StatusCode::UNAUTHORIZED, "unauthorized", err.to_string())
            }
            ApiError::Unauthorized { .. } => {
                Self::new(StatusCode::FORBIDDEN, "forbidden", err.to_string())
            }
            ApiError::DomainRuleViolation { ref rule, .. } => {
                let code = rule.clone();
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, &code, err.to_string())
            }
            ApiError::InvalidInput { .. } | ApiError::PasswordPolicyViolation { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
            }
            ApiError::ResourceNotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "not_found", err.to_string())
            }
            ApiError::Conflict { .. } => {
                Self::new(StatusCode::CONFLICT, "conflict", err.to_string())
            }
            ApiError::Internal { message } => {
                error!(error = %message, "Internal error");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "server_error",
                    String::from("Internal server error"),
                )
            }
        }
    }
}

/// API response for the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    backend: String,
}

type Created<T> = (StatusCode, Json<T>);

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

async fn handle_health(AxumState(app_state): AxumState<AppState>) -> Json<HealthResponse> {
    let persistence = app_state.persistence.lock().await;
    Json(HealthResponse {
        status: String::from("ok"),
        backend: persistence.backend_name().to_string(),
    })
}

async fn handle_bootstrap(
    AxumState(app_state): AxumState<AppState>,
    ApiJson(req): ApiJson<BootstrapRequest>,
) -> Result<Created<UserInfo>, HttpError> {
    info!("Handling bootstrap request");
    let mut persistence = app_state.persistence.lock().await;
    let user: UserInfo = users::bootstrap(&mut persistence, &req)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse = users::login(&mut persistence, &req, &app_state.auth)?;
    Ok(Json(response))
}

async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, Response> {
    let token: &str = bearer_token(&headers).map_err(IntoResponse::into_response)?;
    let mut persistence = app_state.persistence.lock().await;
    users::logout(&mut persistence, token)
        .map_err(|e| HttpError::from(e).into_response())?;
    info!(user_id = actor.user_id, "User logged out");
    Ok(Json(MessageResponse {
        message: String::from("Logged out"),
    }))
}

async fn handle_whoami(SessionUser(actor, user): SessionUser) -> Json<WhoAmIResponse> {
    Json(users::whoami(&actor, &user))
}

async fn handle_accept_invitation(
    AxumState(app_state): AxumState<AppState>,
    ApiJson(req): ApiJson<AcceptInvitationRequest>,
) -> Result<Created<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let user: UserInfo = users::accept_invitation(&mut persistence, &req)?;
    Ok((StatusCode::CREATED, Json(user)))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

async fn handle_list_users(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
) -> Result<Json<ListUsersResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(users::list_users(&mut persistence, &actor)?))
}

async fn handle_update_user_role(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(user_id): Path<i64>,
    ApiJson(req): ApiJson<UpdateUserRoleRequest>,
) -> Result<Json<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(users::update_user_role(
        &mut persistence,
        &actor,
        user_id,
        &req,
    )?))
}

async fn handle_disable_user(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(user_id): Path<i64>,
) -> Result<Json<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(users::set_user_disabled(
        &mut persistence,
        &actor,
        user_id,
        true,
    )?))
}

async fn handle_enable_user(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(user_id): Path<i64>,
) -> Result<Json<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(users::set_user_disabled(
        &mut persistence,
        &actor,
        user_id,
        false,
    )?))
}

async fn handle_list_invitations(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
) -> Result<Json<ListInvitationsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(users::list_invitations(&mut persistence, &actor)?))
}

async fn handle_create_invitation(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    ApiJson(req): ApiJson<CreateInvitationRequest>,
) -> Result<Created<InvitationInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let invitation: InvitationInfo =
        users::create_invitation(&mut persistence, &actor, &req, &app_state.auth)?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

async fn handle_revoke_invitation(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(invitation_id): Path<i64>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(users::revoke_invitation(
        &mut persistence,
        &actor,
        invitation_id,
    )?))
}

// ---------------------------------------------------------------------------
// Bids
// ---------------------------------------------------------------------------

async fn handle_list_bids(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    ApiQuery(query): ApiQuery<ListBidsRequest>,
) -> Result<Json<ListBidsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(bids::list_bids(&mut persistence, &actor, &query)?))
}

async fn handle_create_bid(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    ApiJson(req): ApiJson<BidRequest>,
) -> Result<Created<BidData>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let bid: BidData = bids::create_bid(&mut persistence, &actor, &req)?;
    Ok((StatusCode::CREATED, Json(bid)))
}

async fn handle_get_bid(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(bid_id): Path<i64>,
) -> Result<Json<BidData>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(bids::get_bid(&mut persistence, &actor, bid_id)?))
}

async fn handle_update_bid(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(bid_id): Path<i64>,
    ApiJson(req): ApiJson<BidRequest>,
) -> Result<Json<BidData>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(bids::update_bid(&mut persistence, &actor, bid_id, &req)?))
}

async fn handle_update_bid_status(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(bid_id): Path<i64>,
    ApiJson(req): ApiJson<UpdateBidStatusRequest>,
) -> Result<Json<UpdateBidStatusResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(bids::update_bid_status(
        &mut persistence,
        &actor,
        bid_id,
        &req,
    )?))
}

async fn handle_update_bid_pricing(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(bid_id): Path<i64>,
    ApiJson(req): ApiJson<UpdatePricingRequest>,
) -> Result<Json<BidData>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(bids::update_bid_pricing(
        &mut persistence,
        &actor,
        bid_id,
        req,
    )?))
}

async fn handle_update_bid_onboarding(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(bid_id): Path<i64>,
    ApiJson(onboarding): ApiJson<serde_json::Value>,
) -> Result<Json<BidData>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(bids::update_bid_onboarding(
        &mut persistence,
        &actor,
        bid_id,
        &onboarding,
    )?))
}

async fn handle_add_bid_document(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(bid_id): Path<i64>,
    ApiJson(req): ApiJson<AddDocumentRequest>,
) -> Result<Created<DocumentsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let documents: DocumentsResponse =
        bids::add_bid_document(&mut persistence, &actor, bid_id, &req)?;
    Ok((StatusCode::CREATED, Json(documents)))
}

async fn handle_generate_phases(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(bid_id): Path<i64>,
    ApiJson(req): ApiJson<GeneratePhasesRequest>,
) -> Result<Created<GeneratePhasesResponse>, HttpError> {
    info!(
        actor_id = actor.user_id,
        bid_id,
        "Handling generate_phases request"
    );
    let mut persistence = app_state.persistence.lock().await;
    let response: GeneratePhasesResponse =
        bids::generate_phases(&mut persistence, &app_state.calendar, &actor, bid_id, &req)?;
    Ok((StatusCode::CREATED, Json(response)))
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

async fn handle_list_resources(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_actor, _user): SessionUser,
    ApiQuery(query): ApiQuery<ListResourcesRequest>,
) -> Result<Json<ListResourcesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(resources::list_resources(&mut persistence, &query)?))
}

async fn handle_create_resource(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    ApiJson(req): ApiJson<CreateResourceRequest>,
) -> Result<Created<ResourceInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let resource: ResourceInfo = resources::create_resource(&mut persistence, &actor, &req)?;
    Ok((StatusCode::CREATED, Json(resource)))
}

async fn handle_deactivate_resource(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(resource_id): Path<i64>,
) -> Result<Json<ResourceInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(resources::deactivate_resource(
        &mut persistence,
        &actor,
        resource_id,
    )?))
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

async fn handle_list_tasks(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_actor, _user): SessionUser,
    ApiQuery(query): ApiQuery<ListTasksRequest>,
) -> Result<Json<ListTasksResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(tasks::list_tasks(&mut persistence, &query)?))
}

async fn handle_create_task(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> Result<Created<TaskInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let task: TaskInfo = tasks::create_task(&mut persistence, &app_state.calendar, &actor, &req)?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn handle_get_task(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_actor, _user): SessionUser,
    Path(task_id): Path<i64>,
) -> Result<Json<TaskDetailResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(tasks::get_task(&mut persistence, task_id)?))
}

async fn handle_update_task(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(task_id): Path<i64>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> Result<Json<TaskInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(tasks::update_task(
        &mut persistence,
        &actor,
        task_id,
        &req,
    )?))
}

async fn handle_delete_task(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(task_id): Path<i64>,
) -> Result<Json<MessageResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(tasks::delete_task(&mut persistence, &actor, task_id)?))
}

async fn handle_assign_task(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(task_id): Path<i64>,
    ApiJson(req): ApiJson<AssignTaskRequest>,
) -> Result<Json<TaskInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(tasks::assign_task(
        &mut persistence,
        &actor,
        task_id,
        &req,
    )?))
}

async fn handle_reschedule_task(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(task_id): Path<i64>,
    ApiJson(req): ApiJson<RescheduleTaskRequest>,
) -> Result<Json<RescheduleTaskResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(tasks::reschedule_task(
        &mut persistence,
        &app_state.calendar,
        &actor,
        task_id,
        &req,
    )?))
}

async fn handle_list_task_events(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_actor, _user): SessionUser,
    Path(task_id): Path<i64>,
) -> Result<Json<ListTaskEventsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(tasks::list_task_events(&mut persistence, task_id)?))
}

async fn handle_record_task_event(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(task_id): Path<i64>,
    ApiJson(req): ApiJson<TaskEventRequest>,
) -> Result<Created<TaskEventResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: TaskEventResponse =
        tasks::record_task_event(&mut persistence, &actor, task_id, &req)?;
    Ok((StatusCode::CREATED, Json(response)))
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

async fn handle_calendar_events(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_actor, _user): SessionUser,
    ApiQuery(query): ApiQuery<CalendarEventsRequest>,
) -> Result<Json<Vec<CalendarEvent>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(calendar::list_events(
        &mut persistence,
        &app_state.calendar,
        &query,
    )?))
}

async fn handle_calendar_resources(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_actor, _user): SessionUser,
) -> Result<Json<Vec<CalendarResource>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(calendar::list_resources(&mut persistence)?))
}

async fn handle_move_event(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(task_id): Path<i64>,
    ApiJson(req): ApiJson<MoveEventRequest>,
) -> Result<Json<MoveEventResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(calendar::move_event(
        &mut persistence,
        &app_state.calendar,
        &actor,
        task_id,
        &req,
    )?))
}

async fn handle_calendar_view(
    SessionUser(_actor, _user): SessionUser,
    ApiQuery(query): ApiQuery<CalendarViewRequest>,
) -> Json<CalendarViewResponse> {
    Json(calendar::view_for_width(&query))
}

// ---------------------------------------------------------------------------
// Purchasing
// ---------------------------------------------------------------------------

async fn handle_list_purchase_orders(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    ApiQuery(query): ApiQuery<ListPurchaseOrdersRequest>,
) -> Result<Json<ListPurchaseOrdersResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(purchasing::list_purchase_orders(
        &mut persistence,
        &actor,
        &query,
    )?))
}

async fn handle_create_purchase_order(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    ApiJson(req): ApiJson<CreatePurchaseOrderRequest>,
) -> Result<Created<PurchaseOrderInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let order: PurchaseOrderInfo =
        purchasing::create_purchase_order(&mut persistence, &actor, &req)?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn handle_get_purchase_order(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(po_id): Path<i64>,
) -> Result<Json<PurchaseOrderInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(purchasing::get_purchase_order(
        &mut persistence,
        &actor,
        po_id,
    )?))
}

async fn handle_add_purchase_order_item(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(po_id): Path<i64>,
    ApiJson(req): ApiJson<PurchaseOrderItemRequest>,
) -> Result<Created<PurchaseOrderInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let order: PurchaseOrderInfo =
        purchasing::add_purchase_order_item(&mut persistence, &actor, po_id, &req)?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn handle_update_purchase_order_item(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path((po_id, item_id)): Path<(i64, i64)>,
    ApiJson(req): ApiJson<UpdatePurchaseOrderItemRequest>,
) -> Result<Json<PurchaseOrderInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(purchasing::update_purchase_order_item(
        &mut persistence,
        &actor,
        po_id,
        item_id,
        &req,
    )?))
}

async fn handle_receive_items(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(po_id): Path<i64>,
    ApiJson(req): ApiJson<ReceiveItemsRequest>,
) -> Result<Json<PurchaseOrderInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(purchasing::receive_items(
        &mut persistence,
        &actor,
        po_id,
        &req,
    )?))
}

async fn handle_cancel_purchase_order(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _user): SessionUser,
    Path(po_id): Path<i64>,
) -> Result<Json<PurchaseOrderInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(purchasing::cancel_purchase_order(
        &mut persistence,
        &actor,
        po_id,
    )?))
}

fn build_router(app_state: AppState) -> Router {
    let auth = Router::new()
        .route("/bootstrap", post(handle_bootstrap))
        .route("/login", post(handle_login))
        .route("/logout", post(handle_logout))
        .route("/whoami", get(handle_whoami))
        .route("/accept_invite", post(handle_accept_invitation));

    let admin = Router::new()
        .route("/users", get(handle_list_users))
        .route("/users/{user_id}/role", post(handle_update_user_role))
        .route("/users/{user_id}/disable", post(handle_disable_user))
        .route("/users/{user_id}/enable", post(handle_enable_user))
        .route(
            "/invitations",
            get(handle_list_invitations).post(handle_create_invitation),
        )
        .route(
            "/invitations/{invitation_id}",
            axum::routing::delete(handle_revoke_invitation),
        );

    let bid_routes = Router::new()
        .route("/", get(handle_list_bids).post(handle_create_bid))
        .route("/{bid_id}", get(handle_get_bid).put(handle_update_bid))
        .route("/{bid_id}/status", post(handle_update_bid_status))
        .route("/{bid_id}/pricing", put(handle_update_bid_pricing))
        .route("/{bid_id}/onboarding", put(handle_update_bid_onboarding))
        .route("/{bid_id}/documents", post(handle_add_bid_document))
        .route("/{bid_id}/phases", post(handle_generate_phases));

    let resource_routes = Router::new()
        .route("/", get(handle_list_resources).post(handle_create_resource))
        .route(
            "/{resource_id}/deactivate",
            post(handle_deactivate_resource),
        );

    let task_routes = Router::new()
        .route("/", get(handle_list_tasks).post(handle_create_task))
        .route(
            "/{task_id}",
            get(handle_get_task)
                .put(handle_update_task)
                .delete(handle_delete_task),
        )
        .route("/{task_id}/assign", post(handle_assign_task))
        .route("/{task_id}/reschedule", post(handle_reschedule_task))
        .route(
            "/{task_id}/events",
            get(handle_list_task_events).post(handle_record_task_event),
        );

    let calendar_routes = Router::new()
        .route("/events", get(handle_calendar_events))
        .route("/resources", get(handle_calendar_resources))
        .route("/events/{task_id}/move", post(handle_move_event))
        .route("/view", get(handle_calendar_view));

    let purchasing_routes = Router::new()
        .route(
            "/",
            get(handle_list_purchase_orders).post(handle_create_purchase_order),
        )
        .route("/{po_id}", get(handle_get_purchase_order))
        .route("/{po_id}/items", post(handle_add_purchase_order_item))
        .route(
            "/{po_id}/items/{item_id}",
            put(handle_update_purchase_order_item),
        )
        .route("/{po_id}/receive", post(handle_receive_items))
        .route("/{po_id}/cancel", post(handle_cancel_purchase_order));

    let api = Router::new()
        .route("/health", get(handle_health))
        .nest("/auth", auth)
        .nest("/admin", admin)
        .nest("/bids", bid_routes)
        .nest("/resources", resource_routes)
        .nest("/tasks", task_routes)
        .nest("/calendar", calendar_routes)
        .nest("/purchase_orders", purchasing_routes);

    Router::new().nest("/api", api).with_state(app_state)
}

/// Opens the backend named by the database URL.
fn open_persistence(database_url: Option<&str>) -> Result<Persistence, Box<dyn std::error::Error>> {
    let persistence = match database_url {
        Some(url) if url.starts_with("postgres://") || url.starts_with("postgresql://") => {
            info!("Using Postgres database");
            Persistence::new_with_postgres(url)?
        }
        Some(path) => {
            info!("Using SQLite database at: {}", path);
            Persistence::new_with_file(path)?
        }
        None => {
            warn!("Using in-memory database; data will not survive a restart");
            Persistence::new_in_memory()?
        }
    };
    Ok(persistence)
}

/// Periodically deletes expired sessions.
fn spawn_session_sweeper(persistence: Arc<Mutex<Persistence>>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let mut persistence = persistence.lock().await;
            match persistence.delete_expired_sessions() {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Expired sessions purged"),
                Err(e) => error!(error = %e, "Failed to purge expired sessions"),
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing CE Ops Server");

    let calendar: BusinessCalendar = BusinessCalendar::new(
        &args.timezone,
        args.workday_start_hour,
        args.workday_end_hour,
    )?;
    let auth: AuthConfig = AuthConfig {
        session_duration: time::Duration::hours(args.session_hours),
        invitation_duration: time::Duration::days(args.invite_days),
    };

    let persistence: Persistence = open_persistence(args.database_url.as_deref())?;
    info!(
        backend = persistence.backend_name(),
        timezone = %args.timezone,
        "Persistence ready"
    );

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        calendar,
        auth,
    };
    spawn_session_sweeper(Arc::clone(&app_state.persistence));

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
