// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Requests deserialize straight from JSON bodies and query strings;
//! responses serialize to the JSON the server returns.

use ce_ops_domain::{CalendarEvent, DependencyWarning, DocumentLink, LineItem};
use ce_ops_persistence::{
    BidData, PurchaseOrderData, PurchaseOrderItemData, ResourceData, TaskData, TaskEventData,
    UserData,
};
use serde::{Deserialize, Serialize};

// ========================================================================
// Auth and users
// ========================================================================

/// Request to create the first admin account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BootstrapRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Login credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub session_token: String,
    /// When the session stops being accepted (UTC).
    pub expires_at: String,
    pub user: UserInfo,
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub is_disabled: bool,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

impl From<&UserData> for UserInfo {
    fn from(user: &UserData) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role.clone(),
            is_disabled: user.is_disabled,
            created_at: user.created_at.clone(),
            last_login_at: user.last_login_at.clone(),
        }
    }
}

/// What the current user may do; drives which screens a client shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub manage_users: bool,
    pub read_bids: bool,
    pub write_bids: bool,
    pub schedule_tasks: bool,
    /// Task types the user may report events on.
    pub report_task_types: Vec<String>,
    pub read_purchasing: bool,
    pub write_purchasing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub user: UserInfo,
    pub permissions: Permissions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateUserRoleRequest {
    pub role: String,
}

/// Request to invite a new account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateInvitationRequest {
    pub email: String,
    pub role: String,
}

/// An invitation as shown to admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationInfo {
    pub invitation_id: i64,
    pub email: String,
    pub role: String,
    pub invited_by: i64,
    pub created_at: String,
    pub expires_at: String,
    /// One of `pending`, `accepted`, `revoked`, `expired`.
    pub status: String,
    pub accepted_user_id: Option<i64>,
    /// Only present in the response that created the invitation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListInvitationsResponse {
    pub invitations: Vec<InvitationInfo>,
}

/// Redeems an invitation token for a new account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AcceptInvitationRequest {
    pub token: String,
    pub display_name: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Generic acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ========================================================================
// Bids
// ========================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListBidsRequest {
    pub status: Option<String>,
}

/// Customer and job fields, used for both create and full update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BidRequest {
    pub customer_name: String,
    pub job_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub sales_rep_id: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListBidsResponse {
    pub bids: Vec<BidData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateBidStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBidStatusResponse {
    pub bid_id: i64,
    pub previous_status: String,
    pub status: String,
}

/// Line items and tax rate; totals are always computed server-side.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdatePricingRequest {
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub tax_rate_bps: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddDocumentRequest {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentsResponse {
    pub bid_id: i64,
    pub documents: Vec<DocumentLink>,
}

/// Install date as `YYYY-MM-DD`, or any accepted timestamp whose local
/// date is used.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratePhasesRequest {
    pub install_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratePhasesResponse {
    pub bid_id: i64,
    pub phase_group: String,
    pub tasks: Vec<TaskInfo>,
}

// ========================================================================
// Resources
// ========================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListResourcesRequest {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateResourceRequest {
    pub name: String,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    pub resource_id: i64,
    pub name: String,
    pub kind: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<ResourceData> for ResourceInfo {
    fn from(resource: ResourceData) -> Self {
        Self {
            resource_id: resource.resource_id,
            name: resource.name,
            kind: resource.kind,
            is_active: resource.is_active,
            created_at: resource.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResourcesResponse {
    pub resources: Vec<ResourceInfo>,
}

// ========================================================================
// Tasks
// ========================================================================

/// A task as returned by the API. Window bounds are UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub task_id: i64,
    pub bid_id: Option<i64>,
    pub task_type: String,
    pub title: String,
    pub status: String,
    pub start: String,
    pub end: String,
    pub resource_id: Option<i64>,
    pub phase_group: Option<String>,
    pub phase_order: Option<i32>,
    pub depends_on_task_id: Option<i64>,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<TaskData> for TaskInfo {
    fn from(task: TaskData) -> Self {
        Self {
            task_id: task.task_id,
            bid_id: task.bid_id,
            task_type: task.task_type,
            title: task.title,
            status: task.status,
            start: task.window_start,
            end: task.window_end,
            resource_id: task.resource_id,
            phase_group: task.phase_group,
            phase_order: task.phase_order,
            depends_on_task_id: task.depends_on_task_id,
            notes: task.notes,
            created_by: task.created_by,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Task listing filters; absent fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListTasksRequest {
    pub bid_id: Option<i64>,
    pub status: Option<String>,
    pub task_type: Option<String>,
    pub resource_id: Option<i64>,
    pub phase_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTasksResponse {
    pub tasks: Vec<TaskInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub bid_id: Option<i64>,
    pub task_type: String,
    pub title: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub resource_id: Option<i64>,
    #[serde(default)]
    pub depends_on_task_id: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: String,
    pub task_type: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// `resource_id: null` unassigns the task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssignTaskRequest {
    pub resource_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RescheduleTaskRequest {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub resource_id: Option<i64>,
}

/// The moved task plus any ordering problems the move introduced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RescheduleTaskResponse {
    pub task: TaskInfo,
    pub warnings: Vec<DependencyWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetailResponse {
    pub task: TaskInfo,
    pub events: Vec<TaskEventData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskEventRequest {
    pub kind: String,
    #[serde(default)]
    pub note: Option<String>,
    /// Photo references (URLs or storage keys).
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEventResponse {
    pub event: TaskEventData,
    pub task: TaskInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTaskEventsResponse {
    pub task_id: i64,
    pub events: Vec<TaskEventData>,
}

// ========================================================================
// Calendar
// ========================================================================

/// Event range query. Also accepts FullCalendar's `resourceId`/`taskType`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CalendarEventsRequest {
    pub start: String,
    pub end: String,
    #[serde(default, alias = "resourceId")]
    pub resource_id: Option<i64>,
    #[serde(default, alias = "taskType")]
    pub task_type: Option<String>,
}

/// A numeric identifier that may arrive as a JSON number or string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Number(i64),
    Text(String),
}

/// A drag/drop move from the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MoveEventRequest {
    pub start: String,
    pub end: String,
    #[serde(default, alias = "resourceId")]
    pub resource_id: Option<IdValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveEventResponse {
    pub event: CalendarEvent,
    pub warnings: Vec<DependencyWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CalendarViewRequest {
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarViewResponse {
    pub width: u32,
    pub view: String,
    /// How long clients wait after a resize before re-rendering.
    pub resize_debounce_ms: u64,
}

// ========================================================================
// Purchasing
// ========================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListPurchaseOrdersRequest {
    pub status: Option<String>,
    pub bid_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PurchaseOrderItemRequest {
    pub description: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub qty_required: i64,
    #[serde(default)]
    pub qty_ordered: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatePurchaseOrderRequest {
    pub vendor: String,
    #[serde(default)]
    pub bid_id: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<PurchaseOrderItemRequest>,
}

/// Partial item update; absent fields are left unchanged.
///
/// A blank `sku` clears the stored SKU.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdatePurchaseOrderItemRequest {
    pub description: Option<String>,
    pub sku: Option<String>,
    pub qty_required: Option<i64>,
    pub qty_ordered: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReceiptLine {
    pub item_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReceiveItemsRequest {
    pub receipts: Vec<ReceiptLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderItemInfo {
    pub item_id: i64,
    pub description: String,
    pub sku: Option<String>,
    pub qty_required: i64,
    pub qty_ordered: i64,
    pub qty_received: i64,
    /// Units still to arrive, never negative.
    pub qty_outstanding: i64,
    pub updated_at: String,
}

impl From<PurchaseOrderItemData> for PurchaseOrderItemInfo {
    fn from(item: PurchaseOrderItemData) -> Self {
        Self {
            item_id: item.item_id,
            qty_outstanding: (item.qty_required - item.qty_received).max(0),
            description: item.description,
            sku: item.sku,
            qty_required: item.qty_required,
            qty_ordered: item.qty_ordered,
            qty_received: item.qty_received,
            updated_at: item.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderInfo {
    pub po_id: i64,
    pub vendor: String,
    pub bid_id: Option<i64>,
    pub status: String,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<PurchaseOrderItemInfo>,
}

impl PurchaseOrderInfo {
    #[must_use]
    pub fn new(order: PurchaseOrderData, items: Vec<PurchaseOrderItemData>) -> Self {
        Self {
            po_id: order.po_id,
            vendor: order.vendor,
            bid_id: order.bid_id,
            status: order.status,
            notes: order.notes,
            created_by: order.created_by,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: items.into_iter().map(PurchaseOrderItemInfo::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPurchaseOrdersResponse {
    pub purchase_orders: Vec<PurchaseOrderInfo>,
}
