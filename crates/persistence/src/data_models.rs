// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Records returned by the persistence layer and the inputs it accepts.
//!
//! Row structs that mirror the schema column-for-column stay private to
//! the query modules. These types are what callers see: booleans are
//! `bool`, JSON columns are decoded.

use ce_ops_domain::{
    DocumentLink, InstallTask, ItemQuantities, PricingSnapshot, Role, TaskEventKind, TaskType,
    TaskWindow, parse_stored_timestamp,
};
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub is_disabled: bool,
    pub created_at: String,
    pub updated_at: String,
    pub disabled_at: Option<String>,
    pub last_login_at: Option<String>,
}

/// A login session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub user_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

/// An invitation to create an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationData {
    pub invitation_id: i64,
    pub token: String,
    pub email: String,
    pub role: String,
    pub invited_by: i64,
    pub created_at: String,
    pub expires_at: String,
    pub accepted_at: Option<String>,
    pub accepted_user_id: Option<i64>,
    pub revoked_at: Option<String>,
}

impl InvitationData {
    /// Whether the invitation can still be accepted at `now`.
    #[must_use]
    pub fn is_pending(&self, now: &str) -> bool {
        self.accepted_at.is_none() && self.revoked_at.is_none() && self.expires_at.as_str() > now
    }
}

#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub token: String,
    pub email: String,
    pub role: Role,
    pub invited_by: i64,
    pub expires_at: String,
}

/// A bid with its decoded pricing, onboarding and documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BidData {
    pub bid_id: i64,
    pub customer_name: String,
    pub job_name: String,
    pub address: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub status: String,
    pub sales_rep_id: Option<i64>,
    pub pricing: Option<PricingSnapshot>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub onboarding: Option<serde_json::Value>,
    pub documents: Vec<DocumentLink>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Editable customer and job fields of a bid.
#[derive(Debug, Clone, Default)]
pub struct BidDetails {
    pub customer_name: String,
    pub job_name: String,
    pub address: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub sales_rep_id: Option<i64>,
    pub notes: Option<String>,
}

/// A crew or individual that tasks can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceData {
    pub resource_id: i64,
    pub name: String,
    pub kind: String,
    pub is_active: bool,
    pub created_at: String,
}

/// An install task row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskData {
    pub task_id: i64,
    pub bid_id: Option<i64>,
    pub task_type: String,
    pub title: String,
    pub status: String,
    pub window_start: String,
    pub window_end: String,
    pub resource_id: Option<i64>,
    pub phase_group: Option<String>,
    pub phase_order: Option<i32>,
    pub depends_on_task_id: Option<i64>,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl TaskData {
    /// Parses the stored columns into the domain task.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::RuleViolation` if a stored value no longer
    /// parses, which indicates a corrupted row.
    pub fn to_install_task(&self) -> Result<InstallTask, PersistenceError> {
        let window = TaskWindow::new(
            parse_stored_timestamp(&self.window_start)?,
            parse_stored_timestamp(&self.window_end)?,
        )?;
        Ok(InstallTask {
            task_id: self.task_id,
            bid_id: self.bid_id,
            task_type: self.task_type.parse()?,
            title: self.title.clone(),
            status: self.status.parse()?,
            window,
            resource_id: self.resource_id,
            phase_group: self.phase_group.clone(),
            phase_order: self.phase_order,
            depends_on_task_id: self.depends_on_task_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub bid_id: Option<i64>,
    pub task_type: TaskType,
    pub title: String,
    pub window: TaskWindow,
    pub resource_id: Option<i64>,
    pub depends_on_task_id: Option<i64>,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
}

/// Descriptive task fields; scheduling goes through reschedule/assign.
#[derive(Debug, Clone)]
pub struct TaskDetails {
    pub title: String,
    pub task_type: TaskType,
    pub notes: Option<String>,
}

/// Optional filters for task listings. `None` means no constraint.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub bid_id: Option<i64>,
    pub status: Option<String>,
    pub task_type: Option<String>,
    pub resource_id: Option<i64>,
    pub phase_group: Option<String>,
    /// Only tasks whose window overlaps `[start, end)`.
    pub overlaps: Option<(String, String)>,
}

/// One appended task event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEventData {
    pub event_id: i64,
    pub task_id: i64,
    pub kind: String,
    pub status_after: String,
    pub note: Option<String>,
    pub photos: Vec<String>,
    pub actor_user_id: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewTaskEvent {
    pub task_id: i64,
    pub kind: TaskEventKind,
    pub note: Option<String>,
    pub photos: Vec<String>,
    pub actor_user_id: Option<i64>,
}

/// A purchase order header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseOrderData {
    pub po_id: i64,
    pub vendor: String,
    pub bid_id: Option<i64>,
    pub status: String,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// A purchase order line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseOrderItemData {
    pub item_id: i64,
    pub po_id: i64,
    pub description: String,
    pub sku: Option<String>,
    pub qty_required: i64,
    pub qty_ordered: i64,
    pub qty_received: i64,
    pub updated_at: String,
}

impl PurchaseOrderItemData {
    #[must_use]
    pub const fn quantities(&self) -> ItemQuantities {
        ItemQuantities {
            required: self.qty_required,
            ordered: self.qty_ordered,
            received: self.qty_received,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPurchaseOrder {
    pub vendor: String,
    pub bid_id: Option<i64>,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
    pub items: Vec<NewPurchaseOrderItem>,
}

#[derive(Debug, Clone)]
pub struct NewPurchaseOrderItem {
    pub description: String,
    pub sku: Option<String>,
    pub qty_required: i64,
    pub qty_ordered: i64,
}

/// Change to a nullable text column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TextUpdate {
    #[default]
    Keep,
    Clear,
    Set(String),
}

impl TextUpdate {
    /// The column value after this change is applied to `current`.
    #[must_use]
    pub fn apply(&self, current: Option<String>) -> Option<String> {
        match self {
            Self::Keep => current,
            Self::Clear => None,
            Self::Set(value) => Some(value.clone()),
        }
    }
}

/// Partial update of a line item; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct PurchaseOrderItemUpdate {
    pub description: Option<String>,
    pub sku: TextUpdate,
    pub qty_required: Option<i64>,
    pub qty_ordered: Option<i64>,
}
