// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required text field is empty.
    MissingField(&'static str),
    /// An email address is malformed.
    InvalidEmail(String),
    /// Role string is not a known role.
    InvalidRole(String),
    /// Task type string is not a known task type.
    InvalidTaskType(String),
    /// Task status string is not a known status.
    InvalidTaskStatus(String),
    /// Task event kind string is not a known kind.
    InvalidTaskEventKind(String),
    /// A task status transition is not permitted.
    InvalidTaskTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition was rejected.
        reason: String,
    },
    /// A task window ends at or before it starts.
    InvalidTaskWindow {
        /// The window start (UTC).
        start: String,
        /// The window end (UTC).
        end: String,
    },
    /// A completed task cannot be rescheduled.
    TaskAlreadyComplete {
        /// The task identifier.
        task_id: i64,
    },
    /// A timestamp could not be parsed.
    InvalidTimestamp {
        /// The raw input.
        value: String,
        /// The parser message.
        error: String,
    },
    /// A local time does not exist in the business timezone (DST gap).
    NonexistentLocalTime {
        /// The local wall-clock time that could not be resolved.
        local: String,
    },
    /// Timezone name is not a known IANA zone.
    InvalidTimezone(String),
    /// Workday hours are out of range or inverted.
    InvalidWorkdayHours {
        /// Start hour (0-23).
        start_hour: u32,
        /// End hour (1-24).
        end_hour: u32,
    },
    /// Phase template is empty or not ordered toward the install date.
    InvalidPhaseTemplate(String),
    /// Resource kind string is not a known kind.
    InvalidResourceKind(String),
    /// Bid status string is not a known status.
    InvalidBidStatus(String),
    /// A bid status transition is not permitted.
    InvalidBidTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },
    /// Pricing input is invalid.
    InvalidPricing(String),
    /// A document link is invalid.
    InvalidDocumentLink(String),
    /// A quantity is negative or would overflow.
    InvalidQuantity {
        /// The field holding the quantity.
        field: &'static str,
        /// The offending value.
        value: i64,
    },
    /// Purchase order status string is not a known status.
    InvalidPurchaseOrderStatus(String),
    /// Receipts cannot be recorded against a cancelled purchase order.
    PurchaseOrderCancelled,
    /// A purchase order with received quantities cannot be cancelled.
    PurchaseOrderHasReceipts,
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "Field '{field}' is required"),
            Self::InvalidEmail(email) => write!(f, "Invalid email address: '{email}'"),
            Self::InvalidRole(role) => write!(f, "Invalid role: '{role}'"),
            Self::InvalidTaskType(value) => write!(f, "Invalid task type: '{value}'"),
            Self::InvalidTaskStatus(value) => write!(f, "Invalid task status: '{value}'"),
            Self::InvalidTaskEventKind(value) => {
                write!(f, "Invalid task event kind: '{value}'")
            }
            Self::InvalidTaskTransition { from, to, reason } => {
                write!(f, "Cannot move task from '{from}' to '{to}': {reason}")
            }
            Self::InvalidTaskWindow { start, end } => {
                write!(f, "Task window end {end} must be after start {start}")
            }
            Self::TaskAlreadyComplete { task_id } => {
                write!(f, "Task {task_id} is complete and cannot be rescheduled")
            }
            Self::InvalidTimestamp { value, error } => {
                write!(f, "Failed to parse timestamp '{value}': {error}")
            }
            Self::NonexistentLocalTime { local } => {
                write!(
                    f,
                    "Local time {local} does not exist in the business timezone"
                )
            }
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone: '{tz}'"),
            Self::InvalidWorkdayHours {
                start_hour,
                end_hour,
            } => {
                write!(
                    f,
                    "Invalid workday hours: start {start_hour} must be before end {end_hour} (0-24)"
                )
            }
            Self::InvalidPhaseTemplate(msg) => write!(f, "Invalid phase template: {msg}"),
            Self::InvalidResourceKind(kind) => write!(f, "Invalid resource kind: '{kind}'"),
            Self::InvalidBidStatus(value) => write!(f, "Invalid bid status: '{value}'"),
            Self::InvalidBidTransition { from, to } => {
                write!(f, "Cannot move bid from '{from}' to '{to}'")
            }
            Self::InvalidPricing(msg) => write!(f, "Invalid pricing: {msg}"),
            Self::InvalidDocumentLink(msg) => write!(f, "Invalid document link: {msg}"),
            Self::InvalidQuantity { field, value } => {
                write!(f, "Invalid quantity for '{field}': {value}")
            }
            Self::InvalidPurchaseOrderStatus(value) => {
                write!(f, "Invalid purchase order status: '{value}'")
            }
            Self::PurchaseOrderCancelled => {
                write!(f, "Purchase order is cancelled")
            }
            Self::PurchaseOrderHasReceipts => {
                write!(
                    f,
                    "Purchase order has received items and cannot be cancelled"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
