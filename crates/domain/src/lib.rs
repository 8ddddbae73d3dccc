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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod bid;
mod calendar;
mod error;
mod phases;
mod purchasing;
mod role;
mod schedule;
mod task;
mod timestamp;
mod validation;

#[cfg(test)]
mod tests;

pub use bid::{BidStatus, DocumentLink, LineItem, PricingSnapshot};
pub use calendar::{
    CalendarEvent, CalendarEventProps, CalendarResource, CalendarView, PHONE_MAX_WIDTH,
    RESIZE_DEBOUNCE_MS, TABLET_MAX_WIDTH,
};
pub use error::DomainError;
pub use phases::{DEFAULT_PHASE_STEPS, PhaseStep, PlannedPhase, phase_group_token, plan_phases};
pub use purchasing::{
    ItemQuantities, PurchaseOrderStatus, apply_receipt, roll_up_status, validate_cancel,
};
pub use role::Role;
pub use schedule::{DependencyWarning, ScheduledTaskRef, dependency_warnings, ensure_movable};
pub use task::{InstallTask, ResourceKind, TaskEventKind, TaskStatus, TaskType, TaskWindow};
pub use timestamp::{
    BusinessCalendar, STORED_TIMESTAMP_FORMAT, format_timestamp, is_business_day,
    parse_stored_timestamp, roll_forward_to_business_day, subtract_business_days,
};
pub use validation::{normalize_email, optional_text, require_text};
