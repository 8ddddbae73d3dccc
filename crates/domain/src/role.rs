// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User roles and the permission matrix.
//!
//! Every account carries exactly one role. Office roles (admin, sales,
//! ops, purchasing) work against bids, the schedule and purchasing.
//! Field roles report progress on the task type they own.

use crate::error::DomainError;
use crate::task::TaskType;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Sales,
    Ops,
    Purchasing,
    Installer,
    Service,
    Manufacturing,
    Assembly,
    Delivery,
}

impl Role {
    /// All roles in display order.
    pub const ALL: [Self; 9] = [
        Self::Admin,
        Self::Sales,
        Self::Ops,
        Self::Purchasing,
        Self::Installer,
        Self::Service,
        Self::Manufacturing,
        Self::Assembly,
        Self::Delivery,
    ];

    /// Returns the stored string form of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Sales => "sales",
            Self::Ops => "ops",
            Self::Purchasing => "purchasing",
            Self::Installer => "installer",
            Self::Service => "service",
            Self::Manufacturing => "manufacturing",
            Self::Assembly => "assembly",
            Self::Delivery => "delivery",
        }
    }

    /// The task type a field role reports on, if any.
    #[must_use]
    pub const fn field_task_type(&self) -> Option<TaskType> {
        match self {
            Self::Installer => Some(TaskType::Install),
            Self::Service => Some(TaskType::Service),
            Self::Manufacturing => Some(TaskType::Manufacturing),
            Self::Assembly => Some(TaskType::Assembly),
            Self::Delivery => Some(TaskType::Delivery),
            Self::Admin | Self::Sales | Self::Ops | Self::Purchasing => None,
        }
    }

    #[must_use]
    pub const fn can_manage_users(&self) -> bool {
        matches!(self, Self::Admin)
    }

    #[must_use]
    pub const fn can_write_bids(&self) -> bool {
        matches!(self, Self::Admin | Self::Sales)
    }

    #[must_use]
    pub const fn can_read_bids(&self) -> bool {
        matches!(self, Self::Admin | Self::Sales | Self::Ops)
    }

    /// Create, move, assign, delete tasks; generate phases; manage resources.
    #[must_use]
    pub const fn can_schedule_tasks(&self) -> bool {
        matches!(self, Self::Admin | Self::Ops)
    }

    /// Whether this role may append events to a task of the given type.
    #[must_use]
    pub fn can_report_on(&self, task_type: TaskType) -> bool {
        if self.can_schedule_tasks() {
            return true;
        }
        self.field_task_type() == Some(task_type)
    }

    #[must_use]
    pub const fn can_write_purchasing(&self) -> bool {
        matches!(self, Self::Admin | Self::Purchasing)
    }

    #[must_use]
    pub const fn can_read_purchasing(&self) -> bool {
        matches!(self, Self::Admin | Self::Purchasing | Self::Ops)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| DomainError::InvalidRole(s.to_string()))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
