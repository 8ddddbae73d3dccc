// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rescheduling checks.
//!
//! Moving a task never fails because of its dependencies. The move is
//! applied and the caller gets back a list of warnings describing any
//! ordering it broke.

use crate::error::DomainError;
use crate::task::{TaskStatus, TaskWindow};
use crate::timestamp::format_timestamp;
use serde::Serialize;

/// The parts of a task the dependency check looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTaskRef {
    pub task_id: i64,
    pub window: TaskWindow,
}

/// A non-blocking ordering problem introduced by a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DependencyWarning {
    /// The moved task now starts before its prerequisite ends.
    StartsBeforePrerequisite {
        prerequisite_task_id: i64,
        prerequisite_end: String,
    },
    /// A task depending on the moved one now starts before it ends.
    DependentStartsEarly {
        dependent_task_id: i64,
        dependent_start: String,
    },
}

/// Rejects moves of completed tasks.
///
/// # Errors
///
/// Returns `DomainError::TaskAlreadyComplete` if `status` is complete.
pub const fn ensure_movable(task_id: i64, status: TaskStatus) -> Result<(), DomainError> {
    if status.is_terminal() {
        return Err(DomainError::TaskAlreadyComplete { task_id });
    }
    Ok(())
}

/// Lists the ordering problems for a task placed at `window`.
#[must_use]
pub fn dependency_warnings(
    window: TaskWindow,
    prerequisite: Option<&ScheduledTaskRef>,
    dependents: &[ScheduledTaskRef],
) -> Vec<DependencyWarning> {
    let mut warnings = Vec::new();

    if let Some(prereq) = prerequisite.filter(|p| window.start() < p.window.end()) {
        warnings.push(DependencyWarning::StartsBeforePrerequisite {
            prerequisite_task_id: prereq.task_id,
            prerequisite_end: format_timestamp(prereq.window.end()),
        });
    }

    for dependent in dependents {
        if dependent.window.start() < window.end() {
            warnings.push(DependencyWarning::DependentStartsEarly {
                dependent_task_id: dependent.task_id,
                dependent_start: format_timestamp(dependent.window.start()),
            });
        }
    }

    warnings
}
