// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Install task types, status lifecycle and task events.
//!
//! Task status only moves forward:
//!
//! ```text
//! scheduled -> in_progress -> complete
//! ```
//!
//! Field crews drive the lifecycle by reporting events. `on_the_way`,
//! `arrived` and `wip` put a task in progress; `complete` finishes it.
//! A complete task accepts no further events.

use crate::error::DomainError;
use crate::timestamp::format_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Manufacturing,
    Assembly,
    Delivery,
    Install,
    Service,
}

impl TaskType {
    pub const ALL: [Self; 5] = [
        Self::Manufacturing,
        Self::Assembly,
        Self::Delivery,
        Self::Install,
        Self::Service,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manufacturing => "manufacturing",
            Self::Assembly => "assembly",
            Self::Delivery => "delivery",
            Self::Install => "install",
            Self::Service => "service",
        }
    }

    /// Human-readable label used in calendar titles.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Manufacturing => "Manufacturing",
            Self::Assembly => "Assembly",
            Self::Delivery => "Delivery",
            Self::Install => "Install",
            Self::Service => "Service",
        }
    }

    /// Calendar background color for open tasks of this type.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Manufacturing => "#8e44ad",
            Self::Assembly => "#2980b9",
            Self::Delivery => "#e67e22",
            Self::Install => "#27ae60",
            Self::Service => "#c0392b",
        }
    }
}

impl FromStr for TaskType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::InvalidTaskType(s.to_string()))
    }
}

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Scheduled,
    InProgress,
    Complete,
}

impl TaskStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Validates a move from this status to `next`.
    ///
    /// Repeating `in_progress` is allowed so crews can report several
    /// progress events on the same task.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTaskTransition` when the task is
    /// complete or when `next` would roll the task back to `scheduled`.
    pub fn validate_transition(&self, next: Self) -> Result<(), DomainError> {
        let reason = match (self, next) {
            (Self::Complete, _) => Some("task is already complete"),
            (_, Self::Scheduled) => Some("tasks cannot return to scheduled"),
            (Self::Scheduled | Self::InProgress, Self::InProgress | Self::Complete) => None,
        };

        reason.map_or(Ok(()), |reason| {
            Err(DomainError::InvalidTaskTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
                reason: reason.to_string(),
            })
        })
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "in_progress" => Ok(Self::InProgress),
            "complete" => Ok(Self::Complete),
            _ => Err(DomainError::InvalidTaskStatus(s.to_string())),
        }
    }
}

/// A progress report from the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskEventKind {
    OnTheWay,
    Arrived,
    Wip,
    Complete,
}

impl TaskEventKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OnTheWay => "on_the_way",
            Self::Arrived => "arrived",
            Self::Wip => "wip",
            Self::Complete => "complete",
        }
    }

    /// The task status this event moves the task into.
    #[must_use]
    pub const fn status_after(&self) -> TaskStatus {
        match self {
            Self::OnTheWay | Self::Arrived | Self::Wip => TaskStatus::InProgress,
            Self::Complete => TaskStatus::Complete,
        }
    }

    /// Resolves the status a task moves into when this event is applied.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTaskTransition` if the task cannot
    /// accept the event in its current status.
    pub fn apply_to(&self, current: TaskStatus) -> Result<TaskStatus, DomainError> {
        let next = self.status_after();
        current.validate_transition(next)?;
        Ok(next)
    }
}

impl FromStr for TaskEventKind {
    type Err = DomainError;

    /// Accepts both `on_the_way` and `on-the-way` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "on_the_way" => Ok(Self::OnTheWay),
            "arrived" => Ok(Self::Arrived),
            "wip" => Ok(Self::Wip),
            "complete" => Ok(Self::Complete),
            _ => Err(DomainError::InvalidTaskEventKind(s.to_string())),
        }
    }
}

/// Kind of schedulable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Crew,
    Individual,
}

impl ResourceKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Crew => "crew",
            Self::Individual => "individual",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crew" => Ok(Self::Crew),
            "individual" => Ok(Self::Individual),
            _ => Err(DomainError::InvalidResourceKind(s.to_string())),
        }
    }
}

/// A validated scheduling window, stored in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TaskWindow {
    /// Creates a window.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTaskWindow` unless `end` is strictly
    /// after `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DomainError> {
        if end <= start {
            return Err(DomainError::InvalidTaskWindow {
                start: format_timestamp(start),
                end: format_timestamp(end),
            });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Half-open overlap test against `[range_start, range_end)`.
    #[must_use]
    pub fn overlaps(&self, range_start: DateTime<Utc>, range_end: DateTime<Utc>) -> bool {
        self.start < range_end && self.end > range_start
    }
}

/// A scheduled unit of work, as the rules see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTask {
    pub task_id: i64,
    pub bid_id: Option<i64>,
    pub task_type: TaskType,
    pub title: String,
    pub status: TaskStatus,
    pub window: TaskWindow,
    pub resource_id: Option<i64>,
    pub phase_group: Option<String>,
    pub phase_order: Option<i32>,
    pub depends_on_task_id: Option<i64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_cannot_leave_complete() {
        for next in [
            TaskStatus::Scheduled,
            TaskStatus::InProgress,
            TaskStatus::Complete,
        ] {
            assert!(TaskStatus::Complete.validate_transition(next).is_err());
        }
    }

    #[test]
    fn test_status_cannot_return_to_scheduled() {
        let err = TaskStatus::InProgress
            .validate_transition(TaskStatus::Scheduled)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidTaskTransition { .. }));
    }

    #[test]
    fn test_scheduled_task_can_complete_directly() {
        assert_eq!(
            TaskEventKind::Complete.apply_to(TaskStatus::Scheduled),
            Ok(TaskStatus::Complete)
        );
    }

    #[test]
    fn test_progress_events_repeat() {
        let status = TaskEventKind::OnTheWay
            .apply_to(TaskStatus::Scheduled)
            .unwrap();
        let status = TaskEventKind::Arrived.apply_to(status).unwrap();
        let status = TaskEventKind::Wip.apply_to(status).unwrap();
        assert_eq!(status, TaskStatus::InProgress);
    }

    #[test]
    fn test_event_kind_accepts_hyphenated_spelling() {
        assert_eq!(
            TaskEventKind::from_str("on-the-way"),
            Ok(TaskEventKind::OnTheWay)
        );
        assert_eq!(TaskEventKind::from_str("WIP"), Ok(TaskEventKind::Wip));
        assert!(TaskEventKind::from_str("left").is_err());
    }

    #[test]
    fn test_window_requires_end_after_start() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 13, 0, 0).unwrap();
        assert!(TaskWindow::new(start, start).is_err());
        assert!(TaskWindow::new(start, start - chrono::Duration::hours(1)).is_err());
        assert!(TaskWindow::new(start, start + chrono::Duration::minutes(1)).is_ok());
    }

    #[test]
    fn test_window_overlap_is_half_open() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 13, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 2, 22, 0, 0).unwrap();
        let window = TaskWindow::new(start, end).unwrap();

        assert!(window.overlaps(start, end));
        assert!(!window.overlaps(end, end + chrono::Duration::days(1)));
        assert!(!window.overlaps(start - chrono::Duration::days(1), start));
        assert!(window.overlaps(
            start - chrono::Duration::hours(1),
            start + chrono::Duration::seconds(1)
        ));
    }

    #[test]
    fn test_task_type_round_trip_and_labels() {
        for task_type in TaskType::ALL {
            assert_eq!(TaskType::from_str(task_type.as_str()), Ok(task_type));
        }
        assert_eq!(TaskType::Install.label(), "Install");
    }
}
