// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar feed shapes.
//!
//! The office calendar is a `FullCalendar` resource timeline. These types
//! serialize directly into the event and resource objects it consumes.

use crate::task::{InstallTask, TaskStatus};
use crate::timestamp::format_timestamp;
use serde::Serialize;

/// Widths below this render the agenda list.
pub const PHONE_MAX_WIDTH: u32 = 480;
/// Widths below this (and at least [`PHONE_MAX_WIDTH`]) render a single day.
pub const TABLET_MAX_WIDTH: u32 = 768;
/// Clients wait this long after the last resize before re-rendering.
pub const RESIZE_DEBOUNCE_MS: u64 = 300;

const COMPLETE_COLOR: &str = "#95a5a6";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventProps {
    pub task_type: String,
    pub status: String,
    pub bid_id: Option<i64>,
    pub phase_group: Option<String>,
    pub phase_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: String,
    pub end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub background_color: String,
    pub extended_props: CalendarEventProps,
}

impl CalendarEvent {
    #[must_use]
    pub fn from_task(task: &InstallTask) -> Self {
        let background_color = if task.status == TaskStatus::Complete {
            COMPLETE_COLOR
        } else {
            task.task_type.color()
        };

        Self {
            id: task.task_id.to_string(),
            title: format!("{}: {}", task.task_type.label(), task.title),
            start: format_timestamp(task.window.start()),
            end: format_timestamp(task.window.end()),
            resource_id: task.resource_id.map(|id| id.to_string()),
            background_color: background_color.to_string(),
            extended_props: CalendarEventProps {
                task_type: task.task_type.as_str().to_string(),
                status: task.status.as_str().to_string(),
                bid_id: task.bid_id,
                phase_group: task.phase_group.clone(),
                phase_order: task.phase_order,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarResource {
    pub id: String,
    pub title: String,
}

impl CalendarResource {
    #[must_use]
    pub fn new(resource_id: i64, name: &str) -> Self {
        Self {
            id: resource_id.to_string(),
            title: name.to_string(),
        }
    }
}

/// Calendar view chosen from the viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CalendarView {
    #[serde(rename = "listWeek")]
    ListWeek,
    #[serde(rename = "timeGridDay")]
    TimeGridDay,
    #[serde(rename = "timeGridWeek")]
    TimeGridWeek,
}

impl CalendarView {
    #[must_use]
    pub const fn for_width(width: u32) -> Self {
        if width < PHONE_MAX_WIDTH {
            Self::ListWeek
        } else if width < TABLET_MAX_WIDTH {
            Self::TimeGridDay
        } else {
            Self::TimeGridWeek
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ListWeek => "listWeek",
            Self::TimeGridDay => "timeGridDay",
            Self::TimeGridWeek => "timeGridWeek",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::task::{TaskType, TaskWindow};
    use chrono::{TimeZone, Utc};

    fn task(status: TaskStatus, resource_id: Option<i64>) -> InstallTask {
        InstallTask {
            task_id: 12,
            bid_id: Some(3),
            task_type: TaskType::Install,
            title: String::from("Smith Kitchen"),
            status,
            window: TaskWindow::new(
                Utc.with_ymd_and_hms(2026, 3, 23, 12, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 3, 23, 21, 0, 0).unwrap(),
            )
            .unwrap(),
            resource_id,
            phase_group: Some(String::from("pg-3-0000000000000001")),
            phase_order: Some(4),
            depends_on_task_id: Some(11),
        }
    }

    #[test]
    fn test_view_breakpoints() {
        assert_eq!(CalendarView::for_width(0), CalendarView::ListWeek);
        assert_eq!(CalendarView::for_width(479), CalendarView::ListWeek);
        assert_eq!(CalendarView::for_width(480), CalendarView::TimeGridDay);
        assert_eq!(CalendarView::for_width(767), CalendarView::TimeGridDay);
        assert_eq!(CalendarView::for_width(768), CalendarView::TimeGridWeek);
        assert_eq!(CalendarView::for_width(1920), CalendarView::TimeGridWeek);
    }

    #[test]
    fn test_event_shape() {
        let event = CalendarEvent::from_task(&task(TaskStatus::Scheduled, Some(5)));
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["id"], "12");
        assert_eq!(json["title"], "Install: Smith Kitchen");
        assert_eq!(json["start"], "2026-03-23T12:00:00Z");
        assert_eq!(json["end"], "2026-03-23T21:00:00Z");
        assert_eq!(json["resourceId"], "5");
        assert_eq!(json["backgroundColor"], TaskType::Install.color());
        assert_eq!(json["extendedProps"]["taskType"], "install");
        assert_eq!(json["extendedProps"]["bidId"], 3);
        assert_eq!(json["extendedProps"]["phaseOrder"], 4);
    }

    #[test]
    fn test_unassigned_event_omits_resource() {
        let event = CalendarEvent::from_task(&task(TaskStatus::Scheduled, None));
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("resourceId").is_none());
    }

    #[test]
    fn test_complete_events_are_grey() {
        let event = CalendarEvent::from_task(&task(TaskStatus::Complete, None));
        assert_eq!(event.background_color, COMPLETE_COLOR);
        assert_eq!(event.extended_props.status, "complete");
    }

    #[test]
    fn test_view_serializes_as_fullcalendar_name() {
        let json = serde_json::to_value(CalendarView::TimeGridDay).unwrap();
        assert_eq!(json, "timeGridDay");
        assert_eq!(CalendarView::ListWeek.as_str(), "listWeek");
    }
}
