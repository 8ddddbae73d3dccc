// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Phase generation for a job.
//!
//! A job moves through manufacturing, assembly, delivery and install.
//! Given an install date, each phase is placed a fixed number of business
//! days ahead of it and occupies one working day. Each phase depends on
//! the one before it.

use crate::error::DomainError;
use crate::task::{TaskType, TaskWindow};
use crate::timestamp::{BusinessCalendar, roll_forward_to_business_day, subtract_business_days};
use chrono::NaiveDate;

/// One step of a phase template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseStep {
    pub task_type: TaskType,
    /// Business days before the install date.
    pub lead_business_days: u32,
}

/// The standard template: manufacturing 10, assembly 5, delivery 1 and
/// install 0 business days ahead of the install date.
pub const DEFAULT_PHASE_STEPS: [PhaseStep; 4] = [
    PhaseStep {
        task_type: TaskType::Manufacturing,
        lead_business_days: 10,
    },
    PhaseStep {
        task_type: TaskType::Assembly,
        lead_business_days: 5,
    },
    PhaseStep {
        task_type: TaskType::Delivery,
        lead_business_days: 1,
    },
    PhaseStep {
        task_type: TaskType::Install,
        lead_business_days: 0,
    },
];

/// A task to be created for a phase group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPhase {
    pub task_type: TaskType,
    pub title: String,
    pub window: TaskWindow,
    /// 1-based position within the group.
    pub phase_order: i32,
    /// Position of the prerequisite phase within the plan, if any.
    pub depends_on_index: Option<usize>,
}

/// Plans the phases for a job.
///
/// An install date on a weekend rolls forward to the next Monday.
///
/// # Errors
///
/// Returns `DomainError::InvalidPhaseTemplate` if `steps` is empty or lead
/// times do not strictly decrease, or a timestamp error if a working day
/// cannot be resolved in the business timezone.
pub fn plan_phases(
    install_date: NaiveDate,
    job_name: &str,
    calendar: &BusinessCalendar,
    steps: &[PhaseStep],
) -> Result<Vec<PlannedPhase>, DomainError> {
    if steps.is_empty() {
        return Err(DomainError::InvalidPhaseTemplate(String::from(
            "at least one step is required",
        )));
    }
    if steps
        .windows(2)
        .any(|pair| pair[0].lead_business_days <= pair[1].lead_business_days)
    {
        return Err(DomainError::InvalidPhaseTemplate(String::from(
            "lead times must strictly decrease toward the install date",
        )));
    }

    let anchor = roll_forward_to_business_day(install_date);
    let job_name = job_name.trim();

    let mut planned = Vec::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        let day = subtract_business_days(anchor, step.lead_business_days)?;
        let (start, end) = calendar.workday_window(day)?;
        let phase_order = i32::try_from(index + 1).map_err(|_| {
            DomainError::InvalidPhaseTemplate(String::from("too many phase steps"))
        })?;

        planned.push(PlannedPhase {
            task_type: step.task_type,
            title: format!("{job_name} - {}", step.task_type.label()),
            window: TaskWindow::new(start, end)?,
            phase_order,
            depends_on_index: index.checked_sub(1),
        });
    }

    Ok(planned)
}

/// Generates a phase group token.
///
/// Tokens only need to be unique per database; the caller supplies the
/// randomness so this crate stays free of I/O.
#[must_use]
pub fn phase_group_token(bid_id: i64, nonce: u64) -> String {
    format!("pg-{bid_id}-{nonce:016x}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::timestamp::format_timestamp;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_plan_places_phases_on_business_days() {
        let calendar = BusinessCalendar::default();
        // Install on Monday 2026-03-23.
        let plan = plan_phases(
            date(2026, 3, 23),
            "Smith Kitchen",
            &calendar,
            &DEFAULT_PHASE_STEPS,
        )
        .unwrap();

        assert_eq!(plan.len(), 4);
        let days: Vec<String> = plan
            .iter()
            .map(|p| format_timestamp(p.window.start()))
            .collect();
        // Chicago is UTC-5 after 2026-03-08, so 07:00 local is 12:00Z.
        assert_eq!(
            days,
            vec![
                "2026-03-09T12:00:00Z",
                "2026-03-16T12:00:00Z",
                "2026-03-20T12:00:00Z",
                "2026-03-23T12:00:00Z",
            ]
        );
        assert_eq!(
            format_timestamp(plan[3].window.end()),
            "2026-03-23T21:00:00Z"
        );
    }

    #[test]
    fn test_plan_chains_dependencies_in_order() {
        let calendar = BusinessCalendar::default();
        let plan = plan_phases(date(2026, 3, 23), "Job", &calendar, &DEFAULT_PHASE_STEPS).unwrap();

        let types: Vec<TaskType> = plan.iter().map(|p| p.task_type).collect();
        assert_eq!(
            types,
            vec![
                TaskType::Manufacturing,
                TaskType::Assembly,
                TaskType::Delivery,
                TaskType::Install
            ]
        );
        assert_eq!(plan[0].depends_on_index, None);
        assert_eq!(plan[1].depends_on_index, Some(0));
        assert_eq!(plan[3].depends_on_index, Some(2));
        assert_eq!(
            plan.iter().map(|p| p.phase_order).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(plan[3].title, "Job - Install");
    }

    #[test]
    fn test_weekend_install_rolls_forward() {
        let calendar = BusinessCalendar::default();
        let saturday = plan_phases(date(2026, 3, 21), "Job", &calendar, &DEFAULT_PHASE_STEPS)
            .unwrap();
        let monday = plan_phases(date(2026, 3, 23), "Job", &calendar, &DEFAULT_PHASE_STEPS)
            .unwrap();
        assert_eq!(saturday, monday);
    }

    #[test]
    fn test_rejects_non_decreasing_template() {
        let calendar = BusinessCalendar::default();
        let steps = [
            PhaseStep {
                task_type: TaskType::Delivery,
                lead_business_days: 1,
            },
            PhaseStep {
                task_type: TaskType::Install,
                lead_business_days: 1,
            },
        ];
        assert!(matches!(
            plan_phases(date(2026, 3, 23), "Job", &calendar, &steps),
            Err(DomainError::InvalidPhaseTemplate(_))
        ));
        assert!(plan_phases(date(2026, 3, 23), "Job", &calendar, &[]).is_err());
    }

    #[test]
    fn test_phase_group_token_format() {
        assert_eq!(phase_group_token(7, 255), "pg-7-00000000000000ff");
    }
}
