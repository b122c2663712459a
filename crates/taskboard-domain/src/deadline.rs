//! Deadline classification.
//!
//! Two views disagree on completed tasks whose deadline has passed: the
//! per-task badge calls them `Met`, aggregate metrics call them `Overdue`.
//! [`DeadlineRules`] makes the choice explicit at every call site.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use taskboard_core::AppConfig;

use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineStatus {
    NoDeadline,
    Upcoming,
    Overdue,
    Met,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineRules {
    pub overdue_includes_completed: bool,
}

impl DeadlineRules {
    /// Rules for the per-task badge: a completed task is never overdue.
    pub const BADGE: Self = Self {
        overdue_includes_completed: false,
    };

    /// Rules for aggregate views: a past deadline is overdue regardless of completion.
    pub const AGGREGATE: Self = Self {
        overdue_includes_completed: true,
    };

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            overdue_includes_completed: config.overdue_includes_completed,
        }
    }

    pub fn classify(&self, task: &Task, today: NaiveDate) -> DeadlineStatus {
        let Some(deadline) = task.deadline else {
            return DeadlineStatus::NoDeadline;
        };
        if deadline < today {
            if !task.completed || self.overdue_includes_completed {
                DeadlineStatus::Overdue
            } else {
                DeadlineStatus::Met
            }
        } else if task.completed {
            DeadlineStatus::Met
        } else {
            // due today still counts as upcoming
            DeadlineStatus::Upcoming
        }
    }
}

impl Default for DeadlineRules {
    fn default() -> Self {
        Self::AGGREGATE
    }
}
