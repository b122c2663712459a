//! Filter settings for the visible subset of a column.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::task_filter::{
    CompletionStatusFilter, CompositeFilter, CreatedRangeFilter, DeadlineStatusFilter,
    TaskFilter, TextFilter,
};
use crate::deadline::DeadlineRules;
use crate::task::Task;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionFilter {
    #[default]
    All,
    Completed,
    Incomplete,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadlineFilter {
    #[default]
    All,
    Overdue,
    Upcoming,
}

impl FromStr for CompletionFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "completed" => Ok(Self::Completed),
            "incomplete" => Ok(Self::Incomplete),
            other => Err(format!(
                "unknown status '{}', expected all, completed or incomplete",
                other
            )),
        }
    }
}

impl fmt::Display for CompletionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
        })
    }
}

impl FromStr for DeadlineFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "overdue" => Ok(Self::Overdue),
            "upcoming" => Ok(Self::Upcoming),
            other => Err(format!(
                "unknown deadline filter '{}', expected all, overdue or upcoming",
                other
            )),
        }
    }
}

impl fmt::Display for DeadlineFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Overdue => "overdue",
            Self::Upcoming => "upcoming",
        })
    }
}

/// What to filter by, as opposed to the [`TaskFilter`] predicates that do it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilters {
    pub query: Option<String>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    pub completion: CompletionFilter,
    pub deadline: DeadlineFilter,
}

impl TaskFilters {
    pub fn to_filter(&self, today: NaiveDate, rules: DeadlineRules) -> CompositeFilter {
        let mut filter = CompositeFilter::new();
        if let Some(query) = self.query.as_deref().filter(|q| !q.trim().is_empty()) {
            filter = filter.with_filter(Box::new(TextFilter::new(query)));
        }
        if self.created_from.is_some() || self.created_to.is_some() {
            filter = filter.with_filter(Box::new(CreatedRangeFilter::new(
                self.created_from,
                self.created_to,
            )));
        }
        if self.completion != CompletionFilter::All {
            filter = filter.with_filter(Box::new(CompletionStatusFilter(self.completion)));
        }
        if self.deadline != DeadlineFilter::All {
            filter = filter.with_filter(Box::new(DeadlineStatusFilter::new(
                self.deadline,
                today,
                rules,
            )));
        }
        filter
    }
}

/// Visible subset of `tasks`, in board order.
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    filters: &TaskFilters,
    today: NaiveDate,
    rules: DeadlineRules,
) -> Vec<&'a Task> {
    let filter = filters.to_filter(today, rules);
    tasks.iter().filter(|t| filter.matches(t)).collect()
}
