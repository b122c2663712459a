//! Task filter predicates.
//!
//! Each filter answers a single question about one task; [`CompositeFilter`]
//! combines them with AND logic.

use chrono::NaiveDate;

use super::task_filters::{CompletionFilter, DeadlineFilter};
use crate::deadline::{DeadlineRules, DeadlineStatus};
use crate::task::Task;

pub trait TaskFilter {
    fn matches(&self, task: &Task) -> bool;
}

/// Case-insensitive substring match on title or description.
pub struct TextFilter {
    needle: String,
}

impl TextFilter {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.trim().to_lowercase(),
        }
    }
}

impl TaskFilter for TextFilter {
    fn matches(&self, task: &Task) -> bool {
        self.needle.is_empty() || task.matches_text(&self.needle)
    }
}

/// Creation date within inclusive bounds; either bound may be open.
pub struct CreatedRangeFilter {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl CreatedRangeFilter {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }
}

impl TaskFilter for CreatedRangeFilter {
    fn matches(&self, task: &Task) -> bool {
        let created = task.created_at.date_naive();
        self.from.map_or(true, |from| created >= from) && self.to.map_or(true, |to| created <= to)
    }
}

pub struct CompletionStatusFilter(pub CompletionFilter);

impl TaskFilter for CompletionStatusFilter {
    fn matches(&self, task: &Task) -> bool {
        match self.0 {
            CompletionFilter::All => true,
            CompletionFilter::Completed => task.completed,
            CompletionFilter::Incomplete => !task.completed,
        }
    }
}

pub struct DeadlineStatusFilter {
    wanted: DeadlineFilter,
    today: NaiveDate,
    rules: DeadlineRules,
}

impl DeadlineStatusFilter {
    pub fn new(wanted: DeadlineFilter, today: NaiveDate, rules: DeadlineRules) -> Self {
        Self {
            wanted,
            today,
            rules,
        }
    }
}

impl TaskFilter for DeadlineStatusFilter {
    fn matches(&self, task: &Task) -> bool {
        let status = self.rules.classify(task, self.today);
        match self.wanted {
            DeadlineFilter::All => true,
            DeadlineFilter::Overdue => status == DeadlineStatus::Overdue,
            DeadlineFilter::Upcoming => status == DeadlineStatus::Upcoming,
        }
    }
}

/// A task matches only if it passes every filter. Empty matches everything.
#[derive(Default)]
pub struct CompositeFilter {
    filters: Vec<Box<dyn TaskFilter>>,
}

impl CompositeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: Box<dyn TaskFilter>) -> Self {
        self.filters.push(filter);
        self
    }
}

impl TaskFilter for CompositeFilter {
    fn matches(&self, task: &Task) -> bool {
        self.filters.iter().all(|f| f.matches(task))
    }
}
