//! Task filtering.
//!
//! Provides the filter predicates and the filter settings used to compute the
//! visible subset of a column's tasks.

pub mod task_filter;
pub mod task_filters;

pub use task_filter::{
    CompletionStatusFilter, CompositeFilter, CreatedRangeFilter, DeadlineStatusFilter,
    TaskFilter, TextFilter,
};
pub use task_filters::{filter_tasks, CompletionFilter, DeadlineFilter, TaskFilters};
