//! Aggregations over a board's tasks: per-member counts and daily activity.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::deadline::{DeadlineRules, DeadlineStatus};
use crate::task::Task;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemberMetrics {
    pub email: String,
    pub created: usize,
    pub completed: usize,
    pub overdue: usize,
}

/// Per-member counts, sorted by email.
///
/// Creation and overdue counts go to the creator, completion to the completer.
/// Tasks without a recorded identity are not attributed to anyone.
pub fn member_metrics<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    today: NaiveDate,
    rules: DeadlineRules,
) -> Vec<MemberMetrics> {
    let mut by_member: BTreeMap<String, MemberMetrics> = BTreeMap::new();

    for task in tasks {
        if let Some(creator) = task.creator_email.as_deref() {
            let metrics = member_entry(&mut by_member, creator);
            metrics.created += 1;
            if rules.classify(task, today) == DeadlineStatus::Overdue {
                metrics.overdue += 1;
            }
        }
        if task.completed {
            if let Some(completer) = task.completed_by.as_deref() {
                member_entry(&mut by_member, completer).completed += 1;
            }
        }
    }

    by_member.into_values().collect()
}

fn member_entry<'m>(
    by_member: &'m mut BTreeMap<String, MemberMetrics>,
    email: &str,
) -> &'m mut MemberMetrics {
    let key = email.to_lowercase();
    by_member
        .entry(key.clone())
        .or_insert_with(|| MemberMetrics {
            email: key,
            ..MemberMetrics::default()
        })
}

/// Number of tasks created on each calendar day (UTC).
pub fn activity_by_day<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> BTreeMap<NaiveDate, usize> {
    let mut days = BTreeMap::new();
    for task in tasks {
        *days.entry(task.created_at.date_naive()).or_insert(0) += 1;
    }
    days
}

/// Heat-map bucket (0-4) for a day's activity count.
pub fn activity_intensity(count: usize) -> u8 {
    match count {
        0 => 0,
        1 => 1,
        2 => 2,
        3 | 4 => 3,
        _ => 4,
    }
}
