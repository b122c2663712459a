use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use taskboard_core::{Ordered, TaskboardError, TaskboardResult};

use crate::column::ColumnId;
use crate::field_update::FieldUpdate;

pub type TaskId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub column: ColumnId,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, alias = "creator_id")]
    pub creator: Option<String>,
    #[serde(default)]
    pub creator_email: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_by: Option<String>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /tasks/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDraft {
    pub title: String,
    pub column: ColumnId,
    pub order: i32,
    pub description: String,
    pub creator_id: Option<String>,
    pub creator_email: Option<String>,
}

/// Edit of the user-facing task fields. Column and order only change
/// through moves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub deadline: FieldUpdate<NaiveDate>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && !self.deadline.is_change()
    }

    pub fn validate(&self) -> TaskboardResult<()> {
        if let Some(title) = &self.title {
            Task::validate_title(title)?;
        }
        Ok(())
    }
}

impl Task {
    pub fn validate_title(title: &str) -> TaskboardResult<String> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(TaskboardError::Validation(
                "task title must not be empty".into(),
            ));
        }
        Ok(trimmed.to_string())
    }

    /// Local placeholder built from a draft while the create request is in flight.
    pub fn provisional(id: TaskId, draft: &TaskDraft) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            column: draft.column,
            order: draft.order,
            created_at: now,
            updated_at: now,
            creator: draft.creator_id.clone(),
            creator_email: draft.creator_email.clone(),
            completed: false,
            completed_by: None,
            deadline: None,
        }
    }

    pub fn is_provisional(&self) -> bool {
        self.id < 0
    }

    /// `actor` is recorded as the completer when the update marks the task done.
    pub fn apply(&mut self, update: TaskUpdate, actor: Option<&str>) {
        if let Some(title) = update.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(completed) = update.completed {
            if completed && !self.completed {
                self.completed_by = actor.map(str::to_string);
            } else if !completed {
                self.completed_by = None;
            }
            self.completed = completed;
        }
        update.deadline.apply_to(&mut self.deadline);
        self.updated_at = Utc::now();
    }

    pub fn move_to_column(&mut self, column: ColumnId, order: i32) {
        self.column = column;
        self.order = order;
        self.updated_at = Utc::now();
    }

    pub fn matches_text(&self, needle_lowercase: &str) -> bool {
        self.title.to_lowercase().contains(needle_lowercase)
            || self.description.to_lowercase().contains(needle_lowercase)
    }
}

impl Ordered for Task {
    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }
}

/// Column display order: by `order`, ties broken by server id.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| (t.order, t.id));
}
