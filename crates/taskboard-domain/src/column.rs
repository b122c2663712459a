use serde::{Deserialize, Serialize};
use taskboard_core::{Ordered, TaskboardError, TaskboardResult};

use crate::project::ProjectId;

pub type ColumnId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub project: ProjectId,
    pub order: i32,
}

/// Body of `POST /columns/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDraft {
    pub name: String,
    pub project: ProjectId,
    pub order: i32,
}

impl Column {
    pub fn validate_name(name: &str) -> TaskboardResult<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(TaskboardError::Validation(
                "column name must not be empty".into(),
            ));
        }
        Ok(trimmed.to_string())
    }

    /// Columns created locally carry a negative id until the server assigns one.
    pub fn is_provisional(&self) -> bool {
        self.id < 0
    }

    pub fn rename(&mut self, name: String) {
        self.name = name;
    }
}

impl Ordered for Column {
    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }
}

/// Board display order: by `order`, ties broken by server id.
pub fn sort_columns(columns: &mut [Column]) {
    columns.sort_by_key(|c| (c.order, c.id));
}
