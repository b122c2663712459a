//! Contract of the REST backend the board is persisted to.
//!
//! The backend is the ground truth. Implementations map transport failures
//! and non-2xx responses to recoverable [`TaskboardError`] variants and a
//! missing sign-in to [`TaskboardError::Unauthenticated`].
//!
//! [`TaskboardError`]: taskboard_core::TaskboardError
//! [`TaskboardError::Unauthenticated`]: taskboard_core::TaskboardError::Unauthenticated

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taskboard_core::TaskboardResult;

use crate::column::{Column, ColumnDraft, ColumnId};
use crate::project::{Project, ProjectId, ProjectUpdate};
use crate::task::{Task, TaskDraft, TaskId};

/// Signed-in user as supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
}

impl Identity {
    /// Name recorded as the completer of a task.
    pub fn display_identity(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.user_id)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn list_projects(&self) -> TaskboardResult<Vec<Project>>;
    async fn create_project(&self, name: &str) -> TaskboardResult<Project>;
    async fn update_project(
        &self,
        id: ProjectId,
        update: &ProjectUpdate,
    ) -> TaskboardResult<Project>;
    async fn delete_project(&self, id: ProjectId) -> TaskboardResult<()>;

    async fn list_columns(&self, project: ProjectId) -> TaskboardResult<Vec<Column>>;
    async fn create_column(&self, draft: &ColumnDraft) -> TaskboardResult<Column>;
    async fn update_column(&self, column: &Column) -> TaskboardResult<Column>;
    async fn delete_column(&self, id: ColumnId) -> TaskboardResult<()>;

    async fn list_tasks(&self, column: ColumnId) -> TaskboardResult<Vec<Task>>;
    async fn create_task(&self, draft: &TaskDraft) -> TaskboardResult<Task>;
    /// Sends the full task record, including `column`/`order` for moves.
    async fn update_task(&self, task: &Task) -> TaskboardResult<Task>;
    async fn delete_task(&self, id: TaskId) -> TaskboardResult<()>;
}
