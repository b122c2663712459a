use super::{Command, CommandContext};
use crate::column::{sort_columns, Column, ColumnId};
use taskboard_core::{TaskboardError, TaskboardResult};

/// Add a column with an empty task list.
pub struct InsertColumn {
    pub column: Column,
}

impl Command for InsertColumn {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        if context.columns.iter().any(|c| c.id == self.column.id) {
            return Err(TaskboardError::Validation(format!(
                "Column {} is already on the board",
                self.column.id
            )));
        }
        context.columns.push(self.column.clone());
        sort_columns(context.columns.as_mut_slice());
        context.tasks.insert(self.column.id, Vec::new());
        context.touched.insert(self.column.id);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Create column: '{}'", self.column.name)
    }
}

/// Swap a provisional column for the server's record, re-keying its bucket.
pub struct ReplaceColumn {
    pub local_id: ColumnId,
    pub column: Column,
}

impl Command for ReplaceColumn {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        let Some(existing) = context.columns.iter_mut().find(|c| c.id == self.local_id) else {
            return Ok(());
        };
        *existing = self.column.clone();
        sort_columns(context.columns.as_mut_slice());

        let mut tasks = context.tasks.remove(&self.local_id).unwrap_or_default();
        for task in &mut tasks {
            task.column = self.column.id;
        }
        context.tasks.insert(self.column.id, tasks);
        context.touched.insert(self.local_id);
        context.touched.insert(self.column.id);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Confirm column {} as {}", self.local_id, self.column.id)
    }
}

pub struct RenameColumn {
    pub column_id: ColumnId,
    pub name: String,
}

impl Command for RenameColumn {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        let column = context
            .columns
            .iter_mut()
            .find(|c| c.id == self.column_id)
            .ok_or_else(|| TaskboardError::NotFound(format!("Column {}", self.column_id)))?;
        column.rename(self.name.clone());
        Ok(())
    }

    fn description(&self) -> String {
        format!("Rename column {} to '{}'", self.column_id, self.name)
    }
}

/// Delete a column together with its task list.
pub struct RemoveColumn {
    pub column_id: ColumnId,
}

impl Command for RemoveColumn {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        let before = context.columns.len();
        context.columns.retain(|c| c.id != self.column_id);
        if context.columns.len() == before {
            return Err(TaskboardError::NotFound(format!("Column {}", self.column_id)));
        }
        context.tasks.remove(&self.column_id);
        context.touched.insert(self.column_id);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Delete column {}", self.column_id)
    }
}
