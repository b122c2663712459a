use super::{Command, CommandContext};
use crate::column::ColumnId;
use crate::task::{sort_tasks, Task, TaskId, TaskUpdate};
use taskboard_core::{resequence, TaskboardError, TaskboardResult};

/// Move a task within or across columns and renumber both lists so
/// `order` equals array position.
pub struct MoveTask {
    pub task_id: TaskId,
    pub from_column: ColumnId,
    pub to_column: ColumnId,
    pub from_index: usize,
    pub to_index: usize,
}

impl Command for MoveTask {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        let source_len = {
            let source = context.bucket_mut(self.from_column)?;
            if source.get(self.from_index).map(|t| t.id) != Some(self.task_id) {
                return Err(TaskboardError::NotFound(format!(
                    "Task {} at position {} of column {}",
                    self.task_id, self.from_index, self.from_column
                )));
            }
            source.len()
        };
        let max_index = if self.from_column == self.to_column {
            source_len - 1
        } else {
            context.bucket_mut(self.to_column)?.len()
        };
        if self.to_index > max_index {
            return Err(TaskboardError::Validation(format!(
                "position {} is past the end of column {}",
                self.to_index, self.to_column
            )));
        }
        let order = i32::try_from(self.to_index).map_err(|_| {
            TaskboardError::Validation(format!("position {} is out of range", self.to_index))
        })?;

        let mut task = context.bucket_mut(self.from_column)?.remove(self.from_index);
        task.move_to_column(self.to_column, order);
        let destination = context.bucket_mut(self.to_column)?;
        destination.insert(self.to_index, task);
        resequence(destination);
        resequence(context.bucket_mut(self.from_column)?);

        context.touched.insert(self.from_column);
        context.touched.insert(self.to_column);
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "Move task {} from column {}[{}] to column {}[{}]",
            self.task_id, self.from_column, self.from_index, self.to_column, self.to_index
        )
    }
}

/// Append a task to the end of its column.
pub struct InsertTask {
    pub task: Task,
}

impl Command for InsertTask {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        if context.locate(self.task.id).is_some() {
            return Err(TaskboardError::Validation(format!(
                "Task {} is already on the board",
                self.task.id
            )));
        }
        context.bucket_mut(self.task.column)?.push(self.task.clone());
        context.touched.insert(self.task.column);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Insert task '{}' into column {}", self.task.title, self.task.column)
    }
}

/// Edit title, description, completion or deadline in place.
pub struct PatchTask {
    pub task_id: TaskId,
    pub update: TaskUpdate,
    pub actor: Option<String>,
}

impl Command for PatchTask {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        let (column, index) = context
            .locate(self.task_id)
            .ok_or_else(|| TaskboardError::NotFound(format!("Task {}", self.task_id)))?;
        context.bucket_mut(column)?[index].apply(self.update.clone(), self.actor.as_deref());
        context.touched.insert(column);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Update task {}", self.task_id)
    }
}

pub struct RemoveTask {
    pub task_id: TaskId,
}

impl Command for RemoveTask {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        let (column, index) = context
            .locate(self.task_id)
            .ok_or_else(|| TaskboardError::NotFound(format!("Task {}", self.task_id)))?;
        context.bucket_mut(column)?.remove(index);
        context.touched.insert(column);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Delete task {}", self.task_id)
    }
}

/// Swap a record for the server's version of it, keeping its position.
///
/// Used for create confirmations (provisional id → server id) and update
/// echoes. A record that is gone, or has since moved to another column, is
/// left alone: the local state is newer.
pub struct ReplaceTask {
    pub local_id: TaskId,
    pub task: Task,
}

impl Command for ReplaceTask {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        if let Some((column, index)) = context.locate(self.local_id) {
            if column == self.task.column {
                let bucket = context.bucket_mut(column)?;
                bucket[index] = self.task.clone();
            }
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("Confirm task {} as {}", self.local_id, self.task.id)
    }
}

/// Replace a column's whole list with a server snapshot.
///
/// Tasks in the snapshot that are stored under another column are dropped
/// from that column, so no task is ever held twice. Every column that loses
/// a task this way counts as touched.
pub struct ReplaceColumnTasks {
    pub column_id: ColumnId,
    pub tasks: Vec<Task>,
}

impl Command for ReplaceColumnTasks {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()> {
        if !context.tasks.contains_key(&self.column_id) {
            return Err(TaskboardError::NotFound(format!("Column {}", self.column_id)));
        }

        let mut incoming = self.tasks.clone();
        for task in &mut incoming {
            task.column = self.column_id;
        }
        sort_tasks(&mut incoming);

        for (column, tasks) in context.tasks.iter_mut() {
            if *column == self.column_id {
                continue;
            }
            let before = tasks.len();
            tasks.retain(|t| !incoming.iter().any(|i| i.id == t.id));
            if tasks.len() != before {
                context.touched.insert(*column);
            }
        }
        context.tasks.insert(self.column_id, incoming);
        context.touched.insert(self.column_id);
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "Replace column {} with {} task(s) from the server",
            self.column_id,
            self.tasks.len()
        )
    }
}
