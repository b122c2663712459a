use std::collections::{BTreeSet, HashMap};

use taskboard_core::TaskboardResult;

use crate::column::{Column, ColumnId};
use crate::task::Task;

pub mod column_commands;
pub mod task_commands;

pub use column_commands::*;
pub use task_commands::*;

/// A pure transition of the board state. Commands validate before they
/// mutate, so a failed command leaves the board untouched.
pub trait Command: Send + Sync {
    fn execute(&self, context: &mut CommandContext) -> TaskboardResult<()>;

    /// Human-readable description of what this command does
    fn description(&self) -> String;
}

/// Context passed to commands for mutation.
///
/// Commands record every column whose task list they change as a local
/// mutation in `touched`; the board advances those columns' generations.
pub struct CommandContext<'a> {
    pub columns: &'a mut Vec<Column>,
    pub tasks: &'a mut HashMap<ColumnId, Vec<Task>>,
    pub touched: &'a mut BTreeSet<ColumnId>,
}

impl CommandContext<'_> {
    pub(crate) fn bucket_mut(&mut self, column: ColumnId) -> TaskboardResult<&mut Vec<Task>> {
        self.tasks
            .get_mut(&column)
            .ok_or_else(|| taskboard_core::TaskboardError::NotFound(format!("Column {}", column)))
    }

    pub(crate) fn locate(&self, task_id: crate::TaskId) -> Option<(ColumnId, usize)> {
        self.tasks.iter().find_map(|(column, tasks)| {
            tasks
                .iter()
                .position(|t| t.id == task_id)
                .map(|index| (*column, index))
        })
    }
}
