use std::collections::{BTreeSet, HashMap, HashSet};

use taskboard_core::{TaskboardError, TaskboardResult};

use crate::column::{sort_columns, Column, ColumnId};
use crate::commands::{Command, CommandContext};
use crate::project::ProjectId;
use crate::task::{sort_tasks, Task, TaskId};

/// Generation of each column a request may overwrite, taken when it was issued.
pub type GenerationTags = Vec<(ColumnId, u64)>;

/// In-memory board for the open project: columns in display order and one
/// ordered task list per column.
///
/// Every local mutation of a column's list advances that column's
/// generation. Server responses carry the generation they were issued
/// against and are dropped when it no longer matches, or when a write
/// touching the column is still in flight.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    project: Option<ProjectId>,
    columns: Vec<Column>,
    tasks: HashMap<ColumnId, Vec<Task>>,
    generations: HashMap<ColumnId, u64>,
    last_generation: u64,
    pending_resync: HashSet<ColumnId>,
    in_flight: HashMap<ColumnId, usize>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(&self) -> Option<ProjectId> {
        self.project
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn tasks(&self, column: ColumnId) -> Option<&[Task]> {
        self.tasks.get(&column).map(Vec::as_slice)
    }

    /// All tasks, column by column in display order.
    pub fn all_tasks(&self) -> impl Iterator<Item = &Task> {
        self.columns
            .iter()
            .filter_map(|c| self.tasks.get(&c.id))
            .flatten()
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.locate(id)
            .and_then(|(column, index)| self.tasks.get(&column)?.get(index))
    }

    pub fn locate(&self, id: TaskId) -> Option<(ColumnId, usize)> {
        self.tasks.iter().find_map(|(column, tasks)| {
            tasks
                .iter()
                .position(|t| t.id == id)
                .map(|index| (*column, index))
        })
    }

    pub fn generation(&self, column: ColumnId) -> u64 {
        self.generations.get(&column).copied().unwrap_or(0)
    }

    pub fn tags(&self, columns: &[ColumnId]) -> GenerationTags {
        let mut seen = BTreeSet::new();
        columns
            .iter()
            .filter(|c| seen.insert(**c))
            .map(|c| (*c, self.generation(*c)))
            .collect()
    }

    /// Highest generation handed out so far.
    pub fn latest_generation(&self) -> u64 {
        self.last_generation
    }

    /// A column exists and has not been mutated locally since `tag` was taken.
    pub fn is_current(&self, column: ColumnId, tag: u64) -> bool {
        self.tasks.contains_key(&column) && self.generation(column) == tag
    }

    /// Writes sent for `column` whose responses have not arrived yet.
    pub fn writes_in_flight(&self, column: ColumnId) -> usize {
        self.in_flight.get(&column).copied().unwrap_or(0)
    }

    /// Register a write about to be sent for `columns` and tag it.
    pub(crate) fn begin_write(&mut self, columns: &[ColumnId]) -> GenerationTags {
        let tags = self.tags(columns);
        for (column, _) in &tags {
            *self.in_flight.entry(*column).or_insert(0) += 1;
        }
        tags
    }

    pub(crate) fn end_write(&mut self, tags: &[(ColumnId, u64)]) {
        for (column, _) in tags {
            if let Some(count) = self.in_flight.get_mut(column) {
                *count -= 1;
                if *count == 0 {
                    self.in_flight.remove(column);
                }
            }
        }
    }

    /// Whether a server list for `column` may replace the local one.
    ///
    /// The request was tagged with the column's generation `tag` and issued
    /// when the board stood at `watermark`. The list is refused when the
    /// column changed since, when a write on it is still in flight, or when
    /// it claims a task that now lives in another column with a write in
    /// flight or a change newer than the request.
    pub fn accepts_snapshot(
        &self,
        column: ColumnId,
        tag: u64,
        watermark: u64,
        tasks: &[Task],
    ) -> bool {
        if !self.is_current(column, tag) || self.writes_in_flight(column) > 0 {
            return false;
        }
        tasks.iter().all(|task| match self.locate(task.id) {
            Some((home, _)) if home != column => {
                self.writes_in_flight(home) == 0 && self.generation(home) <= watermark
            }
            _ => true,
        })
    }

    pub fn execute(&mut self, command: &dyn Command) -> TaskboardResult<()> {
        tracing::debug!("Executing: {}", command.description());

        let mut touched = BTreeSet::new();
        let mut context = CommandContext {
            columns: &mut self.columns,
            tasks: &mut self.tasks,
            touched: &mut touched,
        };
        command.execute(&mut context)?;

        for column in touched {
            if self.tasks.contains_key(&column) {
                self.last_generation += 1;
                self.generations.insert(column, self.last_generation);
            } else {
                self.generations.remove(&column);
                self.pending_resync.remove(&column);
            }
        }
        Ok(())
    }

    /// Replace the whole board in one step.
    pub fn replace_board(
        &mut self,
        project: ProjectId,
        mut columns: Vec<Column>,
        mut tasks: HashMap<ColumnId, Vec<Task>>,
    ) {
        sort_columns(&mut columns);
        tasks.retain(|column, _| columns.iter().any(|c| c.id == *column));
        for column in &columns {
            let list = tasks.entry(column.id).or_default();
            for task in list.iter_mut() {
                task.column = column.id;
            }
            sort_tasks(list);
        }

        self.project = Some(project);
        self.columns = columns;
        self.tasks = tasks;
        self.pending_resync.clear();
        self.generations.clear();
        for column in &self.columns {
            self.last_generation += 1;
            self.generations.insert(column.id, self.last_generation);
        }
    }

    pub(crate) fn mark_pending(&mut self, column: ColumnId) {
        if self.tasks.contains_key(&column) {
            self.pending_resync.insert(column);
        }
    }

    pub(crate) fn clear_pending(&mut self, column: ColumnId) {
        self.pending_resync.remove(&column);
    }

    /// Columns whose last resync was dropped as stale and still await one.
    pub fn pending_resync(&self, columns: &[ColumnId]) -> Vec<ColumnId> {
        columns
            .iter()
            .copied()
            .filter(|c| self.pending_resync.contains(c))
            .collect()
    }

    /// Pending columns with no write in flight, tagged for a re-read.
    pub(crate) fn settleable(&self) -> GenerationTags {
        let mut due: Vec<ColumnId> = self
            .pending_resync
            .iter()
            .copied()
            .filter(|c| self.tasks.contains_key(c) && self.writes_in_flight(*c) == 0)
            .collect();
        due.sort_unstable();
        self.tags(&due)
    }

    /// Check the structural invariants: every task sits under the column its
    /// `column` field names, no task is stored twice and every list belongs
    /// to a known column.
    pub fn verify(&self) -> TaskboardResult<()> {
        let mut seen = HashSet::new();
        for (column, tasks) in &self.tasks {
            if self.column(*column).is_none() {
                return Err(TaskboardError::Internal(format!(
                    "task list for unknown column {}",
                    column
                )));
            }
            for task in tasks {
                if task.column != *column {
                    return Err(TaskboardError::Internal(format!(
                        "task {} stored under column {} but names column {}",
                        task.id, column, task.column
                    )));
                }
                if !seen.insert(task.id) {
                    return Err(TaskboardError::Internal(format!(
                        "task {} stored twice",
                        task.id
                    )));
                }
            }
        }
        Ok(())
    }
}
