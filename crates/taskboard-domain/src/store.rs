//! Board State Manager.
//!
//! Every mutation follows the same protocol: apply a pure command to the
//! local [`BoardState`] at once, then send the change to the backend and
//! reconcile with the outcome. Moves roll back by re-reading the affected
//! columns from the server; the simpler CRUD operations keep the local
//! change and record the failure.
//!
//! The state lock is never held across an `.await`, so a mutation is
//! visible to readers as soon as the operation future is first polled.
//!
//! Writes register their columns as in flight until the response arrives.
//! A server list read while a write on its column is outstanding predates
//! that write, so it is set aside and the column re-read once the last
//! write on it finishes.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use taskboard_core::{
    next_order, ActivityLog, AppConfig, LogEntry, LogLevel, Loggable, TaskboardError,
    TaskboardResult,
};

use crate::api::{BoardApi, Identity};
use crate::board::{BoardState, GenerationTags};
use crate::column::{Column, ColumnDraft, ColumnId};
use crate::commands::{
    Command, InsertColumn, InsertTask, MoveTask, PatchTask, RemoveColumn, RemoveTask,
    RenameColumn, ReplaceColumn, ReplaceColumnTasks, ReplaceTask,
};
use crate::deadline::{DeadlineRules, DeadlineStatus};
use crate::filter::{filter_tasks, TaskFilters};
use crate::metrics::{activity_by_day, member_metrics, MemberMetrics};
use crate::project::ProjectId;
use crate::task::{Task, TaskDraft, TaskId, TaskUpdate};

#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Recorded as creator of new tasks and completer of finished ones.
    pub identity: Option<Identity>,
    pub deadline_rules: DeadlineRules,
    pub activity_log_limit: usize,
}

impl StoreOptions {
    pub fn from_config(config: &AppConfig, identity: Option<Identity>) -> Self {
        Self {
            identity,
            deadline_rules: DeadlineRules::from_config(config),
            activity_log_limit: config.activity_log_limit,
        }
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default(), None)
    }
}

/// A drag, keyboard reorder or CLI move: where the task is and where it goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMove {
    pub task_id: TaskId,
    pub from_column: ColumnId,
    pub to_column: ColumnId,
    pub from_index: usize,
    pub to_index: usize,
}

impl TaskMove {
    pub fn is_noop(&self) -> bool {
        self.from_column == self.to_column && self.from_index == self.to_index
    }
}

/// How a mutation ended up relative to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Nothing was changed and nothing was sent.
    Unchanged,
    /// The server accepted the change.
    Confirmed,
    /// The server rejected the change; the affected columns now hold the
    /// server's lists.
    Resynced,
    /// The server rejected the change, but newer local edits made its lists
    /// stale. The columns are re-read once their newest edit settles.
    Stale,
    /// The server rejected the change and the local state was kept.
    Failed(String),
}

#[derive(Debug, Clone, Copy)]
enum FailurePolicy {
    /// Replace the affected columns with a fresh server read.
    Resync,
    /// Keep the local state and record the failure.
    Log,
}

enum Commit<T> {
    Committed(T),
    Recovered(SyncOutcome),
}

/// Where a move left a task. Its write is skipped once that no longer holds.
#[derive(Debug, Clone, Copy)]
struct Placement {
    task_id: TaskId,
    column: ColumnId,
    order: i32,
}

impl Placement {
    fn of(task: &Task) -> Self {
        Self {
            task_id: task.id,
            column: task.column,
            order: task.order,
        }
    }
}

/// Keeps a write's columns registered as in flight until dropped, which
/// also covers a cancelled operation.
struct InFlight<'a> {
    state: &'a Mutex<BoardState>,
    tags: &'a [(ColumnId, u64)],
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.lock().end_write(self.tags);
    }
}

pub struct BoardStore {
    api: Arc<dyn BoardApi>,
    state: Mutex<BoardState>,
    log: Mutex<ActivityLog>,
    options: StoreOptions,
    next_provisional_id: AtomicI64,
}

impl BoardStore {
    pub fn new(api: Arc<dyn BoardApi>, options: StoreOptions) -> Self {
        Self::with_board(api, options, BoardState::new())
    }

    pub fn with_board(api: Arc<dyn BoardApi>, options: StoreOptions, board: BoardState) -> Self {
        let log = ActivityLog::with_limit(options.activity_log_limit);
        Self {
            api,
            state: Mutex::new(board),
            log: Mutex::new(log),
            options,
            next_provisional_id: AtomicI64::new(-1),
        }
    }

    pub fn api(&self) -> &Arc<dyn BoardApi> {
        &self.api
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn snapshot(&self) -> BoardState {
        self.state.lock().clone()
    }

    pub fn project(&self) -> Option<ProjectId> {
        self.state.lock().project()
    }

    pub fn columns(&self) -> Vec<Column> {
        self.state.lock().columns().to_vec()
    }

    pub fn tasks(&self, column: ColumnId) -> Vec<Task> {
        self.state
            .lock()
            .tasks(column)
            .map(<[Task]>::to_vec)
            .unwrap_or_default()
    }

    pub fn task(&self, id: TaskId) -> Option<Task> {
        self.state.lock().task(id).cloned()
    }

    /// Visible subset of a column under `filters`. Never mutates the board.
    pub fn filtered_tasks(
        &self,
        column: ColumnId,
        filters: &TaskFilters,
        today: NaiveDate,
    ) -> Vec<Task> {
        let state = self.state.lock();
        let tasks = state.tasks(column).unwrap_or_default();
        filter_tasks(tasks, filters, today, self.options.deadline_rules)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Per-task badge: a completed task is `Met`, never `Overdue`.
    pub fn deadline_badge(&self, task: TaskId, today: NaiveDate) -> Option<DeadlineStatus> {
        self.state
            .lock()
            .task(task)
            .map(|t| DeadlineRules::BADGE.classify(t, today))
    }

    pub fn member_metrics(&self, today: NaiveDate) -> Vec<MemberMetrics> {
        let state = self.state.lock();
        member_metrics(state.all_tasks(), today, self.options.deadline_rules)
    }

    pub fn activity(&self) -> BTreeMap<NaiveDate, usize> {
        activity_by_day(self.state.lock().all_tasks())
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.log.lock().get_logs().to_vec()
    }

    /// Fetch a project's columns and their tasks and replace the board.
    pub async fn load_project(&self, project: ProjectId) -> TaskboardResult<()> {
        let columns = self.api.list_columns(project).await?;
        let lists = join_all(columns.iter().map(|c| self.api.list_tasks(c.id))).await;

        let mut tasks = HashMap::new();
        for (column, list) in columns.iter().zip(lists) {
            tasks.insert(column.id, list?);
        }

        tracing::info!(
            "Loaded project {} with {} column(s)",
            project,
            columns.len()
        );
        self.state.lock().replace_board(project, columns, tasks);
        Ok(())
    }

    /// Re-read one column from the server.
    pub async fn refresh_column(&self, column: ColumnId) -> TaskboardResult<SyncOutcome> {
        let tags = {
            let state = self.state.lock();
            if state.tasks(column).is_none() {
                return Err(TaskboardError::NotFound(format!("Column {}", column)));
            }
            state.tags(&[column])
        };
        self.resync(&tags).await
    }

    pub async fn move_task(&self, mv: TaskMove) -> TaskboardResult<SyncOutcome> {
        if mv.is_noop() {
            return Ok(SyncOutcome::Unchanged);
        }

        let (tags, placements) = {
            let mut state = self.state.lock();
            if state.task(mv.task_id).is_some_and(Task::is_provisional) {
                return Err(not_saved_yet("Task", mv.task_id));
            }
            let affected = if mv.from_column == mv.to_column {
                vec![mv.from_column]
            } else {
                vec![mv.from_column, mv.to_column]
            };
            let before: HashMap<TaskId, i32> = affected
                .iter()
                .filter_map(|c| state.tasks(*c))
                .flatten()
                .map(|t| (t.id, t.order))
                .collect();

            state.execute(&MoveTask {
                task_id: mv.task_id,
                from_column: mv.from_column,
                to_column: mv.to_column,
                from_index: mv.from_index,
                to_index: mv.to_index,
            })?;

            // The moved task goes first, then siblings whose order shifted.
            let mut placements: Vec<Placement> =
                state.task(mv.task_id).map(Placement::of).into_iter().collect();
            for column in &affected {
                for task in state.tasks(*column).unwrap_or_default() {
                    let shifted = before.get(&task.id) != Some(&task.order);
                    if task.id != mv.task_id && shifted && !task.is_provisional() {
                        placements.push(Placement::of(task));
                    }
                }
            }
            (state.begin_write(&affected), placements)
        };

        // Each write carries the task as it stands when sent, so edits made
        // while earlier writes were in flight are not overwritten.
        let commit = async {
            for placement in &placements {
                if let Some(task) = self.placed(placement) {
                    self.api.update_task(&task).await?;
                }
            }
            Ok(())
        };
        let label = format!("Move of task {}", mv.task_id);
        match self
            .reconcile(&label, tags, FailurePolicy::Resync, commit)
            .await?
        {
            Commit::Committed(()) => Ok(SyncOutcome::Confirmed),
            Commit::Recovered(outcome) => Ok(outcome),
        }
    }

    /// Move a task to `to_index` of `to_column`, wherever it is now.
    pub async fn move_task_to(
        &self,
        task_id: TaskId,
        to_column: ColumnId,
        to_index: usize,
    ) -> TaskboardResult<SyncOutcome> {
        let (from_column, from_index) = self
            .state
            .lock()
            .locate(task_id)
            .ok_or_else(|| TaskboardError::NotFound(format!("Task {}", task_id)))?;
        self.move_task(TaskMove {
            task_id,
            from_column,
            to_column,
            from_index,
            to_index,
        })
        .await
    }

    /// Append a task to a column. Returns the server's record once
    /// confirmed; on failure the placeholder is dropped and returned.
    pub async fn add_task(
        &self,
        column: ColumnId,
        title: &str,
        description: &str,
    ) -> TaskboardResult<(Task, SyncOutcome)> {
        let title = Task::validate_title(title)?;
        let identity = self.options.identity.as_ref();

        let (draft, placeholder, tags) = {
            let mut state = self.state.lock();
            let tasks = state
                .tasks(column)
                .ok_or_else(|| TaskboardError::NotFound(format!("Column {}", column)))?;
            if state.column(column).is_some_and(Column::is_provisional) {
                return Err(not_saved_yet("Column", column));
            }
            let draft = TaskDraft {
                title,
                column,
                order: next_order(tasks),
                description: description.to_string(),
                creator_id: identity.map(|i| i.user_id.clone()),
                creator_email: identity.and_then(|i| i.email.clone()),
            };
            let placeholder = Task::provisional(self.provisional_id(), &draft);
            state.execute(&InsertTask {
                task: placeholder.clone(),
            })?;
            (draft, placeholder, state.begin_write(&[column]))
        };

        let label = format!("Create of task '{}'", draft.title);
        let commit = self.api.create_task(&draft);
        match self.reconcile(&label, tags, FailurePolicy::Log, commit).await? {
            Commit::Committed(created) => {
                self.apply(&ReplaceTask {
                    local_id: placeholder.id,
                    task: created.clone(),
                })?;
                Ok((created, SyncOutcome::Confirmed))
            }
            Commit::Recovered(outcome) => {
                self.discard(&RemoveTask {
                    task_id: placeholder.id,
                });
                Ok((placeholder, outcome))
            }
        }
    }

    pub async fn update_task(
        &self,
        task_id: TaskId,
        update: TaskUpdate,
    ) -> TaskboardResult<SyncOutcome> {
        update.validate()?;
        if update.is_empty() {
            return Ok(SyncOutcome::Unchanged);
        }
        let actor = self
            .options
            .identity
            .as_ref()
            .map(|i| i.display_identity().to_string());

        let (task, tags) = {
            let mut state = self.state.lock();
            let existing = state
                .task(task_id)
                .ok_or_else(|| TaskboardError::NotFound(format!("Task {}", task_id)))?;
            if existing.is_provisional() {
                return Err(not_saved_yet("Task", task_id));
            }
            state.execute(&PatchTask {
                task_id,
                update,
                actor,
            })?;
            let task = state
                .task(task_id)
                .cloned()
                .ok_or_else(|| TaskboardError::Internal(format!("Task {} vanished", task_id)))?;
            let tags = state.begin_write(&[task.column]);
            (task, tags)
        };

        let label = format!("Update of task {}", task_id);
        let commit = self.api.update_task(&task);
        match self
            .reconcile(&label, tags.clone(), FailurePolicy::Log, commit)
            .await?
        {
            Commit::Committed(echo) => {
                let mut state = self.state.lock();
                if tags.iter().all(|(c, g)| state.is_current(*c, *g)) {
                    state.execute(&ReplaceTask {
                        local_id: task_id,
                        task: echo,
                    })?;
                }
                Ok(SyncOutcome::Confirmed)
            }
            Commit::Recovered(outcome) => Ok(outcome),
        }
    }

    pub async fn delete_task(&self, task_id: TaskId) -> TaskboardResult<SyncOutcome> {
        let tags = {
            let mut state = self.state.lock();
            let task = state
                .task(task_id)
                .ok_or_else(|| TaskboardError::NotFound(format!("Task {}", task_id)))?;
            if task.is_provisional() {
                return Err(not_saved_yet("Task", task_id));
            }
            let column = task.column;
            state.execute(&RemoveTask { task_id })?;
            state.begin_write(&[column])
        };

        let label = format!("Delete of task {}", task_id);
        let commit = self.api.delete_task(task_id);
        match self.reconcile(&label, tags, FailurePolicy::Log, commit).await? {
            Commit::Committed(()) => Ok(SyncOutcome::Confirmed),
            Commit::Recovered(outcome) => Ok(outcome),
        }
    }

    /// Append a column to the open project.
    pub async fn add_column(&self, name: &str) -> TaskboardResult<(Column, SyncOutcome)> {
        let name = Column::validate_name(name)?;

        let (draft, placeholder, tags) = {
            let mut state = self.state.lock();
            let project = state
                .project()
                .ok_or_else(|| TaskboardError::Validation("no project is open".into()))?;
            let draft = ColumnDraft {
                name,
                project,
                order: next_order(state.columns()),
            };
            let placeholder = Column {
                id: self.provisional_id(),
                name: draft.name.clone(),
                project,
                order: draft.order,
            };
            state.execute(&InsertColumn {
                column: placeholder.clone(),
            })?;
            let tags = state.begin_write(&[placeholder.id]);
            (draft, placeholder, tags)
        };

        let label = format!("Create of column '{}'", draft.name);
        let commit = self.api.create_column(&draft);
        match self.reconcile(&label, tags, FailurePolicy::Log, commit).await? {
            Commit::Committed(created) => {
                self.apply(&ReplaceColumn {
                    local_id: placeholder.id,
                    column: created.clone(),
                })?;
                Ok((created, SyncOutcome::Confirmed))
            }
            Commit::Recovered(outcome) => {
                self.discard(&RemoveColumn {
                    column_id: placeholder.id,
                });
                Ok((placeholder, outcome))
            }
        }
    }

    pub async fn rename_column(
        &self,
        column_id: ColumnId,
        name: &str,
    ) -> TaskboardResult<SyncOutcome> {
        let name = Column::validate_name(name)?;

        let (column, tags) = {
            let mut state = self.state.lock();
            let existing = state
                .column(column_id)
                .ok_or_else(|| TaskboardError::NotFound(format!("Column {}", column_id)))?;
            if existing.is_provisional() {
                return Err(not_saved_yet("Column", column_id));
            }
            state.execute(&RenameColumn { column_id, name })?;
            let column = state
                .column(column_id)
                .cloned()
                .ok_or_else(|| TaskboardError::Internal(format!("Column {} vanished", column_id)))?;
            (column, state.begin_write(&[column_id]))
        };

        let label = format!("Rename of column {}", column_id);
        let commit = self.api.update_column(&column);
        match self.reconcile(&label, tags, FailurePolicy::Log, commit).await? {
            Commit::Committed(_) => Ok(SyncOutcome::Confirmed),
            Commit::Recovered(outcome) => Ok(outcome),
        }
    }

    /// Delete a column and, with it, every task it holds.
    pub async fn delete_column(&self, column_id: ColumnId) -> TaskboardResult<SyncOutcome> {
        {
            let mut state = self.state.lock();
            if state.column(column_id).is_some_and(Column::is_provisional) {
                return Err(not_saved_yet("Column", column_id));
            }
            state.execute(&RemoveColumn { column_id })?;
        }

        let label = format!("Delete of column {}", column_id);
        let commit = self.api.delete_column(column_id);
        match self
            .reconcile(&label, Vec::new(), FailurePolicy::Log, commit)
            .await?
        {
            Commit::Committed(()) => Ok(SyncOutcome::Confirmed),
            Commit::Recovered(outcome) => Ok(outcome),
        }
    }

    /// Await a remote commit and settle the board with its outcome.
    ///
    /// Missing credentials and other non-recoverable errors are returned to
    /// the caller untouched. Recoverable failures are absorbed per `policy`.
    async fn reconcile<T, F>(
        &self,
        label: &str,
        tags: GenerationTags,
        policy: FailurePolicy,
        commit: F,
    ) -> TaskboardResult<Commit<T>>
    where
        F: Future<Output = TaskboardResult<T>>,
    {
        let in_flight = InFlight {
            state: &self.state,
            tags: &tags,
        };
        let result = commit.await;
        drop(in_flight);

        match result {
            Ok(value) => {
                tracing::debug!("{} confirmed", label);
                self.settle().await?;
                Ok(Commit::Committed(value))
            }
            Err(err) if !err.is_recoverable() => Err(err),
            Err(err) => match policy {
                FailurePolicy::Log => {
                    self.record(
                        LogLevel::Warn,
                        format!("{} failed, keeping local state: {}", label, err),
                    );
                    self.settle().await?;
                    Ok(Commit::Recovered(SyncOutcome::Failed(err.to_string())))
                }
                FailurePolicy::Resync => {
                    self.record(
                        LogLevel::Warn,
                        format!("{} failed, restoring server state: {}", label, err),
                    );
                    Ok(Commit::Recovered(self.resync(&tags).await?))
                }
            },
        }
    }

    /// Re-read columns whose earlier resync was set aside, once no write on
    /// them is in flight any more.
    async fn settle(&self) -> TaskboardResult<()> {
        let due = self.state.lock().settleable();
        if due.is_empty() {
            return Ok(());
        }
        self.resync(&due).await.map(|_| ())
    }

    /// Replace each tagged column with the server's list, unless the board
    /// has moved on since (see [`BoardState::accepts_snapshot`]).
    async fn resync(&self, tags: &[(ColumnId, u64)]) -> TaskboardResult<SyncOutcome> {
        let watermark = self.state.lock().latest_generation();
        let results = join_all(tags.iter().map(|(c, _)| self.api.list_tasks(*c))).await;

        let mut snapshots = Vec::with_capacity(tags.len());
        for (&(column, tag), result) in tags.iter().zip(results) {
            match result {
                Ok(tasks) => snapshots.push((column, tag, tasks)),
                Err(err) if !err.is_recoverable() => return Err(err),
                Err(err) => {
                    {
                        let mut state = self.state.lock();
                        for (column, _) in tags {
                            state.mark_pending(*column);
                        }
                    }
                    self.record(
                        LogLevel::Warn,
                        format!("Could not re-read column {}: {}", column, err),
                    );
                    return Ok(SyncOutcome::Failed(err.to_string()));
                }
            }
        }

        let mut replaced = Vec::new();
        let mut stale = Vec::new();
        {
            let mut state = self.state.lock();
            // Judge every list before applying any: applying one strips its
            // tasks from the other columns.
            let mut accepted = Vec::new();
            for (column, tag, tasks) in snapshots {
                if state.tasks(column).is_none() {
                    continue;
                }
                if state.accepts_snapshot(column, tag, watermark, &tasks) {
                    accepted.push((column, tasks));
                } else {
                    state.mark_pending(column);
                    stale.push(column);
                }
            }
            for (column, tasks) in accepted {
                state.execute(&ReplaceColumnTasks {
                    column_id: column,
                    tasks,
                })?;
                state.clear_pending(column);
                replaced.push(column);
            }
        }

        if stale.is_empty() {
            self.record(
                LogLevel::Info,
                format!("Restored column(s) {:?} from the server", replaced),
            );
            Ok(SyncOutcome::Resynced)
        } else {
            self.record(
                LogLevel::Warn,
                format!(
                    "Dropped stale server state for column(s) {:?}; newer local changes pending",
                    stale
                ),
            );
            Ok(SyncOutcome::Stale)
        }
    }

    /// The task as it stands now, if it still sits where a move placed it.
    /// A task moved again since is written by the later move.
    fn placed(&self, placement: &Placement) -> Option<Task> {
        let state = self.state.lock();
        match state.task(placement.task_id) {
            Some(task) if task.column == placement.column && task.order == placement.order => {
                Some(task.clone())
            }
            _ => {
                tracing::debug!(
                    "Task {} moved again, leaving its write to the later move",
                    placement.task_id
                );
                None
            }
        }
    }

    fn apply(&self, command: &dyn Command) -> TaskboardResult<()> {
        self.state.lock().execute(command)
    }

    /// Drop a placeholder whose create failed. It may already be gone.
    fn discard(&self, command: &dyn Command) {
        if let Err(err) = self.apply(command) {
            tracing::debug!("{} skipped: {}", command.description(), err);
        }
    }

    fn provisional_id(&self) -> i64 {
        self.next_provisional_id.fetch_sub(1, Ordering::SeqCst)
    }

    fn record(&self, level: LogLevel, message: String) {
        match level {
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Warn => tracing::warn!("{}", message),
        }
        self.log.lock().add_log(level, message);
    }
}

fn not_saved_yet(kind: &str, id: i64) -> TaskboardError {
    TaskboardError::Validation(format!(
        "{} {} is not saved yet; retry once the server confirms it",
        kind, id
    ))
}
