//! In-memory backend for exercising `BoardStore` end to end.
//!
//! Records every call, can fail the next N calls of an operation, and can
//! hold an operation's responses behind a gate until the test releases them.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use taskboard_core::{TaskboardError, TaskboardResult};
use taskboard_domain::{
    BoardApi, Column, ColumnDraft, ColumnId, Project, ProjectId, ProjectUpdate, Task, TaskDraft,
    TaskId,
};
use tokio::sync::Semaphore;

pub const TODO: ColumnId = 10;
pub const DOING: ColumnId = 20;
pub const DONE: ColumnId = 30;

#[derive(Default)]
struct Server {
    projects: BTreeMap<ProjectId, Project>,
    columns: BTreeMap<ColumnId, Column>,
    tasks: BTreeMap<TaskId, Task>,
    next_id: i64,
}

#[derive(Default)]
pub struct FakeApi {
    server: Mutex<Server>,
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, usize>>,
    gates: Mutex<HashMap<&'static str, Arc<Semaphore>>>,
    signed_out: AtomicBool,
}

pub fn task(id: TaskId, column: ColumnId, order: i32, title: &str) -> Task {
    let created = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
    Task {
        id,
        title: title.to_string(),
        description: String::new(),
        column,
        order,
        created_at: created,
        updated_at: created,
        creator: Some("u-ann".into()),
        creator_email: Some("ann@example.com".into()),
        completed: false,
        completed_by: None,
        deadline: None,
    }
}

impl FakeApi {
    /// Project 1 with To do [1, 2, 3], Doing [4] and an empty Done.
    pub fn seeded() -> Arc<Self> {
        let api = Self::default();
        {
            let mut server = api.server.lock();
            server.next_id = 1000;
            server.projects.insert(
                1,
                Project {
                    id: 1,
                    name: "Launch".into(),
                    owner_id: Some("u-ann".into()),
                    members: vec![],
                },
            );
            for (id, name, order) in [(TODO, "To do", 0), (DOING, "Doing", 1), (DONE, "Done", 2)] {
                server.columns.insert(
                    id,
                    Column {
                        id,
                        name: name.into(),
                        project: 1,
                        order,
                    },
                );
            }
            for t in [
                task(1, TODO, 0, "Write brief"),
                task(2, TODO, 1, "Book venue"),
                task(3, TODO, 2, "Order swag"),
                task(4, DOING, 0, "Draft agenda"),
            ] {
                server.tasks.insert(t.id, t);
            }
        }
        Arc::new(api)
    }

    pub fn fail_next(&self, op: &'static str, times: usize) {
        *self.failures.lock().entry(op).or_insert(0) += times;
    }

    /// Hold every response of `op` until [`FakeApi::release`] lets it through.
    pub fn gate(&self, op: &'static str) {
        self.gates.lock().insert(op, Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, op: &'static str, responses: usize) {
        if let Some(gate) = self.gates.lock().get(op) {
            gate.add_permits(responses);
        }
    }

    pub fn sign_out(&self) {
        self.signed_out.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.split(' ').next() == Some(op))
            .count()
    }

    /// Yield until `op` has been called at least `count` times.
    pub async fn wait_for(&self, op: &str, count: usize) {
        while self.call_count(op) < count {
            tokio::task::yield_now().await;
        }
    }

    pub fn server_column(&self, column: ColumnId) -> Vec<TaskId> {
        let server = self.server.lock();
        let mut tasks: Vec<&Task> = server.tasks.values().filter(|t| t.column == column).collect();
        tasks.sort_by_key(|t| (t.order, t.id));
        tasks.iter().map(|t| t.id).collect()
    }

    pub fn server_task(&self, id: TaskId) -> Option<Task> {
        self.server.lock().tasks.get(&id).cloned()
    }

    pub fn server_columns(&self) -> Vec<Column> {
        self.server.lock().columns.values().cloned().collect()
    }

    async fn enter(&self, op: &'static str, detail: String) -> TaskboardResult<()> {
        if self.signed_out.load(Ordering::SeqCst) {
            return Err(TaskboardError::Unauthenticated);
        }
        self.calls.lock().push(format!("{} {}", op, detail));

        let gate = self.gates.lock().get(op).cloned();
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .map_err(|e| TaskboardError::Internal(e.to_string()))?
                .forget();
        }

        let mut failures = self.failures.lock();
        match failures.get_mut(op) {
            Some(left) if *left > 0 => {
                *left -= 1;
                Err(TaskboardError::Http {
                    status: 500,
                    body: format!("{} rejected", op),
                })
            }
            _ => Ok(()),
        }
    }

    fn not_found(what: &str, id: i64) -> TaskboardError {
        TaskboardError::Http {
            status: 404,
            body: format!("{} {} not found", what, id),
        }
    }
}

#[async_trait]
impl BoardApi for FakeApi {
    async fn list_projects(&self) -> TaskboardResult<Vec<Project>> {
        self.enter("list_projects", String::new()).await?;
        Ok(self.server.lock().projects.values().cloned().collect())
    }

    async fn create_project(&self, name: &str) -> TaskboardResult<Project> {
        self.enter("create_project", name.to_string()).await?;
        let mut server = self.server.lock();
        server.next_id += 1;
        let project = Project {
            id: server.next_id,
            name: name.to_string(),
            owner_id: None,
            members: vec![],
        };
        server.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        id: ProjectId,
        update: &ProjectUpdate,
    ) -> TaskboardResult<Project> {
        self.enter("update_project", id.to_string()).await?;
        let mut server = self.server.lock();
        let project = server
            .projects
            .get_mut(&id)
            .ok_or_else(|| Self::not_found("project", id))?;
        if let Some(name) = &update.name {
            project.name = name.clone();
        }
        if let Some(members) = &update.members {
            project.members = members.clone();
        }
        Ok(project.clone())
    }

    async fn delete_project(&self, id: ProjectId) -> TaskboardResult<()> {
        self.enter("delete_project", id.to_string()).await?;
        let mut server = self.server.lock();
        server
            .projects
            .remove(&id)
            .ok_or_else(|| Self::not_found("project", id))?;
        server.columns.retain(|_, c| c.project != id);
        let Server { columns, tasks, .. } = &mut *server;
        tasks.retain(|_, t| columns.contains_key(&t.column));
        Ok(())
    }

    async fn list_columns(&self, project: ProjectId) -> TaskboardResult<Vec<Column>> {
        self.enter("list_columns", project.to_string()).await?;
        let server = self.server.lock();
        Ok(server
            .columns
            .values()
            .filter(|c| c.project == project)
            .cloned()
            .collect())
    }

    async fn create_column(&self, draft: &ColumnDraft) -> TaskboardResult<Column> {
        self.enter("create_column", draft.name.clone()).await?;
        let mut server = self.server.lock();
        server.next_id += 1;
        let column = Column {
            id: server.next_id,
            name: draft.name.clone(),
            project: draft.project,
            order: draft.order,
        };
        server.columns.insert(column.id, column.clone());
        Ok(column)
    }

    async fn update_column(&self, column: &Column) -> TaskboardResult<Column> {
        self.enter("update_column", column.id.to_string()).await?;
        let mut server = self.server.lock();
        let stored = server
            .columns
            .get_mut(&column.id)
            .ok_or_else(|| Self::not_found("column", column.id))?;
        *stored = column.clone();
        Ok(column.clone())
    }

    async fn delete_column(&self, id: ColumnId) -> TaskboardResult<()> {
        self.enter("delete_column", id.to_string()).await?;
        let mut server = self.server.lock();
        server
            .columns
            .remove(&id)
            .ok_or_else(|| Self::not_found("column", id))?;
        server.tasks.retain(|_, t| t.column != id);
        Ok(())
    }

    async fn list_tasks(&self, column: ColumnId) -> TaskboardResult<Vec<Task>> {
        self.enter("list_tasks", column.to_string()).await?;
        let server = self.server.lock();
        let mut tasks: Vec<Task> = server
            .tasks
            .values()
            .filter(|t| t.column == column)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.order, t.id));
        Ok(tasks)
    }

    async fn create_task(&self, draft: &TaskDraft) -> TaskboardResult<Task> {
        self.enter("create_task", draft.title.clone()).await?;
        let mut server = self.server.lock();
        if !server.columns.contains_key(&draft.column) {
            return Err(Self::not_found("column", draft.column));
        }
        server.next_id += 1;
        let now = Utc::now();
        let task = Task {
            id: server.next_id,
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
        };
        server.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_task(&self, task: &Task) -> TaskboardResult<Task> {
        self.enter("update_task", task.id.to_string()).await?;
        let mut server = self.server.lock();
        let stored = server
            .tasks
            .get_mut(&task.id)
            .ok_or_else(|| Self::not_found("task", task.id))?;
        *stored = Task {
            updated_at: Utc::now(),
            ..task.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_task(&self, id: TaskId) -> TaskboardResult<()> {
        self.enter("delete_task", id.to_string()).await?;
        self.server
            .lock()
            .tasks
            .remove(&id)
            .ok_or_else(|| Self::not_found("task", id))?;
        Ok(())
    }
}
