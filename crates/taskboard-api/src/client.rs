use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use taskboard_core::{TaskboardError, TaskboardResult};
use taskboard_domain::{
    BoardApi, Column, ColumnDraft, ColumnId, Project, ProjectId, ProjectUpdate, Task, TaskDraft,
    TaskId,
};

use crate::credentials::Credentials;

/// Join a base URL and a path with exactly one slash between them.
pub fn join_endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// REST client for the board backend.
///
/// Requests without credentials fail with
/// [`TaskboardError::Unauthenticated`] before anything is sent.
#[derive(Debug, Clone)]
pub struct HttpBoardApi {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl HttpBoardApi {
    pub fn new(base_url: impl Into<String>, credentials: Option<Credentials>) -> Self {
        Self::with_client(Client::new(), base_url, credentials)
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        credentials: Option<Credentials>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        join_endpoint(&self.base_url, path)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        mut body: Option<Value>,
    ) -> TaskboardResult<RequestBuilder> {
        let credentials = Credentials::require(self.credentials.as_ref())?;
        let url = self.endpoint(path);
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url).query(query);
        match credentials {
            Credentials::Bearer(token) => request = request.bearer_auth(token),
            Credentials::UserId(user_id) => {
                request = request.query(&[("user_id", user_id)]);
                if let Some(Value::Object(fields)) = body.as_mut() {
                    fields.insert("user_id".into(), Value::String(user_id.clone()));
                }
            }
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        Ok(request)
    }

    async fn send(&self, request: RequestBuilder) -> TaskboardResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| TaskboardError::Connection(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::debug!("Request failed with {}: {}", status, body);
        Err(TaskboardError::Http {
            status: status.as_u16(),
            body,
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> TaskboardResult<T> {
        let response = self.send(self.request(method, path, query, body)?).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| TaskboardError::Serialization(e.to_string()))
    }

    async fn delete(&self, path: &str) -> TaskboardResult<()> {
        self.send(self.request(Method::DELETE, path, &[], None)?)
            .await
            .map(|_| ())
    }
}

fn to_body<T: Serialize>(value: &T) -> TaskboardResult<Value> {
    serde_json::to_value(value).map_err(|e| TaskboardError::Serialization(e.to_string()))
}

#[async_trait]
impl BoardApi for HttpBoardApi {
    async fn list_projects(&self) -> TaskboardResult<Vec<Project>> {
        self.fetch(Method::GET, "projects/", &[], None).await
    }

    async fn create_project(&self, name: &str) -> TaskboardResult<Project> {
        let body = json!({ "name": name });
        self.fetch(Method::POST, "projects/", &[], Some(body)).await
    }

    async fn update_project(
        &self,
        id: ProjectId,
        update: &ProjectUpdate,
    ) -> TaskboardResult<Project> {
        let path = format!("projects/{}/", id);
        self.fetch(Method::PUT, &path, &[], Some(to_body(update)?))
            .await
    }

    async fn delete_project(&self, id: ProjectId) -> TaskboardResult<()> {
        self.delete(&format!("projects/{}/", id)).await
    }

    async fn list_columns(&self, project: ProjectId) -> TaskboardResult<Vec<Column>> {
        let query = [("project_id", project.to_string())];
        self.fetch(Method::GET, "columns/", &query, None).await
    }

    async fn create_column(&self, draft: &ColumnDraft) -> TaskboardResult<Column> {
        self.fetch(Method::POST, "columns/", &[], Some(to_body(draft)?))
            .await
    }

    async fn update_column(&self, column: &Column) -> TaskboardResult<Column> {
        let path = format!("columns/{}/", column.id);
        self.fetch(Method::PUT, &path, &[], Some(to_body(column)?))
            .await
    }

    async fn delete_column(&self, id: ColumnId) -> TaskboardResult<()> {
        self.delete(&format!("columns/{}/", id)).await
    }

    async fn list_tasks(&self, column: ColumnId) -> TaskboardResult<Vec<Task>> {
        let query = [("column_id", column.to_string())];
        self.fetch(Method::GET, "tasks/", &query, None).await
    }

    async fn create_task(&self, draft: &TaskDraft) -> TaskboardResult<Task> {
        self.fetch(Method::POST, "tasks/", &[], Some(to_body(draft)?))
            .await
    }

    async fn update_task(&self, task: &Task) -> TaskboardResult<Task> {
        let path = format!("tasks/{}/", task.id);
        self.fetch(Method::PUT, &path, &[], Some(to_body(task)?))
            .await
    }

    async fn delete_task(&self, id: TaskId) -> TaskboardResult<()> {
        self.delete(&format!("tasks/{}/", id)).await
    }
}
