use std::path::Path;
use std::sync::Arc;

use anyhow::bail;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use taskboard_api::{Credentials, HttpBoardApi};
use taskboard_core::AppConfig;
use taskboard_domain::{
    BoardApi, BoardStore, Identity, Project, ProjectId, StoreOptions, SyncOutcome,
};

use crate::cli::GlobalArgs;

/// Result of a board mutation as printed by the CLI.
#[derive(Debug, Serialize)]
pub struct Applied<T: Serialize> {
    #[serde(flatten)]
    pub item: T,
    #[serde(flatten)]
    pub outcome: SyncOutcome,
}

pub struct CliContext {
    pub config: AppConfig,
    pub identity: Option<Identity>,
    api: Arc<HttpBoardApi>,
}

impl CliContext {
    pub fn new(args: &GlobalArgs) -> Self {
        let mut config = match &args.config {
            Some(path) => AppConfig::load_from(Path::new(path)),
            None => AppConfig::load(),
        };
        if let Some(url) = &args.api_url {
            config.api_url = Some(url.clone());
        }
        if let Some(mode) = args.auth_mode {
            config.auth_mode = mode.into();
        }

        let credentials = Credentials::resolve(
            config.auth_mode,
            args.token.as_deref(),
            args.user_id.as_deref(),
        );
        let identity = args
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|user_id| Identity {
                user_id: user_id.to_string(),
                email: args.email.clone(),
            });

        let api = HttpBoardApi::new(config.effective_api_url(), credentials);
        tracing::debug!("Using {} ({:?} auth)", api.base_url(), config.auth_mode);
        Self {
            config,
            identity,
            api: Arc::new(api),
        }
    }

    pub fn api(&self) -> &HttpBoardApi {
        &self.api
    }

    /// Fresh store with the project's board loaded from the server.
    pub async fn open_board(&self, project: ProjectId) -> anyhow::Result<BoardStore> {
        let options = StoreOptions::from_config(&self.config, self.identity.clone());
        let store = BoardStore::new(self.api.clone(), options);
        store.load_project(project).await?;
        Ok(store)
    }

    pub async fn find_project(&self, id: ProjectId) -> anyhow::Result<Project> {
        let projects = self.api.list_projects().await?;
        match projects.into_iter().find(|p| p.id == id) {
            Some(project) => Ok(project),
            None => bail!("Project not found: {}", id),
        }
    }

    pub fn today(&self, requested: Option<NaiveDate>) -> NaiveDate {
        requested.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// A one-shot command has nobody to show a snapped-back card to, so anything
/// but a confirmation is a failure.
pub fn confirmed<T: Serialize>(item: T, outcome: SyncOutcome) -> anyhow::Result<Applied<T>> {
    match &outcome {
        SyncOutcome::Confirmed | SyncOutcome::Unchanged => Ok(Applied { item, outcome }),
        SyncOutcome::Failed(reason) => bail!("The server rejected the change: {}", reason),
        SyncOutcome::Resynced | SyncOutcome::Stale => {
            bail!("The server rejected the change; the board was reloaded")
        }
    }
}
