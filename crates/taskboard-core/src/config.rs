use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_ACTIVITY_LOG_LIMIT: usize = 100;

/// How the signed-in identity is attached to API calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// `Authorization: Bearer <token>` header.
    #[default]
    Bearer,
    /// `user_id` query parameter, and a `user_id` body field on POST/PUT.
    UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub auth_mode: AuthMode,
    /// Count tasks with a past deadline as overdue even once completed.
    #[serde(default = "default_overdue_includes_completed")]
    pub overdue_includes_completed: bool,
    #[serde(default = "default_activity_log_limit")]
    pub activity_log_limit: usize,
}

fn default_overdue_includes_completed() -> bool {
    true
}

fn default_activity_log_limit() -> usize {
    DEFAULT_ACTIVITY_LOG_LIMIT
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            auth_mode: AuthMode::default(),
            overdue_includes_completed: default_overdue_includes_completed(),
            activity_log_limit: default_activity_log_limit(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/taskboard/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("taskboard/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("taskboard\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Missing or malformed files fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn effective_api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_API_URL)
    }
}
