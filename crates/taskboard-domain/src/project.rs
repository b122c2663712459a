use serde::{Deserialize, Serialize};
use taskboard_core::{TaskboardError, TaskboardResult};

pub type ProjectId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(rename = "user_id", default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

/// Body of `PUT /projects/{id}/`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
}

impl Project {
    pub fn validate_name(name: &str) -> TaskboardResult<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(TaskboardError::Validation(
                "project name must not be empty".into(),
            ));
        }
        Ok(trimmed.to_string())
    }

    pub fn has_member(&self, email: &str) -> bool {
        let needle = email.trim();
        self.members.iter().any(|m| m.eq_ignore_ascii_case(needle))
    }

    /// Adds a member email. Returns `false` when it was already present.
    pub fn add_member(&mut self, email: &str) -> TaskboardResult<bool> {
        let email = normalize_email(email)?;
        if self.has_member(&email) {
            return Ok(false);
        }
        self.members.push(email);
        Ok(true)
    }

    /// Returns `false` when the email was not a member.
    pub fn remove_member(&mut self, email: &str) -> bool {
        let needle = email.trim();
        let before = self.members.len();
        self.members.retain(|m| !m.eq_ignore_ascii_case(needle));
        self.members.len() != before
    }

    pub fn rename_update(name: &str) -> TaskboardResult<ProjectUpdate> {
        Ok(ProjectUpdate {
            name: Some(Self::validate_name(name)?),
            members: None,
        })
    }

    pub fn members_update(&self) -> ProjectUpdate {
        ProjectUpdate {
            name: None,
            members: Some(self.members.clone()),
        }
    }
}

fn normalize_email(email: &str) -> TaskboardResult<String> {
    let email = email.trim();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(TaskboardError::Validation(format!(
            "'{}' is not an email address",
            email
        )));
    }
    Ok(email.to_string())
}
