use taskboard_core::{AuthMode, TaskboardError, TaskboardResult};

/// How requests prove who is calling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// `Authorization: Bearer <token>` on every request.
    Bearer(String),
    /// `user_id` query parameter on every request, and a `user_id` field in
    /// every POST/PUT body.
    UserId(String),
}

impl Credentials {
    /// Pick the credential the configured mode asks for. Blank values count
    /// as absent.
    pub fn resolve(
        mode: AuthMode,
        token: Option<&str>,
        user_id: Option<&str>,
    ) -> Option<Credentials> {
        let present = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };
        match mode {
            AuthMode::Bearer => present(token).map(Credentials::Bearer),
            AuthMode::UserId => present(user_id).map(Credentials::UserId),
        }
    }

    pub fn require(credentials: Option<&Credentials>) -> TaskboardResult<&Credentials> {
        credentials.ok_or(TaskboardError::Unauthenticated)
    }
}
