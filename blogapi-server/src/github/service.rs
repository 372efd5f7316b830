//! Repository queries
//!
//! Resolves which user to ask about, then delegates to a `RepositorySource`.

use std::sync::Arc;

use super::client::GithubError;
use super::models::GithubRepoSummary;
use super::source::RepositorySource;

#[derive(Clone)]
pub struct RepositoryService {
    source: Arc<dyn RepositorySource>,
    default_username: Option<String>,
}

impl RepositoryService {
    pub fn new(source: Arc<dyn RepositorySource>, default_username: Option<String>) -> Self {
        Self {
            source,
            default_username,
        }
    }

    /// List repositories for `username`, or for the configured default user.
    ///
    /// Capped at the first `REPOS_PER_PAGE` repositories.
    pub async fn list_repositories(
        &self,
        username: Option<&str>,
    ) -> Result<Vec<GithubRepoSummary>, GithubError> {
        let username = username
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .or(self.default_username.as_deref())
            .ok_or(GithubError::MissingUsername)?;

        tracing::debug!(username, "listing repositories");
        self.source.list_repositories(username).await
    }

    pub async fn get_repository(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<GithubRepoSummary, GithubError> {
        tracing::debug!(owner, repo, "fetching repository");
        self.source.get_repository(owner, repo).await
    }
}
