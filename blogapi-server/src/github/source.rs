//! Repository source trait and implementations
//!
//! Provides a trait for fetching repository metadata, with:
//! - Real implementation in `client::GithubClient`
//! - Mock implementation for testing

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::client::{classify_get_failure, classify_list_failure, GithubError};
use super::models::GithubRepoSummary;

/// Trait for repository metadata lookups (testable)
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// First page of a user's repositories.
    async fn list_repositories(&self, username: &str) -> Result<Vec<GithubRepoSummary>, GithubError>;

    async fn get_repository(&self, owner: &str, repo: &str) -> Result<GithubRepoSummary, GithubError>;
}

/// Mock source serving canned repositories
///
/// A user with no canned repositories gets an empty list, as upstream does.
/// Use `failing(StatusCode::NOT_FOUND)` for a user that does not exist.
#[derive(Default)]
pub struct MockRepositorySource {
    repos: Vec<GithubRepoSummary>,
    failure: Option<StatusCode>,
    calls: Mutex<Vec<String>>,
}

impl MockRepositorySource {
    pub fn new(repos: Vec<GithubRepoSummary>) -> Self {
        Self {
            repos,
            ..Self::default()
        }
    }

    /// Answer every call as if upstream had returned `status`.
    pub fn failing(status: StatusCode) -> Self {
        Self {
            failure: Some(status),
            ..Self::default()
        }
    }

    /// Usernames (or `owner/repo` pairs) requested so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn owned_by<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a GithubRepoSummary> {
        self.repos.iter().filter(move |r| {
            r.full_name
                .split_once('/')
                .is_some_and(|(o, _)| o.eq_ignore_ascii_case(owner))
        })
    }
}

#[async_trait]
impl RepositorySource for MockRepositorySource {
    async fn list_repositories(&self, username: &str) -> Result<Vec<GithubRepoSummary>, GithubError> {
        self.calls.lock().unwrap().push(username.to_owned());
        if let Some(status) = self.failure {
            return Err(classify_list_failure(status, username));
        }

        Ok(self.owned_by(username).cloned().collect())
    }

    async fn get_repository(&self, owner: &str, repo: &str) -> Result<GithubRepoSummary, GithubError> {
        self.calls.lock().unwrap().push(format!("{}/{}", owner, repo));
        if let Some(status) = self.failure {
            return Err(classify_get_failure(status, owner, repo));
        }

        self.owned_by(owner)
            .find(|r| r.name == repo)
            .cloned()
            .ok_or_else(|| classify_get_failure(StatusCode::NOT_FOUND, owner, repo))
    }
}

/// Repository fixture for tests
pub fn sample_repo(owner: &str, name: &str) -> GithubRepoSummary {
    GithubRepoSummary {
        id: 1,
        name: name.to_owned(),
        full_name: format!("{}/{}", owner, name),
        description: None,
        html_url: format!("https://github.com/{}/{}", owner, name),
        private: false,
        fork: false,
        language: Some("Rust".to_owned()),
        stargazers_count: 0,
        forks_count: 0,
        created_at: "2024-01-01T00:00:00Z".to_owned(),
        updated_at: "2024-01-02T00:00:00Z".to_owned(),
        pushed_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn user_without_repositories_lists_empty() {
        let mock = MockRepositorySource::new(vec![sample_repo("alice", "a")]);
        let repos = mock.list_repositories("nobody").await.unwrap();
        assert!(repos.is_empty());
    }

    #[tokio::test]
    async fn failing_not_found_is_unknown_user() {
        let mock = MockRepositorySource::failing(StatusCode::NOT_FOUND);
        let err = mock.list_repositories("ghost").await.unwrap_err();
        assert!(matches!(err, GithubError::UserNotFound { .. }));
        assert_eq!(mock.calls(), vec!["ghost"]);
    }
}
