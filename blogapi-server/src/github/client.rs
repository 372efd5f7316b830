//! GitHub REST API client
//!
//! One outbound request per call, no retries. The optional token is sent as
//! `Authorization: token <token>`; without it requests are anonymous and
//! subject to the stricter unauthenticated rate limit.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, StatusCode, Url};

use super::models::GithubRepoSummary;
use super::source::RepositorySource;
use crate::config::GithubConfig;

/// Only the first page of a user's repositories is fetched
pub const REPOS_PER_PAGE: u32 = 100;

const USER_AGENT: &str = concat!("blogapi/", env!("CARGO_PKG_VERSION"));

/// GitHub client error
#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    #[error("no username supplied and GITHUB_USERNAME is not set")]
    MissingUsername,

    #[error("user '{username}' does not exist or its repositories are inaccessible")]
    UserNotFound { username: String },

    #[error("repository '{owner}/{repo}' does not exist or is inaccessible")]
    RepoNotFound { owner: String, repo: String },

    #[error("GitHub API rate limit reached")]
    RateLimited,

    #[error("GitHub API returned {status}")]
    Upstream { status: u16 },

    #[error("invalid GitHub API URL '{url}'")]
    InvalidBaseUrl { url: String },

    #[error("GitHub request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Map a failed "list user repositories" status.
pub fn classify_list_failure(status: StatusCode, username: &str) -> GithubError {
    match status {
        StatusCode::NOT_FOUND => GithubError::UserNotFound {
            username: username.to_owned(),
        },
        StatusCode::FORBIDDEN => GithubError::RateLimited,
        other => GithubError::Upstream {
            status: other.as_u16(),
        },
    }
}

/// Map a failed "get repository" status.
pub fn classify_get_failure(status: StatusCode, owner: &str, repo: &str) -> GithubError {
    match status {
        StatusCode::NOT_FOUND => GithubError::RepoNotFound {
            owner: owner.to_owned(),
            repo: repo.to_owned(),
        },
        other => GithubError::Upstream {
            status: other.as_u16(),
        },
    }
}

/// GitHub REST client
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    api_url: Url,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Result<Self, GithubError> {
        let invalid = || GithubError::InvalidBaseUrl {
            url: config.api_url.clone(),
        };
        let api_url = Url::parse(&config.api_url).map_err(|_| invalid())?;
        if api_url.cannot_be_a_base() {
            return Err(invalid());
        }

        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            api_url,
            token: config.token.clone(),
        })
    }

    /// Base URL joined with percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get(&self, url: Url) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json");

        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("token {}", token)),
            None => request,
        }
    }

    /// URL for the first page of a user's repositories, most recently updated first.
    pub fn list_url(&self, username: &str) -> Url {
        let mut url = self.endpoint(&["users", username, "repos"]);
        url.query_pairs_mut()
            .append_pair("sort", "updated")
            .append_pair("direction", "desc")
            .append_pair("per_page", &REPOS_PER_PAGE.to_string());
        url
    }

    pub fn repo_url(&self, owner: &str, repo: &str) -> Url {
        self.endpoint(&["repos", owner, repo])
    }
}

#[async_trait]
impl RepositorySource for GithubClient {
    async fn list_repositories(&self, username: &str) -> Result<Vec<GithubRepoSummary>, GithubError> {
        let response = self.get(self.list_url(username)).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(username, status = status.as_u16(), "repository listing failed");
            return Err(classify_list_failure(status, username));
        }

        Ok(response.json().await?)
    }

    async fn get_repository(&self, owner: &str, repo: &str) -> Result<GithubRepoSummary, GithubError> {
        let response = self.get(self.repo_url(owner, repo)).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(owner, repo, status = status.as_u16(), "repository lookup failed");
            return Err(classify_get_failure(status, owner, repo));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str, token: Option<&str>) -> GithubClient {
        GithubClient::new(&GithubConfig {
            api_url: api_url.to_string(),
            default_username: None,
            token: token.map(str::to_string),
        })
        .unwrap()
    }

    #[test]
    fn list_url_requests_first_hundred_by_update_time() {
        let url = client("https://api.github.com", None).list_url("octocat");
        assert_eq!(
            url.as_str(),
            "https://api.github.com/users/octocat/repos?sort=updated&direction=desc&per_page=100"
        );
    }

    #[test]
    fn repo_url_keeps_base_path_and_encodes_segments() {
        let url = client("https://ghe.example.com/api/v3/", None).repo_url("me", "a b");
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/repos/me/a%20b");
    }

    #[test]
    fn token_is_sent_with_token_scheme() {
        let gh = client("https://api.github.com", Some("secret"));
        let request = gh.get(gh.repo_url("o", "r")).build().unwrap();
        assert_eq!(request.headers()[AUTHORIZATION], "token secret");
        assert_eq!(request.headers()[ACCEPT], "application/vnd.github+json");
    }

    #[test]
    fn anonymous_requests_carry_no_authorization() {
        let gh = client("https://api.github.com", None);
        let request = gh.get(gh.repo_url("o", "r")).build().unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = GithubClient::new(&GithubConfig {
            api_url: "not a url".into(),
            ..GithubConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, GithubError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn listing_classifies_404_and_403() {
        assert!(matches!(
            classify_list_failure(StatusCode::NOT_FOUND, "ghost"),
            GithubError::UserNotFound { .. }
        ));
        assert!(matches!(
            classify_list_failure(StatusCode::FORBIDDEN, "busy"),
            GithubError::RateLimited
        ));
        assert!(matches!(
            classify_list_failure(StatusCode::BAD_GATEWAY, "x"),
            GithubError::Upstream { status: 502 }
        ));
    }

    mod upstream {
        use std::collections::HashMap;

        use axum::extract::{Path, Query};
        use axum::http::header::USER_AGENT as USER_AGENT_HEADER;
        use axum::http::HeaderMap;
        use axum::response::{IntoResponse, Response};
        use axum::routing::get;
        use axum::{Json, Router};
        use serde_json::{json, Value};
        use tokio::net::TcpListener;

        use super::super::*;
        use crate::http::ApiError;

        fn raw_repo(owner: &str, name: &str, description: Option<&str>) -> Value {
            json!({
                "id": 42,
                "node_id": "R_kgDO",
                "name": name,
                "full_name": format!("{}/{}", owner, name),
                "owner": { "login": owner, "id": 1 },
                "description": description,
                "html_url": format!("https://github.com/{}/{}", owner, name),
                "private": false,
                "fork": false,
                "language": "Rust",
                "stargazers_count": 3,
                "watchers_count": 3,
                "forks_count": 1,
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-02-01T00:00:00Z",
                "pushed_at": "2024-02-02T00:00:00Z",
                "topics": ["cli"]
            })
        }

        fn well_formed(headers: &HeaderMap) -> bool {
            let agent = headers
                .get(USER_AGENT_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            let accept = headers
                .get(ACCEPT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            agent.starts_with("blogapi/") && accept == "application/vnd.github+json"
        }

        async fn list(
            Path(user): Path<String>,
            Query(query): Query<HashMap<String, String>>,
            headers: HeaderMap,
        ) -> Response {
            let paged = query.get("per_page").map(String::as_str) == Some("100")
                && query.get("sort").map(String::as_str) == Some("updated")
                && query.get("direction").map(String::as_str) == Some("desc");
            if !paged || !well_formed(&headers) {
                return StatusCode::BAD_REQUEST.into_response();
            }

            match user.as_str() {
                "octocat" => Json(json!([
                    raw_repo("octocat", "hello-world", Some("hi")),
                    raw_repo("octocat", "spoon-knife", None)
                ]))
                .into_response(),
                "quiet" => Json(json!([])).into_response(),
                "busy" => StatusCode::FORBIDDEN.into_response(),
                "garbled" => (StatusCode::OK, "not json").into_response(),
                "flaky" => StatusCode::BAD_GATEWAY.into_response(),
                _ => StatusCode::NOT_FOUND.into_response(),
            }
        }

        async fn repo(Path((owner, name)): Path<(String, String)>, headers: HeaderMap) -> Response {
            if !well_formed(&headers) {
                return StatusCode::BAD_REQUEST.into_response();
            }
            let auth = headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);

            match (owner.as_str(), name.as_str()) {
                ("octocat", "hello-world") => {
                    Json(raw_repo(&owner, &name, auth.as_deref())).into_response()
                }
                ("octocat", "secret") => StatusCode::FORBIDDEN.into_response(),
                _ => StatusCode::NOT_FOUND.into_response(),
            }
        }

        /// Serve a fake GitHub API on an ephemeral port and return its base URL.
        async fn spawn() -> String {
            let app = Router::new()
                .route("/users/{user}/repos", get(list))
                .route("/repos/{owner}/{repo}", get(repo));
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });
            format!("http://{}", addr)
        }

        async fn client(token: Option<&str>) -> GithubClient {
            GithubClient::new(&GithubConfig {
                api_url: spawn().await,
                default_username: None,
                token: token.map(str::to_string),
            })
            .unwrap()
        }

        #[tokio::test]
        async fn listing_projects_upstream_objects() {
            let gh = client(None).await;
            let repos = gh.list_repositories("octocat").await.unwrap();

            assert_eq!(repos.len(), 2);
            assert_eq!(repos[0].full_name, "octocat/hello-world");
            assert_eq!(repos[0].description.as_deref(), Some("hi"));
            assert_eq!(repos[0].stargazers_count, 3);
            assert_eq!(repos[1].description, None);

            let value = serde_json::to_value(&repos[0]).unwrap();
            assert!(value.get("owner").is_none());
            assert!(value.get("topics").is_none());
        }

        #[tokio::test]
        async fn listing_with_no_repositories_is_empty() {
            let gh = client(None).await;
            assert!(gh.list_repositories("quiet").await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn listing_maps_upstream_failures() {
            let gh = client(None).await;
            assert!(matches!(
                gh.list_repositories("ghost").await.unwrap_err(),
                GithubError::UserNotFound { .. }
            ));
            assert!(matches!(
                gh.list_repositories("busy").await.unwrap_err(),
                GithubError::RateLimited
            ));
            assert!(matches!(
                gh.list_repositories("flaky").await.unwrap_err(),
                GithubError::Upstream { status: 502 }
            ));
        }

        #[tokio::test]
        async fn undecodable_body_is_internal() {
            let gh = client(None).await;
            let err = gh.list_repositories("garbled").await.unwrap_err();
            assert!(matches!(err, GithubError::Transport(_)));
            assert_eq!(ApiError::from(err).status(), StatusCode::INTERNAL_SERVER_ERROR);
        }

        #[tokio::test]
        async fn lookup_sends_token_and_maps_failures() {
            let gh = client(Some("secret")).await;
            let repo = gh.get_repository("octocat", "hello-world").await.unwrap();
            assert_eq!(repo.name, "hello-world");
            assert_eq!(repo.description.as_deref(), Some("token secret"));

            assert!(matches!(
                gh.get_repository("octocat", "missing").await.unwrap_err(),
                GithubError::RepoNotFound { .. }
            ));
            assert!(matches!(
                gh.get_repository("octocat", "secret").await.unwrap_err(),
                GithubError::Upstream { status: 403 }
            ));
        }

        #[tokio::test]
        async fn unreachable_upstream_is_internal() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);

            let gh = GithubClient::new(&GithubConfig {
                api_url: format!("http://{}", addr),
                ..GithubConfig::default()
            })
            .unwrap();
            let err = gh.list_repositories("octocat").await.unwrap_err();
            assert!(matches!(err, GithubError::Transport(_)));
            assert_eq!(ApiError::from(err).status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn lookup_classifies_404_only() {
        assert!(matches!(
            classify_get_failure(StatusCode::NOT_FOUND, "o", "r"),
            GithubError::RepoNotFound { .. }
        ));
        assert!(matches!(
            classify_get_failure(StatusCode::FORBIDDEN, "o", "r"),
            GithubError::Upstream { status: 403 }
        ));
    }
}
