//! GitHub repository proxy endpoints

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;

use crate::github::GithubRepoSummary;
use crate::http::error::ApiError;
use crate::http::extractors::{ValidPath, ValidQuery};
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct RepositoriesQuery {
    pub username: Option<String>,
}

/// GET /github/repositories?username=
async fn list_for_query(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<RepositoriesQuery>,
) -> Result<Json<Vec<GithubRepoSummary>>, ApiError> {
    let repos = state
        .repositories
        .list_repositories(query.username.as_deref())
        .await?;
    Ok(Json(repos))
}

/// GET /github/repositories/{username}
async fn list_for_user(
    State(state): State<Arc<AppState>>,
    ValidPath(username): ValidPath<String>,
) -> Result<Json<Vec<GithubRepoSummary>>, ApiError> {
    let repos = state.repositories.list_repositories(Some(&username)).await?;
    Ok(Json(repos))
}

/// GET /github/repositories/{username}/{repo}
async fn get_repository(
    State(state): State<Arc<AppState>>,
    ValidPath((username, repo)): ValidPath<(String, String)>,
) -> Result<Json<GithubRepoSummary>, ApiError> {
    let repo = state.repositories.get_repository(&username, &repo).await?;
    Ok(Json(repo))
}

/// GitHub routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/github/repositories", get(list_for_query))
        .route("/github/repositories/{username}", get(list_for_user))
        .route("/github/repositories/{username}/{repo}", get(get_repository))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use crate::github::source::sample_repo;
    use crate::github::MockRepositorySource;
    use crate::http::server::testing::{app_with, expect};
    use crate::posts::MemoryPostStore;

    fn app(source: MockRepositorySource, default_user: Option<&str>) -> axum::Router {
        app_with(Arc::new(MemoryPostStore::new()), source, default_user)
    }

    fn octocat() -> MockRepositorySource {
        MockRepositorySource::new(vec![
            sample_repo("octocat", "hello-world"),
            sample_repo("octocat", "spoon-knife"),
            sample_repo("someone", "else"),
        ])
    }

    #[tokio::test]
    async fn lists_for_default_user() {
        let app = app(octocat(), Some("octocat"));
        let body = expect(&app, "GET", "/github/repositories", None, StatusCode::OK).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["full_name"], "octocat/hello-world");
    }

    #[tokio::test]
    async fn query_username_overrides_default() {
        let app = app(octocat(), Some("octocat"));
        let body = expect(
            &app,
            "GET",
            "/github/repositories?username=someone",
            None,
            StatusCode::OK,
        )
        .await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn path_username_lists_repositories() {
        let app = app(octocat(), None);
        let body = expect(&app, "GET", "/github/repositories/octocat", None, StatusCode::OK).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_username_is_400() {
        let app = app(octocat(), None);
        let body = expect(&app, "GET", "/github/repositories", None, StatusCode::BAD_REQUEST).await;
        assert_eq!(body["statusCode"], 400);
        assert!(body["message"][0].as_str().unwrap().contains("GITHUB_USERNAME"));
    }

    #[tokio::test]
    async fn malformed_query_uses_json_error_body() {
        let app = app(octocat(), Some("octocat"));
        let body = expect(
            &app,
            "GET",
            "/github/repositories?username=a&username=b",
            None,
            StatusCode::BAD_REQUEST,
        )
        .await;
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["error"], "validation_error");
        assert!(body["message"][0].as_str().unwrap().contains("username"));
    }

    #[tokio::test]
    async fn unknown_user_is_404() {
        let app = app(MockRepositorySource::failing(StatusCode::NOT_FOUND), None);
        let body = expect(&app, "GET", "/github/repositories/ghost", None, StatusCode::NOT_FOUND).await;
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn user_without_repositories_gets_empty_list() {
        let app = app(octocat(), None);
        let body = expect(&app, "GET", "/github/repositories/quiet", None, StatusCode::OK).await;
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn rate_limit_is_403() {
        let app = app(MockRepositorySource::failing(StatusCode::FORBIDDEN), None);
        let body = expect(&app, "GET", "/github/repositories/octocat", None, StatusCode::FORBIDDEN).await;
        assert_eq!(body["error"], "forbidden");
    }

    #[tokio::test]
    async fn single_repository_lookup() {
        let app = app(octocat(), None);
        let body = expect(
            &app,
            "GET",
            "/github/repositories/octocat/spoon-knife",
            None,
            StatusCode::OK,
        )
        .await;
        assert_eq!(body["name"], "spoon-knife");
        assert!(body.get("owner").is_none());

        expect(
            &app,
            "GET",
            "/github/repositories/octocat/missing",
            None,
            StatusCode::NOT_FOUND,
        )
        .await;
    }

    #[tokio::test]
    async fn forbidden_on_single_lookup_is_internal() {
        let app = app(MockRepositorySource::failing(StatusCode::FORBIDDEN), None);
        let body = expect(
            &app,
            "GET",
            "/github/repositories/octocat/hello-world",
            None,
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .await;
        assert_eq!(body["message"], "an internal error occurred");
    }
}
