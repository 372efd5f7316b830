//! Post endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::extractors::{ValidId, ValidJson};
use crate::http::server::AppState;
use crate::models::{
    NewPost, Patch, Post, PostChanges, PostContent, PostTitle, TagSet, ValidationError,
};

/// Create post request
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    /// Defaults to false
    #[serde(default)]
    pub published: Option<bool>,
    /// Tag names; created on first use
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Partial update request
///
/// Omitted fields are left unchanged. `summary: null` clears the summary.
/// `tags` replaces the full tag set, so `[]` removes every tag.
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub content: Patch<String>,
    #[serde(default)]
    pub summary: Patch<Option<String>>,
    #[serde(default)]
    pub published: Patch<bool>,
    #[serde(default)]
    pub tags: Patch<Vec<String>>,
}

fn check<T>(errors: &mut Vec<ValidationError>, result: Result<T, ValidationError>) -> Option<T> {
    result.map_err(|e| errors.push(e)).ok()
}

impl CreatePostRequest {
    fn validate(self) -> Result<(NewPost, TagSet), ApiError> {
        let mut errors = Vec::new();
        let title = check(&mut errors, PostTitle::new(self.title));
        let content = check(&mut errors, PostContent::new(self.content));
        let tags = check(&mut errors, TagSet::from_names(self.tags.unwrap_or_default()));

        match (title, content, tags) {
            (Some(title), Some(content), Some(tags)) => Ok((
                NewPost {
                    title,
                    content,
                    summary: self.summary.filter(|s| !s.is_empty()),
                    published: self.published.unwrap_or(false),
                },
                tags,
            )),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

impl UpdatePostRequest {
    fn validate(self) -> Result<(PostChanges, Patch<TagSet>), ApiError> {
        let mut errors = Vec::new();
        let title = check(&mut errors, self.title.map(PostTitle::new).transpose());
        let content = check(&mut errors, self.content.map(PostContent::new).transpose());
        let tags = check(&mut errors, self.tags.map(TagSet::from_names).transpose());

        match (title, content, tags) {
            (Some(title), Some(content), Some(tags)) => Ok((
                PostChanges {
                    title,
                    content,
                    summary: self.summary,
                    published: self.published,
                },
                tags,
            )),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

/// POST /posts - create a post
async fn create_post(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let (post, tags) = req.validate()?;
    let post = state.posts.create(post, tags).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /posts - all posts, newest first
async fn list_posts(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.posts.find_all().await?))
}

/// GET /posts/published - published posts, newest first
async fn list_published(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.posts.find_published().await?))
}

/// GET /posts/{id}
async fn get_post(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(state.posts.find_one(id).await?))
}

/// PATCH /posts/{id}
async fn update_post(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
    ValidJson(req): ValidJson<UpdatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    let (changes, tags) = req.validate()?;
    Ok(Json(state.posts.update(id, changes, tags).await?))
}

/// DELETE /posts/{id}
async fn delete_post(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    let deleted = state.posts.remove(id).await?;
    tracing::info!(post_id = deleted.id, "{}", deleted.message);
    Ok(StatusCode::NO_CONTENT)
}

/// Post routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/published", get(list_published))
        .route(
            "/posts/{id}",
            get(get_post).patch(update_post).delete(delete_post),
        )
}
