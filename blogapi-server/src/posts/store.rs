//! Post storage trait and implementations
//!
//! Provides the persistence operations the post service composes, with:
//! - Postgres implementation in `db::repos::posts`
//! - In-memory implementation for testing

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::db::repos::DbError;
use crate::models::{NewPost, Patch, Post, PostChanges, Tag, TagName};

/// Storage primitives for posts and tags (testable)
///
/// Queries run against the read side. Anything that mutates, and the
/// read-back after a mutation, runs against the write side.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// One post with author and tags, or `None`.
    async fn find(&self, id: i32) -> Result<Option<Post>, DbError>;

    /// Posts newest first, optionally only published ones.
    async fn list(&self, published_only: bool) -> Result<Vec<Post>, DbError>;

    /// Insert the tag if its name is new; return the stored row either way.
    async fn upsert_tag(&self, name: &TagName) -> Result<Tag, DbError>;

    /// Insert a post connected to `tag_ids`.
    async fn insert(&self, post: &NewPost, tag_ids: &[i32]) -> Result<Post, DbError>;

    /// Remove every tag association of a post.
    async fn clear_tags(&self, id: i32) -> Result<(), DbError>;

    /// Apply `changes`, connect `tag_ids`, and refresh `updated_at`.
    async fn update(&self, id: i32, changes: &PostChanges, tag_ids: &[i32])
        -> Result<Post, DbError>;

    /// Delete the post row. Tags are left in place.
    async fn delete(&self, id: i32) -> Result<(), DbError>;
}

fn post_not_found(id: i32) -> DbError {
    DbError::NotFound {
        resource: "post",
        id: id.to_string(),
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    posts: Vec<Post>,
    tags: Vec<Tag>,
    next_post_id: i32,
    next_tag_id: i32,
    writes: usize,
}

impl MemoryState {
    fn connect(&self, post: &mut Post, tag_ids: &[i32]) {
        for id in tag_ids {
            if post.tags.iter().any(|t| t.id == *id) {
                continue;
            }
            if let Some(tag) = self.tags.iter().find(|t| t.id == *id) {
                post.tags.push(tag.clone());
            }
        }
        post.tags.sort_by_key(|t| t.id);
    }
}

/// In-memory store for testing
#[derive(Debug, Default)]
pub struct MemoryPostStore {
    state: Mutex<MemoryState>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mutating calls made so far (tag upserts included).
    pub fn write_count(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    /// Every tag row ever created.
    pub fn tags(&self) -> Vec<Tag> {
        self.state.lock().unwrap().tags.clone()
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn find(&self, id: i32) -> Result<Option<Post>, DbError> {
        let state = self.state.lock().unwrap();
        Ok(state.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self, published_only: bool) -> Result<Vec<Post>, DbError> {
        let state = self.state.lock().unwrap();
        let mut posts: Vec<Post> = state
            .posts
            .iter()
            .filter(|p| !published_only || p.published)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn upsert_tag(&self, name: &TagName) -> Result<Tag, DbError> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        if let Some(tag) = state.tags.iter().find(|t| t.name == name.as_str()) {
            return Ok(tag.clone());
        }
        state.next_tag_id += 1;
        let tag = Tag {
            id: state.next_tag_id,
            name: name.as_str().to_owned(),
        };
        state.tags.push(tag.clone());
        Ok(tag)
    }

    async fn insert(&self, post: &NewPost, tag_ids: &[i32]) -> Result<Post, DbError> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        state.next_post_id += 1;
        let now = Utc::now();
        let mut row = Post {
            id: state.next_post_id,
            title: post.title.as_str().to_owned(),
            content: post.content.as_str().to_owned(),
            summary: post.summary.clone(),
            published: post.published,
            created_at: now,
            updated_at: now,
            author_id: None,
            author: None,
            tags: Vec::new(),
        };
        state.connect(&mut row, tag_ids);
        state.posts.push(row.clone());
        Ok(row)
    }

    async fn clear_tags(&self, id: i32) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| post_not_found(id))?;
        post.tags.clear();
        Ok(())
    }

    async fn update(
        &self,
        id: i32,
        changes: &PostChanges,
        tag_ids: &[i32],
    ) -> Result<Post, DbError> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        state.writes += 1;
        let index = state
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| post_not_found(id))?;

        let mut post = state.posts[index].clone();
        if let Patch::Value(title) = &changes.title {
            post.title = title.as_str().to_owned();
        }
        if let Patch::Value(content) = &changes.content {
            post.content = content.as_str().to_owned();
        }
        if let Patch::Value(summary) = &changes.summary {
            post.summary = summary.clone();
        }
        if let Patch::Value(published) = changes.published {
            post.published = published;
        }
        post.updated_at = Utc::now();
        state.connect(&mut post, tag_ids);
        state.posts[index] = post.clone();
        Ok(post)
    }

    async fn delete(&self, id: i32) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        let before = state.posts.len();
        state.posts.retain(|p| p.id != id);
        if state.posts.len() == before {
            return Err(post_not_found(id));
        }
        Ok(())
    }
}
