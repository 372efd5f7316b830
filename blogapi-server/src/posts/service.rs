//! Post management
//!
//! Composes store primitives into the post operations:
//! - tags are upserted by name in the order given, then connected
//! - a tag update replaces the whole set (clear, upsert, reconnect)
//! - update and remove check existence before writing anything

use std::sync::Arc;

use serde::Serialize;

use super::PostStore;
use crate::db::repos::DbError;
use crate::models::{NewPost, Patch, Post, PostChanges, TagSet};

/// Confirmation returned by `remove`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deleted {
    pub id: i32,
    pub message: String,
}

/// Post service over any `PostStore`
#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn PostStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    /// Create a post, creating any tags that don't exist yet.
    pub async fn create(&self, post: NewPost, tags: TagSet) -> Result<Post, DbError> {
        let tag_ids = self.upsert_tags(&tags).await?;
        let created = self.store.insert(&post, &tag_ids).await?;
        tracing::debug!(post_id = created.id, tags = tag_ids.len(), "post created");
        Ok(created)
    }

    /// All posts, newest first.
    pub async fn find_all(&self) -> Result<Vec<Post>, DbError> {
        self.store.list(false).await
    }

    /// Published posts, newest first.
    pub async fn find_published(&self) -> Result<Vec<Post>, DbError> {
        self.store.list(true).await
    }

    pub async fn find_one(&self, id: i32) -> Result<Post, DbError> {
        self.store.find(id).await?.ok_or_else(|| DbError::NotFound {
            resource: "post",
            id: id.to_string(),
        })
    }

    /// Apply a partial update.
    ///
    /// `tags: Patch::Value(set)` replaces every association with `set`, even
    /// when `set` is empty. The clear and the reconnect are separate
    /// statements, so a failure between them leaves the post untagged.
    pub async fn update(
        &self,
        id: i32,
        changes: PostChanges,
        tags: Patch<TagSet>,
    ) -> Result<Post, DbError> {
        self.find_one(id).await?;

        let tag_ids = match &tags {
            Patch::Value(set) => {
                self.store.clear_tags(id).await?;
                self.upsert_tags(set).await?
            }
            Patch::Missing => Vec::new(),
        };

        let updated = self.store.update(id, &changes, &tag_ids).await?;
        tracing::debug!(post_id = id, retagged = !tags.is_missing(), "post updated");
        Ok(updated)
    }

    /// Delete a post. Its tags stay behind.
    pub async fn remove(&self, id: i32) -> Result<Deleted, DbError> {
        self.find_one(id).await?;
        self.store.delete(id).await?;
        tracing::debug!(post_id = id, "post deleted");

        Ok(Deleted {
            id,
            message: format!("post {} deleted", id),
        })
    }

    async fn upsert_tags(&self, tags: &TagSet) -> Result<Vec<i32>, DbError> {
        let mut ids = Vec::with_capacity(tags.len());
        for name in tags.iter() {
            ids.push(self.store.upsert_tag(name).await?.id);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PostContent, PostTitle};
    use crate::posts::MemoryPostStore;

    fn service() -> (PostService, Arc<MemoryPostStore>) {
        let store = Arc::new(MemoryPostStore::new());
        (PostService::new(store.clone()), store)
    }

    fn draft(title: &str, published: bool) -> NewPost {
        NewPost {
            title: PostTitle::new(title.into()).unwrap(),
            content: PostContent::new("C".into()).unwrap(),
            summary: None,
            published,
        }
    }

    fn tags(names: &[&str]) -> TagSet {
        TagSet::from_names(names.iter().copied()).unwrap()
    }

    #[tokio::test]
    async fn duplicate_tags_collapse_to_one_association() {
        let (svc, store) = service();
        let post = svc.create(draft("T", false), tags(&["a", "b", "a"])).await.unwrap();

        assert_eq!(post.tag_names(), vec!["a", "b"]);
        assert_eq!(store.tags().len(), 2);
    }

    #[tokio::test]
    async fn create_then_fetch_round_trip() {
        let (svc, _) = service();
        let created = svc.create(draft("T", false), tags(&["x"])).await.unwrap();
        let fetched = svc.find_one(created.id).await.unwrap();

        assert_eq!(fetched.title, "T");
        assert_eq!(fetched.content, "C");
        assert!(!fetched.published);
        assert_eq!(fetched.tag_names(), vec!["x"]);
    }

    #[tokio::test]
    async fn existing_tags_are_reused() {
        let (svc, store) = service();
        let first = svc.create(draft("one", false), tags(&["rust"])).await.unwrap();
        let second = svc.create(draft("two", false), tags(&["rust"])).await.unwrap();

        assert_eq!(first.tags[0].id, second.tags[0].id);
        assert_eq!(store.tags().len(), 1);
    }

    #[tokio::test]
    async fn update_missing_post_fails_before_any_write() {
        let (svc, store) = service();
        let err = svc
            .update(42, PostChanges::default(), Patch::Value(tags(&["a"])))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { resource: "post", .. }));
        assert_eq!(store.write_count(), 0);
        assert!(store.tags().is_empty());
    }

    #[tokio::test]
    async fn updating_tags_to_empty_clears_them() {
        let (svc, _) = service();
        let post = svc.create(draft("T", false), tags(&["a", "b"])).await.unwrap();

        let updated = svc
            .update(post.id, PostChanges::default(), Patch::Value(TagSet::default()))
            .await
            .unwrap();
        assert!(updated.tags.is_empty());
        assert!(svc.find_one(post.id).await.unwrap().tags.is_empty());
    }

    #[tokio::test]
    async fn tag_update_replaces_rather_than_merges() {
        let (svc, store) = service();
        let post = svc.create(draft("T", false), tags(&["a", "b"])).await.unwrap();

        let updated = svc
            .update(post.id, PostChanges::default(), Patch::Value(tags(&["c"])))
            .await
            .unwrap();
        assert_eq!(updated.tag_names(), vec!["c"]);
        // old tags are orphaned, not deleted
        assert_eq!(store.tags().len(), 3);
    }

    #[tokio::test]
    async fn omitted_tags_leave_associations_alone() {
        let (svc, _) = service();
        let post = svc.create(draft("T", false), tags(&["keep"])).await.unwrap();

        let changes = PostChanges {
            title: Patch::Value(PostTitle::new("renamed".into()).unwrap()),
            ..PostChanges::default()
        };
        let updated = svc.update(post.id, changes, Patch::Missing).await.unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.tag_names(), vec!["keep"]);
    }

    #[tokio::test]
    async fn omitted_published_is_unchanged_and_explicit_false_applies() {
        let (svc, _) = service();
        let post = svc.create(draft("T", true), TagSet::default()).await.unwrap();

        let untouched = svc
            .update(post.id, PostChanges::default(), Patch::Missing)
            .await
            .unwrap();
        assert!(untouched.published);

        let changes = PostChanges {
            published: Patch::Value(false),
            ..PostChanges::default()
        };
        let unpublished = svc.update(post.id, changes, Patch::Missing).await.unwrap();
        assert!(!unpublished.published);
    }

    #[tokio::test]
    async fn summary_can_be_cleared() {
        let (svc, _) = service();
        let mut new = draft("T", false);
        new.summary = Some("short".into());
        let post = svc.create(new, TagSet::default()).await.unwrap();
        assert_eq!(post.summary.as_deref(), Some("short"));

        let changes = PostChanges {
            summary: Patch::Value(None),
            ..PostChanges::default()
        };
        let updated = svc.update(post.id, changes, Patch::Missing).await.unwrap();
        assert!(updated.summary.is_none());
    }

    #[tokio::test]
    async fn published_listing_filters_and_orders_newest_first() {
        let (svc, _) = service();
        let older = svc.create(draft("older", true), TagSet::default()).await.unwrap();
        let hidden = svc.create(draft("hidden", false), TagSet::default()).await.unwrap();
        let newer = svc.create(draft("newer", true), TagSet::default()).await.unwrap();

        let published: Vec<i32> = svc.find_published().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(published, vec![newer.id, older.id]);

        let all: Vec<i32> = svc.find_all().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(all, vec![newer.id, hidden.id, older.id]);
    }

    #[tokio::test]
    async fn remove_keeps_tags_and_reports_id() {
        let (svc, store) = service();
        let post = svc.create(draft("T", false), tags(&["orphan"])).await.unwrap();

        let deleted = svc.remove(post.id).await.unwrap();
        assert_eq!(deleted.id, post.id);
        assert!(svc.find_one(post.id).await.is_err());
        assert_eq!(store.tags().len(), 1);
    }

    #[tokio::test]
    async fn remove_missing_post_performs_no_mutation() {
        let (svc, store) = service();
        let err = svc.remove(7).await.unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(store.write_count(), 0);
    }
}
