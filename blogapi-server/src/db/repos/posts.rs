//! Post repository
//!
//! Handles post CRUD with proper patterns:
//! - tag upsert: INSERT with ON CONFLICT (races resolve to the existing row)
//! - list: one JOIN for authors, one batched query for tags (no N+1)
//! - insert/update plus tag connect share a transaction

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::DbError;
use crate::db::Database;
use crate::models::{Author, NewPost, Patch, Post, PostChanges, Tag, TagName};
use crate::posts::PostStore;

const SELECT_POSTS: &str = r#"
    SELECT
        p.id,
        p.title,
        p.content,
        p.summary,
        p.published,
        p.created_at,
        p.updated_at,
        p.author_id,
        a.name AS author_name,
        a.email AS author_email
    FROM posts p
    LEFT JOIN authors a ON a.id = p.author_id
"#;

/// Post row joined with its author
#[derive(Debug, FromRow)]
struct PostRow {
    id: i32,
    title: String,
    content: String,
    summary: Option<String>,
    published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_id: Option<i32>,
    author_name: Option<String>,
    author_email: Option<String>,
}

impl PostRow {
    fn into_post(self, tags: Vec<Tag>) -> Post {
        let author = match (self.author_id, self.author_name, self.author_email) {
            (Some(id), Some(name), Some(email)) => Some(Author { id, name, email }),
            _ => None,
        };

        Post {
            id: self.id,
            title: self.title,
            content: self.content,
            summary: self.summary,
            published: self.published,
            created_at: self.created_at,
            updated_at: self.updated_at,
            author_id: self.author_id,
            author,
            tags,
        }
    }
}

/// Tag row tagged with the post it belongs to
#[derive(Debug, FromRow)]
struct PostTagRow {
    post_id: i32,
    id: i32,
    name: String,
}

/// Post repository over the read/write pool pair
#[derive(Clone)]
pub struct PostRepo {
    db: Database,
}

impl PostRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn fetch_one(&self, pool: &PgPool, id: i32) -> Result<Option<Post>, DbError> {
        let row: Option<PostRow> = sqlx::query_as(&format!("{SELECT_POSTS} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match row {
            Some(row) => {
                let mut posts = attach_tags(pool, vec![row]).await?;
                Ok(posts.pop())
            }
            None => Ok(None),
        }
    }

    async fn fetch_written(&self, id: i32) -> Result<Post, DbError> {
        self.fetch_one(self.db.write(), id)
            .await?
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: i32) -> DbError {
    DbError::NotFound {
        resource: "post",
        id: id.to_string(),
    }
}

/// Load tags for every row in one query and assemble posts in row order.
async fn attach_tags(pool: &PgPool, rows: Vec<PostRow>) -> Result<Vec<Post>, DbError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let tag_rows: Vec<PostTagRow> = sqlx::query_as(
        r#"
        SELECT pt.post_id, t.id, t.name
        FROM post_tags pt
        JOIN tags t ON t.id = pt.tag_id
        WHERE pt.post_id = ANY($1)
        ORDER BY t.id
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let tags = tag_rows
                .iter()
                .filter(|t| t.post_id == row.id)
                .map(|t| Tag {
                    id: t.id,
                    name: t.name.clone(),
                })
                .collect();
            row.into_post(tags)
        })
        .collect())
}

async fn connect_tags(
    conn: &mut sqlx::PgConnection,
    post_id: i32,
    tag_ids: &[i32],
) -> Result<(), DbError> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO post_tags (post_id, tag_id)
        SELECT $1, UNNEST($2::int4[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(post_id)
    .bind(tag_ids)
    .execute(conn)
    .await?;

    Ok(())
}

#[async_trait]
impl PostStore for PostRepo {
    async fn find(&self, id: i32) -> Result<Option<Post>, DbError> {
        self.fetch_one(self.db.read(), id).await
    }

    async fn list(&self, published_only: bool) -> Result<Vec<Post>, DbError> {
        let filter = if published_only {
            "WHERE p.published = TRUE"
        } else {
            ""
        };
        let sql = format!("{SELECT_POSTS} {filter} ORDER BY p.created_at DESC, p.id DESC");

        let rows: Vec<PostRow> = sqlx::query_as(&sql).fetch_all(self.db.read()).await?;
        attach_tags(self.db.read(), rows).await
    }

    async fn upsert_tag(&self, name: &TagName) -> Result<Tag, DbError> {
        // DO UPDATE (not DO NOTHING) so RETURNING yields the row on conflict
        let tag: Tag = sqlx::query_as(
            r#"
            INSERT INTO tags (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name
            "#,
        )
        .bind(name.as_str())
        .fetch_one(self.db.write())
        .await?;

        Ok(tag)
    }

    async fn insert(&self, post: &NewPost, tag_ids: &[i32]) -> Result<Post, DbError> {
        let mut tx = self.db.write().begin().await?;

        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO posts (title, content, summary, published)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(post.title.as_str())
        .bind(post.content.as_str())
        .bind(post.summary.as_deref())
        .bind(post.published)
        .fetch_one(&mut *tx)
        .await?;

        connect_tags(&mut tx, id, tag_ids).await?;
        tx.commit().await?;

        self.fetch_written(id).await
    }

    async fn clear_tags(&self, id: i32) -> Result<(), DbError> {
        sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
            .bind(id)
            .execute(self.db.write())
            .await?;
        Ok(())
    }

    async fn update(
        &self,
        id: i32,
        changes: &PostChanges,
        tag_ids: &[i32],
    ) -> Result<Post, DbError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE posts SET updated_at = NOW()");
        if let Patch::Value(title) = &changes.title {
            qb.push(", title = ").push_bind(title.as_str().to_owned());
        }
        if let Patch::Value(content) = &changes.content {
            qb.push(", content = ").push_bind(content.as_str().to_owned());
        }
        if let Patch::Value(summary) = &changes.summary {
            qb.push(", summary = ").push_bind(summary.clone());
        }
        if let Patch::Value(published) = changes.published {
            qb.push(", published = ").push_bind(published);
        }
        qb.push(" WHERE id = ").push_bind(id);

        let mut tx = self.db.write().begin().await?;
        let result = qb.build().execute(&mut *tx).await?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        connect_tags(&mut tx, id, tag_ids).await?;
        tx.commit().await?;

        self.fetch_written(id).await
    }

    async fn delete(&self, id: i32) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.db.write())
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}
