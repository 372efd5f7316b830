//! Schema bootstrap
//!
//! Idempotent `CREATE ... IF NOT EXISTS` statements, run on the write pool
//! before the server accepts traffic.

use sqlx::PgPool;

const STATEMENTS: &[(&str, &str)] = &[
    (
        "authors",
        r#"
        CREATE TABLE IF NOT EXISTS authors (
            id SERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE
        )
        "#,
    ),
    (
        "posts",
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id SERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            summary TEXT,
            published BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            author_id INTEGER REFERENCES authors(id) ON DELETE SET NULL
        )
        "#,
    ),
    (
        "tags",
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            id SERIAL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    ),
    (
        "post_tags",
        r#"
        CREATE TABLE IF NOT EXISTS post_tags (
            post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (post_id, tag_id)
        )
        "#,
    ),
    (
        "idx_posts_created_at",
        "CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts (created_at DESC)",
    ),
    (
        "idx_post_tags_tag_id",
        "CREATE INDEX IF NOT EXISTS idx_post_tags_tag_id ON post_tags (tag_id)",
    ),
];

/// Create any missing tables and indexes.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running schema migrations...");

    for &(name, sql) in STATEMENTS {
        tracing::debug!(object = name, "ensuring schema object");
        sqlx::query(sql).execute(pool).await?;
    }

    tracing::info!("Schema migrations complete");
    Ok(())
}
