use crate::{models::SqlPost, Db};
use chrono::Utc;
use domain::{ContentKind, Post, PreparedPost};

use super::comments::delete_comment_tree;

const POST_COLUMNS: &str = r#"
    p.id, p.author_id, p.title, p.body, p.read_time, p.created_at, p.updated_at,
    u.username AS author
"#;

fn like_pattern(q: &str) -> String {
    let escaped = q
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl Db {
    pub async fn insert_post(&self, author_id: i64, post: &PreparedPost) -> anyhow::Result<Post> {
        let now = Utc::now().naive_utc();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts (author_id, title, body, read_time, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(author_id)
        .bind(post.title())
        .bind(post.body())
        .bind(post.read_time())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        self.get_post(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("post {} vanished after insert", id))
    }

    /// Overwrites the editable fields; `None` when the post does not exist.
    pub async fn update_post(&self, id: i64, post: &PreparedPost) -> anyhow::Result<Option<Post>> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, body = ?, read_time = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(post.title())
        .bind(post.body())
        .bind(post.read_time())
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_post(id).await
    }

    pub async fn get_post(&self, id: i64) -> anyhow::Result<Option<Post>> {
        let sql = format!(
            "SELECT {} FROM posts p JOIN users u ON u.id = p.author_id WHERE p.id = ?",
            POST_COLUMNS
        );
        let row = sqlx::query_as::<_, SqlPost>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Deletes a post together with every comment attached to it.
    pub async fn delete_post(&self, id: i64) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;

        let removed = delete_comment_tree(&mut tx, ContentKind::Post, id, None).await?;

        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        if result.rows_affected() > 0 {
            tracing::debug!("Deleted post {} and {} attached comments", id, removed);
        }
        Ok(result.rows_affected() > 0)
    }

    /// Newest first. `query` matches title, body or author username, case-insensitively.
    pub async fn list_posts(
        &self,
        query: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<(Vec<Post>, i64)> {
        let q = query.map(str::trim).unwrap_or("");
        let pattern = like_pattern(q);

        let filter = r#"
            WHERE ? = ''
               OR p.title LIKE ? ESCAPE '\'
               OR p.body LIKE ? ESCAPE '\'
               OR u.username LIKE ? ESCAPE '\'
        "#;

        let sql = format!(
            r#"
            SELECT {}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            {}
            ORDER BY p.created_at DESC, p.updated_at DESC, p.id DESC
            LIMIT ? OFFSET ?
            "#,
            POST_COLUMNS, filter
        );
        let rows = sqlx::query_as::<_, SqlPost>(&sql)
            .bind(q)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!(
            "SELECT COUNT(*) FROM posts p JOIN users u ON u.id = p.author_id {}",
            filter
        );
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(q)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }
}
