use crate::{
    models::{SqlComment, SqlCommentSummary},
    Db,
};
use chrono::Utc;
use domain::{Comment, CommentSummary, ContentKind, ContentRef};
use sqlx::{Sqlite, Transaction};

const COMMENT_COLUMNS: &str = r#"
    c.id, c.author_id, c.content_kind, c.object_id, c.parent_id, c.body, c.created_at,
    u.username AS author
"#;

/// Identity tuple of a comment. At most one row exists per tuple.
#[derive(Debug, Clone)]
pub struct CommentInsert<'a> {
    pub author_id: i64,
    pub target: ContentRef,
    pub parent_id: Option<i64>,
    pub body: &'a str,
}

/// Deletes every comment reachable from the seed: comments attached to `(kind, object_id)`,
/// the `root` comment itself, and recursively their replies and the comments attached to them.
pub(crate) async fn delete_comment_tree(
    tx: &mut Transaction<'_, Sqlite>,
    kind: ContentKind,
    object_id: i64,
    root: Option<i64>,
) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        WITH RECURSIVE doomed(id) AS (
            SELECT id FROM comments
            WHERE (content_kind = ? AND object_id = ?) OR id = ?
            UNION
            SELECT c.id FROM comments c
            JOIN doomed d
              ON c.parent_id = d.id
              OR (c.content_kind = 'comment' AND c.object_id = d.id)
        )
        DELETE FROM comments WHERE id IN (SELECT id FROM doomed)
        "#,
    )
    .bind(kind.tag())
    .bind(object_id)
    .bind(root)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

impl Db {
    /// Writes the comment unless an identical one exists, in which case the existing row is
    /// returned. The flag is `true` when this call created the row.
    pub async fn insert_comment_or_get(
        &self,
        new: &CommentInsert<'_>,
    ) -> anyhow::Result<(Comment, bool)> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO comments (author_id, content_kind, object_id, parent_id, body, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(new.author_id)
        .bind(new.target.kind.tag())
        .bind(new.target.id)
        .bind(new.parent_id)
        .bind(new.body)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            let id = result.last_insert_rowid();
            let comment = self
                .get_comment(id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("comment {} vanished after insert", id))?;
            return Ok((comment, true));
        }

        // lost to an identical row; hand that one back
        let existing = self.find_comment(new).await?.ok_or_else(|| {
            anyhow::anyhow!(
                "comment by {} on {} conflicted but could not be re-read",
                new.author_id,
                new.target
            )
        })?;
        Ok((existing, false))
    }

    pub async fn find_comment(&self, key: &CommentInsert<'_>) -> anyhow::Result<Option<Comment>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.author_id = ?
              AND c.content_kind = ?
              AND c.object_id = ?
              AND c.body = ?
              AND c.parent_id IS ?
            "#,
            COMMENT_COLUMNS
        );
        let row = sqlx::query_as::<_, SqlComment>(&sql)
            .bind(key.author_id)
            .bind(key.target.kind.tag())
            .bind(key.target.id)
            .bind(key.body)
            .bind(key.parent_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Comment::try_from).transpose()
    }

    pub async fn get_comment(&self, id: i64) -> anyhow::Result<Option<Comment>> {
        let sql = format!(
            "SELECT {} FROM comments c JOIN users u ON u.id = c.author_id WHERE c.id = ?",
            COMMENT_COLUMNS
        );
        let row = sqlx::query_as::<_, SqlComment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Comment::try_from).transpose()
    }

    /// Comments attached to `target` that are not replies, newest first.
    pub async fn list_top_level_comments(
        &self,
        target: ContentRef,
    ) -> anyhow::Result<Vec<CommentSummary>> {
        let sql = format!(
            r#"
            SELECT {},
                (SELECT COUNT(*) FROM comments r WHERE r.parent_id = c.id) AS reply_count
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.content_kind = ? AND c.object_id = ? AND c.parent_id IS NULL
            ORDER BY c.created_at DESC, c.id DESC
            "#,
            COMMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, SqlCommentSummary>(&sql)
            .bind(target.kind.tag())
            .bind(target.id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(CommentSummary::try_from).collect()
    }

    /// Replies to a comment, oldest first.
    pub async fn list_replies(&self, parent_id: i64) -> anyhow::Result<Vec<Comment>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.parent_id = ?
            ORDER BY c.created_at ASC, c.id ASC
            "#,
            COMMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, SqlComment>(&sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Comment::try_from).collect()
    }

    /// Deletes a comment, its replies and anything attached to it.
    pub async fn delete_comment(&self, id: i64) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;
        let removed = delete_comment_tree(&mut tx, ContentKind::Comment, id, Some(id)).await?;
        tx.commit().await?;

        if removed > 1 {
            tracing::debug!("Deleted comment {} with {} dependent comments", id, removed - 1);
        }
        Ok(removed > 0)
    }
}
