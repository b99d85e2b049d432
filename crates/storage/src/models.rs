use chrono::NaiveDateTime;
use domain::{Comment, CommentSummary, ContentKind, ContentRef, Post, User};
use sqlx::FromRow;

#[derive(FromRow)]
pub struct SqlUser {
    pub id: i64,
    pub username: String,
    pub created_at: NaiveDateTime,
}

impl From<SqlUser> for User {
    fn from(sql: SqlUser) -> Self {
        User {
            id: sql.id,
            username: sql.username,
            created_at: sql.created_at,
        }
    }
}

#[derive(FromRow)]
pub struct SqlPost {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub body: String,
    pub read_time: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,

    // joined from users
    pub author: String,
}

impl From<SqlPost> for Post {
    fn from(sql: SqlPost) -> Self {
        Post {
            id: sql.id,
            author_id: sql.author_id,
            author: sql.author,
            title: sql.title,
            body: sql.body,
            read_time: sql.read_time,
            created_at: sql.created_at,
            updated_at: sql.updated_at,
        }
    }
}

#[derive(FromRow)]
pub struct SqlComment {
    pub id: i64,
    pub author_id: i64,
    pub content_kind: String,
    pub object_id: i64,
    pub parent_id: Option<i64>,
    pub body: String,
    pub created_at: NaiveDateTime,

    // joined from users
    pub author: String,
}

impl TryFrom<SqlComment> for Comment {
    type Error = anyhow::Error;

    fn try_from(sql: SqlComment) -> Result<Self, Self::Error> {
        let kind = ContentKind::from_tag(&sql.content_kind)
            .map_err(|e| anyhow::anyhow!("comment {}: {}", sql.id, e))?;
        Ok(Comment {
            id: sql.id,
            author_id: sql.author_id,
            author: sql.author,
            target: ContentRef::new(kind, sql.object_id),
            parent_id: sql.parent_id,
            body: sql.body,
            created_at: sql.created_at,
        })
    }
}

#[derive(FromRow)]
pub struct SqlCommentSummary {
    #[sqlx(flatten)]
    pub comment: SqlComment,
    pub reply_count: i64,
}

impl TryFrom<SqlCommentSummary> for CommentSummary {
    type Error = anyhow::Error;

    fn try_from(sql: SqlCommentSummary) -> Result<Self, Self::Error> {
        Ok(CommentSummary {
            comment: sql.comment.try_into()?,
            reply_count: sql.reply_count,
        })
    }
}
