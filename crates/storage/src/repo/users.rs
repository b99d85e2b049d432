use crate::{models::SqlUser, Db};
use chrono::Utc;
use domain::User;

impl Db {
    /// Inserts a user; `None` when the username is already taken.
    pub async fn create_user(&self, username: &str, token_hash: &str) -> anyhow::Result<Option<User>> {
        let now = Utc::now().naive_utc();

        let row = sqlx::query_as::<_, SqlUser>(
            r#"
            INSERT INTO users (username, token_hash, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(username) DO NOTHING
            RETURNING id, username, created_at
            "#,
        )
        .bind(username)
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn get_user(&self, id: i64) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, SqlUser>(
            "SELECT id, username, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn find_user_by_token_hash(&self, token_hash: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, SqlUser>(
            "SELECT id, username, created_at FROM users WHERE token_hash = ?",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}
