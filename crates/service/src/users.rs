use domain::{BlogError, BlogResult, User};
use rand::RngCore;
use sha2::{Digest, Sha256};
use storage::Db;
use tracing::info;

const USERNAME_MAX_CHARS: usize = 150;

/// Issues API tokens and maps presented tokens back to users. Only token digests are stored.
#[derive(Clone)]
pub struct UserService {
    db: Db,
}

impl UserService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Creates a user and returns it with its plaintext token, which is not kept.
    pub async fn create_user(&self, username: &str) -> BlogResult<(User, String)> {
        let username = username.trim();
        validate_username(username)?;

        let token = generate_token();
        let user = self
            .db
            .create_user(username, &hash_token(&token))
            .await?
            .ok_or_else(|| {
                BlogError::validation("username", "A user with that username already exists.")
            })?;

        info!("User {} ({}) provisioned", user.username, user.id);
        Ok((user, token))
    }

    pub async fn authenticate(&self, token: &str) -> BlogResult<Option<User>> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(self.db.find_user_by_token_hash(&hash_token(token)).await?)
    }
}

fn validate_username(username: &str) -> BlogResult<()> {
    if username.is_empty() {
        return Err(BlogError::required("username"));
    }
    if username.chars().count() > USERNAME_MAX_CHARS {
        return Err(BlogError::validation(
            "username",
            format!("Ensure this value has at most {} characters.", USERNAME_MAX_CHARS),
        ));
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !username.chars().all(allowed) {
        return Err(BlogError::validation(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Compares two secrets through their SHA-256 digests in constant time.
pub fn tokens_match(presented: &str, expected: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
