use crate::models::{Comment, User};

/// Submit a comment onto any registered content kind.
#[derive(Debug, Clone)]
pub struct PostComment {
    pub author: Option<User>,
    pub target_type: String,
    pub target_id: String,
    pub body: String,
    // raw form value; malformed input is treated as "no parent"
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeleteComment {
    pub comment_id: i64,
    pub requester: Option<User>,
}

/// Outcome of [`PostComment`]: the stored comment and whether this call created it.
#[derive(Debug, Clone)]
pub struct CommentOutcome {
    pub comment: Comment,
    pub created: bool,
}
