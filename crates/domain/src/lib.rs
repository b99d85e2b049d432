mod commands;
pub mod content;
mod error;
mod forms;
mod models;

pub use commands::{CommentOutcome, DeleteComment, PostComment};
pub use content::{render_markdown, ReadingSpeed};
pub use error::{BlogError, BlogResult};
pub use forms::{PostForm, PreparedPost, TITLE_MAX_CHARS};
pub use models::{
    Comment, CommentSummary, ContentEntity, ContentKind, ContentRef, Post, Redirect, User,
};
