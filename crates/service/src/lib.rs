mod comments;
pub mod content;
mod posts;
mod users;

pub use comments::{CommentService, Thread};
pub use posts::{PostDetail, PostPage, PostService, DEFAULT_PAGE_SIZE};
pub use users::{tokens_match, UserService};
