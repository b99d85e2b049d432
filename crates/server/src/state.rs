use axum::extract::FromRef;
use service::{CommentService, PostService, UserService};
use storage::Db;

use crate::config::BlogSettings;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub posts: PostService,
    pub comments: CommentService,
    pub users: UserService,
    pub admin_token: String,
}

impl AppState {
    pub fn new(db: Db, blog: &BlogSettings, admin_token: String) -> Self {
        Self {
            posts: PostService::new(db.clone(), blog.words_per_minute, blog.page_size),
            comments: CommentService::new(db.clone()),
            users: UserService::new(db.clone()),
            db,
            admin_token,
        }
    }
}

impl FromRef<AppState> for Db {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
