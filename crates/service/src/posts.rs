use domain::{
    render_markdown, BlogError, BlogResult, CommentSummary, Post, PostForm, ReadingSpeed,
    Redirect, User,
};
use serde::Serialize;
use storage::Db;
use tracing::{info, warn};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub items: Vec<Post>,
    pub page: u32,
    pub total: i64,
    pub has_next: bool,
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub html: String,
    pub share_string: String,
    pub comments: Vec<CommentSummary>,
}

#[derive(Clone)]
pub struct PostService {
    db: Db,
    speed: ReadingSpeed,
    page_size: u32,
}

impl PostService {
    pub fn new(db: Db, speed: ReadingSpeed, page_size: u32) -> Self {
        Self {
            db,
            speed,
            page_size: page_size.max(1),
        }
    }

    pub async fn create(&self, user: Option<&User>, form: PostForm) -> BlogResult<Post> {
        let user = user.ok_or(BlogError::AuthRequired)?;
        let prepared = form.prepare(self.speed)?;

        let post = self.db.insert_post(user.id, &prepared).await?;
        info!(
            "Post {} created by {} ({} min read)",
            post.id, user.username, post.read_time
        );
        Ok(post)
    }

    pub async fn update(&self, user: Option<&User>, id: i64, form: PostForm) -> BlogResult<Post> {
        self.authored_by(user, id).await?;
        let prepared = form.prepare(self.speed)?;

        let post = self
            .db
            .update_post(id, &prepared)
            .await?
            .ok_or(BlogError::NotFound { kind: "post", id })?;
        info!("Post {} updated ({} min read)", post.id, post.read_time);
        Ok(post)
    }

    /// Current editable fields, for the author only.
    pub async fn edit_form(&self, user: Option<&User>, id: i64) -> BlogResult<PostForm> {
        let post = self.authored_by(user, id).await?;
        Ok(PostForm::new(post.title, post.body))
    }

    pub async fn delete(&self, user: Option<&User>, id: i64) -> BlogResult<Redirect> {
        self.authored_by(user, id).await?;
        if !self.db.delete_post(id).await? {
            return Err(BlogError::NotFound { kind: "post", id });
        }
        info!("Post {} deleted", id);
        Ok(Redirect::PostList)
    }

    pub async fn get(&self, id: i64) -> BlogResult<Post> {
        self.db
            .get_post(id)
            .await?
            .ok_or(BlogError::NotFound { kind: "post", id })
    }

    /// The post with its body rendered fresh and its top-level comments.
    pub async fn detail(&self, id: i64) -> BlogResult<PostDetail> {
        let post = self.get(id).await?;
        let comments = self.db.list_top_level_comments(post.content_ref()).await?;

        Ok(PostDetail {
            html: render_markdown(&post.body),
            share_string: share_string(&post.body),
            comments,
            post,
        })
    }

    /// One-based pages, newest posts first.
    pub async fn list(&self, query: Option<&str>, page: u32) -> BlogResult<PostPage> {
        let page = page.max(1);
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let limit = i64::from(self.page_size);
        let offset = i64::from(page - 1) * limit;

        let (items, total) = self.db.list_posts(query, limit, offset).await?;

        Ok(PostPage {
            has_next: offset + (items.len() as i64) < total,
            items,
            page,
            total,
            query: query.map(str::to_string),
        })
    }

    async fn authored_by(&self, user: Option<&User>, id: i64) -> BlogResult<Post> {
        let user = user.ok_or(BlogError::AuthRequired)?;
        let post = self.get(id).await?;
        if post.author_id != user.id {
            warn!("{} may not modify post {}", user.username, id);
            return Err(BlogError::PermissionDenied);
        }
        Ok(post)
    }
}

/// Form-encoded body, suitable for share links.
fn share_string(body: &str) -> String {
    urlencoding::encode(body).replace("%20", "+")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommentService;
    use domain::PostComment;

    async fn setup(page_size: u32) -> (PostService, Db, User, User) {
        let db = Db::in_memory().await.unwrap();
        let alice = db.create_user("alice", "ha").await.unwrap().unwrap();
        let bob = db.create_user("bob", "hb").await.unwrap().unwrap();
        let service = PostService::new(db.clone(), ReadingSpeed::new(200).unwrap(), page_size);
        (service, db, alice, bob)
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[tokio::test]
    async fn read_time_follows_the_body() {
        let (service, _, alice, _) = setup(10).await;

        let post = service
            .create(Some(&alice), PostForm::new("Long", words(400)))
            .await
            .unwrap();
        assert_eq!(post.read_time, 2);

        let post = service
            .update(Some(&alice), post.id, PostForm::new("Short", words(50)))
            .await
            .unwrap();
        assert_eq!(post.read_time, 1);
        assert_eq!(service.get(post.id).await.unwrap().read_time, 1);
    }

    #[tokio::test]
    async fn only_the_author_edits_or_deletes() {
        let (service, _, alice, bob) = setup(10).await;
        let post = service
            .create(Some(&alice), PostForm::new("Mine", "text"))
            .await
            .unwrap();

        assert!(matches!(
            service.create(None, PostForm::new("x", "y")).await,
            Err(BlogError::AuthRequired)
        ));
        assert!(matches!(
            service.update(Some(&bob), post.id, PostForm::new("x", "y")).await,
            Err(BlogError::PermissionDenied)
        ));
        assert!(matches!(
            service.edit_form(Some(&bob), post.id).await,
            Err(BlogError::PermissionDenied)
        ));
        assert!(matches!(
            service.delete(Some(&bob), post.id).await,
            Err(BlogError::PermissionDenied)
        ));

        let form = service.edit_form(Some(&alice), post.id).await.unwrap();
        assert_eq!(form, PostForm::new("Mine", "text"));
        assert_eq!(
            service.delete(Some(&alice), post.id).await.unwrap(),
            Redirect::PostList
        );
        assert!(matches!(
            service.get(post.id).await,
            Err(BlogError::NotFound { kind: "post", .. })
        ));
    }

    #[tokio::test]
    async fn detail_renders_on_every_read() {
        let (service, db, alice, bob) = setup(10).await;
        let post = service
            .create(Some(&alice), PostForm::new("Md", "Hello *there* friend"))
            .await
            .unwrap();
        CommentService::new(db)
            .post_comment(PostComment {
                author: Some(bob),
                target_type: "post".into(),
                target_id: post.id.to_string(),
                body: "great".into(),
                parent_id: None,
            })
            .await
            .unwrap();

        let first = service.detail(post.id).await.unwrap();
        let second = service.detail(post.id).await.unwrap();
        assert_eq!(first.html, second.html);
        assert!(first.html.contains("<em>there</em>"));
        assert_eq!(first.share_string, "Hello+%2Athere%2A+friend");
        assert_eq!(first.comments.len(), 1);
        assert_eq!(first.comments[0].comment.author, "bob");
    }

    #[tokio::test]
    async fn list_paginates_and_searches() {
        let (service, _, alice, bob) = setup(2).await;
        for i in 0..3 {
            service
                .create(Some(&alice), PostForm::new(format!("Alpha {}", i), "text"))
                .await
                .unwrap();
        }
        service
            .create(Some(&bob), PostForm::new("Beta", "nothing here"))
            .await
            .unwrap();

        let first = service.list(None, 1).await.unwrap();
        assert_eq!(first.total, 4);
        assert_eq!(first.items.len(), 2);
        assert!(first.has_next);
        assert_eq!(first.items[0].title, "Beta");

        let last = service.list(None, 2).await.unwrap();
        assert_eq!(last.items.len(), 2);
        assert!(!last.has_next);

        assert!(service.list(None, 9).await.unwrap().items.is_empty());

        let found = service.list(Some("  alpha "), 1).await.unwrap();
        assert_eq!(found.total, 3);
        assert_eq!(found.query.as_deref(), Some("alpha"));

        let by_author = service.list(Some("bob"), 1).await.unwrap();
        assert_eq!(by_author.total, 1);
        assert_eq!(by_author.items[0].title, "Beta");
    }
}
