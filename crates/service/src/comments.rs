use domain::{
    BlogError, BlogResult, Comment, CommentOutcome, CommentSummary, ContentKind, ContentRef,
    DeleteComment, PostComment, Redirect,
};
use serde::Serialize;
use storage::{CommentInsert, Db};
use tracing::{debug, info, warn};

use crate::content::resolve_ref;

/// A top-level comment with its replies.
#[derive(Debug, Clone, Serialize)]
pub struct Thread {
    pub comment: Comment,
    pub replies: Vec<Comment>,
    // comments whose target is the root comment itself
    pub attached: Vec<CommentSummary>,
}

#[derive(Clone)]
pub struct CommentService {
    db: Db,
}

impl CommentService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn post_comment(&self, cmd: PostComment) -> BlogResult<CommentOutcome> {
        let author = cmd.author.ok_or(BlogError::AuthRequired)?;

        let body = cmd.body.trim();
        if body.is_empty() {
            return Err(BlogError::required("content"));
        }

        let parent_id = match parse_parent_id(cmd.parent_id.as_deref()) {
            Some(id) => self.existing_parent(id).await?,
            None => None,
        };

        let kind = ContentKind::from_tag(cmd.target_type.trim()).map_err(|e| {
            BlogError::validation("content_type", e.to_string())
        })?;
        let object_id: i64 = cmd
            .target_id
            .trim()
            .parse()
            .map_err(|_| BlogError::validation("object_id", "Enter a whole number."))?;
        let target = resolve_ref(&self.db, ContentRef::new(kind, object_id))
            .await?
            .content_ref();

        let (comment, created) = self
            .db
            .insert_comment_or_get(&CommentInsert {
                author_id: author.id,
                target,
                parent_id,
                body,
            })
            .await?;

        if created {
            info!(
                "Comment {} created by {} on {} (parent: {:?})",
                comment.id, author.username, target, parent_id
            );
        } else {
            info!(
                "Duplicate submission by {} on {}, reusing comment {}",
                author.username, target, comment.id
            );
        }

        Ok(CommentOutcome { comment, created })
    }

    /// Deletes a comment on behalf of its author and reports where to go next.
    pub async fn delete_comment(&self, cmd: DeleteComment) -> BlogResult<Redirect> {
        let comment = self.get(cmd.comment_id).await?;

        match &cmd.requester {
            Some(user) if user.id == comment.author_id => {}
            other => {
                warn!(
                    "Rejected delete of comment {} by {:?}",
                    comment.id,
                    other.as_ref().map(|u| u.username.as_str())
                );
                return Err(BlogError::PermissionDenied);
            }
        }

        let redirect = match comment.parent_id {
            Some(parent) => Redirect::Thread(parent),
            None => self.detail_redirect(comment.target).await?,
        };

        self.db.delete_comment(comment.id).await?;
        info!("Comment {} deleted, redirecting to {}", comment.id, redirect.path());

        Ok(redirect)
    }

    pub async fn get(&self, id: i64) -> BlogResult<Comment> {
        self.db
            .get_comment(id)
            .await?
            .ok_or(BlogError::NotFound { kind: "comment", id })
    }

    /// Only top-level comments root a thread.
    pub async fn thread(&self, id: i64) -> BlogResult<Thread> {
        let comment = self.get(id).await?;
        if comment.is_reply() {
            return Err(BlogError::NotFound { kind: "comment", id });
        }
        let replies = self.db.list_replies(comment.id).await?;
        let attached = self.db.list_top_level_comments(comment.content_ref()).await?;
        Ok(Thread {
            comment,
            replies,
            attached,
        })
    }

    /// Threads are one level deep: replying to a reply lands on that reply's root.
    async fn existing_parent(&self, id: i64) -> BlogResult<Option<i64>> {
        match self.db.get_comment(id).await? {
            Some(Comment {
                parent_id: Some(root),
                ..
            }) => {
                debug!("Comment {} is a reply, threading onto its root {}", id, root);
                Ok(Some(root))
            }
            Some(parent) => Ok(Some(parent.id)),
            None => {
                debug!("Parent comment {} does not exist, posting top-level", id);
                Ok(None)
            }
        }
    }

    /// Detail view of a target. A reply has no view of its own, so its thread is used.
    async fn detail_redirect(&self, target: ContentRef) -> BlogResult<Redirect> {
        if target.kind == ContentKind::Comment {
            if let Some(Comment {
                parent_id: Some(root),
                ..
            }) = self.db.get_comment(target.id).await?
            {
                return Ok(Redirect::Thread(root));
            }
        }
        Ok(Redirect::Detail(target))
    }
}

/// Malformed, absent or non-positive ids all mean "no parent".
fn parse_parent_id(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            if !raw.is_empty() {
                debug!("Ignoring malformed parent id {:?}", raw);
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Post, PostForm, ReadingSpeed, User};

    struct Fixture {
        db: Db,
        service: CommentService,
        alice: User,
        bob: User,
        post: Post,
    }

    async fn fixture() -> Fixture {
        let db = Db::in_memory().await.unwrap();
        let alice = db.create_user("alice", "ha").await.unwrap().unwrap();
        let bob = db.create_user("bob", "hb").await.unwrap().unwrap();
        let post = PostForm::new("Hello", "world")
            .prepare(ReadingSpeed::default())
            .unwrap();
        let post = db.insert_post(alice.id, &post).await.unwrap();
        Fixture {
            service: CommentService::new(db.clone()),
            db,
            alice,
            bob,
            post,
        }
    }

    fn on_post(author: &User, post: &Post, body: &str, parent: Option<&str>) -> PostComment {
        PostComment {
            author: Some(author.clone()),
            target_type: "post".into(),
            target_id: post.id.to_string(),
            body: body.into(),
            parent_id: parent.map(Into::into),
        }
    }

    #[tokio::test]
    async fn identical_submissions_reuse_one_comment() {
        let f = fixture().await;

        let first = f
            .service
            .post_comment(on_post(&f.alice, &f.post, "nice post", None))
            .await
            .unwrap();
        let second = f
            .service
            .post_comment(on_post(&f.alice, &f.post, "nice post", None))
            .await
            .unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.comment.id, second.comment.id);
        let top = f.db.list_top_level_comments(f.post.content_ref()).await.unwrap();
        assert_eq!(top.len(), 1);
    }

    #[tokio::test]
    async fn identical_body_from_another_user_is_separate() {
        let f = fixture().await;
        let a = f
            .service
            .post_comment(on_post(&f.alice, &f.post, "+1", None))
            .await
            .unwrap();
        let b = f
            .service
            .post_comment(on_post(&f.bob, &f.post, "+1", None))
            .await
            .unwrap();
        assert!(b.created);
        assert_ne!(a.comment.id, b.comment.id);
    }

    #[tokio::test]
    async fn replies_thread_onto_existing_parent() {
        let f = fixture().await;
        let root = f
            .service
            .post_comment(on_post(&f.alice, &f.post, "root", None))
            .await
            .unwrap()
            .comment;

        let reply = f
            .service
            .post_comment(on_post(&f.bob, &f.post, "reply", Some(&root.id.to_string())))
            .await
            .unwrap()
            .comment;
        assert_eq!(reply.parent_id, Some(root.id));
        assert_eq!(reply.target, f.post.content_ref());

        let thread = f.service.thread(root.id).await.unwrap();
        assert_eq!(thread.replies.len(), 1);
        assert_eq!(thread.replies[0].id, reply.id);

        // replies are not thread roots
        assert!(matches!(
            f.service.thread(reply.id).await,
            Err(BlogError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn bad_parent_ids_fall_back_to_top_level() {
        let f = fixture().await;
        for raw in ["9999", "abc", "", "-3", "0", " 12x "] {
            let outcome = f
                .service
                .post_comment(on_post(&f.alice, &f.post, &format!("body {}", raw), Some(raw)))
                .await
                .unwrap();
            assert_eq!(outcome.comment.parent_id, None, "parent id {:?}", raw);
        }
    }

    #[tokio::test]
    async fn comments_can_target_comments() {
        let f = fixture().await;
        let root = f
            .service
            .post_comment(on_post(&f.alice, &f.post, "root", None))
            .await
            .unwrap()
            .comment;

        let meta = f
            .service
            .post_comment(PostComment {
                author: Some(f.bob.clone()),
                target_type: "comment".into(),
                target_id: root.id.to_string(),
                body: "about that comment".into(),
                parent_id: None,
            })
            .await
            .unwrap()
            .comment;
        assert_eq!(meta.target, root.content_ref());
    }

    #[tokio::test]
    async fn rejects_invalid_submissions() {
        let f = fixture().await;

        let mut anonymous = on_post(&f.alice, &f.post, "hi", None);
        anonymous.author = None;
        assert!(matches!(
            f.service.post_comment(anonymous).await,
            Err(BlogError::AuthRequired)
        ));

        assert!(matches!(
            f.service.post_comment(on_post(&f.alice, &f.post, "   ", None)).await,
            Err(BlogError::Validation { field, .. }) if field == "content"
        ));

        let mut unknown = on_post(&f.alice, &f.post, "hi", None);
        unknown.target_type = "photo".into();
        assert!(matches!(
            f.service.post_comment(unknown).await,
            Err(BlogError::Validation { field, .. }) if field == "content_type"
        ));

        let mut missing = on_post(&f.alice, &f.post, "hi", None);
        missing.target_id = "4040".into();
        assert!(matches!(
            f.service.post_comment(missing).await,
            Err(BlogError::NotFound { kind: "post", id: 4040 })
        ));

        let mut garbled = on_post(&f.alice, &f.post, "hi", None);
        garbled.target_id = "one".into();
        assert!(matches!(
            f.service.post_comment(garbled).await,
            Err(BlogError::Validation { field, .. }) if field == "object_id"
        ));
    }

    #[tokio::test]
    async fn only_the_author_may_delete() {
        let f = fixture().await;
        let comment = f
            .service
            .post_comment(on_post(&f.alice, &f.post, "mine", None))
            .await
            .unwrap()
            .comment;

        for requester in [Some(f.bob.clone()), None] {
            let result = f
                .service
                .delete_comment(DeleteComment {
                    comment_id: comment.id,
                    requester,
                })
                .await;
            assert!(matches!(result, Err(BlogError::PermissionDenied)));
        }
        assert!(f.service.get(comment.id).await.is_ok());
    }

    #[tokio::test]
    async fn delete_redirects_to_parent_thread_or_target() {
        let f = fixture().await;
        let root = f
            .service
            .post_comment(on_post(&f.alice, &f.post, "root", None))
            .await
            .unwrap()
            .comment;
        let reply = f
            .service
            .post_comment(on_post(&f.alice, &f.post, "reply", Some(&root.id.to_string())))
            .await
            .unwrap()
            .comment;

        let redirect = f
            .service
            .delete_comment(DeleteComment {
                comment_id: reply.id,
                requester: Some(f.alice.clone()),
            })
            .await
            .unwrap();
        assert_eq!(redirect, Redirect::Thread(root.id));

        let redirect = f
            .service
            .delete_comment(DeleteComment {
                comment_id: root.id,
                requester: Some(f.alice.clone()),
            })
            .await
            .unwrap();
        assert_eq!(redirect, Redirect::Detail(f.post.content_ref()));
        assert_eq!(redirect.path(), format!("/posts/{}/", f.post.id));
        assert!(matches!(
            f.service.get(root.id).await,
            Err(BlogError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn reply_to_a_reply_joins_the_root_thread() {
        let f = fixture().await;
        let root = f
            .service
            .post_comment(on_post(&f.alice, &f.post, "root", None))
            .await
            .unwrap()
            .comment;
        let first = f
            .service
            .post_comment(on_post(&f.bob, &f.post, "first", Some(&root.id.to_string())))
            .await
            .unwrap()
            .comment;
        let nested = f
            .service
            .post_comment(on_post(&f.alice, &f.post, "nested", Some(&first.id.to_string())))
            .await
            .unwrap()
            .comment;
        assert_eq!(nested.parent_id, Some(root.id));

        let thread = f.service.thread(root.id).await.unwrap();
        let ids: Vec<_> = thread.replies.iter().map(|c| c.id).collect();
        assert_eq!(ids, [first.id, nested.id]);

        let redirect = f
            .service
            .delete_comment(DeleteComment {
                comment_id: nested.id,
                requester: Some(f.alice.clone()),
            })
            .await
            .unwrap();
        assert_eq!(redirect, Redirect::Thread(root.id));
        assert!(f.service.thread(root.id).await.is_ok());
    }

    #[tokio::test]
    async fn comment_on_a_reply_redirects_to_its_thread() {
        let f = fixture().await;
        let root = f
            .service
            .post_comment(on_post(&f.alice, &f.post, "root", None))
            .await
            .unwrap()
            .comment;
        let reply = f
            .service
            .post_comment(on_post(&f.bob, &f.post, "reply", Some(&root.id.to_string())))
            .await
            .unwrap()
            .comment;
        let about_reply = f
            .service
            .post_comment(PostComment {
                author: Some(f.alice.clone()),
                target_type: "comment".into(),
                target_id: reply.id.to_string(),
                body: "about the reply".into(),
                parent_id: None,
            })
            .await
            .unwrap()
            .comment;

        let redirect = f
            .service
            .delete_comment(DeleteComment {
                comment_id: about_reply.id,
                requester: Some(f.alice.clone()),
            })
            .await
            .unwrap();
        assert_eq!(redirect, Redirect::Thread(root.id));
    }

    #[tokio::test]
    async fn thread_lists_comments_attached_to_its_root() {
        let f = fixture().await;
        let root = f
            .service
            .post_comment(on_post(&f.alice, &f.post, "root", None))
            .await
            .unwrap()
            .comment;
        let attached = f
            .service
            .post_comment(PostComment {
                author: Some(f.bob.clone()),
                target_type: "comment".into(),
                target_id: root.id.to_string(),
                body: "about the root".into(),
                parent_id: None,
            })
            .await
            .unwrap()
            .comment;

        let thread = f.service.thread(root.id).await.unwrap();
        assert!(thread.replies.is_empty());
        assert_eq!(thread.attached.len(), 1);
        assert_eq!(thread.attached[0].comment.id, attached.id);

        let redirect = f
            .service
            .delete_comment(DeleteComment {
                comment_id: attached.id,
                requester: Some(f.bob.clone()),
            })
            .await
            .unwrap();
        assert_eq!(redirect, Redirect::Detail(root.content_ref()));
    }
}
