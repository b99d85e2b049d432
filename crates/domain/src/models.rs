use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BlogError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: NaiveDateTime,
}

/// Entity kinds a comment may be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Comment,
}

impl ContentKind {
    pub const ALL: [ContentKind; 2] = [ContentKind::Post, ContentKind::Comment];

    pub fn from_tag(tag: &str) -> Result<Self, BlogError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| BlogError::UnknownType(tag.to_string()))
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ContentKind::Post => "post",
            ContentKind::Comment => "comment",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Polymorphic reference to the entity a comment is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef {
    pub kind: ContentKind,
    pub id: i64,
}

impl ContentRef {
    pub fn new(kind: ContentKind, id: i64) -> Self {
        Self { kind, id }
    }

    pub fn post(id: i64) -> Self {
        Self::new(ContentKind::Post, id)
    }

    pub fn comment(id: i64) -> Self {
        Self::new(ContentKind::Comment, id)
    }

    pub fn detail_path(&self) -> String {
        match self.kind {
            ContentKind::Post => format!("/posts/{}/", self.id),
            ContentKind::Comment => format!("/comments/{}/", self.id),
        }
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub author: String,
    pub title: String,
    pub body: String,
    pub read_time: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Post {
    pub fn content_ref(&self) -> ContentRef {
        ContentRef::post(self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub author_id: i64,
    pub author: String,
    pub target: ContentRef,
    pub parent_id: Option<i64>,
    pub body: String,
    pub created_at: NaiveDateTime,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn content_ref(&self) -> ContentRef {
        ContentRef::comment(self.id)
    }
}

/// Top-level comment as shown under its target, with the size of its thread.
#[derive(Debug, Clone, Serialize)]
pub struct CommentSummary {
    #[serde(flatten)]
    pub comment: Comment,
    pub reply_count: i64,
}

/// A resolved content association.
#[derive(Debug, Clone)]
pub enum ContentEntity {
    Post(Post),
    Comment(Comment),
}

impl ContentEntity {
    pub fn content_ref(&self) -> ContentRef {
        match self {
            ContentEntity::Post(p) => p.content_ref(),
            ContentEntity::Comment(c) => c.content_ref(),
        }
    }
}

/// Where a client should navigate after a destructive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Thread(i64),
    Detail(ContentRef),
    PostList,
}

impl Redirect {
    pub fn path(&self) -> String {
        match self {
            Redirect::Thread(id) => ContentRef::comment(*id).detail_path(),
            Redirect::Detail(target) => target.detail_path(),
            Redirect::PostList => "/posts/".to_string(),
        }
    }
}
