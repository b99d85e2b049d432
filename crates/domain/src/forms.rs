use serde::{Deserialize, Serialize};

use crate::content::{estimate_read_time, ReadingSpeed};
use crate::error::{BlogError, BlogResult};

pub const TITLE_MAX_CHARS: usize = 120;

/// Editable fields of a post as submitted by its author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "content")]
    pub body: String,
}

impl PostForm {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Validates the form and derives the read time from the body.
    pub fn prepare(self, speed: ReadingSpeed) -> BlogResult<PreparedPost> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(BlogError::required("title"));
        }
        let title_len = title.chars().count();
        if title_len > TITLE_MAX_CHARS {
            return Err(BlogError::validation(
                "title",
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    TITLE_MAX_CHARS, title_len
                ),
            ));
        }
        if self.body.trim().is_empty() {
            return Err(BlogError::required("body"));
        }

        let read_time = estimate_read_time(&self.body, speed);
        Ok(PreparedPost {
            title,
            body: self.body,
            read_time,
        })
    }
}

/// A validated post ready to be written, carrying its derived read time.
///
/// Only [`PostForm::prepare`] builds one, so read time can never be set independently of the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedPost {
    title: String,
    body: String,
    read_time: i64,
}

impl PreparedPost {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn read_time(&self) -> i64 {
        self.read_time
    }
}
