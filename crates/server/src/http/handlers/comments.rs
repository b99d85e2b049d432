use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use domain::{Comment, CommentOutcome, ContentRef, DeleteComment, PostComment, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service::Thread;

use crate::http::{auth::CurrentUser, error::ApiResult};
use crate::state::AppState;

/// Comment form as posted by clients. Ids stay raw so malformed values can be handled leniently.
#[derive(Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub content: String,
    pub content_type: Option<String>,
    pub object_id: Option<Value>,
    pub parent_id: Option<Value>,
}

impl CommentForm {
    pub fn into_command(
        self,
        author: Option<User>,
        default_target: ContentRef,
        default_parent: Option<i64>,
    ) -> PostComment {
        PostComment {
            author,
            target_type: self
                .content_type
                .unwrap_or_else(|| default_target.kind.tag().to_string()),
            target_id: self
                .object_id
                .map(raw_value)
                .unwrap_or_else(|| default_target.id.to_string()),
            body: self.content,
            parent_id: self
                .parent_id
                .map(raw_value)
                .or_else(|| default_parent.map(|id| id.to_string())),
        }
    }
}

fn raw_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[derive(Serialize)]
pub struct CommentResponse {
    pub comment: Comment,
    pub created: bool,
}

pub fn comment_response(outcome: CommentOutcome) -> (StatusCode, Json<CommentResponse>) {
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (
        status,
        Json(CommentResponse {
            comment: outcome.comment,
            created: outcome.created,
        }),
    )
}

pub async fn thread_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Thread>> {
    Ok(Json(state.comments.thread(id).await?))
}

/// Reply inside a thread. Defaults to the thread root's target with the root as parent.
pub async fn reply(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    CurrentUser(user): CurrentUser,
    Json(form): Json<CommentForm>,
) -> ApiResult<(StatusCode, Json<CommentResponse>)> {
    let thread = state.comments.thread(id).await?;
    let cmd = form.into_command(user, thread.comment.target, Some(thread.comment.id));
    let outcome = state.comments.post_comment(cmd).await?;
    Ok(comment_response(outcome))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Redirect> {
    let next = state
        .comments
        .delete_comment(DeleteComment {
            comment_id: id,
            requester: user,
        })
        .await?;
    Ok(Redirect::to(&next.path()))
}
