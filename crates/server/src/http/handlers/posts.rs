use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use domain::{BlogError, Post, PostForm};
use serde::Deserialize;
use service::{PostDetail, PostPage};

use super::comments::{comment_response, CommentForm, CommentResponse};
use crate::http::{auth::CurrentUser, error::ApiResult};
use crate::state::AppState;

// `page` stays a string so a bad value becomes a field error instead of a query rejection
#[derive(Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub page: Option<String>,
}

impl ListParams {
    fn page(&self) -> Result<u32, BlogError> {
        match self.page.as_deref().map(str::trim) {
            None | Some("") => Ok(1),
            Some(raw) => raw
                .parse()
                .map_err(|_| BlogError::validation("page", "Enter a whole number.")),
        }
    }
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PostPage>> {
    let page = state.posts.list(params.q.as_deref(), params.page()?).await?;
    Ok(Json(page))
}

pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(form): Json<PostForm>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let post = state.posts.create(user.as_ref(), form).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn post_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PostDetail>> {
    Ok(Json(state.posts.detail(id).await?))
}

/// Comment form submitted from a post's page. Targets the post unless the form says otherwise.
pub async fn comment_on_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    CurrentUser(user): CurrentUser,
    Json(form): Json<CommentForm>,
) -> ApiResult<(StatusCode, Json<CommentResponse>)> {
    let post = state.posts.get(id).await?;
    let cmd = form.into_command(user, post.content_ref(), None);
    let outcome = state.comments.post_comment(cmd).await?;
    Ok(comment_response(outcome))
}

pub async fn edit_post_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<PostForm>> {
    Ok(Json(state.posts.edit_form(user.as_ref(), id).await?))
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    CurrentUser(user): CurrentUser,
    Json(form): Json<PostForm>,
) -> ApiResult<Json<Post>> {
    Ok(Json(state.posts.update(user.as_ref(), id, form).await?))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Redirect> {
    let next = state.posts.delete(user.as_ref(), id).await?;
    Ok(Redirect::to(&next.path()))
}

