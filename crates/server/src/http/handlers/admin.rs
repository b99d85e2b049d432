use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use domain::{BlogError, User};
use serde::{Deserialize, Serialize};
use service::tokens_match;

use crate::http::{auth::bearer_token, error::ApiResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
}

#[derive(Serialize)]
pub struct CreateUserResponse {
    pub user: User,
    // shown once; only its digest is stored
    pub token: String,
}

pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<CreateUserResponse>)> {
    let token = bearer_token(&headers).ok_or(BlogError::AuthRequired)?;
    if !tokens_match(token, &state.admin_token) {
        tracing::warn!("Rejected user provisioning with an invalid admin token");
        return Err(BlogError::PermissionDenied.into());
    }

    let (user, token) = state.users.create_user(&payload.username).await?;
    Ok((StatusCode::CREATED, Json(CreateUserResponse { user, token })))
}
