use super::handlers::{admin, comments, posts};
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use storage::Db;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    let cors = if allowed_origins == "*" {
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_origin(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse::<HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(Any)
                .allow_headers(Any)
        } else {
            tracing::info!("CORS enabled for origins: {:?}", origins);
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(origins)
                .allow_headers(Any)
        }
    };

    Router::new()
        .route("/posts/", get(posts::list_posts).post(posts::create_post))
        .route("/posts/:id/", get(posts::post_detail).post(posts::comment_on_post))
        .route(
            "/posts/:id/update/",
            get(posts::edit_post_form).post(posts::update_post),
        )
        .route("/posts/:id/delete/", post(posts::delete_post))
        .route("/comments/:id/", get(comments::thread_detail).post(comments::reply))
        .route("/comments/:id/delete/", post(comments::delete_comment))
        .route("/admin/users", post(admin::create_user))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health(State(db): State<Db>) -> Result<Json<serde_json::Value>, StatusCode> {
    db.ping().await.map_err(|e| {
        tracing::error!("Health check failed: {:?}", e);
        StatusCode::SERVICE_UNAVAILABLE
    })?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
