use axum::{
    Extension, Json,
    extract::{Path, State},
};
use tracing::info;

use marketai_db::models::NewPost;
use marketai_types::api::{
    Claims, PostsResponse, SavePostRequest, SavePostResponse, SuccessResponse,
};

use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::{AppState, run_db};

/// POST /api/catalog/save
pub async fn save_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<SavePostRequest>,
) -> AppResult<Json<SavePostResponse>> {
    let post = NewPost {
        platform: req.platform,
        caption: req.caption,
        hashtags: req.hashtags,
        image_url: req.image_url,
    };

    let user_id = claims.sub;
    let saved = run_db(&state, move |db| db.save_post(user_id, post)).await?;
    info!("Post {} saved to catalog of {}", saved.id, user_id);

    Ok(Json(SavePostResponse {
        success: true,
        post_id: saved.id,
    }))
}

/// GET /api/catalog/posts
pub async fn get_posts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<PostsResponse>> {
    let user_id = claims.sub;
    let posts = run_db(&state, move |db| db.list_posts(user_id)).await?;
    Ok(Json(PostsResponse { posts }))
}

/// DELETE /api/catalog/posts/{post_id}; succeeds whether or not the post exists.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<SuccessResponse>> {
    let user_id = claims.sub;
    run_db(&state, move |db| db.delete_post(user_id, &post_id)).await?;
    Ok(Json(SuccessResponse { success: true }))
}
