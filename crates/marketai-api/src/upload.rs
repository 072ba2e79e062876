use std::time::Duration;

use async_trait::async_trait;
use axum::{Extension, Json, extract::State};
use tracing::info;

use marketai_types::api::{Claims, UploadRequest, UploadResponse};
use marketai_types::{SavedPost, SocialConnectionRecord};

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::{AppState, run_db};

/// Publishes a saved post to a platform with the user's stored credential.
///
/// The only implementation is [`SimulatedPublisher`]. A real one would also
/// own token refresh, rate limiting and partial-failure handling (e.g. media
/// accepted but caption rejected).
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Returns the confirmation message shown to the user.
    async fn publish(
        &self,
        post: &SavedPost,
        connection: &SocialConnectionRecord,
    ) -> AppResult<String>;
}

/// Waits a fixed delay and reports success. No external call is made.
pub struct SimulatedPublisher {
    delay: Duration,
}

impl SimulatedPublisher {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Publisher for SimulatedPublisher {
    async fn publish(
        &self,
        post: &SavedPost,
        connection: &SocialConnectionRecord,
    ) -> AppResult<String> {
        info!(
            post_id = %post.id,
            platform = %connection.platform,
            user_id = %connection.user_id,
            has_token = !connection.access_token.is_empty(),
            "Uploading post (simulated)"
        );

        tokio::time::sleep(self.delay).await;

        Ok(format!(
            "Post uploaded to {} successfully (simulated)",
            connection.platform
        ))
    }
}

/// POST /api/social/upload
///
/// The post and the connection are read independently; neither is modified.
pub async fn upload_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<UploadRequest>,
) -> AppResult<Json<UploadResponse>> {
    let post_id = req
        .post_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("Missing postId".into()))?;

    let user_id = claims.sub;
    let post = run_db(&state, move |db| db.get_post(user_id, &post_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    let platform = req.platform.unwrap_or(post.platform);
    let connection = run_db(&state, move |db| db.get_connection(user_id, platform))
        .await?
        .ok_or_else(|| AppError::Validation("Social account not connected".into()))?;

    let message = state.publisher.publish(&post, &connection).await?;

    Ok(Json(UploadResponse {
        success: true,
        message,
    }))
}
