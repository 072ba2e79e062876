use axum::{Json, extract::State};
use serde_json::{Value, json};
use tracing::{info, warn};

use marketai_types::api::{EditImageRequest, EditImageResponse};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;

const FAILURE_MESSAGE: &str = "Failed to edit image";

fn upstream(details: Value) -> AppError {
    AppError::Upstream {
        message: FAILURE_MESSAGE.to_string(),
        details,
    }
}

/// POST /api/edit: relay an image and prompt to the editing service.
///
/// Failures are reported once; the call is never retried.
pub async fn edit_image(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<EditImageRequest>,
) -> AppResult<Json<EditImageResponse>> {
    let (Some(image), Some(prompt)) = (
        req.image_base64.filter(|s| !s.is_empty()),
        req.prompt.filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::Validation("Image and prompt are required.".into()));
    };

    let url = format!("{}/edit-image", state.edit_api_url.trim_end_matches('/'));
    info!("Forwarding edit request to {} ({} bytes of image)", url, image.len());

    let response = state
        .http
        .post(&url)
        .json(&json!({ "image": image, "prompt": prompt }))
        .send()
        .await
        .map_err(|e| {
            warn!("Edit service unreachable: {}", e);
            upstream(Value::String(e.to_string()))
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| upstream(Value::String(e.to_string())))?;
    let payload: Value = serde_json::from_str(&body).unwrap_or(Value::String(body));

    if !status.is_success() {
        warn!("Edit service returned {}", status);
        return Err(upstream(payload));
    }

    let edited_image = payload
        .get("edited_image")
        .cloned()
        .ok_or_else(|| upstream(json!("edit service response has no edited_image")))?;

    Ok(Json(EditImageResponse { edited_image }))
}
