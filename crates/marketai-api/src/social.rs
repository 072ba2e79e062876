use axum::{Extension, Json, extract::State};
use tracing::info;

use marketai_types::api::{
    Claims, ConnectRequest, ConnectionsResponse, DisconnectRequest, SuccessResponse,
};

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::{AppState, run_db};

pub async fn connect(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<ConnectRequest>,
) -> AppResult<Json<SuccessResponse>> {
    let (Some(platform), Some(access_token)) =
        (req.platform, req.access_token.filter(|t| !t.is_empty()))
    else {
        return Err(AppError::Validation("Missing platform or access token".into()));
    };

    let user_id = claims.sub;
    run_db(&state, move |db| db.upsert_connection(user_id, platform, &access_token)).await?;
    info!("Connected {} for {}", platform, user_id);

    Ok(Json(SuccessResponse { success: true }))
}

pub async fn disconnect(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<DisconnectRequest>,
) -> AppResult<Json<SuccessResponse>> {
    let platform = req
        .platform
        .ok_or_else(|| AppError::Validation("Missing platform".into()))?;

    let user_id = claims.sub;
    run_db(&state, move |db| db.delete_connection(user_id, platform)).await?;
    info!("Disconnected {} for {}", platform, user_id);

    Ok(Json(SuccessResponse { success: true }))
}

pub async fn get_connections(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<ConnectionsResponse>> {
    let user_id = claims.sub;
    let connections = run_db(&state, move |db| db.list_connections(user_id)).await?;
    Ok(Json(ConnectionsResponse { connections }))
}
