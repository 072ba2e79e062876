use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::warn;

use marketai_types::api::Claims;

use crate::AppState;
use crate::error::AppError;

/// Extract and validate the bearer token, then expose its [`Claims`] to the
/// handler as an `Extension`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::Unauthorized)?;

    let claims = verify_token(&state.jwt_secret, bearer.token())?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        warn!("Rejected access token: {}", e);
        AppError::Unauthorized
    })
}
