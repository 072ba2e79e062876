use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{info, warn};
use uuid::Uuid;

use marketai_db::models::UserRow;
use marketai_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest, UserInfo};

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::{AppState, run_db};

const MIN_PASSWORD_LEN: usize = 6;
const TOKEN_TTL_DAYS: i64 = 30;

fn email_taken(email: &str) -> AppError {
    warn!("Registration rejected for existing email {}", email);
    AppError::Validation("A user with this email address has already been registered".into())
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (Some(email), Some(password), Some(name)) =
        (non_empty(req.email), req.password.filter(|p| !p.is_empty()), non_empty(req.name))
    else {
        return Err(AppError::Validation("Missing required fields".into()));
    };

    // Validate input
    if !email.contains('@') {
        return Err(AppError::Validation("Invalid email address".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password should be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    // Check if email is taken; the insert below settles races
    let lookup = email.clone();
    if run_db(&state, move |db| db.get_user_by_email(&lookup)).await?.is_some() {
        return Err(email_taken(&email));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))?
        .to_string();

    let user = UserRow {
        id: Uuid::new_v4(),
        email: email.to_lowercase(),
        name,
        password_hash,
        created_at: chrono::Utc::now(),
    };

    let row = user.clone();
    if !run_db(&state, move |db| db.create_user(&row)).await? {
        return Err(email_taken(&user.email));
    }
    info!("Registered user {}", user.id);

    let token = create_token(&state.jwt_secret, &user)?;

    Ok(Json(AuthResponse {
        user: UserInfo {
            email: user.email,
            name: user.name,
        },
        access_token: token,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (Some(email), Some(password)) = (non_empty(req.email), req.password.filter(|p| !p.is_empty()))
    else {
        return Err(AppError::Validation("Missing email or password".into()));
    };

    let invalid = || AppError::Validation("Invalid login credentials".into());

    let user = run_db(&state, move |db| db.get_user_by_email(&email))
        .await?
        .ok_or_else(invalid)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("stored hash unreadable: {}", e)))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| {
            warn!("Failed login for {}", user.id);
            invalid()
        })?;

    let token = create_token(&state.jwt_secret, &user)?;
    info!("User {} logged in", user.id);

    Ok(Json(AuthResponse {
        user: UserInfo {
            email: user.email,
            name: user.name,
        },
        access_token: token,
    }))
}

pub fn create_token(secret: &str, user: &UserRow) -> AppResult<String> {
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token encoding failed: {}", e)))
}
