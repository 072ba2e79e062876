pub mod auth;
pub mod catalog;
pub mod edit;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod social;
pub mod upload;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE},
    },
    routing::{delete, get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use marketai_db::Database;

use crate::error::{AppError, AppResult};
use crate::upload::{Publisher, SimulatedPublisher};

/// Base64 images travel in JSON bodies on the edit route.
const MAX_EDIT_BODY: usize = 25 * 1024 * 1024;

pub type AppState = Arc<AppStateInner>;

/// Runtime settings the handlers depend on.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub jwt_secret: String,
    /// Base URL of the image editing service; requests go to `{url}/edit-image`.
    pub edit_api_url: String,
    pub edit_timeout: Duration,
    /// Simulated publishing latency.
    pub upload_delay: Duration,
}

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub edit_api_url: String,
    pub http: reqwest::Client,
    pub publisher: Arc<dyn Publisher>,
}

impl AppStateInner {
    pub fn new(db: Database, config: ApiConfig) -> anyhow::Result<AppState> {
        let http = reqwest::Client::builder()
            .timeout(config.edit_timeout)
            .build()?;

        Ok(Arc::new(Self {
            db,
            jwt_secret: config.jwt_secret,
            edit_api_url: config.edit_api_url,
            http,
            publisher: Arc::new(SimulatedPublisher::new(config.upload_delay)),
        }))
    }
}

/// Run a store operation off the async runtime.
pub(crate) async fn run_db<F, T>(state: &AppState, f: F) -> AppResult<T>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let db = state.db.clone();
    tokio::task::spawn_blocking(move || f(&db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            AppError::Internal(e.to_string())
        })?
        .map_err(AppError::from)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Full route table with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route(
            "/api/edit",
            post(edit::edit_image).layer(DefaultBodyLimit::max(MAX_EDIT_BODY)),
        );

    let protected_routes = Router::new()
        .route("/api/catalog/save", post(catalog::save_post))
        .route("/api/catalog/posts", get(catalog::get_posts))
        .route("/api/catalog/posts/{post_id}", delete(catalog::delete_post))
        .route("/api/social/connect", post(social::connect))
        .route("/api/social/disconnect", post(social::disconnect))
        .route("/api/social/connections", get(social::get_connections))
        .route("/api/social/upload", post(upload::upload_post))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .expose_headers([CONTENT_LENGTH])
        .max_age(Duration::from_secs(600));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
