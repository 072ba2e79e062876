use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Platform, SavedPost};

// -- JWT Claims --

/// Access token claims issued on register/login and checked by the
/// bearer-token middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub exp: usize,
}

// -- Auth --

// Fields are optional so a missing one surfaces as 400 from the handler
// rather than as a deserialization rejection.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserInfo,
    pub access_token: String,
}

// -- Catalog --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePostRequest {
    pub platform: Platform,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePostResponse {
    pub success: bool,
    pub post_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostsResponse {
    pub posts: Vec<SavedPost>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// -- Social --

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub platform: Option<Platform>,
    pub access_token: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DisconnectRequest {
    pub platform: Option<Platform>,
}

/// Presence map: a platform is listed only when a credential is stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionsResponse {
    pub connections: BTreeMap<Platform, bool>,
}

impl ConnectionsResponse {
    /// Absent platforms count as not connected.
    pub fn is_connected(&self, platform: Platform) -> bool {
        self.connections.get(&platform).copied().unwrap_or(false)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub post_id: Option<String>,
    /// Defaults to the saved post's own platform when omitted.
    pub platform: Option<Platform>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
}

// -- Image editing --

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditImageRequest {
    pub image_base64: Option<String>,
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditImageResponse {
    pub edited_image: serde_json::Value,
}

// -- Errors --

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
