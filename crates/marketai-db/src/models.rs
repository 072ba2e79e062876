//! Storage-only record types. Posts and connections are stored in their wire
//! shape (`marketai_types`); accounts carry the password hash and never
//! leave the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller when saving a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub platform: marketai_types::Platform,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub image_url: String,
}
