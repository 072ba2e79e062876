use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Social platforms a post can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Facebook,
    Twitter,
    #[serde(rename = "linkedin")]
    LinkedIn,
    #[serde(rename = "tiktok")]
    TikTok,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Instagram,
        Platform::Facebook,
        Platform::Twitter,
        Platform::LinkedIn,
        Platform::TikTok,
    ];

    /// Identifier used on the wire and inside storage keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::LinkedIn => "linkedin",
            Self::TikTok => "tiktok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

/// A post persisted in a user's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPost {
    pub id: String,
    pub user_id: Uuid,
    pub platform: Platform,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// Stored credential linking a user to one platform.
/// At most one exists per (user, platform); a new connect overwrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialConnectionRecord {
    pub user_id: Uuid,
    pub platform: Platform,
    pub access_token: String,
    pub connected_at: DateTime<Utc>,
}
