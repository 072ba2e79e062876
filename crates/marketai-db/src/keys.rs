//! Key layout of the flat namespace:
//!
//! - `user:{email}`                    account record
//! - `catalog:{userId}:{postId}`       saved post
//! - `social:{userId}:{platform}`      platform credential

use marketai_types::Platform;
use uuid::Uuid;

pub fn user(email: &str) -> String {
    format!("user:{}", email.to_lowercase())
}

pub fn catalog_prefix(user_id: Uuid) -> String {
    format!("catalog:{}:", user_id)
}

pub fn catalog(user_id: Uuid, post_id: &str) -> String {
    format!("{}{}", catalog_prefix(user_id), post_id)
}

pub fn social_prefix(user_id: Uuid) -> String {
    format!("social:{}:", user_id)
}

pub fn social(user_id: Uuid, platform: Platform) -> String {
    format!("{}{}", social_prefix(user_id), platform)
}
