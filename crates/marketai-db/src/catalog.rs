use anyhow::Result;
use chrono::Utc;
use rand::Rng;
use tracing::{debug, warn};
use uuid::Uuid;

use marketai_types::SavedPost;

use crate::Database;
use crate::keys;
use crate::models::NewPost;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// `post_{unix_millis}_{9 base36 chars}`. The suffix comes from the thread
/// CSPRNG, so two ids minted in the same millisecond collide with
/// probability 36^-9.
pub fn new_post_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("post_{}_{}", Utc::now().timestamp_millis(), suffix)
}

impl Database {
    // -- Catalog --

    pub fn save_post(&self, user_id: Uuid, post: NewPost) -> Result<SavedPost> {
        let saved = SavedPost {
            id: new_post_id(),
            user_id,
            platform: post.platform,
            caption: post.caption,
            hashtags: post.hashtags,
            image_url: post.image_url,
            created_at: Utc::now(),
        };

        self.store()
            .set(&keys::catalog(user_id, &saved.id), &serde_json::to_value(&saved)?)?;
        debug!("Saved post {} for {}", saved.id, user_id);
        Ok(saved)
    }

    pub fn get_post(&self, user_id: Uuid, post_id: &str) -> Result<Option<SavedPost>> {
        match self.store().get(&keys::catalog(user_id, post_id))? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// All posts owned by `user_id`, in ascending key order (which, given the
    /// timestamped ids, is creation order).
    pub fn list_posts(&self, user_id: Uuid) -> Result<Vec<SavedPost>> {
        let values = self.store().scan_prefix(&keys::catalog_prefix(user_id))?;

        Ok(values
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<SavedPost>(value) {
                Ok(post) => Some(post),
                Err(e) => {
                    warn!("Skipping corrupt catalog entry for {}: {}", user_id, e);
                    None
                }
            })
            .collect())
    }

    /// Idempotent: deleting a missing post succeeds.
    pub fn delete_post(&self, user_id: Uuid, post_id: &str) -> Result<()> {
        self.store().delete(&keys::catalog(user_id, post_id))?;
        debug!("Deleted post {} for {}", post_id, user_id);
        Ok(())
    }
}
