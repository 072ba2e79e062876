use std::collections::BTreeMap;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use marketai_types::{Platform, SocialConnectionRecord};

use crate::Database;
use crate::keys;

impl Database {
    // -- Social connections --

    /// Last write wins: reconnecting a platform replaces its credential.
    pub fn upsert_connection(
        &self,
        user_id: Uuid,
        platform: Platform,
        access_token: &str,
    ) -> Result<SocialConnectionRecord> {
        let record = SocialConnectionRecord {
            user_id,
            platform,
            access_token: access_token.to_string(),
            connected_at: Utc::now(),
        };
        self.store()
            .set(&keys::social(user_id, platform), &serde_json::to_value(&record)?)?;
        debug!("Connected {} for {}", platform, user_id);
        Ok(record)
    }

    pub fn get_connection(
        &self,
        user_id: Uuid,
        platform: Platform,
    ) -> Result<Option<SocialConnectionRecord>> {
        match self.store().get(&keys::social(user_id, platform))? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Idempotent.
    pub fn delete_connection(&self, user_id: Uuid, platform: Platform) -> Result<()> {
        self.store().delete(&keys::social(user_id, platform))?;
        debug!("Disconnected {} for {}", platform, user_id);
        Ok(())
    }

    /// Presence map over stored credentials. Platforms without a record are
    /// absent, not `false`.
    pub fn list_connections(&self, user_id: Uuid) -> Result<BTreeMap<Platform, bool>> {
        let values = self.store().scan_prefix(&keys::social_prefix(user_id))?;

        let mut connections = BTreeMap::new();
        for value in values {
            match serde_json::from_value::<SocialConnectionRecord>(value) {
                Ok(record) => {
                    connections.insert(record.platform, true);
                }
                Err(e) => warn!("Skipping corrupt connection entry for {}: {}", user_id, e),
            }
        }
        Ok(connections)
    }
}
