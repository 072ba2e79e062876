use anyhow::Result;
use tracing::debug;

use crate::Database;
use crate::keys;
use crate::models::UserRow;

impl Database {
    /// Store a new account. Returns `false`, leaving the existing account
    /// untouched, when the email is already registered.
    pub fn create_user(&self, user: &UserRow) -> Result<bool> {
        let created = self
            .store()
            .insert_if_absent(&keys::user(&user.email), &serde_json::to_value(user)?)?;
        if created {
            debug!("Stored account {}", user.id);
        }
        Ok(created)
    }

    /// Lookup is case-insensitive on the email.
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        match self.store().get(&keys::user(email))? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}
