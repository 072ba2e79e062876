use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use marketai_types::api::AuthResponse;

/// The signed-in user as kept between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub email: String,
    pub name: String,
    pub access_token: String,
}

impl From<AuthResponse> for UserSession {
    fn from(resp: AuthResponse) -> Self {
        Self {
            email: resp.user.email,
            name: resp.user.name,
            access_token: resp.access_token,
        }
    }
}

/// Where a session survives restarts.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> anyhow::Result<Option<UserSession>>;
    fn save(&self, session: &UserSession) -> anyhow::Result<()>;
    fn clear(&self) -> anyhow::Result<()>;
}

/// One JSON document on disk.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> anyhow::Result<Option<UserSession>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        let session = serde_json::from_str(&text)
            .with_context(|| format!("parsing session file {}", self.path.display()))?;
        Ok(Some(session))
    }

    fn save(&self, session: &UserSession) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<UserSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: UserSession) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<UserSession>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> anyhow::Result<Option<UserSession>> {
        Ok(self.slot().clone())
    }

    fn save(&self, session: &UserSession) -> anyhow::Result<()> {
        *self.slot() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

/// Who is signed in, passed explicitly to whatever needs it.
pub struct SessionContext {
    store: Box<dyn SessionStore>,
    current: Option<UserSession>,
}

impl SessionContext {
    /// Start from whatever the store holds. An unreadable store starts
    /// signed out rather than failing.
    pub fn restore(store: impl SessionStore + 'static) -> Self {
        let current = match store.load() {
            Ok(session) => session,
            Err(e) => {
                warn!("discarding stored session: {:#}", e);
                None
            }
        };
        if let Some(session) = &current {
            info!("restored session for {}", session.email);
        }
        Self {
            store: Box::new(store),
            current,
        }
    }

    pub fn sign_in(&mut self, session: UserSession) -> anyhow::Result<()> {
        self.store.save(&session)?;
        info!("signed in as {}", session.email);
        self.current = Some(session);
        Ok(())
    }

    /// Forget the session in memory and in storage.
    pub fn sign_out(&mut self) -> anyhow::Result<()> {
        if let Some(session) = self.current.take() {
            info!("signed out {}", session.email);
        }
        self.store.clear()
    }

    pub fn current(&self) -> Option<&UserSession> {
        self.current.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.is_some()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.access_token.as_str())
    }
}
