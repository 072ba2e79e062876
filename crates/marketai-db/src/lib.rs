pub mod catalog;
pub mod keys;
pub mod kv;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod social;
pub mod sqlite;
pub mod users;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

pub use kv::KvStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Storage-agnostic service layer. All records live in one flat key-value
/// namespace; see [`keys`] for the layout.
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn KvStore>,
}

impl Database {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Open (or create) a SQLite-backed store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Arc::new(SqliteStore::open(path)?)))
    }

    /// Volatile store, used by tests and local demos.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn store(&self) -> &dyn KvStore {
        self.store.as_ref()
    }
}
