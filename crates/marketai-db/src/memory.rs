use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use serde_json::Value;

use crate::kv::KvStore;

/// In-process store backed by an ordered map.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut BTreeMap<String, Value>) -> T,
    {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| anyhow!("Store lock poisoned: {}", e))?;
        Ok(f(&mut entries))
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value.clone());
        })
    }

    fn insert_if_absent(&self, key: &str, value: &Value) -> Result<bool> {
        self.with_entries(|entries| match entries.entry(key.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value.clone());
                true
            }
        })
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.with_entries(|entries| {
            entries.remove(key);
        })
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<Value>> {
        self.with_entries(|entries| {
            entries
                .range(prefix.to_string()..)
                .take_while(|(key, _)| key.starts_with(prefix))
                .map(|(_, value)| value.clone())
                .collect()
        })
    }
}
