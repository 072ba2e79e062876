use anyhow::Result;
use serde_json::Value;

/// Minimal key-value interface the services are written against.
///
/// Prefix scan is the only query pattern. Implementations return scan
/// results in ascending key order.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Insert or overwrite.
    fn set(&self, key: &str, value: &Value) -> Result<()>;

    /// Write only if `key` is unused, atomically. Returns whether the value
    /// was stored.
    fn insert_if_absent(&self, key: &str, value: &Value) -> Result<bool>;

    /// Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<()>;

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<Value>>;
}
