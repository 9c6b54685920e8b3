// src/storage/memory.rs
//! In-memory storage backend.
//!
//! Backs the profile store in tests and in hosts without durable storage.
//! Each instance guards its map with an async read-write lock, so writes
//! are atomic per document and reads never observe a torn entry.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

use crate::errors::Result;
use crate::storage::backend::{StorageBackend, StorageProvider};

/// A single in-memory storage instance.
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStorage {
    /// Creates an empty instance.
    pub fn new() -> Self {
        MemoryStorage {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        MemoryStorage::new()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<Value>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.read().await;
        Ok(entries.keys().cloned().collect())
    }

    async fn clear(&self) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.clear();
        Ok(())
    }
}

/// Provider handing out shared in-memory instances by name.
pub struct MemoryStorageProvider {
    instances: Mutex<HashMap<String, Arc<MemoryStorage>>>,
}

impl MemoryStorageProvider {
    /// Creates a provider with no instances.
    pub fn new() -> Self {
        MemoryStorageProvider {
            instances: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorageProvider {
    fn default() -> Self {
        MemoryStorageProvider::new()
    }
}

impl StorageProvider for MemoryStorageProvider {
    fn open_instance(&self, name: &str) -> Arc<dyn StorageBackend> {
        let mut instances = self.instances.lock().expect("storage provider lock");
        instances
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryStorage::new()))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("a").await.unwrap(), None);

        storage.set_item("a", json!({"id": "a"})).await.unwrap();
        assert_eq!(storage.get_item("a").await.unwrap(), Some(json!({"id": "a"})));

        storage.remove_item("a").await.unwrap();
        assert_eq!(storage.get_item("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_and_clear() {
        let storage = MemoryStorage::new();
        storage.set_item("a", json!(1)).await.unwrap();
        storage.set_item("b", json!(2)).await.unwrap();

        let mut keys = storage.keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);

        storage.clear().await.unwrap();
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_scopes_instances_by_name() {
        let provider = MemoryStorageProvider::new();
        let first = provider.open_instance("profileKeyStore_/handler-a");
        let second = provider.open_instance("profileKeyStore_/handler-b");

        first.set_item("shared-key", json!("a")).await.unwrap();
        assert_eq!(second.get_item("shared-key").await.unwrap(), None);

        // Reopening a name yields the same instance.
        let first_again = provider.open_instance("profileKeyStore_/handler-a");
        assert_eq!(
            first_again.get_item("shared-key").await.unwrap(),
            Some(json!("a"))
        );
    }
}
