// src/storage/backend.rs
//! Asynchronous key-value storage interface.
//!
//! The profile store persists documents through this interface. Instances
//! are opened by name through a [`StorageProvider`]; the store derives the
//! instance name from the handler URL, so two handler deployments never
//! share entries.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::errors::Result;

/// An asynchronous key-value document store.
///
/// Writes must be visible atomically: a concurrent read of a different key
/// never observes a partial write, and reads of the same key see either the
/// previous document or the new one in full.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Reads the document stored under `key`, if any.
    async fn get_item(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value` under `key`, replacing any existing document.
    async fn set_item(&self, key: &str, value: Value) -> Result<()>;

    /// Removes the document under `key`. Removing an absent key is not an
    /// error.
    async fn remove_item(&self, key: &str) -> Result<()>;

    /// All keys currently stored in this instance.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Drops every entry in this instance.
    async fn clear(&self) -> Result<()>;
}

/// Opens named storage instances.
///
/// Opening the same name twice yields the same underlying instance;
/// different names are fully isolated.
pub trait StorageProvider: Send + Sync {
    /// Opens (or creates) the instance called `name`.
    fn open_instance(&self, name: &str) -> Arc<dyn StorageBackend>;
}
