//! In-memory secret storage implementation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::{SecretStore, StoreError};

/// In-memory, versioned secret store for testing and development.
///
/// Not persistent; data is lost when the process exits. Versions are kept in
/// insertion order, so version `n` lives at index `n - 1`.
pub struct MemoryStore {
    data: RwLock<HashMap<String, Vec<String>>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Create a memory store seeded with a first version of a secret.
    pub fn with_secret(name: impl Into<String>, payload: impl Into<String>) -> Self {
        let mut data = HashMap::new();
        data.insert(name.into(), vec![payload.into()]);
        Self {
            data: RwLock::new(data),
        }
    }

    /// Number of versions stored for a secret (0 if absent).
    pub fn version_count(&self, name: &str) -> u64 {
        self.data
            .read()
            .map(|d| d.get(name).map(|v| v.len() as u64).unwrap_or(0))
            .unwrap_or(0)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn access_latest(&self, name: &str) -> Result<String, StoreError> {
        let data = self.data.read().map_err(|e| StoreError::Backend {
            message: format!("lock poisoned: {}", e),
        })?;
        data.get(name)
            .and_then(|versions| versions.last())
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                name: name.to_string(),
            })
    }

    async fn add_version(&self, name: &str, payload: &str) -> Result<u64, StoreError> {
        let mut data = self.data.write().map_err(|e| StoreError::Backend {
            message: format!("lock poisoned: {}", e),
        })?;
        let versions = data.entry(name.to_string()).or_default();
        versions.push(payload.to_string());
        Ok(versions.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_add_and_access() {
        let store = MemoryStore::new();

        let version = store.add_version("TRAKT_SECRET", "{\"a\":1}").await.unwrap();
        assert_eq!(version, 1);

        let payload = store.access_latest("TRAKT_SECRET").await.unwrap();
        assert_eq!(payload, "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_memory_store_access_nonexistent() {
        let store = MemoryStore::new();
        let result = store.access_latest("NOPE").await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_memory_store_versions_append() {
        let store = MemoryStore::with_secret("TRAKT_SECRET", "v1");

        let version = store.add_version("TRAKT_SECRET", "v2").await.unwrap();
        assert_eq!(version, 2);
        assert_eq!(store.version_count("TRAKT_SECRET"), 2);

        // The latest version wins, earlier versions are never mutated
        let payload = store.access_latest("TRAKT_SECRET").await.unwrap();
        assert_eq!(payload, "v2");
    }
}
