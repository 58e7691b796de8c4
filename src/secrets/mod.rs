//! Versioned secret storage.
//!
//! The credential blob is stored as an opaque, versioned secret: every write
//! appends a new version and never mutates an existing one. The backend is
//! injected into the token manager as a trait object rather than reached for
//! through a global.

use async_trait::async_trait;
use thiserror::Error;

mod file;
mod gcp;
mod memory;

pub use file::FileStore;
pub use gcp::GoogleSecretStore;
pub use memory::MemoryStore;

/// Error type for secret store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named secret has no versions yet.
    #[error("secret not found: {name}")]
    NotFound { name: String },

    /// The storage backend encountered an error.
    #[error("backend error: {message}")]
    Backend { message: String },

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Abstraction over versioned secret storage backends.
///
/// Implementations include:
/// - [`MemoryStore`] - In-memory storage for tests
/// - [`FileStore`] - Numbered files under a local directory
/// - [`GoogleSecretStore`] - Google Secret Manager over REST
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Retrieve the payload of the latest version of a secret.
    async fn access_latest(&self, name: &str) -> Result<String, StoreError>;

    /// Append a new version with the given payload.
    ///
    /// Returns the number of the newly created version.
    async fn add_version(&self, name: &str, payload: &str) -> Result<u64, StoreError>;
}
