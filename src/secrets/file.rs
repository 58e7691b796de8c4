//! File-backed secret storage implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{SecretStore, StoreError};

/// Versioned secret store over a local directory.
///
/// Each secret gets its own subdirectory with one numbered file per version
/// (`000001.json`, `000002.json`, ...). The latest version is the file with
/// the highest number; older versions are never touched.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn secret_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    async fn latest_version_number(&self, dir: &Path) -> Result<Option<u64>, StoreError> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Backend {
                    message: format!("failed to read {}: {}", dir.display(), e),
                })
            }
        };

        let mut latest = None;
        while let Some(entry) = entries.next_entry().await.map_err(|e| StoreError::Backend {
            message: format!("failed to read {}: {}", dir.display(), e),
        })? {
            let file_name = entry.file_name();
            let Some(stem) = Path::new(&file_name).file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Ok(number) = stem.parse::<u64>() {
                latest = latest.max(Some(number));
            }
        }
        Ok(latest)
    }
}

#[async_trait]
impl SecretStore for FileStore {
    async fn access_latest(&self, name: &str) -> Result<String, StoreError> {
        let dir = self.secret_dir(name);
        let Some(number) = self.latest_version_number(&dir).await? else {
            return Err(StoreError::NotFound {
                name: name.to_string(),
            });
        };

        let path = dir.join(format!("{:06}.json", number));
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| StoreError::Backend {
                message: format!("failed to read {}: {}", path.display(), e),
            })
    }

    async fn add_version(&self, name: &str, payload: &str) -> Result<u64, StoreError> {
        let dir = self.secret_dir(name);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::Backend {
                message: format!("failed to create {}: {}", dir.display(), e),
            })?;

        let number = self.latest_version_number(&dir).await?.unwrap_or(0) + 1;
        let path = dir.join(format!("{:06}.json", number));
        tokio::fs::write(&path, payload)
            .await
            .map_err(|e| StoreError::Backend {
                message: format!("failed to write {}: {}", path.display(), e),
            })?;

        Ok(number)
    }
}
