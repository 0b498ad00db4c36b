use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use super::TableStore;
use crate::config::StorageConfig;
use crate::errors::{ClassifierError, ClassifierResult};

/// Stores the encoded table as a single file inside a cache directory
#[derive(Debug, Clone)]
pub struct FileTableStore {
    path: PathBuf,
}

impl FileTableStore {
    /// Open a store, creating `cache_dir` if needed.
    ///
    /// Fails when the directory exists but cannot be written to.
    pub async fn open<P: AsRef<Path>>(cache_dir: P, file_name: &str) -> ClassifierResult<Self> {
        let cache_dir = cache_dir.as_ref();
        tokio::fs::create_dir_all(cache_dir).await?;

        let metadata = tokio::fs::metadata(cache_dir).await?;
        if !metadata.is_dir() {
            return Err(ClassifierError::storage(format!(
                "cache path {} is not a directory",
                cache_dir.display()
            )));
        }
        check_writable(cache_dir, file_name).await?;

        Ok(Self {
            path: cache_dir.join(file_name),
        })
    }

    pub async fn from_config(config: &StorageConfig) -> ClassifierResult<Self> {
        Self::open(&config.cache_dir, &config.file_name).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

/// Fails unless this process can create a file in `cache_dir`
async fn check_writable(cache_dir: &Path, file_name: &str) -> ClassifierResult<()> {
    let marker = cache_dir.join(format!(".{file_name}.write-check"));
    tokio::fs::write(&marker, b"")
        .await
        .map_err(|e| {
            ClassifierError::storage(format!(
                "cache directory {} is not writable: {e}",
                cache_dir.display()
            ))
        })?;
    if let Err(e) = tokio::fs::remove_file(&marker).await {
        debug!("Could not remove {}: {}", marker.display(), e);
    }
    Ok(())
}

#[async_trait]
impl TableStore for FileTableStore {
    async fn load(&self) -> ClassifierResult<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                debug!("Loaded {} bytes from {}", bytes.len(), self.path.display());
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClassifierError::storage(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn save(&self, blob: &[u8]) -> ClassifierResult<()> {
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, blob).await.map_err(|e| {
            ClassifierError::storage(format!("failed to write {}: {e}", temp_path.display()))
        })?;
        tokio::fs::rename(&temp_path, &self.path).await.map_err(|e| {
            ClassifierError::storage(format!("failed to replace {}: {e}", self.path.display()))
        })?;

        info!("Saved signature table to {} ({} bytes)", self.path.display(), blob.len());
        Ok(())
    }

    async fn exists(&self) -> ClassifierResult<bool> {
        Ok(tokio::fs::try_exists(&self.path).await?)
    }
}
