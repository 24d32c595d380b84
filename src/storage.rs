use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;

/// Where accepted profile images end up.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Create the destination directory (and parents) if missing.
    async fn ensure_directory(&self) -> anyhow::Result<()>;
    /// Persist `body` under `file_name` and return the stored reference,
    /// a path relative to the upload root.
    async fn store_upload(&self, file_name: &str, body: Bytes) -> anyhow::Result<String>;
}

pub const PROFILE_IMAGE_DIR: &str = "profile_images";

/// Filesystem storage under `<root>/profile_images`. `root` is what the
/// router serves at `/uploads`.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn dir(&self) -> PathBuf {
        self.root.join(PROFILE_IMAGE_DIR)
    }
}

#[async_trait]
impl FileStorage for LocalStorage {
    async fn ensure_directory(&self) -> anyhow::Result<()> {
        let dir = self.dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create upload dir {}", dir.display()))
    }

    async fn store_upload(&self, file_name: &str, body: Bytes) -> anyhow::Result<String> {
        anyhow::ensure!(
            !file_name.is_empty() && !file_name.contains(['/', '\\']) && !file_name.starts_with('.'),
            "refusing unsafe file name {file_name:?}"
        );
        let dest = self.dir().join(file_name);
        let partial = self.dir().join(format!(".{file_name}.part"));

        tokio::fs::write(&partial, &body)
            .await
            .with_context(|| format!("write {}", partial.display()))?;
        if let Err(e) = tokio::fs::rename(&partial, &dest).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e).with_context(|| format!("move upload to {}", dest.display()));
        }

        Ok(format!("{PROFILE_IMAGE_DIR}/{file_name}"))
    }
}
