use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

/// Where uploaded cat pictures end up. Handlers hand the stored filename
/// onwards; the access-rule layer never touches file contents.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn save(&self, filename: &str, data: Bytes) -> anyhow::Result<()>;
    async fn remove(&self, filename: &str) -> anyhow::Result<()>;
}

/// Local-disk store rooted at the configured uploads directory.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub async fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn path_for(&self, filename: &str) -> PathBuf {
        // filenames are generated server-side; joining only the final path
        // component keeps a crafted name from escaping the root
        self.root
            .join(Path::new(filename).file_name().unwrap_or_default())
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn save(&self, filename: &str, data: Bytes) -> anyhow::Result<()> {
        tokio::fs::write(self.path_for(filename), &data).await?;
        Ok(())
    }

    async fn remove(&self, filename: &str) -> anyhow::Result<()> {
        tokio::fs::remove_file(self.path_for(filename)).await?;
        Ok(())
    }
}
