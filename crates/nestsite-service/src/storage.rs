//! Filesystem-backed [`ObjectStore`].
//!
//! Objects are written below a root directory using their key as the
//! relative path; the HTTP server exposes that directory under
//! `public_base_url`.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use nestsite_core::error::{NestError, NestResult};
use nestsite_core::repository::ObjectStore;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> NestResult<PathBuf> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(NestError::Storage(format!("invalid object key: {key}")));
        }
        Ok(self.root.join(relative))
    }
}

impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> NestResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| NestError::Storage(format!("create {}: {e}", parent.display())))?;
        }
        let size = bytes.len();
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| NestError::Storage(format!("write {key}: {e}")))?;
        debug!(key, content_type, size, "Stored object");
        Ok(())
    }

    async fn delete(&self, key: &str) -> NestResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(NestError::Storage(format!("delete {key}: {e}"))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "http://localhost/media/");

        store
            .put("tenants/t/properties/p/a.jpg", "image/jpeg", vec![1, 2, 3])
            .await
            .unwrap();
        let written = dir.path().join("tenants/t/properties/p/a.jpg");
        assert_eq!(std::fs::read(&written).unwrap(), vec![1, 2, 3]);
        assert_eq!(
            store.public_url("tenants/t/properties/p/a.jpg"),
            "http://localhost/media/tenants/t/properties/p/a.jpg"
        );

        store.delete("tenants/t/properties/p/a.jpg").await.unwrap();
        assert!(!written.exists());
        // Deleting twice is fine.
        store.delete("tenants/t/properties/p/a.jpg").await.unwrap();
    }

    #[tokio::test]
    async fn rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "/media");
        assert!(store.put("../outside", "text/plain", vec![]).await.is_err());
        assert!(store.put("/etc/passwd", "text/plain", vec![]).await.is_err());
    }
}
