//! Storage for uploaded files (team logos, coach photos and rendered match
//! summary visuals).
//!
//! Files are written under a single root directory, in one sub-folder per
//! kind of asset, and served back to browsers under [`PUBLIC_PREFIX`].

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

pub const PUBLIC_PREFIX: &str = "/assets";

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file type: {0:?}")]
    UnsupportedType(String),

    #[error("The uploaded file is empty")]
    Empty,
}

#[derive(Clone, Debug)]
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stores `bytes` in `folder` under a freshly generated name that keeps
    /// the extension of `file_name`, returning the public URL of the file.
    #[tracing::instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub async fn put(
        &self,
        folder: &str,
        file_name: &str,
        bytes: &[u8],
        allowed: &[&str],
    ) -> Result<String, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::Empty);
        }

        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if !allowed.contains(&ext.as_str()) {
            return Err(StorageError::UnsupportedType(ext));
        }

        let name = format!("{}.{ext}", Uuid::new_v4());
        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&name), bytes).await?;

        tracing::debug!("stored {folder}/{name}");

        Ok(format!("{PUBLIC_PREFIX}/{folder}/{name}"))
    }

    /// Deletes a file stored by [`put`](Self::put), given its public URL.
    /// Used when the record that would have pointed at it is never written.
    pub async fn remove(&self, url: &str) {
        let Some(relative) = url
            .strip_prefix(PUBLIC_PREFIX)
            .map(|rest| Path::new(rest.trim_start_matches('/')))
        else {
            tracing::warn!("not removing {url}: outside the store");
            return;
        };
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            tracing::warn!("not removing {url}: outside the store");
            return;
        }

        match tokio::fs::remove_file(self.root.join(relative)).await {
            Ok(()) => tracing::debug!("removed {url}"),
            Err(e) => tracing::warn!("could not remove {url}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_file_and_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(dir.path());

        let url = store
            .put("team-logos", "Logo.PNG", b"not really a png", IMAGE_EXTENSIONS)
            .await
            .unwrap();

        assert!(url.starts_with("/assets/team-logos/"));
        assert!(url.ends_with(".png"));

        let name = url.rsplit('/').next().unwrap();
        let stored =
            std::fs::read(dir.path().join("team-logos").join(name)).unwrap();
        assert_eq!(stored, b"not really a png");
    }

    #[tokio::test]
    async fn removes_stored_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(dir.path().join("assets"));
        std::fs::write(dir.path().join("keep.txt"), b"keep").unwrap();

        let url = store
            .put("coach-photos", "me.jpg", b"photo", IMAGE_EXTENSIONS)
            .await
            .unwrap();
        store.remove(&url).await;
        assert_eq!(
            std::fs::read_dir(store.root().join("coach-photos"))
                .unwrap()
                .count(),
            0
        );

        store.remove("/assets/../keep.txt").await;
        store.remove("/elsewhere/keep.txt").await;
        assert!(dir.path().join("keep.txt").exists());
    }

    #[tokio::test]
    async fn rejects_unknown_extensions_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(dir.path());

        assert!(matches!(
            store.put("x", "script.sh", b"#!/bin/sh", IMAGE_EXTENSIONS).await,
            Err(StorageError::UnsupportedType(ext)) if ext == "sh"
        ));
        assert!(matches!(
            store.put("x", "a.png", b"", IMAGE_EXTENSIONS).await,
            Err(StorageError::Empty)
        ));
    }
}
