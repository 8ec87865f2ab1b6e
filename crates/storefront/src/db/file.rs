//! Flat-file JSON snapshot storage.
//!
//! Each collection is a single pretty-printed JSON array. Writes go to a
//! uniquely named temporary file next to the target and are then renamed
//! over it, so readers only ever observe complete snapshots.

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, instrument};
use uuid::Uuid;

use emporium_core::{Cart, Document};

use super::{CartStore, CollectionStore, StoreError};

/// A collection persisted as one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore<D> {
    path: PathBuf,
    _document: PhantomData<fn() -> D>,
}

impl<D: Document> JsonFileStore<D> {
    /// Store the collection at an explicit path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _document: PhantomData,
        }
    }

    /// Store the collection as `<dir>/<collection>.json`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(format!("{}.json", D::COLLECTION)))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map_or_else(|| D::COLLECTION.into(), |n| n.to_string_lossy());
        self.path
            .with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
    }

    fn io_error(path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[async_trait]
impl<D: Document> CollectionStore<D> for JsonFileStore<D> {
    #[instrument(skip(self), fields(collection = D::COLLECTION))]
    async fn read(&self) -> Result<Vec<D>, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::io_error(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            collection: D::COLLECTION,
            reason: e.to_string(),
        })
    }

    #[instrument(skip(self, documents), fields(collection = D::COLLECTION, count = documents.len()))]
    async fn write(&self, documents: &[D]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(documents)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::io_error(parent, e))?;
        }

        let temp = self.temp_path();
        let written = match fs::write(&temp, &bytes).await {
            Ok(()) => fs::rename(&temp, &self.path)
                .await
                .map_err(|e| Self::io_error(&self.path, e)),
            Err(e) => Err(Self::io_error(&temp, e)),
        };

        if written.is_err() {
            let _ = fs::remove_file(&temp).await;
        }
        written?;

        debug!("Collection written");
        Ok(())
    }
}

impl CartStore for JsonFileStore<Cart> {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use emporium_core::{CartId, ProductId};

    use super::*;

    #[tokio::test]
    async fn test_read_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<Cart>::in_dir(dir.path());

        assert!(store.read().await.unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_read_empty_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<Cart>::in_dir(dir.path());
        std::fs::write(store.path(), "").unwrap();

        assert!(store.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_creates_parent_dirs_and_pretty_prints() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<Cart>::in_dir(&dir.path().join("nested/data"));

        store.write(&[Cart::new(CartId::new(1))]).await.unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.starts_with("[\n"));
        assert_eq!(store.read().await.unwrap(), vec![Cart::new(CartId::new(1))]);
    }

    #[tokio::test]
    async fn test_write_replaces_whole_snapshot_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<Cart>::in_dir(dir.path());

        store
            .write(&[Cart::new(CartId::new(1)), Cart::new(CartId::new(2))])
            .await
            .unwrap();
        store.write(&[Cart::new(CartId::new(2))]).await.unwrap();

        assert_eq!(store.read().await.unwrap(), vec![Cart::new(CartId::new(2))]);
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<Cart>::in_dir(dir.path());
        // A non-empty directory at the target path makes the rename fail.
        std::fs::create_dir(store.path()).unwrap();
        std::fs::write(store.path().join("keep"), "").unwrap();

        assert!(matches!(
            store.write(&[Cart::new(CartId::new(1))]).await,
            Err(StoreError::Io { .. })
        ));

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_read_malformed_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<Cart>::in_dir(dir.path());
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(
            store.read().await,
            Err(StoreError::Corrupt {
                collection: "carts",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_default_cart_operations() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::<Cart>::in_dir(dir.path());
        store.write(&[Cart::new(CartId::new(1))]).await.unwrap();

        let cart = store
            .increment_item(CartId::new(1), ProductId::new(7))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cart.item(ProductId::new(7)).unwrap().quantity, 1);

        assert!(
            store
                .set_item_quantity(CartId::new(1), ProductId::new(7), 4)
                .await
                .unwrap()
        );
        assert!(
            !store
                .set_item_quantity(CartId::new(1), ProductId::new(8), 4)
                .await
                .unwrap()
        );
        assert!(
            store
                .increment_item(CartId::new(2), ProductId::new(7))
                .await
                .unwrap()
                .is_none()
        );

        let stored = store.read().await.unwrap();
        assert_eq!(stored[0].item(ProductId::new(7)).unwrap().quantity, 4);

        assert!(store.clear_items(CartId::new(1)).await.unwrap());
        assert!(!store.clear_items(CartId::new(2)).await.unwrap());
        assert!(store.read().await.unwrap()[0].items.is_empty());
    }
}
