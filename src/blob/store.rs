//! Content-addressed-by-id binary storage with an explicit lifecycle.
//!
//! The backing bucket is opened by [`BlobStore::init`]; every operation
//! invoked before that fails fast with a clear "not initialized"
//! [`ApiError::Storage`] instead of relying on a lazily populated
//! shared handle.

use std::collections::HashMap;

use bytes::Bytes;
use tokio::sync::RwLock;

use crate::domain::BlobId;
use crate::error::ApiError;

/// A file as received from a multipart upload, before it has an id.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Raw file content.
    pub bytes: Bytes,
    /// Declared MIME type.
    pub content_type: String,
    /// Original client-side filename.
    pub filename: String,
}

/// A stored binary object and its recorded metadata.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    /// Raw file content. [`Bytes`] clones are reference-counted.
    pub bytes: Bytes,
    /// MIME type recorded at store time.
    pub content_type: String,
    /// Filename recorded at store time.
    pub filename: String,
}

/// Opaque-id binary store for uploaded files (QR codes, screenshots).
///
/// `None` in the inner slot means the store has not been initialized
/// yet. Writes are independent per request; no cross-request ordering
/// is needed beyond the map lock.
#[derive(Debug)]
pub struct BlobStore {
    inner: RwLock<Option<HashMap<BlobId, StoredBlob>>>,
}

impl BlobStore {
    /// Creates an **uninitialized** store. Call [`Self::init`] before
    /// serving requests.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Opens the backing bucket. Idempotent: a second call leaves
    /// already-stored blobs in place.
    pub async fn init(&self) {
        let mut inner = self.inner.write().await;
        if inner.is_none() {
            *inner = Some(HashMap::new());
        }
    }

    /// Returns `true` once [`Self::init`] has completed.
    pub async fn ready(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// Persists binary content and returns the opaque id that will
    /// retrieve identical bytes and content type later.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if the store is not initialized.
    pub async fn put(
        &self,
        bytes: Bytes,
        content_type: &str,
        filename: &str,
    ) -> Result<BlobId, ApiError> {
        let mut inner = self.inner.write().await;
        let bucket = inner.as_mut().ok_or_else(not_ready)?;
        let id = BlobId::new();
        bucket.insert(
            id,
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
                filename: filename.to_string(),
            },
        );
        tracing::debug!(blob_id = %id, content_type, "blob stored");
        Ok(id)
    }

    /// Fetches a stored blob.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] before initialization and
    /// [`ApiError::BlobNotFound`] when the id is unknown.
    pub async fn get(&self, id: BlobId) -> Result<StoredBlob, ApiError> {
        let inner = self.inner.read().await;
        let bucket = inner.as_ref().ok_or_else(not_ready)?;
        bucket.get(&id).cloned().ok_or(ApiError::BlobNotFound(id))
    }

    /// Deletes a stored blob.
    ///
    /// Absence is reported as [`ApiError::BlobNotFound`]; cleanup
    /// callers swallow that rather than failing their primary
    /// operation.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] before initialization and
    /// [`ApiError::BlobNotFound`] when the id is unknown.
    pub async fn delete(&self, id: BlobId) -> Result<(), ApiError> {
        let mut inner = self.inner.write().await;
        let bucket = inner.as_mut().ok_or_else(not_ready)?;
        match bucket.remove(&id) {
            Some(_) => {
                tracing::debug!(blob_id = %id, "blob deleted");
                Ok(())
            }
            None => Err(ApiError::BlobNotFound(id)),
        }
    }

    /// Number of stored blobs (zero before initialization).
    pub async fn len(&self) -> usize {
        self.inner.read().await.as_ref().map_or(0, HashMap::len)
    }

    /// Returns `true` when no blobs are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for BlobStore {
    fn default() -> Self {
        Self::new()
    }
}

fn not_ready() -> ApiError {
    ApiError::Storage("blob store not initialized".to_string())
}
