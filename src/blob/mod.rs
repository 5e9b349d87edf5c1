//! Blob storage for uploaded files.

pub mod store;

pub use store::{BlobStore, StoredBlob, UploadedFile};
