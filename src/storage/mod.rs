//! Remote artifact storage
//!
//! The promoter only needs two operations from the artifact store: download
//! an object into a local file and upload a local file. Both go through the
//! `ArtifactStore` trait in `core::traits`.

#[cfg(test)]
pub mod memory_store;
pub mod s3_store;

#[cfg(test)]
pub use memory_store::MemoryStore;
pub use s3_store::S3Store;

use thiserror::Error;

/// Errors raised by an artifact store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The requested key does not exist. Recoverable: the run records it and
    /// moves on.
    #[error("{bucket}/{key} does not exist")]
    NotFound { bucket: String, key: String },

    /// Any other failure reported by the store
    #[error("Artifact store request failed: {0}")]
    Request(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
