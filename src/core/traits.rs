//! Core traits for release promotion
//!
//! These are the seams between the promotion pipeline and the outside world:
//! the remote artifact store and the operator at the terminal.

use crate::storage::StoreError;
use async_trait::async_trait;
use std::path::Path;

// ============================================================================
// Artifact Store
// ============================================================================

/// Remote object storage holding built artifacts
///
/// Keys are computed path strings such as
/// `el/6/x86_64/sensu-1.0.0-1.el6.x86_64.rpm/sensu-1.0.0-1.el6.x86_64.rpm`.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store name for log output (e.g. "s3")
    fn name(&self) -> &str;

    /// Download `key` from `bucket` into `destination`
    ///
    /// Returns the number of bytes written. A missing key must be reported as
    /// `StoreError::NotFound`, and no file may be left at `destination` when
    /// the download fails.
    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        destination: &Path,
    ) -> Result<u64, StoreError>;

    /// Upload the local file `source` to `bucket` under `key`
    async fn upload_file(&self, bucket: &str, key: &str, source: &Path)
    -> Result<(), StoreError>;
}

// ============================================================================
// Operator Prompt
// ============================================================================

/// Yes/no question asked to the operator between pipeline stages
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Ask `message` and return true for an affirmative answer
    async fn confirm(&self, message: &str) -> std::io::Result<bool>;
}
