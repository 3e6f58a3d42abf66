//! Artifact fetching
//!
//! Downloads every planned artifact that is not already on disk. A key that
//! does not exist in the store is recorded and the run moves on; any other
//! store failure aborts the run.

use crate::core::error::PromoteError;
use crate::core::traits::ArtifactStore;
use crate::planning::ArtifactMapping;
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

/// An artifact that could not be retrieved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub source: String,
    pub destination: PathBuf,
    pub reason: String,
}

/// Outcome of the fetch stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchReport {
    pub downloaded: Vec<PathBuf>,
    /// Destinations that already existed
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<FetchFailure>,
}

impl FetchReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Fetch `artifacts` from `bucket` into their destinations, in order
pub async fn fetch_artifacts(
    store: &dyn ArtifactStore,
    bucket: &str,
    artifacts: &[ArtifactMapping],
) -> Result<FetchReport, PromoteError> {
    let mut report = FetchReport::default();

    for artifact in artifacts {
        let destination = &artifact.destination;

        if fs::try_exists(destination).await? {
            println!(
                "  ⏭️  Skipping {} as {} already exists",
                artifact.source,
                destination.display()
            );
            report.skipped.push(destination.clone());
            continue;
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }

        println!(
            "  ⬇️  Downloading {}/{} => {}",
            bucket,
            artifact.source,
            destination.display()
        );

        match store.get_object(bucket, &artifact.source, destination).await {
            Ok(bytes) => {
                debug!(store = store.name(), key = %artifact.source, bytes, "artifact downloaded");
                report.downloaded.push(destination.clone());
            }
            Err(e) => {
                let error = PromoteError::from(e);
                if !error.is_recoverable() {
                    return Err(error);
                }
                warn!(key = %artifact.source, "artifact missing from store");
                println!("  ❌ Failed to retrieve {}: {}", artifact.source, error);
                report.failed.push(FetchFailure {
                    source: artifact.source.clone(),
                    destination: destination.clone(),
                    reason: error.to_string(),
                });
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Platform;
    use crate::storage::MemoryStore;
    use tempfile::TempDir;

    const BUCKET: &str = "artifacts";

    fn mapping(dir: &TempDir, source: &str, relative: &str) -> ArtifactMapping {
        ArtifactMapping {
            platform: Platform::El,
            destination: dir.path().join(relative),
            source: source.to_string(),
        }
    }

    #[tokio::test]
    async fn test_downloads_into_new_directories() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new();
        store.insert(BUCKET, "el/7/x86_64/a.rpm/a.rpm", b"rpm");

        let artifacts = vec![mapping(&dir, "el/7/x86_64/a.rpm/a.rpm", "stable/7/x86_64/a.rpm")];
        let report = fetch_artifacts(&store, BUCKET, &artifacts).await.unwrap();

        assert_eq!(report.downloaded, vec![dir.path().join("stable/7/x86_64/a.rpm")]);
        assert!(!report.has_failures());
        assert_eq!(
            std::fs::read(dir.path().join("stable/7/x86_64/a.rpm")).unwrap(),
            b"rpm"
        );
    }

    #[tokio::test]
    async fn test_existing_destination_skips_store() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.rpm"), b"already here").unwrap();
        let store = MemoryStore::new();

        let artifacts = vec![mapping(&dir, "el/7/x86_64/a.rpm/a.rpm", "a.rpm")];
        let report = fetch_artifacts(&store, BUCKET, &artifacts).await.unwrap();

        assert_eq!(report.skipped.len(), 1);
        assert!(store.requests().is_empty());
        assert_eq!(std::fs::read(dir.path().join("a.rpm")).unwrap(), b"already here");
    }

    #[tokio::test]
    async fn test_missing_key_is_recorded_and_run_continues() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new();
        store.insert(BUCKET, "present", b"x");

        let artifacts = vec![
            mapping(&dir, "missing-1", "one"),
            mapping(&dir, "present", "two"),
            mapping(&dir, "missing-2", "three"),
        ];
        let report = fetch_artifacts(&store, BUCKET, &artifacts).await.unwrap();

        assert_eq!(report.downloaded.len(), 1);
        let failed: Vec<_> = report.failed.iter().map(|f| f.source.as_str()).collect();
        assert_eq!(failed, vec!["missing-1", "missing-2"]);
        assert!(!dir.path().join("one").exists());
        assert_eq!(
            store.requests(),
            vec![
                "get artifacts/missing-1",
                "get artifacts/present",
                "get artifacts/missing-2"
            ]
        );
    }

    #[tokio::test]
    async fn test_store_failure_aborts_fetch() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new();
        store.insert(BUCKET, "present", b"x");
        store.insert_failure(BUCKET, "denied", "AccessDenied");

        let artifacts = vec![
            mapping(&dir, "denied", "one"),
            mapping(&dir, "present", "two"),
        ];
        let err = fetch_artifacts(&store, BUCKET, &artifacts).await.unwrap_err();

        assert!(matches!(err, PromoteError::Store(ref e) if !e.is_not_found()));
        assert!(!err.is_recoverable());
        assert_eq!(store.requests(), vec!["get artifacts/denied"]);
    }
}
