//! Artifact uploading

use crate::core::traits::ArtifactStore;
use crate::planning::UploadMapping;
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs;
use tracing::warn;

/// An upload the store rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadFailure {
    pub local: PathBuf,
    pub key: String,
    pub reason: String,
}

/// Outcome of an upload run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    /// Local files that were not found
    pub missing: Vec<PathBuf>,
    pub failed: Vec<UploadFailure>,
}

/// Upload every mapping whose local file exists; nothing here is fatal
pub async fn upload_artifacts(
    store: &dyn ArtifactStore,
    bucket: &str,
    uploads: &[UploadMapping],
) -> UploadReport {
    let mut report = UploadReport::default();

    for upload in uploads {
        if !fs::try_exists(&upload.local).await.unwrap_or(false) {
            println!("  ⚠️  Warning! {} was not found.", upload.local.display());
            report.missing.push(upload.local.clone());
            continue;
        }

        println!(
            "  ⬆️  Uploading {} => {}/{}",
            upload.local.display(),
            bucket,
            upload.key
        );

        match store.upload_file(bucket, &upload.key, &upload.local).await {
            Ok(()) => report.uploaded.push(upload.key.clone()),
            Err(e) => {
                warn!(key = %upload.key, error = %e, "upload failed");
                println!(
                    "  ❌ Failed to upload {} => {}: {}",
                    upload.local.display(),
                    upload.key,
                    e
                );
                report.failed.push(UploadFailure {
                    local: upload.local.clone(),
                    key: upload.key.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}
