//! S3-backed artifact store

use super::StoreError;
use crate::core::traits::ArtifactStore;
use crate::security::credentials::AwsCredentials;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use secrecy::ExposeSecret;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Name reported to AWS for the static credentials provider
const CREDENTIALS_PROVIDER: &str = "package-promoter";

/// Artifact store talking to Amazon S3 with static credentials
#[derive(Clone, Debug)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    /// Create a client for `region` using the given credentials
    pub fn new(region: &str, credentials: &AwsCredentials) -> Self {
        let credentials = Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.expose_secret().to_string(),
            None,
            None,
            CREDENTIALS_PROVIDER,
        );

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .build();

        Self {
            client: Client::from_conf(config),
        }
    }

    fn partial_path(destination: &Path) -> PathBuf {
        let mut name = destination
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".part");
        destination.with_file_name(name)
    }

    async fn stream_to_file(mut body: ByteStream, path: &Path) -> Result<u64, StoreError> {
        let mut file = fs::File::create(path).await?;
        let mut written = 0u64;

        while let Some(chunk) = body
            .try_next()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        Ok(written)
    }
}

#[async_trait]
impl ArtifactStore for S3Store {
    fn name(&self) -> &str {
        "s3"
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        destination: &Path,
    ) -> Result<u64, StoreError> {
        let response = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(response) => response,
            Err(err) => {
                let message = DisplayErrorContext(&err).to_string();
                return Err(if err.into_service_error().is_no_such_key() {
                    StoreError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    StoreError::Request(message)
                });
            }
        };

        debug!(
            bucket,
            key,
            content_length = ?response.content_length(),
            etag = ?response.e_tag(),
            "object metadata"
        );

        // Only a complete download is renamed into place
        let partial = Self::partial_path(destination);
        match Self::stream_to_file(response.body, &partial).await {
            Ok(written) => {
                fs::rename(&partial, destination).await?;
                Ok(written)
            }
            Err(err) => {
                let _ = fs::remove_file(&partial).await;
                Err(err)
            }
        }
    }

    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        source: &Path,
    ) -> Result<(), StoreError> {
        let body = ByteStream::from_path(source)
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|err| StoreError::Request(DisplayErrorContext(&err).to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_path() {
        let partial = S3Store::partial_path(Path::new("/tmp/apt/jessie/sensu_1.0.0-1_amd64.deb"));
        assert_eq!(
            partial,
            PathBuf::from("/tmp/apt/jessie/sensu_1.0.0-1_amd64.deb.part")
        );
    }

    #[tokio::test]
    async fn test_name() {
        let store = S3Store::new("us-east-1", &AwsCredentials::new("AKIAEXAMPLE", "secret"));
        assert_eq!(store.name(), "s3");
    }
}
