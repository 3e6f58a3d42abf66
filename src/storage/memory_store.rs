//! In-memory artifact store for tests

use super::StoreError;
use crate::core::traits::ArtifactStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Artifact store backed by a map, recording every request it receives
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    failures: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object under `bucket/key`
    pub fn insert(&self, bucket: &str, key: &str, data: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(format!("{bucket}/{key}"), data.to_vec());
    }

    /// Make every request for `bucket/key` fail with `message`
    pub fn insert_failure(&self, bucket: &str, key: &str, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(format!("{bucket}/{key}"), message.to_string());
    }

    fn failure(&self, bucket: &str, key: &str) -> Option<StoreError> {
        self.failures
            .lock()
            .unwrap()
            .get(&format!("{bucket}/{key}"))
            .map(|message| StoreError::Request(message.clone()))
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&format!("{bucket}/{key}"))
            .cloned()
    }

    /// Requests seen so far, as "get bucket/key" or "put bucket/key"
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        destination: &Path,
    ) -> Result<u64, StoreError> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("get {bucket}/{key}"));
        if let Some(err) = self.failure(bucket, key) {
            return Err(err);
        }

        let data = self.object(bucket, key).ok_or_else(|| StoreError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })?;

        tokio::fs::write(destination, &data).await?;
        Ok(data.len() as u64)
    }

    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        source: &Path,
    ) -> Result<(), StoreError> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("put {bucket}/{key}"));
        if let Some(err) = self.failure(bucket, key) {
            return Err(err);
        }

        let data = tokio::fs::read(source).await?;
        self.insert(bucket, key, &data);
        Ok(())
    }
}
