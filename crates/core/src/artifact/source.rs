//! Where classifier artifacts come from.

use super::sigv4::{sign_get_object, S3Credentials};
use crate::{TriageError, TriageResult};
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Fetches the raw bytes of a serialized classifier.
#[async_trait::async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Human-readable location, for logs. Never includes credentials.
    fn describe(&self) -> String;

    async fn fetch(&self) -> TriageResult<Vec<u8>>;
}

/// Artifact on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl ArtifactSource for FileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn fetch(&self) -> TriageResult<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .map_err(TriageError::ArtifactRead)
    }
}

/// Artifact stored as an object in S3 or an S3-compatible store.
pub struct S3Source {
    endpoint: Url,
    bucket: String,
    key: String,
    region: String,
    credentials: S3Credentials,
    client: reqwest::Client,
}

impl S3Source {
    pub fn new(
        endpoint: Url,
        bucket: String,
        key: String,
        region: String,
        credentials: S3Credentials,
    ) -> TriageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| {
                TriageError::InvalidConfig(format!("failed to build object store client: {e}"))
            })?;

        Ok(Self {
            endpoint,
            bucket,
            key,
            region,
            credentials,
            client,
        })
    }
}

#[async_trait::async_trait]
impl ArtifactSource for S3Source {
    fn describe(&self) -> String {
        format!("s3://{}/{} via {}", self.bucket, self.key, self.endpoint)
    }

    async fn fetch(&self) -> TriageResult<Vec<u8>> {
        let signed = sign_get_object(
            &self.endpoint,
            &self.bucket,
            &self.key,
            &self.region,
            &self.credentials,
            chrono::Utc::now(),
        )?;

        let mut request = self.client.get(signed.url);
        for (name, value) in &signed.headers {
            // reqwest derives the host header from the url.
            if name != "host" {
                request = request.header(name.as_str(), value.as_str());
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| TriageError::ArtifactFetch(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TriageError::ArtifactStatus {
                status: status.as_u16(),
                key: self.key.clone(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TriageError::ArtifactFetch(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
