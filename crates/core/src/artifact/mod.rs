//! Classifier artifact loading.
//!
//! The artifact is fetched and validated once at startup. Any failure is returned to the
//! caller, which is expected to abort: there is no stub model to fall back to.

pub mod sigv4;
pub mod source;

use crate::constants::{DEFAULT_AWS_REGION, DEFAULT_MODEL_KEY};
use crate::severity::model::Classifier;
use crate::{TriageError, TriageResult};
use reqwest::Url;
use sigv4::S3Credentials;
use source::{ArtifactSource, FileSource, S3Source};
use std::path::PathBuf;

/// Where the classifier artifact lives, resolved from configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactLocation {
    File(PathBuf),
    S3 {
        endpoint: Url,
        bucket: String,
        key: String,
        region: String,
        credentials: S3Credentials,
    },
}

impl ArtifactLocation {
    /// Resolve the location from configuration values.
    ///
    /// `lookup` returns the value of a named setting (normally an environment variable).
    /// `TRIAGE_MODEL_PATH` wins when set; otherwise the artifact is read from the object store,
    /// which needs `TRIAGE_MODEL_BUCKET`, `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY`.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> TriageResult<Self> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &str| {
            get(name).ok_or_else(|| {
                TriageError::InvalidConfig(format!(
                    "{name} must be set when TRIAGE_MODEL_PATH is not"
                ))
            })
        };

        if let Some(path) = get("TRIAGE_MODEL_PATH") {
            return Ok(Self::File(PathBuf::from(path)));
        }

        let bucket = require("TRIAGE_MODEL_BUCKET")?;
        let key = get("TRIAGE_MODEL_KEY").unwrap_or_else(|| DEFAULT_MODEL_KEY.into());
        let region = get("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.into());
        let endpoint = get("TRIAGE_S3_ENDPOINT")
            .unwrap_or_else(|| format!("https://s3.{region}.amazonaws.com"));
        let endpoint = Url::parse(&endpoint).map_err(|e| {
            TriageError::InvalidConfig(format!("TRIAGE_S3_ENDPOINT is not a valid url: {e}"))
        })?;
        let credentials = S3Credentials {
            access_key_id: require("AWS_ACCESS_KEY_ID")?,
            secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
            session_token: get("AWS_SESSION_TOKEN"),
        };

        Ok(Self::S3 {
            endpoint,
            bucket,
            key,
            region,
            credentials,
        })
    }

    pub fn into_source(self) -> TriageResult<Box<dyn ArtifactSource>> {
        Ok(match self {
            Self::File(path) => Box::new(FileSource::new(path)),
            Self::S3 {
                endpoint,
                bucket,
                key,
                region,
                credentials,
            } => Box::new(S3Source::new(endpoint, bucket, key, region, credentials)?),
        })
    }
}

/// Fetch, deserialize and validate the classifier.
pub async fn load(source: &dyn ArtifactSource) -> TriageResult<Classifier> {
    let location = source.describe();
    tracing::info!(%location, "loading classifier artifact");

    let bytes = source.fetch().await?;
    let classifier = Classifier::from_slice(&bytes)?;

    tracing::info!(
        %location,
        bytes = bytes.len(),
        model = %classifier.summary(),
        "classifier loaded"
    );
    Ok(classifier)
}
