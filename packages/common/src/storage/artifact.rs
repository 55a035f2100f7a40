use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::placeholder::placeholder_data_url;
use super::traits::{BlobStore, PNG_CONTENT_TYPE};

/// Uploads artifacts and hands back a URL, whatever happens.
///
/// Without a backend, for empty payloads, and whenever the backend call fails,
/// the returned URL is an inline placeholder image instead.
#[derive(Clone)]
pub struct ArtifactStore {
    backend: Option<Arc<dyn BlobStore>>,
}

impl ArtifactStore {
    pub fn new(backend: Arc<dyn BlobStore>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A store that never contacts a backend.
    pub fn placeholder_only() -> Self {
        Self { backend: None }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Store `bytes` as `logical_name` and return a retrievable URL.
    pub async fn store(&self, bytes: &[u8], logical_name: &str) -> String {
        if bytes.is_empty() {
            warn!(logical_name, "Empty artifact, using placeholder");
            return placeholder_data_url(logical_name);
        }

        let Some(backend) = &self.backend else {
            debug!(logical_name, "Storage not configured, using placeholder");
            return placeholder_data_url(logical_name);
        };

        match backend.put(logical_name, bytes, PNG_CONTENT_TYPE).await {
            Ok(url) => {
                info!(logical_name, bytes = bytes.len(), "Stored artifact");
                url
            }
            Err(e) => {
                error!(logical_name, error = %e, "Artifact upload failed, using placeholder");
                placeholder_data_url(logical_name)
            }
        }
    }
}

#[cfg(feature = "object-storage")]
mod from_config {
    use std::sync::Arc;

    use tracing::{info, warn};

    use super::ArtifactStore;
    use crate::config::StorageAppConfig;
    use crate::storage::credentials::CredentialState;
    use crate::storage::error::StorageError;
    use crate::storage::s3::S3BlobStore;

    impl ArtifactStore {
        /// Build the store from configuration.
        ///
        /// Only a credential value that is not JSON is an error; every other
        /// incomplete setup yields a placeholder-only store.
        pub fn from_config(config: &StorageAppConfig) -> Result<Self, StorageError> {
            let state = CredentialState::parse(config.credentials.as_deref())?;
            let bucket = config
                .bucket
                .as_deref()
                .map(str::trim)
                .filter(|b| !b.is_empty());

            match (state, bucket) {
                (CredentialState::Ready(creds), Some(bucket)) => {
                    let backend = S3BlobStore::new(
                        bucket,
                        &creds,
                        &config.public_base_url,
                        config.timeout(),
                    )?;
                    info!(bucket, endpoint = %creds.endpoint, "Artifact storage enabled");
                    Ok(Self::new(Arc::new(backend)))
                }
                (CredentialState::Incomplete(reason), _) => {
                    warn!(%reason, "Storage credentials incomplete, artifacts will be placeholders");
                    Ok(Self::placeholder_only())
                }
                (_, None) => {
                    warn!("Storage bucket or credentials not configured, artifacts will be placeholders");
                    Ok(Self::placeholder_only())
                }
                (CredentialState::Absent, Some(_)) => {
                    warn!("Storage credentials not configured, artifacts will be placeholders");
                    Ok(Self::placeholder_only())
                }
            }
        }
    }
}
