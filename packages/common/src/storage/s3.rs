use std::time::Duration;

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};
use tracing::debug;

use super::credentials::StorageCredentials;
use super::error::StorageError;
use super::traits::BlobStore;

/// S3-compatible object storage (GCS interoperability, MinIO, AWS).
///
/// Objects are addressed path-style and exposed at
/// `{public_base_url}/{bucket}/{key}`; object visibility is left to the
/// bucket's own configuration.
pub struct S3BlobStore {
    bucket: Box<Bucket>,
    bucket_name: String,
    public_base_url: String,
    timeout: Duration,
}

impl S3BlobStore {
    pub fn new(
        bucket_name: &str,
        creds: &StorageCredentials,
        public_base_url: &str,
        timeout: Duration,
    ) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: creds.region.clone(),
            endpoint: creds.endpoint.clone(),
        };
        let credentials = Credentials::new(
            Some(&creds.access_key_id),
            Some(&creds.secret_access_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Misconfigured(e.to_string()))?;
        let bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| StorageError::Misconfigured(e.to_string()))?
            .with_path_style();

        Ok(Self {
            bucket,
            bucket_name: bucket_name.to_owned(),
            public_base_url: public_base_url.trim_end_matches('/').to_owned(),
            timeout,
        })
    }

    /// Deterministic public URL of `key`.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, self.bucket_name, key)
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<String, StorageError> {
        let upload = self.bucket.put_object_with_content_type(key, data, content_type);
        let response = tokio::time::timeout(self.timeout, upload)
            .await
            .map_err(|_| StorageError::Timeout(self.timeout))?
            .map_err(|e| match e {
                S3Error::HttpFailWithBody(status, _) => StorageError::Rejected {
                    status,
                    key: key.to_owned(),
                },
                other => StorageError::Backend(other.to_string()),
            })?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Rejected {
                status,
                key: key.to_owned(),
            });
        }

        debug!(key, bytes = data.len(), "Uploaded object");
        Ok(self.public_url(key))
    }
}
