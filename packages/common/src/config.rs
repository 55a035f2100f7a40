use std::time::Duration;

use serde::Deserialize;

/// Blob storage configuration.
///
/// Both `credentials` and `bucket` may be absent; the artifact store then runs
/// in placeholder mode instead of failing.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageAppConfig {
    /// JSON credential document for the S3-compatible backend.
    #[serde(default)]
    pub credentials: Option<String>,
    /// Bucket name. Default: unset.
    #[serde(default)]
    pub bucket: Option<String>,
    /// Prefix of public object URLs. Default: "https://storage.googleapis.com".
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Upper bound for a single upload, in seconds. Default: 10.
    #[serde(default = "default_storage_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_public_base_url() -> String {
    "https://storage.googleapis.com".into()
}
fn default_storage_timeout_secs() -> u64 {
    10
}

impl StorageAppConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for StorageAppConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            bucket: None,
            public_base_url: default_public_base_url(),
            timeout_secs: default_storage_timeout_secs(),
        }
    }
}
