use serde::Deserialize;
use serde_json::Value;

use super::error::StorageError;

/// HMAC interoperability keys for an S3-compatible endpoint.
#[derive(Clone, Deserialize)]
pub struct StorageCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_endpoint() -> String {
    "https://storage.googleapis.com".into()
}
fn default_region() -> String {
    "auto".into()
}

impl std::fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .finish()
    }
}

/// Outcome of inspecting the configured credential document.
#[derive(Debug)]
pub enum CredentialState {
    /// Nothing configured.
    Absent,
    /// Valid JSON that does not describe usable credentials.
    Incomplete(String),
    Ready(StorageCredentials),
}

impl CredentialState {
    /// Inspect a raw credential document.
    ///
    /// A value that is not JSON at all is a hard misconfiguration and returns
    /// an error. Blank values count as absent.
    pub fn parse(raw: Option<&str>) -> Result<Self, StorageError> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::Absent);
        };

        let value: Value = serde_json::from_str(raw).map_err(|e| {
            StorageError::Misconfigured(format!("credentials are not valid JSON: {e}"))
        })?;

        match serde_json::from_value::<StorageCredentials>(value) {
            Ok(creds) if creds.access_key_id.is_empty() || creds.secret_access_key.is_empty() => {
                Ok(Self::Incomplete("access key fields are empty".into()))
            }
            Ok(creds) => Ok(Self::Ready(creds)),
            Err(e) => Ok(Self::Incomplete(e.to_string())),
        }
    }
}
