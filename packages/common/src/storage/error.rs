use std::fmt;
use std::time::Duration;

/// Errors that can occur while talking to a blob storage backend.
#[derive(Debug)]
pub enum StorageError {
    /// The backend configuration cannot be used at all.
    Misconfigured(String),
    /// The backend answered with a non-success status.
    Rejected { status: u16, key: String },
    /// The backend call failed (network, auth, quota).
    Backend(String),
    /// The upload did not finish in time.
    Timeout(Duration),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Misconfigured(msg) => write!(f, "storage misconfigured: {msg}"),
            Self::Rejected { status, key } => {
                write!(f, "storage rejected upload of {key} (status {status})")
            }
            Self::Backend(msg) => write!(f, "storage backend error: {msg}"),
            Self::Timeout(after) => write!(f, "storage upload timed out after {after:?}"),
        }
    }
}

impl std::error::Error for StorageError {}
