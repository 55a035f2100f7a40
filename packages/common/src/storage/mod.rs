mod artifact;
mod credentials;
mod error;
mod placeholder;
mod traits;

#[cfg(feature = "object-storage")]
pub mod s3;

pub use artifact::ArtifactStore;
pub use credentials::{CredentialState, StorageCredentials};
pub use error::StorageError;
pub use placeholder::{PLACEHOLDER_FILL, placeholder_data_url};
pub use traits::{BlobStore, PNG_CONTENT_TYPE};
