pub mod config;
pub mod normalize;
pub mod storage;

pub use normalize::{ImageError, ImageNormalizer, NormalizedImage};
pub use storage::{ArtifactStore, BlobStore, StorageError};
