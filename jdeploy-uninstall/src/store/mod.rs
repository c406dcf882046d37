//! Manifest persistence: the atomic writer and the keyed repository.

mod error;
mod repository;
mod writer;

pub use error::{StoreError, StoreResult};
pub use repository::{FileManifestRepository, ManifestRepository};
pub use writer::ManifestWriter;
