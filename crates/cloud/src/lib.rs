//! Image archive for report photos.
//!
//! - [`store::AssetStore`] -- the seam to the hosted asset store.
//! - [`cloudinary::CloudinaryClient`] -- signed Cloudinary uploads.
//! - [`archive::ImageArchive`] -- bounded fan-out of one request's images.

pub mod archive;
pub mod cloudinary;
pub mod error;
pub mod store;

pub use archive::{ArchiveConfig, ImageArchive, UploadPolicy};
pub use error::ArchiveError;
pub use store::{AssetHandle, AssetStore, ImageUpload};
