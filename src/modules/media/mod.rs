//! Media processing module
//!
//! Defines the `MediaUploader` seam used by the upload gateway and the
//! Cloudinary implementation behind it.

mod cloudinary_client;
mod uploader;

pub use cloudinary_client::{CloudinaryClient, CloudinaryUploadResponse};
pub use uploader::{MediaError, MediaUploadResult, MediaUploader};
