use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while talking to the media-processing service
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Media service credentials are not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Media service rejected the upload ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid media service response: {0}")]
    InvalidResponse(String),
}

/// The load-bearing part of a successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct MediaUploadResult {
    /// Identifier assigned by the service, unique per upload
    pub public_id: String,
    /// Size in bytes after transformation
    pub bytes: i64,
    /// Duration in seconds, when the service reports one
    pub duration: Option<f64>,
}

/// Upload seam between the gateway and the media-processing service.
///
/// One instance is built at startup and shared read-only by every request.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Whether the credentials needed for an upload are present
    fn is_configured(&self) -> bool;

    /// Upload a complete video held in memory
    async fn upload_video(
        &self,
        data: Vec<u8>,
        file_name: &str,
    ) -> Result<MediaUploadResult, MediaError>;
}
