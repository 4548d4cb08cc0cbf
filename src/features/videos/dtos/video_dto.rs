use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::videos::models::Video;

/// Path of the upload endpoint, shared with the client transport
pub const UPLOAD_PATH: &str = "/api/video-upload";

/// Maximum video size in bytes (70 MiB); files at or above it are refused
pub const MAX_VIDEO_SIZE: usize = 70 * 1024 * 1024;

/// Extra room for multipart boundaries and the text fields
pub const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Whether a file of `len` bytes is refused by the size ceiling
pub fn exceeds_max_video_size(len: u64) -> bool {
    len >= MAX_VIDEO_SIZE as u64
}

/// Upload video request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)]
#[serde(rename_all = "camelCase")]
pub struct UploadVideoDto {
    /// The video file
    #[schema(format = Binary, content_media_type = "video/*")]
    pub file: String,
    /// Title shown for the video
    #[schema(example = "Product demo")]
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// File size in bytes as measured by the client, decimal string
    #[schema(example = "7000000")]
    pub original_size: String,
}

/// Persisted video record as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoDto {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Identifier assigned by Cloudinary
    #[schema(example = "video-uploads/abc123")]
    pub public_id: String,
    #[schema(example = "7000000")]
    pub original_size: String,
    #[schema(example = "5000000")]
    pub compressed_size: String,
    /// Duration in seconds, 0 when unknown
    #[schema(example = 12.4)]
    pub duration: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Video> for VideoDto {
    fn from(video: Video) -> Self {
        Self {
            id: video.id,
            title: video.title,
            description: video.description,
            public_id: video.public_id,
            original_size: video.original_size,
            compressed_size: video.compressed_size,
            duration: video.duration,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_ceiling_is_inclusive() {
        assert!(!exceeds_max_video_size(0));
        assert!(!exceeds_max_video_size(MAX_VIDEO_SIZE as u64 - 1));
        assert!(exceeds_max_video_size(MAX_VIDEO_SIZE as u64));
        assert!(exceeds_max_video_size(MAX_VIDEO_SIZE as u64 + 1));
    }

    #[test]
    fn test_video_dto_uses_camel_case_field_names() {
        let now = Utc::now();
        let dto = VideoDto {
            id: Uuid::new_v4(),
            title: "T".to_string(),
            description: Some("D".to_string()),
            public_id: "abc123".to_string(),
            original_size: "7000000".to_string(),
            compressed_size: "5000000".to_string(),
            duration: 12.4,
            created_at: now,
            updated_at: now,
        };

        let value = serde_json::to_value(&dto).unwrap();

        assert_eq!(value["publicId"], "abc123");
        assert_eq!(value["originalSize"], "7000000");
        assert_eq!(value["compressedSize"], "5000000");
        assert_eq!(value["duration"], 12.4);
        assert!(value.get("createdAt").is_some());
        assert!(value.get("public_id").is_none());
    }
}
