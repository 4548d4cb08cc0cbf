use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result, MSG_FILE_NOT_FOUND};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::videos::dtos::{exceeds_max_video_size, VideoDto};
use crate::features::videos::models::NewVideo;
use crate::features::videos::services::VideoRepository;
use crate::modules::media::MediaUploader;
use crate::shared::types::PaginationQuery;

/// Where an upload request is in its lifecycle; named in logs on failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Received,
    Authorizing,
    ConfigChecked,
    Uploading,
    Persisting,
    Completed,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadStage::Received => "received",
            UploadStage::Authorizing => "authorizing",
            UploadStage::ConfigChecked => "config_checked",
            UploadStage::Uploading => "uploading",
            UploadStage::Persisting => "persisting",
            UploadStage::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// File part of an upload request, fully buffered
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Fields of the multipart upload request; nothing here is validated by the gateway
/// except the presence and size of the file
#[derive(Debug, Clone, Default)]
pub struct VideoUploadForm {
    pub file: Option<UploadedFile>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub original_size: Option<String>,
}

/// Upload gateway and read access to stored video records
pub struct VideoService {
    media: Arc<dyn MediaUploader>,
    repository: Arc<dyn VideoRepository>,
}

impl VideoService {
    pub fn new(media: Arc<dyn MediaUploader>, repository: Arc<dyn VideoRepository>) -> Self {
        Self { media, repository }
    }

    /// Fails with `ServiceMisconfigured` when the media service has no credentials
    pub fn ensure_configured(&self) -> Result<()> {
        if self.media.is_configured() {
            Ok(())
        } else {
            Err(AppError::ServiceMisconfigured)
        }
    }

    /// Forward the file to the media service and record the result.
    ///
    /// Checks run in order: media service configured, file present, file under
    /// the size ceiling, `title` and `originalSize` present. Nothing is retried;
    /// a failed upload leaves no record.
    pub async fn upload(&self, user: &AuthenticatedUser, form: VideoUploadForm) -> Result<VideoDto> {
        self.ensure_configured()?;
        debug!(stage = %UploadStage::ConfigChecked, user = %user.sub, "Upload request accepted");

        let file = form
            .file
            .ok_or_else(|| AppError::BadRequest(MSG_FILE_NOT_FOUND.to_string()))?;

        if exceeds_max_video_size(file.data.len() as u64) {
            return Err(AppError::PayloadTooLarge);
        }

        // Both columns are NOT NULL; refuse before anything reaches the media service
        let title = form.title.ok_or_else(|| missing_field("title"))?;
        let original_size = form
            .original_size
            .ok_or_else(|| missing_field("originalSize"))?;

        debug!(
            stage = %UploadStage::Uploading,
            "Sending '{}' ({} bytes, {}) to media service",
            file.file_name,
            file.data.len(),
            file.content_type.as_deref().unwrap_or("unknown type")
        );

        let uploaded = self
            .media
            .upload_video(file.data, &file.file_name)
            .await
            .map_err(|e| AppError::UploadFailed(format!("stage={}: {}", UploadStage::Uploading, e)))?;

        let new_video = NewVideo {
            title,
            description: form.description,
            public_id: uploaded.public_id,
            original_size,
            compressed_size: uploaded.bytes.to_string(),
            duration: uploaded.duration.unwrap_or(0.0),
        };

        let video = self.repository.insert(new_video).await.map_err(|e| {
            AppError::UploadFailed(format!("stage={}: {}", UploadStage::Persisting, e))
        })?;

        info!(
            stage = %UploadStage::Completed,
            "Video stored: id={}, public_id={}, original_size={}, compressed_size={}, duration={}",
            video.id, video.public_id, video.original_size, video.compressed_size, video.duration
        );

        Ok(video.into())
    }

    pub async fn list(&self, query: &PaginationQuery) -> Result<(Vec<VideoDto>, i64)> {
        let (videos, total) = self.repository.list(query.limit(), query.offset()).await?;
        Ok((videos.into_iter().map(VideoDto::from).collect(), total))
    }

    pub async fn get(&self, id: Uuid) -> Result<VideoDto> {
        self.repository
            .find_by_id(id)
            .await?
            .map(VideoDto::from)
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))
    }
}

fn missing_field(name: &str) -> AppError {
    AppError::UploadFailed(format!("stage={}: missing field {}", UploadStage::Received, name))
}
