use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use validator::{Validate, ValidationErrors};

use super::transport::{GatewayErrorKind, TransportError, UploadPayload, UploadTransport};
use crate::features::videos::dtos::{exceeds_max_video_size, VideoDto, MAX_VIDEO_SIZE};

const LABEL_IDLE: &str = "Upload Video";
const LABEL_BUSY: &str = "Uploading...";

/// File picked by the user, read into memory
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    /// MIME hint from the picker, e.g. `video/mp4`
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("no file selected")]
    NoFileSelected,

    #[error("invalid form: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error("file is {size} bytes, limit is {limit} bytes")]
    FileTooLarge { size: u64, limit: usize },

    #[error("an upload is already in progress")]
    AlreadyUploading,

    #[error("selected file cannot be sent: {0}")]
    UnreadableFile(String),

    #[error("gateway rejected the upload: {0:?}")]
    Gateway(GatewayErrorKind),

    #[error(transparent)]
    Transport(TransportError),
}

impl From<TransportError> for FormError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Gateway { kind, .. } => FormError::Gateway(kind),
            TransportError::InvalidPayload(reason) => FormError::UnreadableFile(reason),
            other => FormError::Transport(other),
        }
    }
}

impl FormError {
    /// Text to show the user
    pub fn user_message(&self) -> &'static str {
        match self {
            FormError::NoFileSelected => "Please choose a video file.",
            FormError::Invalid(_) => "Please enter a title for the video.",
            FormError::FileTooLarge { .. } => "File size exceeds the maximum limit of 70 MB.",
            FormError::AlreadyUploading => "An upload is already in progress.",
            FormError::UnreadableFile(_) => "The selected file could not be sent as a video.",
            FormError::Gateway(kind) => match kind {
                GatewayErrorKind::Unauthorized => "Please sign in to upload videos.",
                GatewayErrorKind::ServiceMisconfigured => {
                    "Video uploads are not available right now."
                }
                GatewayErrorKind::BadRequest => "The server did not receive the video file.",
                GatewayErrorKind::PayloadTooLarge => "The server refused the file as too large.",
                GatewayErrorKind::UploadFailed => "Upload video failed. Please try again.",
            },
            FormError::Transport(_) => "Could not reach the server. Check your connection.",
        }
    }
}

/// State of the upload form.
///
/// Clones share the busy flag, so a view holding a clone sees the same
/// "Uploading..." state as the one submitting.
#[derive(Debug, Clone, Default, Validate)]
pub struct UploadForm {
    pub file: Option<SelectedFile>,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: String,
    busy: Arc<AtomicBool>,
}

/// Clears the busy flag when the submission ends, however it ends
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl UploadForm {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_file(mut self, file: SelectedFile) -> Self {
        self.file = Some(file);
        self
    }

    pub fn is_uploading(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Label of the submit control; the control is disabled while uploading
    pub fn submit_label(&self) -> &'static str {
        if self.is_uploading() {
            LABEL_BUSY
        } else {
            LABEL_IDLE
        }
    }

    /// Validate locally, then send exactly one request through `transport`.
    ///
    /// Files at or above 70 MiB never leave the client. The returned record is
    /// what the gateway persisted.
    pub async fn submit(&self, transport: &dyn UploadTransport) -> Result<VideoDto, FormError> {
        let file = self.file.as_ref().ok_or(FormError::NoFileSelected)?;
        self.validate()?;

        let size = file.size();
        if exceeds_max_video_size(size) {
            warn!("Refusing '{}': {} bytes is over the upload limit", file.name, size);
            return Err(FormError::FileTooLarge {
                size,
                limit: MAX_VIDEO_SIZE,
            });
        }

        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(FormError::AlreadyUploading);
        }
        let _busy = BusyGuard(&self.busy);

        let payload = UploadPayload {
            file: file.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            original_size: size.to_string(),
        };

        match transport.send(payload).await {
            Ok(video) => {
                info!("Video uploaded: id={}, public_id={}", video.id, video.public_id);
                Ok(video)
            }
            Err(e) => {
                warn!("Video upload failed: {}", e);
                Err(e.into())
            }
        }
    }
}
