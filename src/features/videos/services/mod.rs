mod video_repository;
mod video_service;

pub use video_repository::{PgVideoRepository, VideoRepository};
pub use video_service::{UploadStage, UploadedFile, VideoService, VideoUploadForm};
