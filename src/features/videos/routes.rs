use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::videos::dtos::{MAX_VIDEO_SIZE, MULTIPART_OVERHEAD, UPLOAD_PATH};
use crate::features::videos::handlers::{get_video, list_videos, upload_video};
use crate::features::videos::services::VideoService;

/// Create routes for the videos feature (all require an authenticated caller)
pub fn routes(video_service: Arc<VideoService>) -> Router {
    Router::new()
        .route(
            UPLOAD_PATH,
            post(upload_video).layer(DefaultBodyLimit::max(MAX_VIDEO_SIZE + MULTIPART_OVERHEAD)),
        )
        .route("/api/videos", get(list_videos))
        .route("/api/videos/{id}", get(get_video))
        .with_state(video_service)
}
