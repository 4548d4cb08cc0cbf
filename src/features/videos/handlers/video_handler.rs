use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, ErrorResponse};
use crate::core::extractor::AppQuery;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::videos::dtos::{UploadVideoDto, VideoDto};
use crate::features::videos::services::{UploadStage, UploadedFile, VideoService, VideoUploadForm};
use crate::shared::types::{ApiResponse, PaginationQuery};

/// Upload a video
///
/// Accepts multipart/form-data with:
/// - `file`: The video to upload (required)
/// - `title`: Title of the video
/// - `description`: Optional description
/// - `originalSize`: File size in bytes measured by the client
///
/// The file is forwarded to Cloudinary and the resulting metadata is stored.
#[utoipa::path(
    post,
    path = "/api/video-upload",
    tag = "videos",
    request_body(
        content = UploadVideoDto,
        content_type = "multipart/form-data",
        description = "Video file plus title, description and client-measured originalSize",
    ),
    responses(
        (status = 200, description = "Video uploaded and stored", body = VideoDto),
        (status = 400, description = "File not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Cloudinary not configured, or upload video failed", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_video(
    user: AuthenticatedUser,
    State(service): State<Arc<VideoService>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VideoDto>, AppError> {
    debug!(stage = %UploadStage::Received, "Video upload request");
    debug!(stage = %UploadStage::Authorizing, user = %user.sub, "Caller authenticated");

    // Refuse before draining a large body when the media service cannot take it
    service.ensure_configured()?;

    let multipart = multipart
        .map_err(|e| AppError::UploadFailed(format!("unreadable multipart request: {}", e)))?;
    let form = read_upload_form(multipart).await?;

    let video = service.upload(&user, form).await?;

    Ok(Json(video))
}

/// Collect the multipart fields; unknown fields are skipped
async fn read_upload_form(mut multipart: Multipart) -> Result<VideoUploadForm, AppError> {
    let mut form = VideoUploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                // A plain text part under `file` is not an uploaded file
                let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
                    debug!("Ignoring 'file' part without a filename");
                    continue;
                };
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await.map_err(multipart_error)?;

                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    data: Vec::from(data),
                });
            }
            "title" => form.title = Some(field.text().await.map_err(multipart_error)?),
            "description" => form.description = Some(field.text().await.map_err(multipart_error)?),
            "originalSize" => {
                form.original_size = Some(field.text().await.map_err(multipart_error)?)
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    Ok(form)
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::UploadFailed(format!("failed to read multipart data: {}", e.body_text()))
    }
}

/// List uploaded videos, newest first
#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of videos", body = ApiResponse<Vec<VideoDto>>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_videos(
    _user: AuthenticatedUser,
    State(service): State<Arc<VideoService>>,
    AppQuery(query): AppQuery<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<VideoDto>>>, AppError> {
    let (videos, total) = service.list(&query).await?;

    Ok(Json(ApiResponse::success(
        Some(videos),
        None,
        Some(query.meta(total)),
    )))
}

/// Get a single video by id
#[utoipa::path(
    get,
    path = "/api/videos/{id}",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video id")
    ),
    responses(
        (status = 200, description = "Video found", body = ApiResponse<VideoDto>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_video(
    _user: AuthenticatedUser,
    State(service): State<Arc<VideoService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<VideoDto>>, AppError> {
    let video = service.get(id).await?;

    Ok(Json(ApiResponse::success(Some(video), None, None)))
}
