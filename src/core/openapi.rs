use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::core::error::ErrorResponse;
use crate::features::videos::{dtos as videos_dtos, handlers as videos_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        videos_handlers::upload_video,
        videos_handlers::list_videos,
        videos_handlers::get_video,
    ),
    components(
        schemas(
            // Shared
            Meta,
            ErrorResponse,
            // Videos
            videos_dtos::UploadVideoDto,
            videos_dtos::VideoDto,
            ApiResponse<videos_dtos::VideoDto>,
            ApiResponse<Vec<videos_dtos::VideoDto>>,
        )
    ),
    tags(
        (name = "videos", description = "Video upload and uploaded video records"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Video Upload API",
        version = "0.1.0",
        description = "API documentation for the video upload service",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
