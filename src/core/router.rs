use axum::{middleware::from_fn, routing::get, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::{AppConfig, SwaggerConfig};
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::auth::JwtValidator;
use crate::features::videos::{routes as videos_routes, VideoService};

/// Simple health check endpoint (no auth required)
async fn health_check() -> axum::http::StatusCode {
    axum::http::StatusCode::OK
}

fn swagger_router(config: &SwaggerConfig) -> Router {
    let swagger_modifier = SwaggerInfoModifier {
        title: config.title.clone(),
        version: config.version.clone(),
        description: config.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger =
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi));

    if let Some(credentials) = config.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        swagger.layer(from_fn(middleware::basic_auth_middleware(Arc::new(
            credentials,
        ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        swagger
    }
}

/// Assemble the application: protected video routes, health check, Swagger UI
/// and the request-id/trace/CORS stack around all of them.
pub fn build_router(
    app: &AppConfig,
    swagger: &SwaggerConfig,
    jwt_validator: Arc<JwtValidator>,
    video_service: Arc<VideoService>,
) -> Router {
    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(videos_routes(video_service))
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_validator,
            middleware::auth_middleware,
        ));

    let health_route = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(swagger_router(swagger))
        .merge(protected_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(app.cors_allowed_origins.clone()))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::JwksClient;
    use crate::shared::test_helpers::{FakeMediaUploader, InMemoryVideoRepository};
    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use std::time::Duration;

    fn app_config() -> AppConfig {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }

    fn swagger_config(username: Option<&str>, password: Option<&str>) -> SwaggerConfig {
        SwaggerConfig {
            username: username.map(String::from),
            password: password.map(String::from),
            title: "Video Upload API".to_string(),
            version: "0.1.0".to_string(),
            description: "test".to_string(),
        }
    }

    fn validator() -> Arc<JwtValidator> {
        // Nothing listens on port 9; no request below gets as far as a key lookup
        let jwks = Arc::new(JwksClient::new("http://127.0.0.1:9/jwks", Duration::from_secs(60)));
        Arc::new(JwtValidator::new(
            jwks,
            "http://127.0.0.1:9".to_string(),
            "video-api".to_string(),
            Duration::from_secs(0),
        ))
    }

    struct App {
        server: TestServer,
        media: Arc<FakeMediaUploader>,
        repo: Arc<InMemoryVideoRepository>,
    }

    fn app(media: FakeMediaUploader, swagger: SwaggerConfig) -> App {
        let media = Arc::new(media);
        let repo = Arc::new(InMemoryVideoRepository::default());
        let service = Arc::new(VideoService::new(media.clone(), repo.clone()));
        let router = build_router(&app_config(), &swagger, validator(), service);

        App {
            server: TestServer::new(router).unwrap(),
            media,
            repo,
        }
    }

    fn upload_form() -> MultipartForm {
        MultipartForm::new()
            .add_text("title", "T")
            .add_text("originalSize", "4")
            .add_part(
                "file",
                Part::bytes(vec![1u8, 2, 3, 4])
                    .file_name("clip.mp4")
                    .mime_type("video/mp4"),
            )
    }

    #[tokio::test]
    async fn test_unauthenticated_upload_is_rejected_before_config_check() {
        let app = app(FakeMediaUploader::unconfigured(), swagger_config(None, None));

        let response = app
            .server
            .post("/api/video-upload")
            .multipart(upload_form())
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&serde_json::json!({ "error": "Unauthorized" }));
        assert_eq!(app.media.calls(), 0);
        assert!(app.repo.inserted().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_bearer_token_never_reaches_media_service() {
        let app = app(FakeMediaUploader::default(), swagger_config(None, None));

        let response = app
            .server
            .post("/api/video-upload")
            .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"))
            .multipart(upload_form())
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(app.media.calls(), 0);
    }

    #[tokio::test]
    async fn test_video_listing_requires_authentication() {
        let app = app(FakeMediaUploader::default(), swagger_config(None, None));

        app.server
            .get("/api/videos")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_health_is_public_and_carries_request_id() {
        let app = app(FakeMediaUploader::default(), swagger_config(None, None));

        let response = app.server.get("/health").await;

        response.assert_status_ok();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let app = app(FakeMediaUploader::default(), swagger_config(None, None));

        let response = app.server.get("/api-docs/openapi.json").await;

        response.assert_status_ok();
        let doc: serde_json::Value = response.json();
        assert_eq!(doc["info"]["title"], "Video Upload API");
        assert!(doc["paths"]["/api/video-upload"].is_object());
    }

    #[tokio::test]
    async fn test_swagger_basic_auth_when_credentials_configured() {
        let app = app(
            FakeMediaUploader::default(),
            swagger_config(Some("docs"), Some("secret")),
        );

        app.server
            .get("/api-docs/openapi.json")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        // base64("docs:secret")
        app.server
            .get("/api-docs/openapi.json")
            .add_header(
                header::AUTHORIZATION,
                HeaderValue::from_static("Basic ZG9jczpzZWNyZXQ="),
            )
            .await
            .assert_status_ok();
    }
}
