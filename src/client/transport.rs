use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::upload_form::SelectedFile;
use crate::core::error::{ErrorResponse, MSG_NOT_CONFIGURED};
use crate::features::videos::dtos::{VideoDto, UPLOAD_PATH};

/// Fields sent to the gateway for one submission
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub file: SelectedFile,
    pub title: String,
    pub description: String,
    /// Byte length of `file`, decimal string
    pub original_size: String,
}

/// Failure classes the gateway reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    Unauthorized,
    ServiceMisconfigured,
    BadRequest,
    PayloadTooLarge,
    UploadFailed,
}

impl GatewayErrorKind {
    /// Classify a non-success response from its status and `error` message
    pub fn classify(status: StatusCode, message: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::BAD_REQUEST => Self::BadRequest,
            StatusCode::PAYLOAD_TOO_LARGE => Self::PayloadTooLarge,
            StatusCode::INTERNAL_SERVER_ERROR if message == MSG_NOT_CONFIGURED => {
                Self::ServiceMisconfigured
            }
            _ => Self::UploadFailed,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("gateway answered {status}: {message}")]
    Gateway {
        kind: GatewayErrorKind,
        status: StatusCode,
        message: String,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected gateway response: {0}")]
    InvalidResponse(String),

    /// The payload could not be encoded; nothing was sent
    #[error("invalid upload payload: {0}")]
    InvalidPayload(String),
}

/// Sends one upload to the gateway; implementations must not retry
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn send(&self, payload: UploadPayload) -> Result<VideoDto, TransportError>;
}

/// `multipart/form-data` transport over reqwest
pub struct HttpUploadTransport {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpUploadTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("video-upload-core/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token: None,
        })
    }

    /// Access token sent as `Authorization: Bearer <token>`
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn upload_url(&self) -> String {
        format!("{}{}", self.base_url, UPLOAD_PATH)
    }
}

#[async_trait]
impl UploadTransport for HttpUploadTransport {
    async fn send(&self, payload: UploadPayload) -> Result<VideoDto, TransportError> {
        let mut file_part = Part::bytes(payload.file.bytes).file_name(payload.file.name);
        if let Some(content_type) = payload.file.content_type.as_deref() {
            file_part = file_part.mime_str(content_type).map_err(|_| {
                TransportError::InvalidPayload(format!("invalid content type '{}'", content_type))
            })?;
        }

        let form = Form::new()
            .part("file", file_part)
            .text("title", payload.title)
            .text("description", payload.description)
            .text("originalSize", payload.original_size);

        let mut request = self.client.post(self.upload_url()).multipart(form);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return response
                .json::<VideoDto>()
                .await
                .map_err(|e| TransportError::InvalidResponse(e.to_string()));
        }

        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("Unknown error").to_string(),
        };

        Err(TransportError::Gateway {
            kind: GatewayErrorKind::classify(status, &message),
            status,
            message,
        })
    }
}
