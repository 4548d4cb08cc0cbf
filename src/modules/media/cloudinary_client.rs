//! Cloudinary upload client
//!
//! Sends videos to the signed upload API
//! (`{upload_prefix}/v1_1/{cloud_name}/video/upload`) and maps the loosely
//! structured JSON answer to a `MediaUploadResult`.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::core::config::{CloudinaryConfig, CloudinaryCredentials};
use crate::modules::media::{MediaError, MediaUploadResult, MediaUploader};

/// Incoming transformation: automatic quality, mp4 container
pub const VIDEO_TRANSFORMATION: &str = "q_auto/f_mp4";

/// Fields of the upload answer the gateway relies on; everything else is ignored
#[derive(Debug, Clone, Deserialize)]
pub struct CloudinaryUploadResponse {
    pub public_id: String,
    pub bytes: i64,
    #[serde(default)]
    pub duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
    error: CloudinaryErrorMessage,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorMessage {
    message: String,
}

impl From<CloudinaryUploadResponse> for MediaUploadResult {
    fn from(response: CloudinaryUploadResponse) -> Self {
        Self {
            public_id: response.public_id,
            bytes: response.bytes,
            // Negative or NaN durations are treated as missing
            duration: response.duration.filter(|d| d.is_finite() && *d >= 0.0),
        }
    }
}

/// Cloudinary client shared by all in-flight requests
pub struct CloudinaryClient {
    credentials: Option<CloudinaryCredentials>,
    upload_prefix: String,
    folder: String,
    http_client: Client,
}

impl CloudinaryClient {
    /// Build the client from configuration.
    ///
    /// Missing credentials are not an error here; `is_configured` reports them
    /// and every upload attempt fails with `MediaError::NotConfigured`.
    pub fn new(config: CloudinaryConfig) -> Result<Self, MediaError> {
        let http_client = Client::builder()
            .user_agent(concat!("video-upload-core/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let credentials = config.credentials();
        if let Some(ref creds) = credentials {
            info!(
                "Cloudinary client initialized for cloud: {}, folder: {}, endpoint: {}",
                creds.cloud_name, config.folder, config.upload_prefix
            );
        }

        Ok(Self {
            credentials,
            upload_prefix: config.upload_prefix,
            folder: config.folder,
            http_client,
        })
    }

    fn upload_url(&self, cloud_name: &str) -> String {
        format!("{}/v1_1/{}/video/upload", self.upload_prefix, cloud_name)
    }

    /// Parameters that take part in the signature, sorted by name
    fn signed_params(&self, timestamp: i64) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        params.insert("folder", self.folder.clone());
        params.insert("timestamp", timestamp.to_string());
        params.insert("transformation", VIDEO_TRANSFORMATION.to_string());
        params
    }

    /// SHA-1 hex digest of `k1=v1&k2=v2...` (keys sorted) followed by the API secret
    pub fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
        let to_sign = params
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha1::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl MediaUploader for CloudinaryClient {
    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn upload_video(
        &self,
        data: Vec<u8>,
        file_name: &str,
    ) -> Result<MediaUploadResult, MediaError> {
        let creds = self.credentials.as_ref().ok_or(MediaError::NotConfigured)?;

        let params = self.signed_params(Utc::now().timestamp());
        let signature = Self::sign(&params, &creds.api_secret);
        let size = data.len();

        let mut form = Form::new()
            .text("api_key", creds.api_key.clone())
            .text("signature", signature)
            .part("file", Part::bytes(data).file_name(file_name.to_string()));
        for (key, value) in params {
            form = form.text(key, value);
        }

        debug!(
            "Uploading {} bytes to Cloudinary folder '{}' as '{}'",
            size, self.folder, file_name
        );

        let response = self
            .http_client
            .post(self.upload_url(&creds.cloud_name))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<CloudinaryErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: CloudinaryUploadResponse = serde_json::from_str(&body)
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

        debug!(
            "Cloudinary accepted upload: public_id={}, bytes={}, duration={:?}",
            parsed.public_id, parsed.bytes, parsed.duration
        );

        Ok(parsed.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Multipart, Path, State},
        http::StatusCode,
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<(String, HashMap<String, String>, usize)>>>;

    #[derive(Clone)]
    struct FakeCloudinary {
        captured: Captured,
        status: StatusCode,
        reply: Value,
    }

    async fn fake_upload(
        State(fake): State<FakeCloudinary>,
        Path(cloud_name): Path<String>,
        mut multipart: Multipart,
    ) -> (StatusCode, Json<Value>) {
        let mut fields = HashMap::new();
        let mut file_len = 0;
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                file_len = field.bytes().await.unwrap().len();
            } else {
                fields.insert(name, field.text().await.unwrap());
            }
        }
        fake.captured
            .lock()
            .unwrap()
            .push((cloud_name, fields, file_len));
        (fake.status, Json(fake.reply.clone()))
    }

    async fn spawn_fake(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/v1_1/{cloud_name}/video/upload", post(fake_upload))
            .with_state(FakeCloudinary {
                captured: captured.clone(),
                status,
                reply,
            });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), captured)
    }

    fn config(upload_prefix: &str) -> CloudinaryConfig {
        CloudinaryConfig {
            cloud_name: Some("demo-cloud".to_string()),
            api_key: Some("123456".to_string()),
            api_secret: Some("secret".to_string()),
            upload_prefix: upload_prefix.to_string(),
            folder: "video-uploads".to_string(),
        }
    }

    #[test]
    fn test_sign_matches_documented_example() {
        let mut params = BTreeMap::new();
        params.insert("timestamp", "1315060510".to_string());
        params.insert("public_id", "sample_image".to_string());

        assert_eq!(
            CloudinaryClient::sign(&params, "abcd"),
            "b4ad47fb4e25c7bf5f92a20089f9db59bc302313"
        );
    }

    #[test]
    fn test_sign_covers_folder_and_transformation() {
        let mut params = BTreeMap::new();
        params.insert("transformation", VIDEO_TRANSFORMATION.to_string());
        params.insert("folder", "video-uploads".to_string());
        params.insert("timestamp", "1700000000".to_string());

        assert_eq!(
            CloudinaryClient::sign(&params, "secret"),
            "53ed40bfa8bc2d721ff6899e4510bf6bbcf41004"
        );
    }

    #[test]
    fn test_negative_duration_is_treated_as_missing() {
        let result: MediaUploadResult = CloudinaryUploadResponse {
            public_id: "abc".to_string(),
            bytes: 10,
            duration: Some(-1.0),
        }
        .into();

        assert_eq!(result.duration, None);
    }

    #[test]
    fn test_response_ignores_unrelated_fields() {
        let parsed: CloudinaryUploadResponse = serde_json::from_value(json!({
            "public_id": "video-uploads/abc123",
            "bytes": 5000000,
            "format": "mp4",
            "secure_url": "https://res.cloudinary.com/demo/video/upload/abc123.mp4",
            "eager": []
        }))
        .unwrap();

        assert_eq!(parsed.public_id, "video-uploads/abc123");
        assert_eq!(parsed.bytes, 5_000_000);
        assert_eq!(parsed.duration, None);
    }

    #[tokio::test]
    async fn test_unconfigured_client_never_calls_out() {
        let client = CloudinaryClient::new(CloudinaryConfig {
            upload_prefix: "http://127.0.0.1:9".to_string(),
            folder: "video-uploads".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert!(!client.is_configured());
        let result = client.upload_video(vec![1, 2, 3], "clip.mp4").await;
        assert!(matches!(result, Err(MediaError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_upload_sends_signed_video_request() {
        let (prefix, captured) = spawn_fake(
            StatusCode::OK,
            json!({ "public_id": "abc123", "bytes": 5000000, "duration": 12.4, "format": "mp4" }),
        )
        .await;
        let client = CloudinaryClient::new(config(&prefix)).unwrap();

        let result = client
            .upload_video(vec![7u8; 2048], "clip.mov")
            .await
            .unwrap();

        assert_eq!(
            result,
            MediaUploadResult {
                public_id: "abc123".to_string(),
                bytes: 5_000_000,
                duration: Some(12.4),
            }
        );

        let calls = captured.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (cloud_name, fields, file_len) = &calls[0];
        assert_eq!(cloud_name, "demo-cloud");
        assert_eq!(*file_len, 2048);
        assert_eq!(fields["api_key"], "123456");
        assert_eq!(fields["folder"], "video-uploads");
        assert_eq!(fields["transformation"], "q_auto/f_mp4");

        let mut expected = BTreeMap::new();
        expected.insert("folder", fields["folder"].clone());
        expected.insert("timestamp", fields["timestamp"].clone());
        expected.insert("transformation", fields["transformation"].clone());
        assert_eq!(
            fields["signature"],
            CloudinaryClient::sign(&expected, "secret")
        );
    }

    #[tokio::test]
    async fn test_upload_without_duration_reports_none() {
        let (prefix, _) =
            spawn_fake(StatusCode::OK, json!({ "public_id": "still", "bytes": 42 })).await;
        let client = CloudinaryClient::new(config(&prefix)).unwrap();

        let result = client.upload_video(vec![0u8; 16], "clip.mp4").await.unwrap();

        assert_eq!(result.duration, None);
    }

    #[tokio::test]
    async fn test_rejection_carries_cloudinary_message() {
        let (prefix, _) = spawn_fake(
            StatusCode::UNAUTHORIZED,
            json!({ "error": { "message": "Invalid Signature" } }),
        )
        .await;
        let client = CloudinaryClient::new(config(&prefix)).unwrap();

        let result = client.upload_video(vec![0u8; 16], "clip.mp4").await;

        match result {
            Err(MediaError::Rejected { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid Signature");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_invalid_response() {
        let (prefix, _) = spawn_fake(StatusCode::OK, json!({ "unexpected": true })).await;
        let client = CloudinaryClient::new(config(&prefix)).unwrap();

        let result = client.upload_video(vec![0u8; 16], "clip.mp4").await;

        assert!(matches!(result, Err(MediaError::InvalidResponse(_))));
    }
}
