use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::features::auth::model::AuthenticatedUser;
use crate::features::videos::models::{NewVideo, Video};
use crate::features::videos::VideoRepository;
use crate::modules::media::{MediaError, MediaUploadResult, MediaUploader};

pub fn test_user() -> AuthenticatedUser {
    AuthenticatedUser::new("test-sub")
}

async fn inject_test_user_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(test_user());
    next.run(request).await
}

/// Stand-in for the JWT middleware: every request is authenticated as `test_user()`
pub fn with_test_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_test_user_middleware))
}

enum MediaBehaviour {
    /// Fresh public id per call
    Unique,
    Fixed(MediaUploadResult),
    Fail,
    Unconfigured,
}

/// Media service double that counts calls
pub struct FakeMediaUploader {
    behaviour: MediaBehaviour,
    calls: AtomicUsize,
    uploaded_bytes: Mutex<Vec<usize>>,
}

impl Default for FakeMediaUploader {
    fn default() -> Self {
        Self::with(MediaBehaviour::Unique)
    }
}

impl FakeMediaUploader {
    fn with(behaviour: MediaBehaviour) -> Self {
        Self {
            behaviour,
            calls: AtomicUsize::new(0),
            uploaded_bytes: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding(result: MediaUploadResult) -> Self {
        Self::with(MediaBehaviour::Fixed(result))
    }

    pub fn failing() -> Self {
        Self::with(MediaBehaviour::Fail)
    }

    pub fn unconfigured() -> Self {
        Self::with(MediaBehaviour::Unconfigured)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Byte length of each uploaded file, in call order
    pub fn uploaded_sizes(&self) -> Vec<usize> {
        self.uploaded_bytes.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaUploader for FakeMediaUploader {
    fn is_configured(&self) -> bool {
        !matches!(self.behaviour, MediaBehaviour::Unconfigured)
    }

    async fn upload_video(
        &self,
        data: Vec<u8>,
        _file_name: &str,
    ) -> Result<MediaUploadResult, MediaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.uploaded_bytes.lock().unwrap().push(data.len());

        match &self.behaviour {
            MediaBehaviour::Unique => Ok(MediaUploadResult {
                public_id: format!("video-uploads/{}", Uuid::new_v4().simple()),
                bytes: data.len() as i64 / 2,
                duration: Some(1.5),
            }),
            MediaBehaviour::Fixed(result) => Ok(result.clone()),
            MediaBehaviour::Fail => Err(MediaError::Rejected {
                status: 400,
                message: "Invalid Signature".to_string(),
            }),
            MediaBehaviour::Unconfigured => Err(MediaError::NotConfigured),
        }
    }
}

/// Repository double keeping rows in memory
#[derive(Default)]
pub struct InMemoryVideoRepository {
    rows: Mutex<Vec<Video>>,
    inserted: Mutex<Vec<NewVideo>>,
    fail: bool,
}

impl InMemoryVideoRepository {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Values passed to `insert`, in call order
    pub fn inserted(&self) -> Vec<NewVideo> {
        self.inserted.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn insert(&self, video: NewVideo) -> Result<Video, sqlx::Error> {
        if self.fail {
            return Err(sqlx::Error::PoolTimedOut);
        }
        self.inserted.lock().unwrap().push(video.clone());

        let now = Utc::now();
        let row = Video {
            id: Uuid::new_v4(),
            title: video.title,
            description: video.description,
            public_id: video.public_id,
            original_size: video.original_size,
            compressed_size: video.compressed_size,
            duration: video.duration,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<Video>, i64), sqlx::Error> {
        let rows = self.rows.lock().unwrap();
        let total = rows.len() as i64;
        let page = rows
            .iter()
            .rev()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, sqlx::Error> {
        Ok(self.rows.lock().unwrap().iter().find(|v| v.id == id).cloned())
    }
}
