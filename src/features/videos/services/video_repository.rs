use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::videos::models::{NewVideo, Video};

/// Persistence seam for video records
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Insert one record and return it with the generated id and timestamps
    async fn insert(&self, video: NewVideo) -> Result<Video, sqlx::Error>;

    /// Page of records, newest first, plus the total count
    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<Video>, i64), sqlx::Error>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, sqlx::Error>;
}

/// PostgreSQL implementation over the shared pool
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    async fn insert(&self, video: NewVideo) -> Result<Video, sqlx::Error> {
        // The connection goes back to the pool when `conn` drops, on success and on error
        let mut conn = self.pool.acquire().await?;

        sqlx::query_as::<_, Video>(
            r#"
            INSERT INTO videos (title, description, public_id, original_size, compressed_size, duration)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(video.title)
        .bind(video.description)
        .bind(video.public_id)
        .bind(video.original_size)
        .bind(video.compressed_size)
        .bind(video.duration)
        .fetch_one(&mut *conn)
        .await
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<Video>, i64), sqlx::Error> {
        let videos = sqlx::query_as::<_, Video>(
            r#"
            SELECT * FROM videos
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos")
            .fetch_one(&self.pool)
            .await?;

        Ok((videos, total))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, sqlx::Error> {
        sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
