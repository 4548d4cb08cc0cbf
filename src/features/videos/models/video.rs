use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for an uploaded video
#[derive(Debug, Clone, FromRow)]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub public_id: String,
    /// Byte length measured by the client before transfer
    pub original_size: String,
    /// Byte length reported by the media service after transformation
    pub compressed_size: String,
    pub duration: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a single insert; id and timestamps come from the database
#[derive(Debug, Clone, PartialEq)]
pub struct NewVideo {
    pub title: String,
    pub description: Option<String>,
    pub public_id: String,
    pub original_size: String,
    pub compressed_size: String,
    pub duration: f64,
}
