use crate::models::{Citation, GeneratedImage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub id: Uuid,
    pub image: GeneratedImage,
    /// The analysis brief the image was designed from.
    pub brief: String,
    pub citations: Vec<Citation>,
    pub video_title: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Title, author and description resolved for a video, used only to enrich prompts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}
