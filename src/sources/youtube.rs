use crate::{
    config::OembedConfig,
    error::{InfogenError, Result},
    models::VideoMetadata,
    sources::VideoMetadataResolver,
};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;

static VIDEO_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?|shorts)/|.*[?&]v=)|youtu\.be/)([a-zA-Z0-9_-]{11})",
    )
    .expect("video url pattern is valid")
});

static BARE_VIDEO_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("video id pattern is valid"));

/// Pulls the 11-character video id out of a watch, short, embed or share link,
/// or accepts a bare id.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Some(id) = VIDEO_URL_PATTERN
        .captures(input)
        .and_then(|caps| caps.get(1))
    {
        return Some(id.as_str().to_string());
    }

    if BARE_VIDEO_ID.is_match(input) {
        return Some(input.to_string());
    }

    None
}

pub fn canonical_video_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

#[derive(Clone)]
pub struct OembedClient {
    client: Client,
    endpoint: String,
}

impl OembedClient {
    pub fn new(config: OembedConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint,
        }
    }
}

#[async_trait]
impl VideoMetadataResolver for OembedClient {
    async fn resolve(&self, video_id: &str) -> Result<VideoMetadata> {
        let video_url = canonical_video_url(video_id);
        log::debug!("Resolving oEmbed metadata for {}", video_url);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", video_url.as_str()), ("format", "json")])
            .send()
            .await
            .map_err(|e| InfogenError::Request(format!("oEmbed request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InfogenError::Api {
                status: status.as_u16(),
                message: format!("oEmbed lookup for {} failed", video_id),
            });
        }

        let metadata: VideoMetadata = response
            .json()
            .await
            .map_err(|e| InfogenError::Response(format!("invalid oEmbed body: {}", e)))?;

        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_common_shapes() {
        let id = "dQw4w9WgXcQ";
        for input in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "dQw4w9WgXcQ",
            "  https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s ",
            "https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://youtube.com/shorts/dQw4w9WgXcQ?si=abc",
            "https://youtu.be/dQw4w9WgXcQ?si=tracking",
        ] {
            assert_eq!(extract_video_id(input).as_deref(), Some(id), "input: {}", input);
        }
    }

    #[test]
    fn test_extract_rejects_invalid() {
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("short"), None);
        assert_eq!(extract_video_id("https://example.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(extract_video_id("dQw4w9WgXcQ-too-long"), None);
    }

    #[test]
    fn test_canonical_url() {
        assert_eq!(
            canonical_video_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }
}
