pub mod github;
pub mod youtube;

use crate::{
    error::Result,
    models::{RepoReference, RepoSnapshot, VideoMetadata},
};
use async_trait::async_trait;

pub use github::GithubClient;
pub use youtube::OembedClient;

/// Looks up public metadata for a video. Failures are never fatal to a generation.
#[async_trait]
pub trait VideoMetadataResolver: Send + Sync {
    async fn resolve(&self, video_id: &str) -> Result<VideoMetadata>;
}

/// Provides the file tree of a code repository.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    async fn fetch_snapshot(&self, reference: &RepoReference) -> Result<RepoSnapshot>;
}
