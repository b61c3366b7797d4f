use crate::error::{InfogenError, Result};
use crate::models::{GeneratedImage, PresentationOptions};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoReference {
    pub owner: String,
    pub repo: String,
}

impl RepoReference {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Accepts `owner/repo` or a `https://github.com/owner/repo[/...]` URL.
    pub fn parse(input: &str) -> Result<Self> {
        crate::sources::github::parse_repo_reference(input).ok_or_else(|| {
            InfogenError::InvalidInput(format!(
                "'{}' is not a repository reference; use \"owner/repo\"",
                input.trim()
            ))
        })
    }
}

impl fmt::Display for RepoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFile {
    pub path: String,
}

/// A repository's file tree as fetched at analysis time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoSnapshot {
    pub reference: RepoReference,
    pub files: Vec<RepoFile>,
}

impl RepoSnapshot {
    pub fn new(reference: RepoReference, files: Vec<RepoFile>) -> Self {
        Self { reference, files }
    }

    /// First `limit` paths joined by `separator`.
    pub fn paths(&self, limit: usize, separator: &str) -> String {
        self.files
            .iter()
            .take(limit)
            .map(|f| f.path.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRequest {
    pub reference: RepoReference,
    pub options: PresentationOptions,
}

impl RepositoryRequest {
    pub fn new(reference: RepoReference, options: PresentationOptions) -> Self {
        Self { reference, options }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoAnalysis {
    pub snapshot: RepoSnapshot,
    pub technical_diagram: GeneratedImage,
    /// Product-feature poster; absent when that call failed.
    pub feature_diagram: Option<GeneratedImage>,
    pub feature_summary: String,
}
