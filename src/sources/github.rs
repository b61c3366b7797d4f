use crate::{
    config::GithubConfig,
    error::{ContentFailure, InfogenError, Result},
    models::{RepoFile, RepoReference, RepoSnapshot},
    sources::RepositorySource,
};
use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;

const IGNORED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "target",
    "vendor",
    ".next",
    "__pycache__",
    "coverage",
];

const IGNORED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "ico", "webp", "mp4", "mp3", "wav", "woff", "woff2",
    "ttf", "eot", "pdf", "zip", "gz", "lock", "map",
];

const IGNORED_FILES: &[&str] = &["package-lock.json", "yarn.lock", "pnpm-lock.yaml", ".DS_Store"];

/// Parses `owner/repo` or a github.com URL. Returns `None` for anything else.
pub fn parse_repo_reference(input: &str) -> Option<RepoReference> {
    let clean = input.trim().trim_end_matches('/');
    if clean.is_empty() {
        return None;
    }

    if let Ok(url) = reqwest::Url::parse(clean) {
        let host = url.host_str()?;
        if host != "github.com" && host != "www.github.com" {
            return None;
        }
        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
        let owner = segments.next()?;
        let repo = segments.next()?;
        return Some(RepoReference::new(owner, strip_git_suffix(repo)));
    }

    let parts: Vec<&str> = clean.split('/').collect();
    match parts.as_slice() {
        [owner, repo] if !owner.is_empty() && !repo.is_empty() => {
            Some(RepoReference::new(*owner, strip_git_suffix(repo)))
        }
        _ => None,
    }
}

fn strip_git_suffix(repo: &str) -> &str {
    repo.strip_suffix(".git").unwrap_or(repo)
}

/// True for source-like files worth showing to the model.
pub fn is_relevant_path(path: &str) -> bool {
    let mut segments = path.split('/').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_some() && IGNORED_DIRS.contains(&segment) {
            return false;
        }
        if segments.peek().is_none() {
            if IGNORED_FILES.contains(&segment) {
                return false;
            }
            if let Some((_, ext)) = segment.rsplit_once('.') {
                if IGNORED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
                    return false;
                }
            }
        }
    }
    true
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    config: GithubConfig,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Appends `segments` to the API base, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| InfogenError::Config(format!("invalid GitHub API base: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| InfogenError::Config("GitHub API base cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, url: Url) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(header::USER_AGENT, concat!("infogen/", env!("CARGO_PKG_VERSION")))
            .header(header::ACCEPT, "application/vnd.github+json");

        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn default_branch(&self, reference: &RepoReference) -> Result<String> {
        let url = self.endpoint(&["repos", reference.owner.as_str(), reference.repo.as_str()])?;
        let response = self
            .get(url)
            .send()
            .await
            .map_err(|e| InfogenError::Request(format!("GitHub request failed: {}", e)))?;

        match response.status() {
            status if status.is_success() => {
                let info: RepoInfo = response
                    .json()
                    .await
                    .map_err(|e| InfogenError::Response(format!("invalid repository body: {}", e)))?;
                Ok(info.default_branch)
            }
            StatusCode::NOT_FOUND => Err(InfogenError::content(
                ContentFailure::NotFound,
                reference.to_string(),
            )),
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(InfogenError::Api {
                    status: status.as_u16(),
                    message: format!("GitHub: {}", message),
                })
            }
        }
    }
}

#[async_trait]
impl RepositorySource for GithubClient {
    async fn fetch_snapshot(&self, reference: &RepoReference) -> Result<RepoSnapshot> {
        let branch = self.default_branch(reference).await?;
        log::info!("📂 Fetching file tree of {} ({})", reference, branch);

        let url = self.endpoint(&[
            "repos",
            reference.owner.as_str(),
            reference.repo.as_str(),
            "git",
            "trees",
            branch.as_str(),
        ])?;
        let response = self
            .get(url)
            .query(&[("recursive", "1")])
            .send()
            .await
            .map_err(|e| InfogenError::Request(format!("GitHub request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(InfogenError::Api {
                status: status.as_u16(),
                message: format!("GitHub: {}", message),
            });
        }

        let tree: TreeResponse = response
            .json()
            .await
            .map_err(|e| InfogenError::Response(format!("invalid tree body: {}", e)))?;

        if tree.truncated {
            log::warn!("⚠️  File tree of {} was truncated by GitHub", reference);
        }

        let files: Vec<RepoFile> = tree
            .tree
            .into_iter()
            .filter(|entry| entry.kind == "blob" && is_relevant_path(&entry.path))
            .map(|entry| RepoFile { path: entry.path })
            .collect();

        log::debug!("{} relevant files in {}", files.len(), reference);
        Ok(RepoSnapshot::new(reference.clone(), files))
    }
}
