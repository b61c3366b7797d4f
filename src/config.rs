use crate::guard::{
    CONTENT_NOT_FOUND_MARKER, INSUFFICIENT_DATA_MARKER, SAFETY_MARKER, VIDEO_NOT_FOUND_MARKER,
};
use crate::models::ImageSize;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_base: String,
    pub text_model: String,
    pub image_model: String,
    pub image_size: ImageSize,
    pub request_timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            image_size: ImageSize::TwoK,
            request_timeout_secs: 300,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_base = non_empty_env("GEMINI_API_BASE")
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base);
        let text_model = non_empty_env("GEMINI_TEXT_MODEL").unwrap_or(defaults.text_model);
        let image_model = non_empty_env("GEMINI_IMAGE_MODEL").unwrap_or(defaults.image_model);
        let image_size = non_empty_env("GEMINI_IMAGE_SIZE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.image_size);
        let request_timeout_secs = non_empty_env("GEMINI_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.request_timeout_secs);

        GeminiConfig {
            api_base,
            text_model,
            image_model,
            image_size,
            request_timeout_secs,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_models(
        mut self,
        text_model: impl Into<String>,
        image_model: impl Into<String>,
    ) -> Self {
        self.text_model = text_model.into();
        self.image_model = image_model.into();
        self
    }

    pub fn with_image_size(mut self, image_size: ImageSize) -> Self {
        self.image_size = image_size;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }
}

/// Thresholds for rejecting an analysis brief. The values have no principled
/// derivation; they are kept configurable.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub min_brief_chars: usize,
    pub not_found_markers: Vec<String>,
    pub insufficient_markers: Vec<String>,
    pub safety_markers: Vec<String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        GuardConfig {
            min_brief_chars: 50,
            not_found_markers: vec![
                VIDEO_NOT_FOUND_MARKER.to_string(),
                CONTENT_NOT_FOUND_MARKER.to_string(),
            ],
            insufficient_markers: vec![INSUFFICIENT_DATA_MARKER.to_string()],
            safety_markers: vec![SAFETY_MARKER.to_string()],
        }
    }
}

impl GuardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(min) = non_empty_env("INFOGEN_MIN_BRIEF_CHARS").and_then(|s| s.parse().ok()) {
            config.min_brief_chars = min;
        }
        config
    }

    pub fn with_min_brief_chars(mut self, min: usize) -> Self {
        self.min_brief_chars = min;
        self
    }
}

#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub api_base: String,
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        GithubConfig {
            api_base: DEFAULT_GITHUB_API_BASE.to_string(),
            token: None,
        }
    }
}

impl GithubConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let mut config = GithubConfig::new();
        if let Some(api_base) = non_empty_env("GITHUB_API_BASE") {
            config = config.with_api_base(api_base);
        }
        config.token = non_empty_env("GITHUB_TOKEN");
        config
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct OembedConfig {
    pub endpoint: String,
}

impl Default for OembedConfig {
    fn default() -> Self {
        OembedConfig {
            endpoint: DEFAULT_OEMBED_ENDPOINT.to_string(),
        }
    }
}

impl OembedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct CredentialConfig {
    pub env_vars: Vec<String>,
    pub store_path: PathBuf,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        CredentialConfig {
            env_vars: vec!["API_KEY".to_string(), "GEMINI_API_KEY".to_string()],
            store_path: PathBuf::from(".infogen").join("credential"),
        }
    }
}

impl CredentialConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = non_empty_env("INFOGEN_CREDENTIAL_PATH") {
            config.store_path = PathBuf::from(path);
        }
        config
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    pub fn with_env_vars(mut self, names: Vec<String>) -> Self {
        self.env_vars = names;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub default_language: String,
    pub gemini: GeminiConfig,
    pub guard: GuardConfig,
    pub github: GithubConfig,
    pub oembed: OembedConfig,
    pub credential: CredentialConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_language: "English".to_string(),
            gemini: GeminiConfig::default(),
            guard: GuardConfig::default(),
            github: GithubConfig::default(),
            oembed: OembedConfig::default(),
            credential: CredentialConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Config {
            default_language: non_empty_env("INFOGEN_LANGUAGE")
                .unwrap_or_else(|| "English".to_string()),
            gemini: GeminiConfig::from_env(),
            guard: GuardConfig::from_env(),
            github: GithubConfig::from_env(),
            oembed: OembedConfig::default(),
            credential: CredentialConfig::from_env(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_guard(mut self, config: GuardConfig) -> Self {
        self.guard = config;
        self
    }

    pub fn with_github(mut self, config: GithubConfig) -> Self {
        self.github = config;
        self
    }

    pub fn with_credential(mut self, config: CredentialConfig) -> Self {
        self.credential = config;
        self
    }
}

pub(crate) fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
