use crate::error::{InfogenError, Result};
use crate::models::{AspectRatio, InlineAttachment};
use crate::sources::youtube;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the user asked to visualize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Source {
    Url {
        url: String,
    },
    File {
        data_base64: String,
        mime_type: String,
        filename: String,
    },
    Text {
        text: String,
    },
    Video {
        reference: String,
    },
}

impl Source {
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Url { .. } => "url",
            Source::File { .. } => "file",
            Source::Text { .. } => "text",
            Source::Video { .. } => "video",
        }
    }

    /// Human-readable name of the source for error messages.
    pub fn label(&self) -> String {
        match self {
            Source::Url { url } => url.trim().to_string(),
            Source::File { filename, .. } => filename.clone(),
            Source::Text { .. } => "the provided text".to_string(),
            Source::Video { reference } => match youtube::extract_video_id(reference) {
                Some(id) => youtube::canonical_video_url(&id),
                None => reference.trim().to_string(),
            },
        }
    }

    /// Rejects malformed input before any network call is made.
    pub fn validate(&self) -> Result<()> {
        match self {
            Source::Url { url } => {
                let url = url.trim();
                if url.is_empty() {
                    return Err(InfogenError::InvalidInput("URL is empty".into()));
                }
                let parsed = reqwest::Url::parse(url).map_err(|e| {
                    InfogenError::InvalidInput(format!("'{}' is not a valid URL: {}", url, e))
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(InfogenError::InvalidInput(format!(
                        "unsupported URL scheme '{}'",
                        parsed.scheme()
                    )));
                }
                Ok(())
            }
            Source::File {
                data_base64,
                mime_type,
                filename,
            } => {
                if mime_type.trim().is_empty() {
                    return Err(InfogenError::InvalidInput(format!(
                        "missing MIME type for '{}'",
                        filename
                    )));
                }
                let bytes = STANDARD.decode(data_base64.trim().as_bytes()).map_err(|e| {
                    InfogenError::InvalidInput(format!("'{}' is not valid base64: {}", filename, e))
                })?;
                if bytes.is_empty() {
                    return Err(InfogenError::InvalidInput(format!("'{}' is empty", filename)));
                }
                Ok(())
            }
            Source::Text { text } => {
                if text.trim().is_empty() {
                    Err(InfogenError::InvalidInput("text is empty".into()))
                } else {
                    Ok(())
                }
            }
            Source::Video { reference } => match youtube::extract_video_id(reference) {
                Some(_) => Ok(()),
                None => Err(InfogenError::InvalidInput(format!(
                    "'{}' is not a YouTube link or video id",
                    reference.trim()
                ))),
            },
        }
    }

    pub(crate) fn attachment(&self) -> Option<InlineAttachment> {
        match self {
            Source::File {
                data_base64,
                mime_type,
                ..
            } => Some(InlineAttachment {
                mime_type: mime_type.clone(),
                data_base64: data_base64.trim().to_string(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StylePreset {
    ModernEditorial,
    MinimalistWhite,
    PlayfulVibrant,
    CleanMinimalist,
    DarkModeTech,
    CinematicAnalysis,
    ModernDataFlow,
    HandDrawnBlueprint,
    CorporateWhite,
    NeonCyberpunk,
}

impl StylePreset {
    pub const ALL: [StylePreset; 10] = [
        StylePreset::ModernEditorial,
        StylePreset::MinimalistWhite,
        StylePreset::PlayfulVibrant,
        StylePreset::CleanMinimalist,
        StylePreset::DarkModeTech,
        StylePreset::CinematicAnalysis,
        StylePreset::ModernDataFlow,
        StylePreset::HandDrawnBlueprint,
        StylePreset::CorporateWhite,
        StylePreset::NeonCyberpunk,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StylePreset::ModernEditorial => "modern-editorial",
            StylePreset::MinimalistWhite => "minimalist-white",
            StylePreset::PlayfulVibrant => "playful-vibrant",
            StylePreset::CleanMinimalist => "clean-minimalist",
            StylePreset::DarkModeTech => "dark-mode-tech",
            StylePreset::CinematicAnalysis => "cinematic-analysis",
            StylePreset::ModernDataFlow => "modern-data-flow",
            StylePreset::HandDrawnBlueprint => "hand-drawn-blueprint",
            StylePreset::CorporateWhite => "corporate-white",
            StylePreset::NeonCyberpunk => "neon-cyberpunk",
        }
    }

    pub fn guideline(&self) -> &'static str {
        match self {
            StylePreset::ModernEditorial => {
                "Modern editorial: magazine grid, bold serif headline, restrained accent color"
            }
            StylePreset::MinimalistWhite => {
                "Minimalist white: generous white background, thin line icons, one accent color"
            }
            StylePreset::PlayfulVibrant => {
                "Playful and vibrant: saturated colors, rounded shapes, friendly illustrations"
            }
            StylePreset::CleanMinimalist => {
                "Clean minimalist: flat shapes, neutral palette, strict alignment"
            }
            StylePreset::DarkModeTech => {
                "Dark mode tech: near-black background, neon accents, monospace labels"
            }
            StylePreset::CinematicAnalysis => {
                "Cinematic analysis: dramatic lighting, film-strip framing, widescreen typography"
            }
            StylePreset::ModernDataFlow => {
                "Modern data flow: directed arrows, layered nodes, gradient connectors"
            }
            StylePreset::HandDrawnBlueprint => {
                "Hand-drawn blueprint: blue paper, white sketched lines, annotated callouts"
            }
            StylePreset::CorporateWhite => {
                "Corporate white: clean white canvas, navy and gray palette, boxed sections"
            }
            StylePreset::NeonCyberpunk => {
                "Neon cyberpunk: dark grid, magenta and cyan glow, futuristic type"
            }
        }
    }
}

impl FromStr for StylePreset {
    type Err = InfogenError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        StylePreset::ALL
            .iter()
            .copied()
            .find(|preset| preset.name() == wanted)
            .ok_or_else(|| InfogenError::InvalidInput(format!("unknown style preset '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleChoice {
    Preset(StylePreset),
    Custom(String),
}

impl StyleChoice {
    /// Preset name if it matches one, otherwise free-form custom style text.
    pub fn parse(input: &str) -> Self {
        match input.parse::<StylePreset>() {
            Ok(preset) => StyleChoice::Preset(preset),
            Err(_) => StyleChoice::Custom(input.trim().to_string()),
        }
    }

    pub fn guideline(&self) -> String {
        match self {
            StyleChoice::Preset(preset) => preset.guideline().to_string(),
            StyleChoice::Custom(text) if text.trim().is_empty() => {
                StylePreset::ModernEditorial.guideline().to_string()
            }
            StyleChoice::Custom(text) => format!("Custom: {}", text.trim()),
        }
    }
}

impl Default for StyleChoice {
    fn default() -> Self {
        StyleChoice::Preset(StylePreset::ModernEditorial)
    }
}

impl fmt::Display for StyleChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleChoice::Preset(preset) => f.write_str(preset.name()),
            StyleChoice::Custom(text) => write!(f, "custom ({})", text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationOptions {
    pub style: StyleChoice,
    pub language: String,
    pub aspect_ratio: AspectRatio,
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self {
            style: StyleChoice::default(),
            language: "English".to_string(),
            aspect_ratio: AspectRatio::Portrait,
        }
    }
}

impl PresentationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: StyleChoice) -> Self {
        self.style = style;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub source: Source,
    pub options: PresentationOptions,
}

impl GenerationRequest {
    pub fn new(source: Source, options: PresentationOptions) -> Self {
        Self { source, options }
    }

    pub fn url(url: impl Into<String>, options: PresentationOptions) -> Self {
        Self::new(Source::Url { url: url.into() }, options)
    }

    pub fn text(text: impl Into<String>, options: PresentationOptions) -> Self {
        Self::new(Source::Text { text: text.into() }, options)
    }

    pub fn video(reference: impl Into<String>, options: PresentationOptions) -> Self {
        Self::new(
            Source::Video {
                reference: reference.into(),
            },
            options,
        )
    }

    pub fn file(
        data_base64: impl Into<String>,
        mime_type: impl Into<String>,
        filename: impl Into<String>,
        options: PresentationOptions,
    ) -> Self {
        Self::new(
            Source::File {
                data_base64: data_base64.into(),
                mime_type: mime_type.into(),
                filename: filename.into(),
            },
            options,
        )
    }
}
