use std::fmt;
use thiserror::Error;

/// Substring the provider uses when the API key is unknown or revoked.
pub const ENTITY_NOT_FOUND_MARKER: &str = "Requested entity was not found";

/// Why the analysis phase could not produce usable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFailure {
    NotFound,
    InsufficientData,
    SafetyFiltered,
}

impl ContentFailure {
    pub fn code(&self) -> &'static str {
        match self {
            ContentFailure::NotFound => "NOT_FOUND",
            ContentFailure::InsufficientData => "NO_DATA",
            ContentFailure::SafetyFiltered => "SAFETY",
        }
    }

    /// Hints a caller can show next to the error message.
    pub fn suggestions(&self) -> &'static [&'static str] {
        match self {
            ContentFailure::NotFound => &[
                "Make sure the source is public and not unlisted or private.",
                "Very recent content may not be indexed yet; try again later.",
                "Double-check the identifier or URL for typos.",
            ],
            ContentFailure::InsufficientData => &[
                "The source may be very short or contain no spoken or written content.",
                "The title or description may be too sparse to analyze.",
                "Try a richer or more widely covered source.",
            ],
            ContentFailure::SafetyFiltered => &[
                "The content was blocked by the provider's safety filters.",
                "Try a different source.",
            ],
        }
    }
}

impl fmt::Display for ContentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentFailure::NotFound => write!(f, "content could not be found or verified"),
            ContentFailure::InsufficientData => write!(f, "not enough data to build an infographic"),
            ContentFailure::SafetyFiltered => write!(f, "content was blocked by safety filters"),
        }
    }
}

/// Coarse classification callers use to decide how to present an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    InvalidInput,
    Unreachable(ContentFailure),
    Synthesis,
    Credential,
    Unclassified,
}

#[derive(Debug, Error)]
pub enum InfogenError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not use {source_label}: {failure}")]
    ContentUnavailable {
        failure: ContentFailure,
        source_label: String,
    },

    #[error("Image synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("The provider rejected the stored credential")]
    CredentialInvalid,

    #[error("No provider credential is configured")]
    CredentialMissing,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Provider error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Response error: {0}")]
    Response(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl InfogenError {
    pub fn content(failure: ContentFailure, source_label: impl Into<String>) -> Self {
        InfogenError::ContentUnavailable {
            failure,
            source_label: source_label.into(),
        }
    }

    /// True when the provider reported the credential as unknown.
    pub fn is_entity_not_found(&self) -> bool {
        match self {
            InfogenError::Api { message, .. } => message.contains(ENTITY_NOT_FOUND_MARKER),
            InfogenError::Response(message) | InfogenError::Request(message) => {
                message.contains(ENTITY_NOT_FOUND_MARKER)
            }
            _ => false,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            InfogenError::InvalidInput(_) => ErrorClass::InvalidInput,
            InfogenError::ContentUnavailable { failure, .. } => ErrorClass::Unreachable(*failure),
            InfogenError::SynthesisFailed(_) => ErrorClass::Synthesis,
            InfogenError::CredentialInvalid | InfogenError::CredentialMissing => {
                ErrorClass::Credential
            }
            _ => ErrorClass::Unclassified,
        }
    }
}

impl From<reqwest::Error> for InfogenError {
    fn from(err: reqwest::Error) -> Self {
        InfogenError::Request(err.to_string())
    }
}

impl From<serde_json::Error> for InfogenError {
    fn from(err: serde_json::Error) -> Self {
        InfogenError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, InfogenError>;
