//! Infogen turns articles, documents, free text, YouTube videos and GitHub
//! repositories into AI-generated infographics.
//!
//! The [`Orchestrator`] runs each request through an analysis call, a content
//! guard and an image synthesis call, reporting [`ProgressStage`]s on the way.

pub mod citations;
pub mod config;
pub mod credential;
pub mod error;
pub mod gemini;
pub mod guard;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod prompts;
pub mod provider;
pub mod sources;

pub use config::Config;
pub use credential::{
    Credential, CredentialEvent, CredentialManager, CredentialSelector, CredentialState,
    CredentialStore, FileCredentialStore, MemoryCredentialStore,
};
pub use error::{ContentFailure, ErrorClass, InfogenError, Result};
pub use gemini::GeminiClient;
pub use guard::BriefGuard;
pub use models::*;
pub use orchestrator::Orchestrator;
pub use progress::ProgressStage;
pub use provider::GenerativeProvider;
pub use sources::{GithubClient, OembedClient, RepositorySource, VideoMetadataResolver};
