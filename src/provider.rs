use crate::{
    credential::Credential,
    error::Result,
    models::{GeneratedImage, ImageSynthesisRequest, TextAnalysis, TextAnalysisRequest},
};
use async_trait::async_trait;

/// The two capabilities the orchestrator needs from a generative-AI backend.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn analyze(
        &self,
        credential: &Credential,
        request: TextAnalysisRequest,
    ) -> Result<TextAnalysis>;

    /// `Ok(None)` when the call succeeded but no image part came back.
    async fn synthesize(
        &self,
        credential: &Credential,
        request: ImageSynthesisRequest,
    ) -> Result<Option<GeneratedImage>>;
}
