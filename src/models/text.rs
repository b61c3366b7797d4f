use crate::models::{Citation, InlineAttachment};

#[derive(Debug, Clone)]
pub struct TextAnalysisRequest {
    pub prompt: String,
    /// Document sent alongside the prompt (uploaded-file sources).
    pub attachment: Option<InlineAttachment>,
    /// Let the model ground its answer with web search.
    pub use_search: bool,
    pub temperature: Option<f32>,
}

impl TextAnalysisRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            attachment: None,
            use_search: false,
            temperature: None,
        }
    }

    pub fn with_search(mut self) -> Self {
        self.use_search = true;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_attachment(mut self, attachment: InlineAttachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextAnalysis {
    pub text: String,
    /// Grounding references in the order the provider returned them, not deduplicated.
    pub references: Vec<Citation>,
    /// Set when the provider refused the prompt or stopped for safety.
    pub blocked_reason: Option<String>,
}
