use crate::{
    credential::Credential,
    error::Result,
    gemini::{
        wire::{Content, GenerateContentRequest, GenerationConfig, GoogleSearch, Part, Tool},
        GeminiTransport,
    },
    models::{TextAnalysis, TextAnalysisRequest},
};

#[derive(Clone)]
pub struct TextClient {
    transport: GeminiTransport,
    model: String,
}

impl TextClient {
    pub fn new(transport: GeminiTransport, model: String) -> Self {
        Self { transport, model }
    }

    fn build_body(request: &TextAnalysisRequest) -> GenerateContentRequest {
        let mut parts = Vec::new();
        if let Some(attachment) = &request.attachment {
            parts.push(Part::inline(attachment));
        }
        parts.push(Part::text(request.prompt.clone()));

        let tools = if request.use_search {
            vec![Tool {
                google_search: GoogleSearch::default(),
            }]
        } else {
            Vec::new()
        };

        let generation_config = request.temperature.map(|temperature| GenerationConfig {
            temperature: Some(temperature),
            ..Default::default()
        });

        GenerateContentRequest {
            contents: vec![Content::user(parts)],
            tools,
            generation_config,
        }
    }

    pub async fn analyze(
        &self,
        credential: &Credential,
        request: TextAnalysisRequest,
    ) -> Result<TextAnalysis> {
        log::info!(
            "Invoking text model: {} (search: {})",
            self.model,
            request.use_search
        );
        let body = Self::build_body(&request);
        let response = self
            .transport
            .generate_content(&self.model, credential, &body)
            .await?;

        let analysis = TextAnalysis {
            text: response.text(),
            references: response.grounding_references(),
            blocked_reason: response.blocked_reason(),
        };
        log::debug!(
            "Text model returned {} chars, {} references",
            analysis.text.len(),
            analysis.references.len()
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InlineAttachment;
    use serde_json::json;

    #[test]
    fn test_body_places_attachment_before_prompt() {
        let request = TextAnalysisRequest::new("Summarize")
            .with_attachment(InlineAttachment {
                mime_type: "application/pdf".into(),
                data_base64: "JVBERi0=".into(),
            })
            .with_temperature(0.2);
        let value = serde_json::to_value(TextClient::build_body(&request)).unwrap();
        let parts = &value["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], json!("application/pdf"));
        assert_eq!(parts[1]["text"], json!("Summarize"));
        assert!(value.get("tools").is_none());
        let temperature = value["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_body_enables_search() {
        let request = TextAnalysisRequest::new("Analyze").with_search();
        let value = serde_json::to_value(TextClient::build_body(&request)).unwrap();
        assert_eq!(value["tools"][0]["googleSearch"], json!({}));
        assert!(value.get("generationConfig").is_none());
    }
}
