pub mod image_client;
pub mod text_client;
pub mod wire;

use crate::{
    config::GeminiConfig,
    credential::Credential,
    error::{InfogenError, Result},
    models::{GeneratedImage, ImageSynthesisRequest, TextAnalysis, TextAnalysisRequest},
    provider::GenerativeProvider,
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use wire::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

pub use image_client::ImageClient;
pub use text_client::TextClient;

/// HTTP plumbing shared by the text and image clients.
#[derive(Clone)]
pub struct GeminiTransport {
    client: Client,
    api_base: String,
}

impl GeminiTransport {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| InfogenError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        let model = model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    pub async fn generate_content(
        &self,
        model: &str,
        credential: &Credential,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let endpoint = self.endpoint(model);
        log::debug!("POST {}", endpoint);

        let response = self
            .client
            .post(&endpoint)
            .header("x-goog-api-key", credential.expose())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                log::error!("Gemini transport error: {:?}", e);
                InfogenError::Request(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| InfogenError::Response(e.to_string()))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => {
                    log::error!(
                        "Gemini service error: {} {:?} - {}",
                        envelope.error.code.unwrap_or(status.as_u16()),
                        envelope.error.status,
                        envelope.error.message
                    );
                    envelope.error.message
                }
                Err(_) => text,
            };
            return Err(InfogenError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text)
            .map_err(|e| InfogenError::Response(format!("invalid generateContent body: {}", e)))
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    text_client: TextClient,
    image_client: ImageClient,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let transport = GeminiTransport::new(&config)?;
        Ok(Self {
            text_client: TextClient::new(transport.clone(), config.text_model.clone()),
            image_client: ImageClient::new(transport, config.image_model, config.image_size),
        })
    }
}

#[async_trait]
impl GenerativeProvider for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn analyze(
        &self,
        credential: &Credential,
        request: TextAnalysisRequest,
    ) -> Result<TextAnalysis> {
        self.text_client.analyze(credential, request).await
    }

    async fn synthesize(
        &self,
        credential: &Credential,
        request: ImageSynthesisRequest,
    ) -> Result<Option<GeneratedImage>> {
        self.image_client.synthesize(credential, request).await
    }
}
