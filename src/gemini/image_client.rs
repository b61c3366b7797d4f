use crate::{
    credential::Credential,
    error::Result,
    gemini::{
        wire::{Content, GenerateContentRequest, GenerationConfig, ImageConfig, Part},
        GeminiTransport,
    },
    models::{GeneratedImage, ImageSize, ImageSynthesisRequest},
};

#[derive(Clone)]
pub struct ImageClient {
    transport: GeminiTransport,
    model: String,
    default_size: ImageSize,
}

impl ImageClient {
    pub fn new(transport: GeminiTransport, model: String, default_size: ImageSize) -> Self {
        Self {
            transport,
            model,
            default_size,
        }
    }

    fn build_body(&self, request: &ImageSynthesisRequest) -> GenerateContentRequest {
        let mut parts = Vec::new();
        if let Some(attachment) = &request.attachment {
            parts.push(Part::inline(attachment));
        }
        parts.push(Part::text(request.prompt.clone()));

        GenerateContentRequest {
            contents: vec![Content::user(parts)],
            tools: Vec::new(),
            generation_config: Some(GenerationConfig {
                temperature: None,
                response_modalities: Some(vec!["IMAGE".to_string()]),
                image_config: Some(ImageConfig {
                    aspect_ratio: request.aspect_ratio.map(|r| r.as_str().to_string()),
                    image_size: Some(
                        request
                            .image_size
                            .unwrap_or(self.default_size)
                            .as_str()
                            .to_string(),
                    ),
                }),
            }),
        }
    }

    /// Returns the first inline image of the response, if the model produced one.
    pub async fn synthesize(
        &self,
        credential: &Credential,
        request: ImageSynthesisRequest,
    ) -> Result<Option<GeneratedImage>> {
        log::info!("Generating image with model: {}", self.model);
        let body = self.build_body(&request);
        let response = self
            .transport
            .generate_content(&self.model, credential, &body)
            .await?;

        let image = response.first_image();
        if image.is_none() {
            match response.blocked_reason() {
                Some(reason) => log::warn!("⚠️  Image withheld by provider: {}", reason),
                None => log::warn!("⚠️  Image model returned no image part"),
            }
        }
        Ok(image)
    }
}
