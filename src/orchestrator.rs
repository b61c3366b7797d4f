use crate::{
    citations::dedup_citations,
    config::Config,
    credential::{Credential, CredentialManager},
    error::{ContentFailure, InfogenError, Result},
    gemini::GeminiClient,
    guard::BriefGuard,
    logger,
    models::{
        AspectRatio, GeneratedImage, GenerationRequest, GenerationResult, ImageSynthesisRequest,
        PresentationOptions, RepoAnalysis, RepoSnapshot, RepositoryRequest, Source,
        TextAnalysisRequest, VideoMetadata,
    },
    progress::ProgressStage,
    prompts,
    provider::GenerativeProvider,
    sources::{youtube, GithubClient, OembedClient, RepositorySource, VideoMetadataResolver},
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

const VIDEO_ANALYSIS_TEMPERATURE: f32 = 0.2;

/// Sequences analysis, validation and image synthesis for one request at a time.
///
/// Cloning is cheap and clones share only immutable collaborators, so concurrent
/// calls never see each other's progress or results.
#[derive(Clone)]
pub struct Orchestrator {
    provider: Arc<dyn GenerativeProvider>,
    credentials: Arc<CredentialManager>,
    guard: BriefGuard,
    metadata: Option<Arc<dyn VideoMetadataResolver>>,
    repositories: Option<Arc<dyn RepositorySource>>,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn GenerativeProvider>, credentials: Arc<CredentialManager>) -> Self {
        Self {
            provider,
            credentials,
            guard: BriefGuard::default(),
            metadata: None,
            repositories: None,
        }
    }

    /// Wires the Gemini provider, oEmbed metadata and GitHub sources from config.
    pub fn from_config(config: &Config, credentials: Arc<CredentialManager>) -> Result<Self> {
        let provider = GeminiClient::new(config.gemini.clone())?;
        Ok(Self::new(Arc::new(provider), credentials)
            .with_guard(BriefGuard::new(config.guard.clone()))
            .with_metadata_resolver(Arc::new(OembedClient::new(config.oembed.clone())))
            .with_repository_source(Arc::new(GithubClient::new(config.github.clone()))))
    }

    pub fn with_guard(mut self, guard: BriefGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn with_metadata_resolver(mut self, resolver: Arc<dyn VideoMetadataResolver>) -> Self {
        self.metadata = Some(resolver);
        self
    }

    pub fn with_repository_source(mut self, source: Arc<dyn RepositorySource>) -> Self {
        self.repositories = Some(source);
        self
    }

    pub fn credentials(&self) -> &Arc<CredentialManager> {
        &self.credentials
    }

    /// Turns one source into an infographic.
    pub async fn generate<F>(
        &self,
        request: GenerationRequest,
        on_progress: F,
    ) -> Result<GenerationResult>
    where
        F: Fn(ProgressStage) + Send + Sync,
    {
        request.source.validate()?;
        let credential = self.credentials.current()?;

        let id = Uuid::new_v4();
        let tag = short_tag(&id);
        let label = request.source.label();
        let _timer = logger::timer(&format!("generate[{}]", tag));
        log::info!(
            "🎬 [{}] Generating {} infographic from {} via {}",
            tag,
            request.source.kind(),
            label,
            self.provider.name()
        );

        on_progress(ProgressStage::FetchingSource);
        let (analysis_request, video_title) = self.analysis_request(&request).await;
        let analysis = self.screen(
            &credential,
            self.provider.analyze(&credential, analysis_request).await,
        )?;
        self.guard.check(&analysis, &label)?;
        let citations = dedup_citations(analysis.references);
        log::info!(
            "📝 [{}] Brief accepted ({} chars, {} citations)",
            tag,
            analysis.text.len(),
            citations.len()
        );

        on_progress(ProgressStage::Designing);
        let prompt = prompts::infographic_prompt(&analysis.text, &request.options);
        let image = self
            .render(&credential, prompt, request.options.aspect_ratio)
            .await?
            .ok_or_else(|| {
                InfogenError::SynthesisFailed("the image model returned no image".into())
            })?;
        log::info!("🎨 [{}] Infographic ready ({})", tag, image.mime_type);

        Ok(GenerationResult {
            id,
            image,
            brief: analysis.text,
            citations,
            video_title,
            created_at: Utc::now(),
        })
    }

    async fn analysis_request(
        &self,
        request: &GenerationRequest,
    ) -> (TextAnalysisRequest, Option<String>) {
        let options = &request.options;
        match &request.source {
            Source::Url { url } => (
                TextAnalysisRequest::new(prompts::article_analysis_prompt(url, options))
                    .with_search(),
                None,
            ),
            Source::Text { text } => (
                TextAnalysisRequest::new(prompts::text_analysis_prompt(text, options)),
                None,
            ),
            Source::File { filename, .. } => {
                let mut analysis = TextAnalysisRequest::new(prompts::document_analysis_prompt(
                    filename, options,
                ));
                analysis.attachment = request.source.attachment();
                (analysis, None)
            }
            Source::Video { reference } => {
                // validate() has already accepted the reference
                let video_id = youtube::extract_video_id(reference).unwrap_or_default();
                let video_url = youtube::canonical_video_url(&video_id);
                let metadata = self.video_metadata(&video_id).await;
                let prompt = prompts::video_analysis_prompt(
                    &video_id,
                    &video_url,
                    metadata.as_ref(),
                    options,
                );
                (
                    TextAnalysisRequest::new(prompt)
                        .with_search()
                        .with_temperature(VIDEO_ANALYSIS_TEMPERATURE),
                    metadata.map(|m| m.title),
                )
            }
        }
    }

    async fn video_metadata(&self, video_id: &str) -> Option<VideoMetadata> {
        let resolver = self.metadata.as_ref()?;
        match resolver.resolve(video_id).await {
            Ok(metadata) => {
                log::debug!("Video {} resolved as \"{}\"", video_id, metadata.title);
                Some(metadata)
            }
            Err(e) => {
                log::warn!("⚠️  Metadata lookup for {} failed: {}", video_id, e);
                None
            }
        }
    }

    /// Converts an unknown-entity provider error into a reset of `sent`, the
    /// credential the failing call used.
    fn screen<T>(&self, sent: &Credential, result: Result<T>) -> Result<T> {
        match result {
            Err(e) if e.is_entity_not_found() => {
                log::error!("❌ Provider reported the credential as unknown: {}", e);
                if !self.credentials.invalidate_if(sent) {
                    log::debug!("Rejected credential was already replaced, keeping the active one");
                }
                Err(InfogenError::CredentialInvalid)
            }
            other => other,
        }
    }

    async fn render(
        &self,
        credential: &Credential,
        prompt: String,
        aspect_ratio: AspectRatio,
    ) -> Result<Option<GeneratedImage>> {
        let request = ImageSynthesisRequest::new(prompt).with_aspect_ratio(aspect_ratio);
        self.screen(credential, self.provider.synthesize(credential, request).await)
    }

    async fn describe(&self, credential: &Credential, prompt: String) -> Result<String> {
        let analysis = self.screen(
            credential,
            self.provider
                .analyze(credential, TextAnalysisRequest::new(prompt))
                .await,
        )?;
        Ok(analysis.text)
    }

    /// Fetches a repository tree and renders the technical diagram, the feature
    /// poster and the feature summary concurrently. Only the poster is optional.
    pub async fn analyze_repository<F>(
        &self,
        request: RepositoryRequest,
        on_progress: F,
    ) -> Result<RepoAnalysis>
    where
        F: Fn(ProgressStage) + Send + Sync,
    {
        let credential = self.credentials.current()?;
        let source = self
            .repositories
            .as_ref()
            .ok_or_else(|| InfogenError::Config("no repository source configured".into()))?;

        let _timer = logger::timer(&format!("analyze_repository[{}]", request.reference));
        on_progress(ProgressStage::ConnectingRepository);
        let snapshot = source.fetch_snapshot(&request.reference).await?;
        if snapshot.files.is_empty() {
            return Err(InfogenError::content(
                ContentFailure::NotFound,
                request.reference.to_string(),
            ));
        }

        on_progress(ProgressStage::RenderingRepository);
        let options = &request.options;
        let (technical, feature, summary) = futures::join!(
            self.render(
                &credential,
                prompts::technical_diagram_prompt(&snapshot, options),
                options.aspect_ratio,
            ),
            self.render(
                &credential,
                prompts::feature_poster_prompt(&snapshot, options),
                options.aspect_ratio,
            ),
            self.describe(
                &credential,
                prompts::feature_summary_prompt(&snapshot, &options.language),
            ),
        );

        let technical_diagram = technical?.ok_or_else(|| {
            InfogenError::SynthesisFailed("the technical diagram was not produced".into())
        })?;
        let feature_summary = summary?;
        if feature_summary.trim().is_empty() {
            return Err(InfogenError::Response(
                "the feature summary came back empty".into(),
            ));
        }
        let feature_diagram = match feature {
            Ok(image) => image,
            Err(e) => {
                log::warn!(
                    "⚠️  Feature poster for {} failed, continuing without it: {}",
                    request.reference,
                    e
                );
                None
            }
        };

        Ok(RepoAnalysis {
            snapshot,
            technical_diagram,
            feature_diagram,
            feature_summary,
        })
    }

    /// Renders the on-demand 3D holographic variant of a repository; always landscape.
    pub async fn generate_holographic_variant(
        &self,
        snapshot: &RepoSnapshot,
        options: &PresentationOptions,
    ) -> Result<GeneratedImage> {
        let credential = self.credentials.current()?;
        let prompt = prompts::holographic_prompt(snapshot, options);
        self.render(&credential, prompt, AspectRatio::Landscape)
            .await?
            .ok_or_else(|| InfogenError::SynthesisFailed("the 3D variant was not produced".into()))
    }

    pub async fn ask_about_component(
        &self,
        snapshot: &RepoSnapshot,
        component: &str,
        question: &str,
    ) -> Result<String> {
        if question.trim().is_empty() {
            return Err(InfogenError::InvalidInput("question is empty".into()));
        }
        let credential = self.credentials.current()?;
        let answer = self
            .describe(
                &credential,
                prompts::component_question_prompt(snapshot, component, question),
            )
            .await?;
        if answer.trim().is_empty() {
            return Err(InfogenError::Response("no answer was produced".into()));
        }
        Ok(answer)
    }

    /// Applies a natural-language edit to an existing image.
    pub async fn edit_image(
        &self,
        image: &GeneratedImage,
        instruction: &str,
    ) -> Result<GeneratedImage> {
        if instruction.trim().is_empty() {
            return Err(InfogenError::InvalidInput("edit instruction is empty".into()));
        }
        let credential = self.credentials.current()?;
        let request =
            ImageSynthesisRequest::new(instruction.trim()).with_attachment(image.as_attachment());
        self.screen(&credential, self.provider.synthesize(&credential, request).await)?
            .ok_or_else(|| InfogenError::SynthesisFailed("the edited image was not produced".into()))
    }
}

fn short_tag(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}
