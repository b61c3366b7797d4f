#![allow(dead_code)]

use async_trait::async_trait;
use infogen::{
    Credential, CredentialManager, GeneratedImage, GenerativeProvider, ImageSynthesisRequest,
    InfogenError, Orchestrator, ProgressStage, RepoReference, RepoSnapshot, RepositorySource,
    Result, TextAnalysis, TextAnalysisRequest, VideoMetadata, VideoMetadataResolver,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

pub const PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

type AnalyzeFn = dyn Fn(&TextAnalysisRequest) -> Result<TextAnalysis> + Send + Sync;
type SynthesizeFn = dyn Fn(&ImageSynthesisRequest) -> Result<Option<GeneratedImage>> + Send + Sync;

/// In-memory provider whose answers are computed from the incoming request.
pub struct ScriptedProvider {
    on_analyze: Box<AnalyzeFn>,
    on_synthesize: Box<SynthesizeFn>,
    analyze_calls: AtomicUsize,
    synthesize_calls: AtomicUsize,
    analysis_requests: Mutex<Vec<TextAnalysisRequest>>,
    synthesis_requests: Mutex<Vec<ImageSynthesisRequest>>,
    keys: Mutex<Vec<String>>,
    gates: Vec<Arc<Barrier>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            on_analyze: Box::new(|_| Ok(brief(long_text()))),
            on_synthesize: Box::new(|_| Ok(Some(png()))),
            analyze_calls: AtomicUsize::new(0),
            synthesize_calls: AtomicUsize::new(0),
            analysis_requests: Mutex::new(Vec::new()),
            synthesis_requests: Mutex::new(Vec::new()),
            keys: Mutex::new(Vec::new()),
            gates: Vec::new(),
        }
    }

    /// Every call waits on each barrier in order before answering.
    pub fn with_gates(mut self, gates: Vec<Arc<Barrier>>) -> Self {
        self.gates = gates;
        self
    }

    pub fn on_analyze<F>(mut self, f: F) -> Self
    where
        F: Fn(&TextAnalysisRequest) -> Result<TextAnalysis> + Send + Sync + 'static,
    {
        self.on_analyze = Box::new(f);
        self
    }

    pub fn on_synthesize<F>(mut self, f: F) -> Self
    where
        F: Fn(&ImageSynthesisRequest) -> Result<Option<GeneratedImage>> + Send + Sync + 'static,
    {
        self.on_synthesize = Box::new(f);
        self
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn synthesize_calls(&self) -> usize {
        self.synthesize_calls.load(Ordering::SeqCst)
    }

    pub fn analysis_requests(&self) -> Vec<TextAnalysisRequest> {
        self.analysis_requests.lock().unwrap().clone()
    }

    pub fn synthesis_requests(&self) -> Vec<ImageSynthesisRequest> {
        self.synthesis_requests.lock().unwrap().clone()
    }

    /// Keys the calls were made with, in call order.
    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }

    async fn enter(&self, credential: &Credential) {
        self.keys.lock().unwrap().push(credential.expose().to_string());
        for gate in &self.gates {
            gate.wait().await;
        }
    }
}

#[async_trait]
impl GenerativeProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn analyze(
        &self,
        credential: &Credential,
        request: TextAnalysisRequest,
    ) -> Result<TextAnalysis> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        self.analysis_requests.lock().unwrap().push(request.clone());
        self.enter(credential).await;
        (self.on_analyze)(&request)
    }

    async fn synthesize(
        &self,
        credential: &Credential,
        request: ImageSynthesisRequest,
    ) -> Result<Option<GeneratedImage>> {
        self.synthesize_calls.fetch_add(1, Ordering::SeqCst);
        self.synthesis_requests.lock().unwrap().push(request.clone());
        self.enter(credential).await;
        (self.on_synthesize)(&request)
    }
}

pub struct StaticRepository(pub Vec<&'static str>);

#[async_trait]
impl RepositorySource for StaticRepository {
    async fn fetch_snapshot(&self, reference: &RepoReference) -> Result<RepoSnapshot> {
        let files = self
            .0
            .iter()
            .map(|path| infogen::RepoFile {
                path: path.to_string(),
            })
            .collect();
        Ok(RepoSnapshot::new(reference.clone(), files))
    }
}

pub struct StaticMetadata(pub Option<&'static str>);

#[async_trait]
impl VideoMetadataResolver for StaticMetadata {
    async fn resolve(&self, video_id: &str) -> Result<VideoMetadata> {
        match self.0 {
            Some(title) => Ok(VideoMetadata {
                title: title.to_string(),
                author_name: Some("Channel".to_string()),
                description: None,
            }),
            None => Err(InfogenError::Api {
                status: 404,
                message: format!("no oEmbed for {}", video_id),
            }),
        }
    }
}

/// Records every stage reported to it.
#[derive(Clone, Default)]
pub struct ProgressLog(Arc<Mutex<Vec<ProgressStage>>>);

impl ProgressLog {
    pub fn sink(&self) -> impl Fn(ProgressStage) + Send + Sync {
        let stages = self.0.clone();
        move |stage| stages.lock().unwrap().push(stage)
    }

    pub fn stages(&self) -> Vec<ProgressStage> {
        self.0.lock().unwrap().clone()
    }
}

pub fn long_text() -> String {
    "HEADLINE: Rust ownership explained. KEY STATS: 3 rules, 0 garbage collector pauses, \
     100% memory safety in safe code. TAKEAWAYS: borrow, move, drop."
        .to_string()
}

pub fn brief(text: impl Into<String>) -> TextAnalysis {
    TextAnalysis {
        text: text.into(),
        ..Default::default()
    }
}

pub fn png() -> GeneratedImage {
    GeneratedImage::new("image/png", PNG_BASE64)
}

pub fn credentials() -> Arc<CredentialManager> {
    Arc::new(CredentialManager::with_credential(
        Credential::new("test-key").unwrap(),
    ))
}

pub fn orchestrator(provider: Arc<ScriptedProvider>) -> Orchestrator {
    Orchestrator::new(provider, credentials())
}
