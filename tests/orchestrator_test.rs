mod common;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::*;
use infogen::{
    guard::{INSUFFICIENT_DATA_MARKER, VIDEO_NOT_FOUND_MARKER},
    sources::youtube::extract_video_id,
    AspectRatio, Citation, ContentFailure, Credential, CredentialEvent, CredentialManager,
    CredentialState, ErrorClass, GeneratedImage, GenerationRequest, InfogenError, Orchestrator,
    PresentationOptions, ProgressStage, RepoReference, RepositoryRequest, TextAnalysis,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::Barrier;

fn options() -> PresentationOptions {
    PresentationOptions::new()
}

#[tokio::test]
async fn test_text_generation_reports_stages_in_order() {
    let provider = Arc::new(ScriptedProvider::new());
    let progress = ProgressLog::default();

    let result = orchestrator(provider.clone())
        .generate(
            GenerationRequest::text("Ownership, borrowing and lifetimes.", options()),
            progress.sink(),
        )
        .await
        .unwrap();

    assert_eq!(
        progress.stages(),
        vec![ProgressStage::FetchingSource, ProgressStage::Designing]
    );
    assert_eq!(result.image, png());
    assert_eq!(result.brief, long_text());
    assert!(result.citations.is_empty());
    assert!(result.video_title.is_none());

    let analysis = &provider.analysis_requests()[0];
    assert!(!analysis.use_search);
    let synthesis = &provider.synthesis_requests()[0];
    assert!(synthesis.prompt.contains(&long_text()));
    assert_eq!(synthesis.aspect_ratio, Some(AspectRatio::Portrait));
}

#[tokio::test]
async fn test_sentinel_brief_never_reaches_synthesis() {
    let provider = Arc::new(ScriptedProvider::new().on_analyze(|_| {
        Ok(brief(format!(
            "{} - searched everywhere, nothing matched this id at all.",
            VIDEO_NOT_FOUND_MARKER
        )))
    }));
    let progress = ProgressLog::default();

    let err = orchestrator(provider.clone())
        .generate(
            GenerationRequest::video("https://youtu.be/dQw4w9WgXcQ", options()),
            progress.sink(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.class(), ErrorClass::Unreachable(ContentFailure::NotFound));
    assert_eq!(provider.synthesize_calls(), 0);
    assert_eq!(progress.stages(), vec![ProgressStage::FetchingSource]);
}

#[tokio::test]
async fn test_insufficient_marker_and_short_brief() {
    let provider = Arc::new(
        ScriptedProvider::new().on_analyze(|_| Ok(brief("Only a title, nothing else."))),
    );
    let err = orchestrator(provider.clone())
        .generate(GenerationRequest::url("https://example.com/post", options()), progress_noop)
        .await
        .unwrap_err();
    assert_eq!(
        err.class(),
        ErrorClass::Unreachable(ContentFailure::InsufficientData)
    );
    assert_eq!(provider.synthesize_calls(), 0);

    let provider = Arc::new(ScriptedProvider::new().on_analyze(|_| {
        Ok(brief(format!(
            "{}: the page is a login wall with no readable article body.",
            INSUFFICIENT_DATA_MARKER
        )))
    }));
    let err = orchestrator(provider.clone())
        .generate(GenerationRequest::url("https://example.com/post", options()), progress_noop)
        .await
        .unwrap_err();
    assert_eq!(
        err.class(),
        ErrorClass::Unreachable(ContentFailure::InsufficientData)
    );
    assert_eq!(provider.synthesize_calls(), 0);
}

fn progress_noop(_: ProgressStage) {}

#[tokio::test]
async fn test_blocked_analysis_is_safety_filtered() {
    let provider = Arc::new(ScriptedProvider::new().on_analyze(|_| {
        Ok(TextAnalysis {
            text: String::new(),
            references: Vec::new(),
            blocked_reason: Some("SAFETY".into()),
        })
    }));
    let err = orchestrator(provider.clone())
        .generate(GenerationRequest::text("something", options()), progress_noop)
        .await
        .unwrap_err();
    assert_eq!(
        err.class(),
        ErrorClass::Unreachable(ContentFailure::SafetyFiltered)
    );
    assert_eq!(provider.synthesize_calls(), 0);
}

#[tokio::test]
async fn test_citations_are_deduplicated_by_uri() {
    let provider = Arc::new(ScriptedProvider::new().on_analyze(|_| {
        Ok(TextAnalysis {
            text: long_text(),
            references: vec![
                Citation::new("https://a.example/1", "First title"),
                Citation::new("https://b.example/2", "Other"),
                Citation::new("https://a.example/1", "Second title"),
            ],
            blocked_reason: None,
        })
    }));

    let result = orchestrator(provider.clone())
        .generate(GenerationRequest::url("https://example.com/post", options()), progress_noop)
        .await
        .unwrap();

    assert_eq!(
        result.citations,
        vec![
            Citation::new("https://a.example/1", "First title"),
            Citation::new("https://b.example/2", "Other"),
        ]
    );
    assert!(provider.analysis_requests()[0].use_search);
}

#[tokio::test]
async fn test_missing_image_is_synthesis_failure() {
    let provider = Arc::new(ScriptedProvider::new().on_synthesize(|_| Ok(None)));
    let err = orchestrator(provider)
        .generate(GenerationRequest::text("some text", options()), progress_noop)
        .await
        .unwrap_err();
    assert!(matches!(err, InfogenError::SynthesisFailed(_)));
    assert_eq!(err.class(), ErrorClass::Synthesis);
}

#[tokio::test]
async fn test_invalid_input_makes_no_provider_calls() {
    let provider = Arc::new(ScriptedProvider::new());
    let progress = ProgressLog::default();
    let err = orchestrator(provider.clone())
        .generate(GenerationRequest::video("not a video", options()), progress.sink())
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::InvalidInput);
    assert_eq!(provider.analyze_calls(), 0);
    assert!(progress.stages().is_empty());
}

#[tokio::test]
async fn test_file_source_sends_attachment() {
    let provider = Arc::new(ScriptedProvider::new());
    orchestrator(provider.clone())
        .generate(
            GenerationRequest::file("JVBERi0xLjQ=", "application/pdf", "report.pdf", options()),
            progress_noop,
        )
        .await
        .unwrap();

    let request = &provider.analysis_requests()[0];
    let attachment = request.attachment.as_ref().unwrap();
    assert_eq!(attachment.mime_type, "application/pdf");
    assert!(request.prompt.contains("report.pdf"));
}

#[tokio::test]
async fn test_video_shapes_resolve_to_same_id() {
    let inputs = [
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
        "https://youtu.be/dQw4w9WgXcQ",
        "dQw4w9WgXcQ",
    ];
    for input in inputs {
        assert_eq!(extract_video_id(input).as_deref(), Some("dQw4w9WgXcQ"));
    }

    let provider = Arc::new(ScriptedProvider::new());
    let orchestrator = orchestrator(provider.clone())
        .with_metadata_resolver(Arc::new(StaticMetadata(Some("Never Gonna Give You Up"))));
    for input in inputs {
        let result = orchestrator
            .generate(GenerationRequest::video(input, options()), progress_noop)
            .await
            .unwrap();
        assert_eq!(result.video_title.as_deref(), Some("Never Gonna Give You Up"));
    }

    for request in provider.analysis_requests() {
        assert!(request.prompt.contains("ID: dQw4w9WgXcQ"));
        assert!(request.prompt.contains("Never Gonna Give You Up"));
        assert!(request.use_search);
        assert_eq!(request.temperature, Some(0.2));
    }
}

#[tokio::test]
async fn test_failed_metadata_lookup_is_not_fatal() {
    let provider = Arc::new(ScriptedProvider::new());
    let result = orchestrator(provider.clone())
        .with_metadata_resolver(Arc::new(StaticMetadata(None)))
        .generate(GenerationRequest::video("dQw4w9WgXcQ", options()), progress_noop)
        .await
        .unwrap();
    assert!(result.video_title.is_none());
    assert!(!provider.analysis_requests()[0]
        .prompt
        .contains("PUBLIC METADATA"));
}

#[tokio::test]
async fn test_unknown_entity_emits_one_reset() {
    let provider = Arc::new(ScriptedProvider::new().on_analyze(|_| {
        Err(InfogenError::Api {
            status: 404,
            message: "Requested entity was not found.".into(),
        })
    }));
    let credentials = credentials();
    let mut events = credentials.subscribe();
    let orchestrator = Orchestrator::new(provider.clone(), credentials.clone());

    let err = orchestrator
        .generate(GenerationRequest::text("some text", options()), progress_noop)
        .await
        .unwrap_err();
    assert!(matches!(err, InfogenError::CredentialInvalid));
    assert_eq!(err.class(), ErrorClass::Credential);
    assert_eq!(credentials.state(), CredentialState::NeedsCredential);

    assert_eq!(events.try_recv(), Ok(CredentialEvent::Invalidated));
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));

    let err = orchestrator
        .generate(GenerationRequest::text("some text", options()), progress_noop)
        .await
        .unwrap_err();
    assert!(matches!(err, InfogenError::CredentialMissing));
    assert_eq!(provider.analyze_calls(), 1);
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_unknown_entity_in_repo_fan_out_resets_once() {
    let provider = Arc::new(ScriptedProvider::new().on_synthesize(|_| {
        Err(InfogenError::Api {
            status: 404,
            message: "Requested entity was not found.".into(),
        })
    }));
    let credentials = credentials();
    let mut events = credentials.subscribe();
    let orchestrator = Orchestrator::new(provider.clone(), credentials.clone())
        .with_repository_source(Arc::new(StaticRepository(vec!["src/main.rs"])));

    let err = orchestrator
        .analyze_repository(
            RepositoryRequest::new(RepoReference::new("acme", "widgets"), options()),
            progress_noop,
        )
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Credential);
    assert_eq!(provider.synthesize_calls(), 2);
    assert_eq!(events.try_recv(), Ok(CredentialEvent::Invalidated));
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_late_rejection_keeps_newer_key() {
    let entered = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));
    let provider = Arc::new(
        ScriptedProvider::new()
            .with_gates(vec![entered.clone(), release.clone()])
            .on_analyze(|_| {
                Err(InfogenError::Api {
                    status: 404,
                    message: "Requested entity was not found.".into(),
                })
            }),
    );
    let credentials = credentials();
    let orchestrator = Orchestrator::new(provider.clone(), credentials.clone());

    let pending = tokio::spawn(async move {
        orchestrator
            .generate(GenerationRequest::text("some text", options()), progress_noop)
            .await
    });

    // The call is in flight with the old key; the user enters a new one meanwhile.
    entered.wait().await;
    credentials.invalidate();
    credentials.provide("new-key").unwrap();
    let mut events = credentials.subscribe();
    release.wait().await;

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, InfogenError::CredentialInvalid));
    assert_eq!(provider.keys(), vec!["test-key".to_string()]);
    assert_eq!(credentials.current().unwrap().expose(), "new-key");
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test]
async fn test_repo_renders_run_concurrently() {
    // Each call waits until all three are in flight, so sequential calls would stall.
    let provider = Arc::new(
        ScriptedProvider::new()
            .with_gates(vec![Arc::new(Barrier::new(3))])
            .on_analyze(|_| Ok(brief("1. Project purpose: widgets."))),
    );
    let orchestrator = orchestrator(provider.clone())
        .with_repository_source(Arc::new(StaticRepository(vec!["src/main.rs"])));

    let analysis = tokio::time::timeout(
        Duration::from_secs(5),
        orchestrator.analyze_repository(
            RepositoryRequest::new(RepoReference::new("acme", "widgets"), options()),
            progress_noop,
        ),
    )
    .await
    .expect("repository renders ran one after another")
    .unwrap();

    assert!(analysis.feature_diagram.is_some());
    assert_eq!(provider.synthesize_calls(), 2);
    assert_eq!(provider.analyze_calls(), 1);
}

#[tokio::test]
async fn test_missing_credential_blocks_generation() {
    let provider = Arc::new(ScriptedProvider::new());
    let credentials = Arc::new(CredentialManager::with_credential(
        Credential::new("k").unwrap(),
    ));
    credentials.invalidate();

    let err = Orchestrator::new(provider.clone(), credentials)
        .generate(GenerationRequest::text("some text", options()), progress_noop)
        .await
        .unwrap_err();
    assert!(matches!(err, InfogenError::CredentialMissing));
    assert_eq!(provider.analyze_calls(), 0);
}

#[tokio::test]
async fn test_repo_feature_failure_is_optional() {
    let provider = Arc::new(ScriptedProvider::new().on_synthesize(|request| {
        if request.prompt.contains("feature poster") {
            Err(InfogenError::Api {
                status: 500,
                message: "internal".into(),
            })
        } else {
            Ok(Some(png()))
        }
    }).on_analyze(|_| Ok(brief("1. Project purpose: widgets."))));
    let progress = ProgressLog::default();

    let analysis = orchestrator(provider.clone())
        .with_repository_source(Arc::new(StaticRepository(vec![
            "src/main.rs",
            "src/lib.rs",
            "Cargo.toml",
        ])))
        .analyze_repository(
            RepositoryRequest::new(RepoReference::new("acme", "widgets"), options()),
            progress.sink(),
        )
        .await
        .unwrap();

    assert!(analysis.feature_diagram.is_none());
    assert_eq!(analysis.technical_diagram, png());
    assert_eq!(analysis.feature_summary, "1. Project purpose: widgets.");
    assert_eq!(analysis.snapshot.files.len(), 3);
    assert_eq!(
        progress.stages(),
        vec![
            ProgressStage::ConnectingRepository,
            ProgressStage::RenderingRepository
        ]
    );
    assert_eq!(provider.synthesize_calls(), 2);
    assert_eq!(provider.analyze_calls(), 1);
}

#[tokio::test]
async fn test_repo_technical_failure_is_fatal() {
    let provider = Arc::new(ScriptedProvider::new().on_synthesize(|request| {
        if request.prompt.contains("Technical architecture diagram") {
            Ok(None)
        } else {
            Ok(Some(png()))
        }
    }));
    let err = orchestrator(provider)
        .with_repository_source(Arc::new(StaticRepository(vec!["src/main.rs"])))
        .analyze_repository(
            RepositoryRequest::new(RepoReference::new("acme", "widgets"), options()),
            progress_noop,
        )
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Synthesis);
}

#[tokio::test]
async fn test_empty_repository_is_not_found() {
    let provider = Arc::new(ScriptedProvider::new());
    let err = orchestrator(provider.clone())
        .with_repository_source(Arc::new(StaticRepository(Vec::new())))
        .analyze_repository(
            RepositoryRequest::new(RepoReference::new("acme", "empty"), options()),
            progress_noop,
        )
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Unreachable(ContentFailure::NotFound));
    assert_eq!(provider.synthesize_calls(), 0);
}

#[tokio::test]
async fn test_holographic_variant_is_landscape() {
    let provider = Arc::new(ScriptedProvider::new());
    let snapshot = infogen::RepoSnapshot::new(
        RepoReference::new("acme", "widgets"),
        vec![infogen::RepoFile {
            path: "src/main.rs".into(),
        }],
    );
    let image = orchestrator(provider.clone())
        .generate_holographic_variant(&snapshot, &options())
        .await
        .unwrap();
    assert_eq!(image, png());
    assert_eq!(
        provider.synthesis_requests()[0].aspect_ratio,
        Some(AspectRatio::Landscape)
    );
}

#[tokio::test]
async fn test_component_question_and_image_edit() {
    let provider = Arc::new(
        ScriptedProvider::new().on_analyze(|_| Ok(brief("It parses the config file."))),
    );
    let orchestrator = orchestrator(provider.clone());
    let snapshot = infogen::RepoSnapshot::new(
        RepoReference::new("acme", "widgets"),
        vec![infogen::RepoFile {
            path: "src/config.rs".into(),
        }],
    );

    let answer = orchestrator
        .ask_about_component(&snapshot, "config", "What does it do?")
        .await
        .unwrap();
    assert_eq!(answer, "It parses the config file.");
    assert!(orchestrator
        .ask_about_component(&snapshot, "config", "  ")
        .await
        .is_err());

    let edited = orchestrator
        .edit_image(&png(), "make the title red")
        .await
        .unwrap();
    assert_eq!(edited, png());
    let request = &provider.synthesis_requests()[0];
    assert_eq!(request.prompt, "make the title red");
    assert!(request.attachment.is_some());
    assert!(orchestrator.edit_image(&png(), "").await.is_err());
}

#[tokio::test]
async fn test_concurrent_generations_are_isolated() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .on_analyze(|request| {
                let topic = if request.prompt.contains("ALPHA_SOURCE") {
                    "ALPHA_SOURCE"
                } else {
                    "BETA_SOURCE"
                };
                Ok(brief(format!("{} {}", topic, long_text())))
            })
            .on_synthesize(|request| {
                let marker = if request.prompt.contains("ALPHA_SOURCE") {
                    "ALPHA"
                } else {
                    "BETA"
                };
                Ok(Some(GeneratedImage::new("image/png", STANDARD.encode(marker))))
            }),
    );
    let orchestrator = orchestrator(provider);
    let alpha_progress = ProgressLog::default();
    let beta_progress = ProgressLog::default();

    let (alpha, beta) = tokio::join!(
        orchestrator.generate(
            GenerationRequest::text("ALPHA_SOURCE about compilers", options()),
            alpha_progress.sink(),
        ),
        orchestrator.generate(
            GenerationRequest::text("BETA_SOURCE about databases", options()),
            beta_progress.sink(),
        ),
    );
    let (alpha, beta) = (alpha.unwrap(), beta.unwrap());

    assert_ne!(alpha.id, beta.id);
    assert!(alpha.brief.contains("ALPHA_SOURCE") && !alpha.brief.contains("BETA_SOURCE"));
    assert!(beta.brief.contains("BETA_SOURCE") && !beta.brief.contains("ALPHA_SOURCE"));
    assert_eq!(alpha.image.decode().unwrap(), b"ALPHA");
    assert_eq!(beta.image.decode().unwrap(), b"BETA");

    let expected = vec![ProgressStage::FetchingSource, ProgressStage::Designing];
    assert_eq!(alpha_progress.stages(), expected);
    assert_eq!(beta_progress.stages(), expected);
}
