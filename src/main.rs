use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use infogen::{
    logger::{self, LogLevel, LoggerConfig},
    AspectRatio, Config, Credential, CredentialEvent, CredentialManager, CredentialSelector,
    CredentialState, ErrorClass, GeneratedImage, GenerationRequest, GenerationResult,
    InfogenError, Orchestrator, PresentationOptions, ProgressStage, RepoReference,
    RepositoryRequest, StyleChoice,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Parser)]
#[command(name = "infogen", version, about = "Generate infographics from web, documents, text, videos and repositories")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    presentation: PresentationArgs,

    /// Directory the generated images and briefs are written to
    #[arg(long, short, global = true, default_value = "infographics")]
    output: PathBuf,

    #[arg(long, global = true, default_value = "info")]
    log_level: LogLevel,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Ask for an API key on stdin when none is configured
    #[arg(long, global = true)]
    prompt_key: bool,
}

#[derive(Args)]
struct PresentationArgs {
    /// Preset name (e.g. "dark-mode-tech") or a free-form style description
    #[arg(long, global = true)]
    style: Option<String>,

    #[arg(long, global = true)]
    language: Option<String>,

    /// 9:16, 16:9 or 1:1
    #[arg(long, global = true)]
    aspect_ratio: Option<AspectRatio>,
}

#[derive(Subcommand)]
enum Command {
    /// Visualize a web article
    Article { url: String },
    /// Visualize free text, read from a file or given inline
    Text {
        #[arg(required_unless_present = "file")]
        text: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Visualize a document such as a PDF or an image
    Document {
        path: PathBuf,
        #[arg(long)]
        mime: Option<String>,
    },
    /// Visualize a YouTube video from its link or id
    Video { reference: String },
    /// Diagram a GitHub repository
    Repo {
        reference: String,
        /// Also render the 3D holographic variant
        #[arg(long)]
        holographic: bool,
        /// Ask a question about one component after the analysis
        #[arg(long, requires = "question")]
        component: Option<String>,
        #[arg(long)]
        question: Option<String>,
    },
    /// Edit an existing image with a natural-language instruction
    Edit { image: PathBuf, instruction: String },
    /// Manage the stored provider API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    Set { key: String },
    Status,
}

struct StdinSelector;

#[async_trait]
impl CredentialSelector for StdinSelector {
    async fn select(&self) -> infogen::Result<Option<Credential>> {
        let mut stderr = tokio::io::stderr();
        stderr.write_all(b"Gemini API key: ").await?;
        stderr.flush().await?;
        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        Ok(Credential::new(line))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let cli = Cli::parse();

    let logger_config = if cli.json_logs {
        LoggerConfig::production()
    } else {
        LoggerConfig::development()
    };
    logger::init_with_config(logger_config.with_level(cli.log_level))?;
    logger::log_startup_info("infogen", env!("CARGO_PKG_VERSION"));
    if !dotenv_loaded {
        log::debug!("No .env file found, using system environment variables");
    }

    let config = Config::from_env();
    logger::log_config_info(&config);

    let mut credentials = CredentialManager::from_config(&config.credential);
    if cli.prompt_key {
        credentials = credentials.with_selector(Arc::new(StdinSelector));
    }
    let credentials = Arc::new(credentials);

    if let Command::Key { action } = &cli.command {
        return run_key_command(&credentials, action).await;
    }

    if let CredentialState::NeedsCredential = credentials.resolve().await {
        log::error!("❌ No API key found. Set GEMINI_API_KEY, run `infogen key set <KEY>` or pass --prompt-key");
        return Err(InfogenError::CredentialMissing.into());
    }

    let mut resets = credentials.subscribe();
    tokio::spawn(async move {
        while let Ok(CredentialEvent::Invalidated) = resets.recv().await {
            log::warn!("🔒 The API key was rejected and has been cleared; set a new one with `infogen key set`");
        }
    });

    let orchestrator = Orchestrator::from_config(&config, credentials)?;
    let options = presentation_options(&cli.presentation, &config);

    let outcome = run(&orchestrator, cli.command, options, &cli.output).await;
    if let Err(e) = &outcome {
        report(e);
    }
    outcome.map_err(Into::into)
}

async fn run_key_command(
    credentials: &CredentialManager,
    action: &KeyAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        KeyAction::Set { key } => {
            credentials.provide(key)?;
            log::info!("✅ API key stored");
        }
        KeyAction::Status => match credentials.resolve().await {
            CredentialState::HasCredential { origin, .. } => {
                println!("API key available ({:?})", origin)
            }
            _ => println!("No API key configured"),
        },
    }
    Ok(())
}

fn presentation_options(args: &PresentationArgs, config: &Config) -> PresentationOptions {
    let mut options = PresentationOptions::new().with_language(
        args.language
            .clone()
            .unwrap_or_else(|| config.default_language.clone()),
    );
    if let Some(style) = &args.style {
        options = options.with_style(StyleChoice::parse(style));
    }
    if let Some(ratio) = args.aspect_ratio {
        options = options.with_aspect_ratio(ratio);
    }
    options
}

fn print_stage(stage: ProgressStage) {
    eprintln!(">> {}", stage);
}

async fn run(
    orchestrator: &Orchestrator,
    command: Command,
    options: PresentationOptions,
    output: &Path,
) -> infogen::Result<()> {
    let request = match command {
        Command::Article { url } => GenerationRequest::url(url, options),
        Command::Text { text, file } => {
            let text = match file {
                Some(path) => fs::read_to_string(path)?,
                None => text.unwrap_or_default(),
            };
            GenerationRequest::text(text, options)
        }
        Command::Document { path, mime } => {
            let bytes = fs::read(&path)?;
            let mime = mime.unwrap_or_else(|| guess_mime(&path).to_string());
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string());
            GenerationRequest::file(STANDARD.encode(bytes), mime, filename, options)
        }
        Command::Video { reference } => GenerationRequest::video(reference, options),
        Command::Repo {
            reference,
            holographic,
            component,
            question,
        } => {
            let reference = RepoReference::parse(&reference)?;
            let analysis = orchestrator
                .analyze_repository(
                    RepositoryRequest::new(reference.clone(), options.clone()),
                    print_stage,
                )
                .await?;
            let stem = format!("{}-{}", reference.owner, reference.repo);
            save_image(output, &format!("{}-technical", stem), &analysis.technical_diagram)?;
            match &analysis.feature_diagram {
                Some(image) => save_image(output, &format!("{}-features", stem), image)?,
                None => log::warn!("⚠️  Feature poster unavailable for {}", reference),
            }
            save_text(output, &format!("{}-summary.md", stem), &analysis.feature_summary)?;
            println!("{}", analysis.feature_summary);

            if holographic {
                let image = orchestrator
                    .generate_holographic_variant(&analysis.snapshot, &options)
                    .await?;
                save_image(output, &format!("{}-holographic", stem), &image)?;
            }
            if let (Some(component), Some(question)) = (component, question) {
                let answer = orchestrator
                    .ask_about_component(&analysis.snapshot, &component, &question)
                    .await?;
                println!("\n{}: {}\n{}", component, question, answer);
            }
            return Ok(());
        }
        Command::Edit { image, instruction } => {
            let bytes = fs::read(&image)?;
            let source = GeneratedImage::new(guess_mime(&image), STANDARD.encode(bytes));
            let edited = orchestrator.edit_image(&source, &instruction).await?;
            let stem = image
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            save_image(output, &format!("{}-edited", stem), &edited)?;
            return Ok(());
        }
        Command::Key { .. } => return Ok(()),
    };

    let result = orchestrator.generate(request, print_stage).await?;
    write_result(output, &result)
}

fn write_result(output: &Path, result: &GenerationResult) -> infogen::Result<()> {
    let stem = result.id.simple().to_string();
    save_image(output, &stem, &result.image)?;

    let mut brief = String::new();
    if let Some(title) = &result.video_title {
        brief.push_str(&format!("# {}\n\n", title));
    }
    brief.push_str(&result.brief);
    if !result.citations.is_empty() {
        brief.push_str("\n\n## Sources\n");
        for citation in &result.citations {
            brief.push_str(&format!("- [{}]({})\n", citation.title, citation.uri));
        }
    }
    save_text(output, &format!("{}.md", stem), &brief)
}

fn save_image(dir: &Path, stem: &str, image: &GeneratedImage) -> infogen::Result<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.{}", stem, image.file_extension()));
    fs::write(&path, image.decode()?)?;
    println!("🖼️  {}", path.display());
    Ok(())
}

fn save_text(dir: &Path, name: &str, text: &str) -> infogen::Result<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, text)?;
    println!("📝 {}", path.display());
    Ok(())
}

fn guess_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("md") | Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

fn report(error: &InfogenError) {
    match error.class() {
        ErrorClass::Unreachable(failure) => {
            log::error!("❌ {} ({})", error, failure.code());
            for hint in failure.suggestions() {
                eprintln!("   - {}", hint);
            }
        }
        ErrorClass::Credential => {
            log::error!("❌ {}. Run `infogen key set <KEY>` with a valid key.", error)
        }
        _ => log::error!("❌ {}", error),
    }
}
