//! Submit one generation request through the retrying controller and report
//! how it ended.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use reqwest::Url;
use studio::domain::generation_controller::{
    AttemptStatus, GenerationAttemptState, GenerationOutcome, GenerationRequestController,
};
use studio::domain::ports::GenerationRequest;
use studio::domain::{Prompt, StyleName, UploadedImage};
use studio::inbound::http::state::DEFAULT_MAX_UPLOAD_BYTES;
use studio::outbound::studio_client::HttpGenerationSubmitter;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

const TOKEN_ENV: &str = "STUDIO_TOKEN";

/// `studio-generate` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "studio-generate",
    about = "Create an image generation, retrying while the model is overloaded",
    version
)]
struct CliArgs {
    /// API base URL.
    #[arg(long = "base-url", value_name = "url", default_value = "http://localhost:3000")]
    base_url: Url,
    /// Bearer token. Falls back to `STUDIO_TOKEN` when omitted.
    #[arg(long = "token", value_name = "jwt")]
    token: Option<String>,
    /// Prompt text.
    #[arg(long = "prompt")]
    prompt: String,
    /// Style name.
    #[arg(long = "style", default_value = "Editorial")]
    style: String,
    /// JPEG or PNG source image.
    #[arg(long = "image", value_name = "path")]
    image: PathBuf,
    /// Per-request timeout in seconds.
    #[arg(long = "timeout-secs", default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let token = resolve_token(args.token.clone())?;
    let request = build_request(&args)?;
    let submitter = HttpGenerationSubmitter::new(
        &args.base_url,
        token,
        Duration::from_secs(args.timeout_secs),
    )
    .wrap_err("build HTTP client")?;
    let controller = GenerationRequestController::new(Arc::new(submitter));

    let progress = tokio::spawn(log_progress(controller.subscribe()));
    let run = controller.start(request).wrap_err("start generation")?;
    let outcome = tokio::select! {
        outcome = run.outcome() => outcome,
        signal = tokio::signal::ctrl_c() => {
            signal.wrap_err("listen for Ctrl-C")?;
            info!("cancelling generation");
            controller.cancel();
            // A pending retry is dropped; an in-flight submission is awaited.
            wait_for_terminal(controller.subscribe()).await;
            Ok(GenerationOutcome::Cancelled)
        }
    }
    .wrap_err("generation task")?;
    progress.abort();

    report(outcome)
}

fn resolve_token(flag: Option<String>) -> Result<Zeroizing<String>> {
    flag.or_else(|| env::var(TOKEN_ENV).ok())
        .filter(|token| !token.trim().is_empty())
        .map(Zeroizing::new)
        .ok_or_else(|| eyre!("a bearer token is required (--token or {TOKEN_ENV})"))
}

fn content_type_for(path: &Path) -> Result<&'static str> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => Ok("image/png"),
        Some("jpg" | "jpeg") => Ok("image/jpeg"),
        _ => bail!("{} is not a .png, .jpg or .jpeg file", path.display()),
    }
}

fn read_image(path: &Path) -> Result<(String, Vec<u8>)> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("{} has no file name", path.display()))?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .wrap_err_with(|| format!("open {}", parent.display()))?;
    let bytes = dir
        .read(Path::new(file_name))
        .wrap_err_with(|| format!("read {}", path.display()))?;
    Ok((file_name.to_string_lossy().into_owned(), bytes))
}

fn build_request(args: &CliArgs) -> Result<GenerationRequest> {
    let content_type = content_type_for(&args.image)?;
    let (file_name, bytes) = read_image(&args.image)?;
    Ok(GenerationRequest {
        prompt: Prompt::new(args.prompt.clone())?,
        style: StyleName::new(args.style.clone())?,
        image: UploadedImage::new(file_name, content_type, bytes, DEFAULT_MAX_UPLOAD_BYTES)?,
    })
}

async fn log_progress(mut states: watch::Receiver<GenerationAttemptState>) {
    while states.changed().await.is_ok() {
        let state = states.borrow_and_update().clone();
        info!(
            attempt = state.attempt_number,
            status = ?state.status,
            cancelled = state.cancelled,
            "generation progress"
        );
    }
}

async fn wait_for_terminal(mut states: watch::Receiver<GenerationAttemptState>) {
    let settled = |status: AttemptStatus| status.is_terminal() || status == AttemptStatus::Idle;
    if states.wait_for(|state| settled(state.status)).await.is_err() {
        warn!("controller dropped before settling");
    }
}

fn report(outcome: GenerationOutcome) -> Result<()> {
    match outcome {
        GenerationOutcome::Succeeded(payload) => {
            println!("id={}", payload.id);
            println!("status={}", payload.status.as_str());
            println!("image_url={}", payload.image_url);
            Ok(())
        }
        GenerationOutcome::Failed(failure) => {
            bail!("generation failed ({:?}): {}", failure.kind, failure.message)
        }
        GenerationOutcome::Cancelled => {
            println!("status=cancelled");
            Ok(())
        }
    }
}
