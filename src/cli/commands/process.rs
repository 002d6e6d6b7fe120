//! Process command: run one image through the pipeline.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncReadExt;
use tracing::warn;

use crate::cli::icons::{error, heading, info, success, warn as warn_icon};
use crate::config::{ApiKey, Settings};
use crate::llm::GeminiClient;
use crate::models::{PipelineRun, PipelineStatus, SourceImage};
use crate::services::Orchestrator;
use crate::utils::format_size;

/// Read the input image from a file, or from stdin when `input` is `-`.
async fn load_image(input: &Path) -> anyhow::Result<SourceImage> {
    if input.as_os_str() != "-" {
        return SourceImage::from_path(input)
            .with_context(|| format!("Failed to load image {}", input.display()));
    }

    let mut bytes = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut bytes)
        .await
        .context("Failed to read stdin")?;

    if bytes.starts_with(b"data:") {
        let url = String::from_utf8(bytes).context("Data URL is not valid UTF-8")?;
        return Ok(SourceImage::from_data_url(&url)?.with_name("stdin"));
    }
    Ok(SourceImage::from_bytes(bytes, None)?.with_name("stdin"))
}

/// Spinner label for a pipeline status.
fn status_message(status: PipelineStatus) -> &'static str {
    match status {
        PipelineStatus::Idle => "Waiting...",
        PipelineStatus::Running => "Processing...",
        _ => "Done",
    }
}

/// Render a finished run for the terminal.
pub(crate) fn render_run(run: &PipelineRun) -> String {
    let mut out = String::new();

    if let Some(reason) = run.failure_reason() {
        out.push_str(&format!("{} {}\n", error(), reason.user_message()));
    }

    if let Some(text) = run.ocr_display() {
        out.push_str(&format!("\n{}\n{}\n", heading("Extracted Text"), text.trim_end()));
    }

    if let Some(text) = run.translation_display() {
        out.push_str(&format!("\n{}\n{}\n", heading("Translation"), text.trim_end()));
    }

    out
}

/// Process one image and print the result.
pub async fn cmd_process(
    settings: &Settings,
    api_key: ApiKey,
    input: &Path,
    json: bool,
) -> anyhow::Result<()> {
    let client = Arc::new(GeminiClient::new(settings.llm.clone(), api_key)?);
    let orchestrator = Orchestrator::with_client(client);

    let image = load_image(input).await?;
    if image.exceeds(settings.input.max_image_bytes) {
        warn!(
            "Image is {} (advisory limit {})",
            format_size(image.size()),
            format_size(settings.input.max_image_bytes)
        );
        if !json {
            eprintln!(
                "{} Image is larger than {}; processing anyway",
                warn_icon(),
                format_size(settings.input.max_image_bytes)
            );
        }
    }

    if !json {
        eprintln!(
            "{} {} ({}, {})",
            info(),
            image.name().unwrap_or("image"),
            image.mime().label(),
            format_size(image.size())
        );
    }
    orchestrator.select_image(Some(image));

    let pb = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    let mut status_rx = orchestrator.subscribe();
    let watcher = {
        let pb = pb.clone();
        tokio::spawn(async move {
            while status_rx.changed().await.is_ok() {
                let status = status_rx.borrow_and_update().status;
                pb.set_message(status_message(status));
            }
        })
    };

    let run = orchestrator.process().await;
    watcher.abort();
    pb.finish_and_clear();

    let run = run.context("Run was superseded before completing")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print!("{}", render_run(&run));
        if matches!(run.status, PipelineStatus::Succeeded(_)) {
            eprintln!("\n{} Done", success());
        }
    }

    if run.failure_reason().is_some() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Capability;
    use crate::models::{FailureReason, NO_TEXT_FOUND, NO_TRANSLATION_NOTE};

    #[test]
    fn test_render_translated() {
        console::set_colors_enabled(false);
        let run = PipelineRun::translated(1, "مرحبا\n".to_string(), "Hello".to_string());
        let out = render_run(&run);
        assert!(out.contains("── Extracted Text ──\nمرحبا\n"));
        assert!(out.contains("── Translation ──\nHello\n"));
    }

    #[test]
    fn test_render_ocr_only_and_empty() {
        console::set_colors_enabled(false);
        let out = render_run(&PipelineRun::ocr_only(1, "Hello world".to_string()));
        assert!(out.contains(NO_TRANSLATION_NOTE));

        let out = render_run(&PipelineRun::empty(2));
        assert!(out.contains(NO_TEXT_FOUND));
        assert!(!out.contains("Translation"));
    }

    #[test]
    fn test_render_failures() {
        console::set_colors_enabled(false);
        let out = render_run(&PipelineRun::failed(
            1,
            FailureReason::CapabilityFailure(Capability::Ocr),
        ));
        assert!(out.starts_with("✗ Failed to extract text"));
        assert!(!out.contains("Extracted Text"));

        let out = render_run(&PipelineRun::translation_failed(2, "مرحبا".to_string()));
        assert!(out.contains("Failed to translate"));
        assert!(out.contains("مرحبا"));
        assert!(!out.contains("── Translation ──"));
    }

    #[test]
    fn test_status_message() {
        assert_eq!(status_message(PipelineStatus::Running), "Processing...");
        assert_eq!(status_message(PipelineStatus::EmptyResult), "Done");
    }
}
