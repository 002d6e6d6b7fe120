//! Processing pipeline orchestration.
//!
//! Drives a single selected image through encode, OCR, script detection and
//! (for Arabic text) translation, publishing each transition as a
//! [`PipelineRun`] snapshot. Separated from UI concerns: callers observe
//! progress through [`Orchestrator::subscribe`].
//!
//! Only the most recently started run may publish. Selecting a new image or
//! starting another run supersedes anything in flight; late results from a
//! superseded run are dropped rather than displayed.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::llm::prompts::OCR_INSTRUCTION;
use crate::llm::{Capability, TextRecognizer, Translator};
use crate::models::{FailureReason, PipelineRun, SourceImage};
use crate::utils::encoding::encode_image_async;
use crate::utils::script::contains_arabic;

/// Current selection and the id of the latest run.
struct Slot {
    image: Option<Arc<SourceImage>>,
    latest_run: u64,
}

/// Owns the pipeline status and runs the processing sequence.
pub struct Orchestrator {
    recognizer: Arc<dyn TextRecognizer>,
    translator: Arc<dyn Translator>,
    slot: Mutex<Slot>,
    state: watch::Sender<PipelineRun>,
}

impl Orchestrator {
    /// Create an orchestrator over the given capability clients.
    pub fn new(recognizer: Arc<dyn TextRecognizer>, translator: Arc<dyn Translator>) -> Self {
        let (state, _) = watch::channel(PipelineRun::idle(0));
        Self {
            recognizer,
            translator,
            slot: Mutex::new(Slot {
                image: None,
                latest_run: 0,
            }),
            state,
        }
    }

    /// Create an orchestrator over a single client providing both capabilities.
    pub fn with_client<C>(client: Arc<C>) -> Self
    where
        C: TextRecognizer + Translator + 'static,
    {
        Self::new(client.clone(), client)
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the selected image and reset to `Idle`.
    ///
    /// Any run still in flight is superseded.
    pub fn select_image(&self, image: Option<SourceImage>) {
        let mut slot = self.slot();
        slot.latest_run += 1;
        slot.image = image.map(Arc::new);

        match &slot.image {
            Some(image) => debug!("Selected image {:?}", image),
            None => debug!("Cleared image selection"),
        }
        self.state.send_replace(PipelineRun::idle(slot.latest_run));
    }

    /// Whether an image is currently selected.
    pub fn has_image(&self) -> bool {
        self.slot().image.is_some()
    }

    /// Snapshot of the current run.
    pub fn current(&self) -> PipelineRun {
        self.state.borrow().clone()
    }

    /// Watch status changes.
    pub fn subscribe(&self) -> watch::Receiver<PipelineRun> {
        self.state.subscribe()
    }

    fn is_current(&self, run_id: u64) -> bool {
        self.slot().latest_run == run_id
    }

    /// Publish a run if it is still the latest. Returns it when published.
    fn commit(&self, run: PipelineRun) -> Option<PipelineRun> {
        let slot = self.slot();
        if slot.latest_run != run.run_id {
            debug!(
                "Discarding {} result of superseded run {} (latest is {})",
                run.status, run.run_id, slot.latest_run
            );
            return None;
        }

        debug!("Run {} -> {}", run.run_id, run.status);
        self.state.send_replace(run.clone());
        Some(run)
    }

    /// Process the selected image.
    ///
    /// Returns the terminal run, or `None` if this run was superseded before
    /// it finished.
    pub async fn process(&self) -> Option<PipelineRun> {
        let (run_id, image) = {
            let mut slot = self.slot();
            slot.latest_run += 1;
            (slot.latest_run, slot.image.clone())
        };

        let Some(image) = image else {
            warn!("Process requested with no image selected");
            return self.commit(PipelineRun::failed(run_id, FailureReason::NoImageSelected));
        };

        info!("Starting run {} for {:?}", run_id, image);
        self.commit(PipelineRun::running(run_id))?;

        let run = self.execute(run_id, image).await?;
        self.commit(run)
    }

    /// Run the pipeline steps. `None` means the run was superseded between steps.
    async fn execute(&self, run_id: u64, image: Arc<SourceImage>) -> Option<PipelineRun> {
        let payload = match encode_image_async(image).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Run {}: encoding failed: {}", run_id, e);
                return Some(PipelineRun::failed(run_id, FailureReason::EncodingFailure));
            }
        };

        if !self.is_current(run_id) {
            return None;
        }

        let extracted = match self.recognizer.extract_text(&payload, OCR_INSTRUCTION).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Run {}: {}", run_id, e);
                return Some(PipelineRun::failed(
                    run_id,
                    FailureReason::CapabilityFailure(Capability::Ocr),
                ));
            }
        };
        drop(payload);

        if extracted.trim().is_empty() {
            info!("Run {}: no text found", run_id);
            return Some(PipelineRun::empty(run_id));
        }

        if !contains_arabic(&extracted) {
            info!("Run {}: text is not Arabic, skipping translation", run_id);
            return Some(PipelineRun::ocr_only(run_id, extracted));
        }

        if !self.is_current(run_id) {
            return None;
        }

        match self.translator.translate(&extracted).await {
            Ok(translated) => Some(PipelineRun::translated(run_id, extracted, translated)),
            Err(e) => {
                warn!("Run {}: {}", run_id, e);
                Some(PipelineRun::translation_failed(run_id, extracted))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CapabilityError, LlmError};
    use crate::models::{PipelineStatus, SuccessKind};
    use crate::utils::encoding::EncodedPayload;
    use crate::utils::mime::ImageMime;
    use async_trait::async_trait;

    /// Returns a fixed OCR result; translation always fails.
    struct Fixed(&'static str);

    #[async_trait]
    impl TextRecognizer for Fixed {
        async fn extract_text(
            &self,
            _payload: &EncodedPayload,
            _instruction: &str,
        ) -> Result<String, CapabilityError> {
            Ok(self.0.to_string())
        }
    }

    #[async_trait]
    impl Translator for Fixed {
        async fn translate(&self, _source_text: &str) -> Result<String, CapabilityError> {
            Err(CapabilityError::translation(LlmError::Connection(
                "offline".to_string(),
            )))
        }
    }

    fn image() -> SourceImage {
        SourceImage::new(b"image".to_vec(), ImageMime::Png)
    }

    #[tokio::test]
    async fn test_starts_idle() {
        let orchestrator = Orchestrator::with_client(Arc::new(Fixed("")));
        assert_eq!(orchestrator.current().status, PipelineStatus::Idle);
        assert!(!orchestrator.has_image());
    }

    #[tokio::test]
    async fn test_no_image() {
        let orchestrator = Orchestrator::with_client(Arc::new(Fixed("text")));
        let run = orchestrator.process().await.unwrap();
        assert_eq!(
            run.status,
            PipelineStatus::Failed(FailureReason::NoImageSelected)
        );
        assert_eq!(orchestrator.current(), run);
    }

    #[tokio::test]
    async fn test_ocr_only() {
        let orchestrator = Orchestrator::with_client(Arc::new(Fixed("Hello world")));
        orchestrator.select_image(Some(image()));
        let run = orchestrator.process().await.unwrap();
        assert_eq!(run.status, PipelineStatus::Succeeded(SuccessKind::OcrOnly));
        assert_eq!(run.extracted_text.as_deref(), Some("Hello world"));
    }

    #[tokio::test]
    async fn test_whitespace_is_empty_result() {
        let orchestrator = Orchestrator::with_client(Arc::new(Fixed(" \n\t ")));
        orchestrator.select_image(Some(image()));
        let run = orchestrator.process().await.unwrap();
        assert_eq!(run.status, PipelineStatus::EmptyResult);
        assert!(run.extracted_text.is_none());
    }

    #[tokio::test]
    async fn test_empty_image_is_encoding_failure() {
        let orchestrator = Orchestrator::with_client(Arc::new(Fixed("text")));
        orchestrator.select_image(Some(SourceImage::new(Vec::new(), ImageMime::Jpeg)));
        let run = orchestrator.process().await.unwrap();
        assert_eq!(
            run.status,
            PipelineStatus::Failed(FailureReason::EncodingFailure)
        );
    }

    #[tokio::test]
    async fn test_translation_failure_keeps_text() {
        let orchestrator = Orchestrator::with_client(Arc::new(Fixed("مرحبا")));
        orchestrator.select_image(Some(image()));
        let run = orchestrator.process().await.unwrap();
        assert_eq!(
            run.status,
            PipelineStatus::Failed(FailureReason::CapabilityFailure(Capability::Translation))
        );
        assert_eq!(run.extracted_text.as_deref(), Some("مرحبا"));
        assert!(run.translated_text.is_none());
    }

    #[tokio::test]
    async fn test_select_image_resets_to_idle() {
        let orchestrator = Orchestrator::with_client(Arc::new(Fixed("Hello")));
        orchestrator.select_image(Some(image()));
        orchestrator.process().await.unwrap();
        assert!(orchestrator.current().status.is_terminal());

        orchestrator.select_image(Some(image()));
        let current = orchestrator.current();
        assert_eq!(current.status, PipelineStatus::Idle);
        assert!(current.extracted_text.is_none());

        orchestrator.select_image(None);
        assert!(!orchestrator.has_image());
        assert_eq!(orchestrator.current().status, PipelineStatus::Idle);
    }

    #[tokio::test]
    async fn test_run_ids_increase() {
        let orchestrator = Orchestrator::with_client(Arc::new(Fixed("Hello")));
        orchestrator.select_image(Some(image()));
        let first = orchestrator.process().await.unwrap();
        let second = orchestrator.process().await.unwrap();
        assert!(second.run_id > first.run_id);
        assert_eq!(orchestrator.current().run_id, second.run_id);
    }
}
