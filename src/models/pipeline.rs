//! Pipeline run state.

use serde::Serialize;

use crate::llm::Capability;

/// Shown when the extracted text is not Arabic.
pub const NO_TRANSLATION_NOTE: &str =
    "The extracted text does not appear to be Arabic, so no translation was performed.";

/// Shown when OCR finds no text.
pub const NO_TEXT_FOUND: &str = "No text found in the image.";

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessKind {
    /// Text was extracted; it was not Arabic so no translation ran.
    OcrOnly,
    /// Arabic text was extracted and translated.
    OcrAndTranslation,
}

/// Why a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "step")]
pub enum FailureReason {
    NoImageSelected,
    EncodingFailure,
    CapabilityFailure(Capability),
}

impl FailureReason {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoImageSelected => "Please select an image file first.",
            Self::EncodingFailure => "Failed to read the image data. Please try another file.",
            Self::CapabilityFailure(Capability::Ocr) => {
                "Failed to extract text from the image. Please try again."
            }
            Self::CapabilityFailure(Capability::Translation) => {
                "Failed to translate the text. Please try again."
            }
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.user_message())
    }
}

/// Pipeline status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "detail")]
pub enum PipelineStatus {
    Idle,
    Running,
    Succeeded(SuccessKind),
    /// OCR completed but found no text. Not an error.
    EmptyResult,
    Failed(FailureReason),
}

impl PipelineStatus {
    /// Whether this status ends a run.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Idle | Self::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Succeeded(_) => "succeeded",
            Self::EmptyResult => "empty",
            Self::Failed(_) => "failed",
        }
    }
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One end-to-end execution of the pipeline for a single image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineRun {
    /// Monotonic id; a higher id supersedes every lower one.
    pub run_id: u64,
    pub status: PipelineStatus,
    pub extracted_text: Option<String>,
    pub translated_text: Option<String>,
}

impl PipelineRun {
    pub fn idle(run_id: u64) -> Self {
        Self::with_status(run_id, PipelineStatus::Idle)
    }

    pub fn running(run_id: u64) -> Self {
        Self::with_status(run_id, PipelineStatus::Running)
    }

    pub fn empty(run_id: u64) -> Self {
        Self::with_status(run_id, PipelineStatus::EmptyResult)
    }

    pub fn failed(run_id: u64, reason: FailureReason) -> Self {
        Self::with_status(run_id, PipelineStatus::Failed(reason))
    }

    pub fn ocr_only(run_id: u64, extracted: String) -> Self {
        Self {
            extracted_text: Some(extracted),
            ..Self::with_status(run_id, PipelineStatus::Succeeded(SuccessKind::OcrOnly))
        }
    }

    pub fn translated(run_id: u64, extracted: String, translated: String) -> Self {
        Self {
            run_id,
            status: PipelineStatus::Succeeded(SuccessKind::OcrAndTranslation),
            extracted_text: Some(extracted),
            translated_text: Some(translated),
        }
    }

    /// Translation failed after OCR succeeded. The OCR text is kept for display.
    pub fn translation_failed(run_id: u64, extracted: String) -> Self {
        Self {
            extracted_text: Some(extracted),
            ..Self::failed(run_id, FailureReason::CapabilityFailure(Capability::Translation))
        }
    }

    fn with_status(run_id: u64, status: PipelineStatus) -> Self {
        Self {
            run_id,
            status,
            extracted_text: None,
            translated_text: None,
        }
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self.status {
            PipelineStatus::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Text for the OCR panel: extracted text, or the "no text" message for empty results.
    pub fn ocr_display(&self) -> Option<&str> {
        match self.status {
            PipelineStatus::EmptyResult => Some(NO_TEXT_FOUND),
            _ => self.extracted_text.as_deref(),
        }
    }

    /// Text for the translation panel: the translation, or the fixed note when none was needed.
    pub fn translation_display(&self) -> Option<&str> {
        match self.status {
            PipelineStatus::Succeeded(SuccessKind::OcrOnly) => Some(NO_TRANSLATION_NOTE),
            PipelineStatus::Succeeded(SuccessKind::OcrAndTranslation) => {
                self.translated_text.as_deref()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!PipelineStatus::Idle.is_terminal());
        assert!(!PipelineStatus::Running.is_terminal());
        assert!(PipelineStatus::EmptyResult.is_terminal());
        assert!(PipelineStatus::Succeeded(SuccessKind::OcrOnly).is_terminal());
        assert!(PipelineStatus::Failed(FailureReason::NoImageSelected).is_terminal());
    }

    #[test]
    fn test_display_text() {
        let run = PipelineRun::ocr_only(1, "Hello world".to_string());
        assert_eq!(run.ocr_display(), Some("Hello world"));
        assert_eq!(run.translation_display(), Some(NO_TRANSLATION_NOTE));
        assert!(run.translated_text.is_none());

        let run = PipelineRun::empty(2);
        assert_eq!(run.ocr_display(), Some(NO_TEXT_FOUND));
        assert_eq!(run.translation_display(), None);
    }

    #[test]
    fn test_translation_failure_keeps_ocr_text() {
        let run = PipelineRun::translation_failed(3, "مرحبا".to_string());
        assert_eq!(run.extracted_text.as_deref(), Some("مرحبا"));
        assert_eq!(
            run.failure_reason(),
            Some(FailureReason::CapabilityFailure(Capability::Translation))
        );
        assert_eq!(run.translation_display(), None);
    }

    #[test]
    fn test_user_messages_name_the_step() {
        assert!(FailureReason::CapabilityFailure(Capability::Ocr)
            .user_message()
            .contains("extract"));
        assert!(FailureReason::CapabilityFailure(Capability::Translation)
            .user_message()
            .contains("translate"));
    }

    #[test]
    fn test_serialize() {
        let run = PipelineRun::failed(4, FailureReason::CapabilityFailure(Capability::Ocr));
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["run_id"], 4);
        assert_eq!(json["status"]["state"], "failed");
        assert_eq!(json["status"]["detail"]["kind"], "capability_failure");
        assert_eq!(json["status"]["detail"]["step"], "ocr");
    }
}
