//! qalam - scanned document OCR with Arabic-to-English translation.
//!
//! The library exposes the processing pipeline: an image is encoded for
//! transport, sent to a remote OCR capability, checked for Arabic script,
//! and translated when Arabic text is found.

pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{ApiKey, ConfigError, Settings};
pub use llm::{Capability, CapabilityError, GeminiClient, TextRecognizer, Translator};
pub use models::{FailureReason, PipelineRun, PipelineStatus, SourceImage, SuccessKind};
pub use services::Orchestrator;
