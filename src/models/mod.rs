//! Data models for qalam.

mod image;
mod pipeline;

pub use image::{ImageError, SourceImage, DEFAULT_MAX_IMAGE_BYTES};
pub use pipeline::{
    FailureReason, PipelineRun, PipelineStatus, SuccessKind, NO_TEXT_FOUND, NO_TRANSLATION_NOTE,
};
