//! Shared utility functions.
//!
//! - `encoding`: base64 transport encoding for image payloads
//! - `script`: Arabic script detection
//! - `mime`: accepted image types and detection
//! - `format`: human-readable formatting

pub mod encoding;
pub mod format;
pub mod mime;
pub mod script;

pub use encoding::{encode_image, encode_image_async, EncodedPayload, EncodingError};
pub use format::{format_size, redact};
pub use mime::ImageMime;
pub use script::contains_arabic;
