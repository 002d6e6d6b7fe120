//! Source image model.

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::utils::encoding::{self, EncodedPayload};
use crate::utils::mime::{accepted_labels, detect_mime, ImageMime};

/// Advisory size limit for selected images (10 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Errors raised while selecting an image.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported image type '{0}' (accepted: {})", accepted_labels())]
    UnsupportedType(String),

    #[error("Could not determine image type (accepted: {})", accepted_labels())]
    UnknownType,

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),
}

/// A selected image: raw bytes plus a declared, allow-listed content type.
#[derive(Clone)]
pub struct SourceImage {
    bytes: Vec<u8>,
    mime: ImageMime,
    name: Option<String>,
}

impl SourceImage {
    /// Create an image from bytes already known to be of the given type.
    pub fn new(bytes: impl Into<Vec<u8>>, mime: ImageMime) -> Self {
        Self {
            bytes: bytes.into(),
            mime,
            name: None,
        }
    }

    /// Attach a display name (usually the file name).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Build an image from raw bytes, detecting its type from content.
    ///
    /// `path` is only consulted for its extension when sniffing fails.
    pub fn from_bytes(bytes: Vec<u8>, path: Option<&Path>) -> Result<Self, ImageError> {
        let mime = detect_mime(&bytes, path).ok_or(ImageError::UnknownType)?;
        let mime = ImageMime::from_mime(&mime).ok_or(ImageError::UnsupportedType(mime))?;
        Ok(Self::new(bytes, mime))
    }

    /// Read an image file, detecting its type from content (or extension).
    pub fn from_path(path: &Path) -> Result<Self, ImageError> {
        let bytes = std::fs::read(path)?;
        let image = Self::from_bytes(bytes, Some(path))?;
        Ok(match path.file_name() {
            Some(name) => image.with_name(name.to_string_lossy()),
            None => image,
        })
    }

    /// Parse a `data:<mime>;base64,<data>` URL.
    pub fn from_data_url(url: &str) -> Result<Self, ImageError> {
        let url = url.trim();
        let header = url
            .split_once(',')
            .map(|(header, _)| header)
            .ok_or_else(|| ImageError::InvalidDataUrl("missing ',' separator".to_string()))?;

        let declared = header
            .strip_prefix("data:")
            .and_then(|rest| rest.strip_suffix(";base64"))
            .ok_or_else(|| {
                ImageError::InvalidDataUrl("expected 'data:<mime>;base64,' header".to_string())
            })?;
        let mime = ImageMime::from_mime(declared)
            .ok_or_else(|| ImageError::UnsupportedType(declared.to_string()))?;

        let data = encoding::strip_data_url_header(url)
            .map_err(|e| ImageError::InvalidDataUrl(e.to_string()))?;
        let bytes = encoding::decode_payload(&EncodedPayload::new(data, mime))
            .map_err(|e| ImageError::InvalidDataUrl(e.to_string()))?;

        Ok(Self::new(bytes, mime))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Whether the image is larger than the advisory limit.
    pub fn exceeds(&self, max_bytes: u64) -> bool {
        self.size() > max_bytes
    }
}

impl fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceImage")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("size", &self.size())
            .finish()
    }
}
