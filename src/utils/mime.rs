//! Image MIME type allow-list and detection helpers.

use std::path::Path;

use serde::Serialize;

/// Image types accepted for processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum ImageMime {
    Png,
    Jpeg,
    Webp,
}

impl ImageMime {
    /// Get the MIME type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    /// Get a short display label for the type.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPG",
            Self::Webp => "WEBP",
        }
    }

    /// All accepted types.
    pub fn all() -> &'static [ImageMime] {
        &[Self::Png, Self::Jpeg, Self::Webp]
    }

    /// Parse a MIME type string, returning `None` for anything outside the allow-list.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime_lower = mime.trim().to_lowercase();
        match mime_lower.as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageMime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ImageMime> for &'static str {
    fn from(mime: ImageMime) -> Self {
        mime.as_str()
    }
}

/// Human-readable list of accepted types, e.g. "PNG, JPG, WEBP".
pub fn accepted_labels() -> String {
    ImageMime::all()
        .iter()
        .map(|m| m.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Detect the MIME type of image bytes, sniffing content first and
/// falling back to the file extension.
///
/// Returns the raw MIME string so callers can report unsupported types.
pub fn detect_mime(bytes: &[u8], path: Option<&Path>) -> Option<String> {
    if let Some(kind) = infer::get(bytes) {
        return Some(kind.mime_type().to_string());
    }

    path.and_then(|p| mime_guess::from_path(p).first())
        .map(|m| m.essence_str().to_string())
}
