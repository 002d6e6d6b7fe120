//! Binary-to-transport encoding for image payloads.
//!
//! Images are sent to the remote capabilities as standard base64 text.
//! Data URL headers (`data:<mime>;base64,`) are stripped so that only the
//! embedded base64 remains.

use std::sync::Arc;

use base64::Engine;
use thiserror::Error;

use crate::models::SourceImage;
use crate::utils::mime::ImageMime;

/// Errors from encoding or decoding a payload.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Failed to read image data: {0}")]
    Read(String),

    #[error("No base64 data found after data URL header")]
    MissingData,

    #[error("Invalid base64 data: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// A text-safe encoding of an image, paired with its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub data: String,
    pub mime: ImageMime,
}

impl EncodedPayload {
    pub fn new(data: impl Into<String>, mime: ImageMime) -> Self {
        Self {
            data: data.into(),
            mime,
        }
    }
}

/// Format image bytes as a data URL.
pub fn to_data_url(image: &SourceImage) -> String {
    format!(
        "data:{};base64,{}",
        image.mime(),
        base64::engine::general_purpose::STANDARD.encode(image.bytes())
    )
}

/// Return the base64 portion of a data URL.
///
/// Input without a header is returned unchanged. An empty data section is an error.
pub fn strip_data_url_header(url: &str) -> Result<&str, EncodingError> {
    let data = match url.split_once(',') {
        Some((header, data)) if header.starts_with("data:") => data,
        Some(_) => return Err(EncodingError::MissingData),
        None => url,
    };

    let data = data.trim();
    if data.is_empty() {
        return Err(EncodingError::MissingData);
    }
    Ok(data)
}

/// Encode an image into a transport payload.
///
/// An empty image has no data section and fails with [`EncodingError::MissingData`].
pub fn encode_image(image: &SourceImage) -> Result<EncodedPayload, EncodingError> {
    let url = to_data_url(image);
    let data = strip_data_url_header(&url)?;
    Ok(EncodedPayload::new(data, image.mime()))
}

/// Encode an image on the blocking pool.
pub async fn encode_image_async(image: Arc<SourceImage>) -> Result<EncodedPayload, EncodingError> {
    tokio::task::spawn_blocking(move || encode_image(&image))
        .await
        .map_err(|e| EncodingError::Read(e.to_string()))?
}

/// Decode a payload back into raw bytes.
pub fn decode_payload(payload: &EncodedPayload) -> Result<Vec<u8>, EncodingError> {
    Ok(base64::engine::general_purpose::STANDARD.decode(payload.data.as_bytes())?)
}
