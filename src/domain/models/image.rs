#[cfg(test)]
#[path = "image_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Result;
use base64::engine::general_purpose;
use base64::Engine;
use tokio::fs;

/// Image types the generation endpoint accepts inline.
pub const SUPPORTED_MEDIA_TYPES: [&str; 5] = [
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/heic",
    "image/heif",
];

/// Returns the base64 body of a data URI, or the input unchanged when it has
/// no `data:...,` header.
pub fn strip_data_uri_header(encoded: &str) -> &str {
    if let Some((header, data)) = encoded.split_once(',') {
        if header.starts_with("data:") {
            return data;
        }
    }

    return encoded;
}

pub fn media_type_from_path(file_path: &path::Path) -> String {
    let extension = file_path
        .extension()
        .map(|ext| return ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let media_type = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    };

    return media_type.to_string();
}

/// Raw image bytes plus their media type. Immutable once captured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Vec<u8>,
    media_type: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, media_type: &str) -> ImagePayload {
        return ImagePayload {
            bytes,
            media_type: media_type.to_string(),
        };
    }

    /// Accepts either bare base64 or a full data URI. Any header is dropped.
    pub fn from_base64(encoded: &str, media_type: &str) -> Result<ImagePayload> {
        let bytes = general_purpose::STANDARD.decode(strip_data_uri_header(encoded.trim()))?;
        return Ok(ImagePayload::new(bytes, media_type));
    }

    /// Parses `data:<media type>;base64,<body>`.
    pub fn from_data_uri(uri: &str) -> Result<ImagePayload> {
        let (header, _) = match uri.trim().split_once(',') {
            Some(parts) => parts,
            None => bail!("Image is not a data URI"),
        };
        let descriptor = match header.strip_prefix("data:") {
            Some(descriptor) => descriptor,
            None => bail!("Image is not a data URI"),
        };
        let (media_type, encoding) = descriptor.split_once(';').unwrap_or((descriptor, ""));
        if encoding != "base64" {
            bail!(format!("Unsupported data URI encoding '{encoding}'"));
        }

        return ImagePayload::from_base64(uri, media_type);
    }

    /// Reads an image from disk. The media type is inferred from the file
    /// extension unless one is given.
    pub async fn from_path(file_path: &path::Path, media_type: Option<&str>) -> Result<ImagePayload> {
        if !file_path.exists() {
            bail!(format!("Image {} does not exist", file_path.display()));
        }

        let bytes = fs::read(file_path).await?;
        let media_type = match media_type {
            Some(media_type) if !media_type.is_empty() => media_type.to_string(),
            _ => media_type_from_path(file_path),
        };

        return Ok(ImagePayload::new(bytes, &media_type));
    }

    /// Loads an image from either a data URI or a file path.
    pub async fn load(source: &str, media_type: Option<&str>) -> Result<ImagePayload> {
        if source.trim_start().starts_with("data:") {
            return ImagePayload::from_data_uri(source);
        }

        return ImagePayload::from_path(path::Path::new(source), media_type).await;
    }

    pub fn bytes(&self) -> &[u8] {
        return &self.bytes;
    }

    pub fn media_type(&self) -> &str {
        return &self.media_type;
    }

    /// Advisory only. Nothing downstream refuses an unsupported type.
    pub fn is_supported(&self) -> bool {
        return SUPPORTED_MEDIA_TYPES.contains(&self.media_type.as_str());
    }

    /// Base64 body ready for transmission, never carrying a data URI header.
    pub fn to_base64(&self) -> String {
        return general_purpose::STANDARD.encode(self.bytes());
    }
}
