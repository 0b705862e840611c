//! Image codec - conversion between raw uploads and data-URL transport form

pub mod base64;
pub mod sniff;

use serde::Serialize;
use std::fmt;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{AppError, Result};

/// MIME type assumed when an encoded image carries no usable marker.
pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// File suffix used when a MIME type does not name an image subtype.
pub const DEFAULT_EXTENSION: &str = "png";

/// Image types accepted at the upload boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MimeType {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/webp")]
    Webp,
}

impl MimeType {
    pub const ACCEPTED: [MimeType; 3] = [MimeType::Png, MimeType::Jpeg, MimeType::Webp];

    /// Parse a declared MIME type, ignoring parameters and case.
    pub fn parse(s: &str) -> Result<Self> {
        let essence = s.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/png" => Ok(Self::Png),
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/webp" => Ok(Self::Webp),
            _ => Err(AppError::UnsupportedMediaType(s.trim().to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    /// Resolve the type of an upload: the declared type when there is one,
    /// otherwise whatever the magic bytes say.
    pub fn resolve(declared: Option<&str>, data: &[u8]) -> Result<Self> {
        match declared.map(str::trim).filter(|d| !d.is_empty()) {
            Some(declared) => Self::parse(declared),
            None => sniff::detect_mime(data)
                .ok_or_else(|| AppError::UnsupportedMediaType("unknown".to_string()))
                .and_then(Self::parse),
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text-safe image representation: `data:<mime>;base64,<payload>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw image bytes paired with their MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn encode(&self) -> EncodedImage {
        encode(&self.bytes, &self.mime_type)
    }
}

/// Build the data URL for `data` tagged with `mime_type`.
pub fn encode(data: &[u8], mime_type: &str) -> EncodedImage {
    EncodedImage(format!("data:{};base64,{}", mime_type, base64::encode(data)))
}

/// Read a file fully and encode it.
pub async fn encode_file(path: &Path, declared: Option<&str>) -> Result<EncodedImage> {
    let data = fs::read(path).await.map_err(|e| {
        warn!(path = ?path, error = %e, "Could not read upload");
        AppError::PreviewEncodingFailed
    })?;
    if data.is_empty() {
        return Err(AppError::PreviewEncodingFailed);
    }

    let mime = MimeType::resolve(declared, &data)?;
    debug!(path = ?path, size = data.len(), mime = %mime, "Encoded upload");
    Ok(encode(&data, mime.as_str()))
}

/// Split an encoded image back into bytes and MIME type.
///
/// A missing or malformed marker yields [`DEFAULT_MIME_TYPE`]; a bare base64
/// string without any header is accepted as payload.
pub fn decode(encoded: &str) -> Result<(Vec<u8>, String)> {
    let (header, payload) = match encoded.split_once(',') {
        Some((header, payload)) => (Some(header), payload),
        None => (None, encoded),
    };

    let mime_type = header
        .and_then(mime_from_header)
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string();

    Ok((base64::decode(payload)?, mime_type))
}

fn mime_from_header(header: &str) -> Option<&str> {
    let rest = header.trim().strip_prefix("data:")?;
    let mime = rest.split(';').next()?.trim();
    let (kind, subtype) = mime.split_once('/')?;
    if kind.is_empty() || subtype.is_empty() || mime.contains(char::is_whitespace) {
        return None;
    }
    Some(mime)
}

/// Derive a filename suffix from a MIME type.
///
/// Only a purely alphabetic lowercase `image/` subtype is used as-is.
pub fn extension_for(mime_type: &str) -> &str {
    let essence = mime_type.split(';').next().unwrap_or_default().trim();
    match essence.strip_prefix("image/") {
        Some(subtype) if !subtype.is_empty() && subtype.bytes().all(|b| b.is_ascii_lowercase()) => subtype,
        _ => DEFAULT_EXTENSION,
    }
}

/// Normalise a MIME type reported by a remote service.
///
/// Returns the lowercased `image/<subtype>` essence, or `None` when the value
/// is not an image type or contains characters unusable in a header.
pub fn normalize_image_mime(reported: &str) -> Option<String> {
    let essence = reported.split(';').next()?.trim().to_ascii_lowercase();
    let subtype = essence.strip_prefix("image/")?;
    let token = |b: u8| b.is_ascii_alphanumeric() || b"!#$&-^_.+".contains(&b);
    if subtype.is_empty() || !subtype.bytes().all(token) {
        return None;
    }
    Some(essence)
}
