//! Base64 encoding and decoding utilities

use base64::{engine::general_purpose::STANDARD, Engine};
use crate::error::{AppError, Result};

/// Encode binary data to base64 string
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode a bare base64 payload to binary data
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    STANDARD.decode(encoded.trim()).map_err(|_| AppError::PreviewEncodingFailed)
}
