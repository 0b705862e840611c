//! Seam between the generation service and the external image API

use async_trait::async_trait;

use crate::codec::ImagePayload;
use crate::error::Result;

/// Image returned by a transformer. The MIME type is whatever the API
/// reported, if anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

/// Trait for image-editing backends
#[async_trait]
pub trait ImageTransformer: Send + Sync {
    /// Backend name, used in logs
    fn name(&self) -> &str;

    /// Send one edit request for `image` with an already-composed instruction.
    ///
    /// Exactly one call is made; there is no retry. Transport and protocol
    /// failures come back as `GenerationFailed`, a response without an image
    /// as `NoImageReturned`.
    async fn transform(&self, image: &ImagePayload, instruction: &str) -> Result<TransformOutput>;
}
