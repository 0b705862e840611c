//! Generation service - request composition and the external API client

pub mod directive;
pub mod gemini;
pub mod traits;

use std::sync::Arc;
use tracing::debug;

use crate::codec::ImagePayload;
use crate::error::Result;

pub use gemini::GeminiClient;
pub use traits::{ImageTransformer, TransformOutput};

/// Which kind of call is being made; only affects logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Style,
    Edit,
}

impl TransformKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Style => "style",
            Self::Edit => "edit",
        }
    }
}

/// Applies the identity directive and forwards to the configured transformer
#[derive(Clone)]
pub struct GenerationService {
    transformer: Arc<dyn ImageTransformer>,
}

impl GenerationService {
    pub fn new(transformer: Arc<dyn ImageTransformer>) -> Self {
        Self { transformer }
    }

    /// Restyle the uploaded photo with a catalog instruction
    pub async fn style_transform(&self, image: &ImagePayload, style_instruction: &str) -> Result<TransformOutput> {
        self.transform(TransformKind::Style, image, style_instruction).await
    }

    /// Apply a free-text edit to the current result
    pub async fn edit_transform(&self, image: &ImagePayload, edit_instruction: &str) -> Result<TransformOutput> {
        self.transform(TransformKind::Edit, image, edit_instruction).await
    }

    async fn transform(
        &self,
        kind: TransformKind,
        image: &ImagePayload,
        instruction: &str,
    ) -> Result<TransformOutput> {
        let composed = directive::compose(instruction);
        debug!(
            backend = %self.transformer.name(),
            kind = kind.as_str(),
            prompt_len = composed.len(),
            "Dispatching transform"
        );
        self.transformer.transform(image, &composed).await
    }
}
