//! Shared fixtures

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

use headshot_studio::codec::ImagePayload;
use headshot_studio::controller::WorkflowController;
use headshot_studio::generation::{GenerationService, ImageTransformer, TransformOutput};
use headshot_studio::styles::StyleCatalog;
use headshot_studio::{AppError, Result};

pub const JPEG: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01];

/// Transformer that replays queued outcomes and records every call.
#[derive(Default)]
pub struct ScriptedTransformer {
    outcomes: Mutex<VecDeque<Result<TransformOutput>>>,
    calls: Mutex<Vec<(ImagePayload, String)>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedTransformer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_image(&self, bytes: &[u8], mime_type: Option<&str>) {
        self.outcomes.lock().push_back(Ok(TransformOutput {
            bytes: bytes.to_vec(),
            mime_type: mime_type.map(str::to_string),
        }));
    }

    pub fn push_error(&self, error: AppError) {
        self.outcomes.lock().push_back(Err(error));
    }

    /// Make the next calls wait until the returned handle is notified.
    pub fn hold(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock() = Some(notify.clone());
        notify
    }

    pub fn calls(&self) -> Vec<(ImagePayload, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ImageTransformer for ScriptedTransformer {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn transform(&self, image: &ImagePayload, instruction: &str) -> Result<TransformOutput> {
        self.calls.lock().push((image.clone(), instruction.to_string()));
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.outcomes
            .lock()
            .pop_front()
            .unwrap_or(Err(AppError::GenerationFailed))
    }
}

pub fn controller_with(transformer: Arc<ScriptedTransformer>) -> WorkflowController {
    WorkflowController::new(GenerationService::new(transformer), StyleCatalog::builtin())
}
