//! Workflow controller - owns the session and sequences its phases

pub mod snapshot;

use chrono::{DateTime, Utc};
use futures::future::{AbortHandle, AbortRegistration, Abortable};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::codec::{self, MimeType};
use crate::error::{AppError, Result};
use crate::generation::{GenerationService, TransformKind};
use crate::session::{reduce, Action, SessionState, SourceImage, TransformJob, Transition};
use crate::styles::StyleCatalog;

pub use snapshot::{download_filename, DownloadArtifact, SessionSnapshot};

struct Inner {
    session_id: Uuid,
    state: SessionState,
    updated_at: DateTime<Utc>,
    in_flight: Option<(u64, AbortHandle)>,
}

impl Inner {
    fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: SessionState::default(),
            updated_at: Utc::now(),
            in_flight: None,
        }
    }

    fn apply(&mut self, action: Action) -> Option<TransformJob> {
        if let Action::Completed { ticket, .. } | Action::Failed { ticket, .. } = &action {
            if self.state.in_flight_ticket() != Some(*ticket) {
                warn!(session = %self.session_id, ticket = *ticket, "Discarding stale result");
            }
        }

        let before = self.state.phase_kind();
        let Transition { state, job } = reduce(std::mem::take(&mut self.state), action);
        self.state = state;
        self.updated_at = Utc::now();

        let after = self.state.phase_kind();
        if before != after {
            info!(session = %self.session_id, from = ?before, to = ?after, "Phase changed");
        }
        if let Some(message) = self.state.error() {
            debug!(session = %self.session_id, error = %message, "Session error set");
        }
        job
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self.session_id, &self.state, self.updated_at)
    }
}

/// Single-session workflow controller
pub struct WorkflowController {
    inner: Arc<Mutex<Inner>>,
    service: GenerationService,
    catalog: StyleCatalog,
}

impl WorkflowController {
    pub fn new(service: GenerationService, catalog: StyleCatalog) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::new())),
            service,
            catalog,
        }
    }

    pub fn catalog(&self) -> &StyleCatalog {
        &self.catalog
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().snapshot()
    }

    /// Copy of the raw session state
    pub fn state(&self) -> SessionState {
        self.inner.lock().state.clone()
    }

    fn apply(&self, action: Action) -> SessionSnapshot {
        let mut inner = self.inner.lock();
        inner.apply(action);
        inner.snapshot()
    }

    /// Accept an uploaded photo held in memory.
    pub fn upload(&self, bytes: Vec<u8>, declared_mime: Option<&str>) -> SessionSnapshot {
        let source = MimeType::resolve(declared_mime, &bytes).and_then(|mime| SourceImage::new(bytes, mime));
        self.apply(upload_action(source))
    }

    /// Accept an uploaded photo from disk.
    pub async fn upload_file(&self, path: &Path, declared_mime: Option<&str>) -> SessionSnapshot {
        let source = codec::encode_file(path, declared_mime)
            .await
            .and_then(|encoded| SourceImage::from_encoded(&encoded));
        self.apply(upload_action(source))
    }

    pub fn select_style(&self, style_id: &str) -> SessionSnapshot {
        let action = match self.catalog.find(style_id) {
            Some(style) => Action::SelectStyle(style.clone()),
            None => Action::Rejected(format!("Unknown style: {}", style_id)),
        };
        self.apply(action)
    }

    /// Generate the styled headshot from the uploaded photo.
    pub async fn generate(&self) -> SessionSnapshot {
        self.run(Action::Generate).await
    }

    /// Refine the current headshot with a free-text instruction.
    pub async fn edit(&self, instruction: &str) -> SessionSnapshot {
        self.run(Action::Edit(instruction.to_string())).await
    }

    pub fn dismiss_error(&self) -> SessionSnapshot {
        self.apply(Action::DismissError)
    }

    /// Reset the session, abandoning any call still in flight.
    pub fn start_over(&self) -> SessionSnapshot {
        let mut inner = self.inner.lock();
        if let Some((ticket, handle)) = inner.in_flight.take() {
            handle.abort();
            debug!(session = %inner.session_id, ticket, "Aborted in-flight transform");
        }
        inner.apply(Action::StartOver);
        inner.session_id = Uuid::new_v4();
        info!(session = %inner.session_id, "Session reset");
        inner.snapshot()
    }

    /// The current result as a downloadable file
    pub fn download(&self) -> Result<DownloadArtifact> {
        let inner = self.inner.lock();
        let generated = inner
            .state
            .generated()
            .ok_or_else(|| AppError::validation("No generated image to download."))?;
        Ok(DownloadArtifact {
            filename: download_filename(&generated.mime_type),
            mime_type: generated.mime_type.clone(),
            bytes: generated.bytes.clone(),
        })
    }

    fn begin(&self, action: Action) -> Option<(TransformJob, AbortRegistration)> {
        let mut inner = self.inner.lock();
        let job = inner.apply(action)?;
        let (handle, registration) = AbortHandle::new_pair();
        inner.in_flight = Some((job.ticket, handle));
        Some((job, registration))
    }

    async fn run(&self, action: Action) -> SessionSnapshot {
        if let Some((job, registration)) = self.begin(action) {
            // The call runs on its own task so a dropped caller cannot
            // leave the session stuck in flight.
            let task = tokio::spawn(complete(self.inner.clone(), self.service.clone(), job, registration));
            if let Err(e) = task.await {
                error!(error = %e, "Transform task failed to complete");
            }
        }
        self.snapshot()
    }
}

fn upload_action(source: Result<SourceImage>) -> Action {
    match source {
        Ok(source) => Action::Upload(source),
        Err(e) => {
            warn!(error = %e, "Upload rejected");
            Action::Rejected(e.user_message())
        }
    }
}

async fn complete(
    inner: Arc<Mutex<Inner>>,
    service: GenerationService,
    job: TransformJob,
    registration: AbortRegistration,
) {
    let ticket = job.ticket;
    let call = async {
        match job.kind {
            TransformKind::Style => service.style_transform(&job.image, &job.instruction).await,
            TransformKind::Edit => service.edit_transform(&job.image, &job.instruction).await,
        }
    };
    let outcome = Abortable::new(call, registration).await;

    let mut inner = inner.lock();
    if matches!(inner.in_flight, Some((current, _)) if current == ticket) {
        inner.in_flight = None;
    }

    match outcome {
        Err(_aborted) => {
            debug!(ticket, "Transform abandoned");
        }
        Ok(Ok(output)) => {
            inner.apply(Action::Completed { ticket, output });
        }
        Ok(Err(e)) => {
            warn!(ticket, kind = job.kind.as_str(), error = %e, "Transform failed");
            inner.apply(Action::Failed {
                ticket,
                message: e.user_message(),
            });
        }
    }
}
