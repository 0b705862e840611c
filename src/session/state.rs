//! Session phases and the pure transition function

use serde::Serialize;

use crate::codec::{self, EncodedImage, ImagePayload, MimeType};
use crate::error::{AppError, Result};
use crate::generation::{TransformKind, TransformOutput};
use crate::styles::StyleDescriptor;

pub const MISSING_INPUTS: &str = "Please upload an image and select a style.";
pub const NO_GENERATED_IMAGE: &str = "No generated image to edit.";
pub const EMPTY_EDIT: &str = "Please describe the edit you want to make.";
pub const BUSY: &str = "A request is already in progress.";
pub const UPLOAD_LOCKED: &str = "Start over to upload a different photo.";
pub const STYLE_LOCKED: &str = "A style can only be chosen after uploading and before generating.";
pub const ALREADY_GENERATED: &str = "A headshot has already been generated. Edit it or start over.";

/// The uploaded photo. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    bytes: Vec<u8>,
    mime: MimeType,
    preview: EncodedImage,
}

impl SourceImage {
    pub fn new(bytes: Vec<u8>, mime: MimeType) -> Result<Self> {
        if bytes.is_empty() {
            return Err(AppError::PreviewEncodingFailed);
        }
        let preview = codec::encode(&bytes, mime.as_str());
        Ok(Self { bytes, mime, preview })
    }

    /// Rebuild from an encoded upload; the embedded type must be accepted.
    pub fn from_encoded(encoded: &EncodedImage) -> Result<Self> {
        let (bytes, mime) = codec::decode(encoded.as_str())?;
        Self::new(bytes, MimeType::parse(&mime)?)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> MimeType {
        self.mime
    }

    pub fn preview(&self) -> &EncodedImage {
        &self.preview
    }

    pub fn to_payload(&self) -> ImagePayload {
        ImagePayload::new(self.bytes.clone(), self.mime.as_str())
    }
}

/// The most recent result. Each success replaces the previous one.
pub type GeneratedImage = ImagePayload;

/// Workflow phase. Each variant carries exactly the data valid in it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    AwaitingUpload,
    AwaitingStyleSelection {
        source: SourceImage,
        style: Option<StyleDescriptor>,
    },
    Generating {
        source: SourceImage,
        style: StyleDescriptor,
        ticket: u64,
    },
    Ready {
        source: SourceImage,
        style: StyleDescriptor,
        generated: GeneratedImage,
    },
    Editing {
        source: SourceImage,
        style: StyleDescriptor,
        generated: GeneratedImage,
        ticket: u64,
    },
}

/// Phase name without its data, for logs and snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    AwaitingUpload,
    AwaitingStyleSelection,
    Generating,
    Ready,
    Editing,
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::AwaitingUpload => PhaseKind::AwaitingUpload,
            Phase::AwaitingStyleSelection { .. } => PhaseKind::AwaitingStyleSelection,
            Phase::Generating { .. } => PhaseKind::Generating,
            Phase::Ready { .. } => PhaseKind::Ready,
            Phase::Editing { .. } => PhaseKind::Editing,
        }
    }

    pub fn ticket(&self) -> Option<u64> {
        match self {
            Phase::Generating { ticket, .. } | Phase::Editing { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }
}

/// The single state record of a session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    phase: Phase,
    error: Option<String>,
    // Survives StartOver so tickets are never reused within a process.
    last_ticket: u64,
}

impl SessionState {
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn phase_kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn in_flight(&self) -> bool {
        self.phase.ticket().is_some()
    }

    pub fn in_flight_ticket(&self) -> Option<u64> {
        self.phase.ticket()
    }

    pub fn source(&self) -> Option<&SourceImage> {
        match &self.phase {
            Phase::AwaitingUpload => None,
            Phase::AwaitingStyleSelection { source, .. }
            | Phase::Generating { source, .. }
            | Phase::Ready { source, .. }
            | Phase::Editing { source, .. } => Some(source),
        }
    }

    pub fn selected_style(&self) -> Option<&StyleDescriptor> {
        match &self.phase {
            Phase::AwaitingUpload => None,
            Phase::AwaitingStyleSelection { style, .. } => style.as_ref(),
            Phase::Generating { style, .. } | Phase::Ready { style, .. } | Phase::Editing { style, .. } => {
                Some(style)
            }
        }
    }

    pub fn generated(&self) -> Option<&GeneratedImage> {
        match &self.phase {
            Phase::Ready { generated, .. } | Phase::Editing { generated, .. } => Some(generated),
            _ => None,
        }
    }

    /// True when every user-visible field matches a fresh session.
    pub fn is_initial(&self) -> bool {
        self.phase == Phase::AwaitingUpload && self.error.is_none()
    }

    fn issue_ticket(&mut self) -> u64 {
        self.last_ticket += 1;
        self.last_ticket
    }
}

/// User commands and call completions fed into [`reduce`]
#[derive(Debug, Clone)]
pub enum Action {
    Upload(SourceImage),
    /// Surface an error without changing phase (failed upload, unknown style)
    Rejected(String),
    SelectStyle(StyleDescriptor),
    Generate,
    Edit(String),
    Completed { ticket: u64, output: TransformOutput },
    Failed { ticket: u64, message: String },
    DismissError,
    StartOver,
}

/// A call the controller must dispatch after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformJob {
    pub ticket: u64,
    pub kind: TransformKind,
    pub image: ImagePayload,
    pub instruction: String,
}

#[derive(Debug)]
pub struct Transition {
    pub state: SessionState,
    pub job: Option<TransformJob>,
}

/// Apply `action` to `state`.
///
/// Entering `Generating` or `Editing` clears the error and yields a job.
/// Completions whose ticket is not the in-flight one leave the state as is.
pub fn reduce(mut state: SessionState, action: Action) -> Transition {
    let phase = std::mem::take(&mut state.phase);

    let (phase, job) = match (phase, action) {
        (Phase::AwaitingUpload | Phase::AwaitingStyleSelection { .. }, Action::Upload(source)) => {
            state.error = None;
            (Phase::AwaitingStyleSelection { source, style: None }, None)
        }
        (phase, Action::Upload(_)) => reject(&mut state, phase, UPLOAD_LOCKED),

        (phase, Action::Rejected(message)) => {
            state.error = Some(message);
            (phase, None)
        }

        (Phase::AwaitingStyleSelection { source, .. }, Action::SelectStyle(style)) => {
            (Phase::AwaitingStyleSelection { source, style: Some(style) }, None)
        }
        (phase, Action::SelectStyle(_)) => reject(&mut state, phase, STYLE_LOCKED),

        (Phase::AwaitingStyleSelection { source, style: Some(style) }, Action::Generate) => {
            state.error = None;
            let ticket = state.issue_ticket();
            let job = TransformJob {
                ticket,
                kind: TransformKind::Style,
                image: source.to_payload(),
                instruction: style.prompt.to_string(),
            };
            (Phase::Generating { source, style, ticket }, Some(job))
        }
        (phase @ Phase::Ready { .. }, Action::Generate) => reject(&mut state, phase, ALREADY_GENERATED),
        (phase, Action::Generate) => reject(&mut state, phase, MISSING_INPUTS),

        (Phase::Ready { source, style, generated }, Action::Edit(text)) => {
            let instruction = text.trim();
            if instruction.is_empty() {
                state.error = Some(EMPTY_EDIT.to_string());
                (Phase::Ready { source, style, generated }, None)
            } else {
                state.error = None;
                let ticket = state.issue_ticket();
                let job = TransformJob {
                    ticket,
                    kind: TransformKind::Edit,
                    image: generated.clone(),
                    instruction: instruction.to_string(),
                };
                (Phase::Editing { source, style, generated, ticket }, Some(job))
            }
        }
        (phase, Action::Edit(_)) => reject(&mut state, phase, NO_GENERATED_IMAGE),

        (Phase::Generating { source, style, ticket }, Action::Completed { ticket: done, output })
            if ticket == done =>
        {
            let mime_type = output
                .mime_type
                .as_deref()
                .and_then(codec::normalize_image_mime)
                .unwrap_or_else(|| source.mime().as_str().to_string());
            let generated = ImagePayload::new(output.bytes, mime_type);
            (Phase::Ready { source, style, generated }, None)
        }
        (Phase::Editing { source, style, generated, ticket }, Action::Completed { ticket: done, output })
            if ticket == done =>
        {
            let generated = ImagePayload::new(output.bytes, generated.mime_type);
            (Phase::Ready { source, style, generated }, None)
        }
        (Phase::Generating { source, style, ticket }, Action::Failed { ticket: done, message })
            if ticket == done =>
        {
            state.error = Some(message);
            (Phase::AwaitingStyleSelection { source, style: Some(style) }, None)
        }
        (Phase::Editing { source, style, generated, ticket }, Action::Failed { ticket: done, message })
            if ticket == done =>
        {
            state.error = Some(message);
            (Phase::Ready { source, style, generated }, None)
        }
        (phase, Action::Completed { .. } | Action::Failed { .. }) => (phase, None),

        (phase, Action::DismissError) => {
            state.error = None;
            (phase, None)
        }

        (_, Action::StartOver) => {
            state.error = None;
            (Phase::AwaitingUpload, None)
        }
    };

    state.phase = phase;
    Transition { state, job }
}

fn reject(state: &mut SessionState, phase: Phase, message: &str) -> (Phase, Option<TransformJob>) {
    let message = if phase.ticket().is_some() { BUSY } else { message };
    state.error = Some(message.to_string());
    (phase, None)
}
