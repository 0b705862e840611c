//! Read-only views of the session handed to the presentation layer

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::codec::{self, EncodedImage};
use crate::session::{PhaseKind, SessionState};

/// Base name of the downloaded file; the extension follows the image type.
pub const DOWNLOAD_BASENAME: &str = "ai-headshot";

pub fn download_filename(mime_type: &str) -> String {
    format!("{}.{}", DOWNLOAD_BASENAME, codec::extension_for(mime_type))
}

/// Everything the UI needs to render the current session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub phase: PhaseKind,
    pub selected_style: Option<String>,
    pub source_preview: Option<EncodedImage>,
    pub generated_image: Option<EncodedImage>,
    pub in_flight: bool,
    pub error: Option<String>,
    pub download_filename: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn capture(session_id: Uuid, state: &SessionState, updated_at: DateTime<Utc>) -> Self {
        let generated = state.generated();
        Self {
            session_id,
            phase: state.phase_kind(),
            selected_style: state.selected_style().map(|style| style.id.to_string()),
            source_preview: state.source().map(|source| source.preview().clone()),
            generated_image: generated.map(|image| image.encode()),
            in_flight: state.in_flight(),
            error: state.error().map(str::to_string),
            download_filename: generated.map(|image| download_filename(&image.mime_type)),
            updated_at,
        }
    }
}

/// The current result packaged for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}
