//! Headshot Studio
//!
//! Turns an uploaded selfie into a professionally styled headshot by sending
//! it, together with a style or edit instruction, to a generative
//! image-editing API, and lets the user refine the result before download.

pub mod api;
pub mod codec;
pub mod config;
pub mod controller;
pub mod error;
pub mod generation;
pub mod session;
pub mod styles;

pub use error::{AppError, Result};

use std::sync::Arc;

use controller::WorkflowController;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<config::Settings>,
    pub controller: Arc<WorkflowController>,
}
