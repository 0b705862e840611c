//! Session state machine

pub mod state;

pub use state::{
    reduce, Action, GeneratedImage, Phase, PhaseKind, SessionState, SourceImage, TransformJob, Transition,
};
