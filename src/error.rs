//! Error types surfaced by the pipeline.
//!
//! Only misuse of the frame state machine and invalid setup are reported as
//! errors. Problems with an individual primitive are logged and the primitive
//! is dropped; heap exhaustion aborts the process.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// `begin_frame` was called while a frame was still accumulating.
    FrameInProgress,
    /// A drawing or compositing call was made outside of a frame.
    NoFrameInProgress,
    /// The viewport has a zero dimension.
    InvalidViewport { width: u32, height: u32 },
    /// The camera description cannot produce a projection.
    InvalidCamera(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::FrameInProgress => write!(f, "a frame is already accumulating"),
            RenderError::NoFrameInProgress => write!(f, "no frame is accumulating"),
            RenderError::InvalidViewport { width, height } => {
                write!(f, "invalid viewport {}x{}", width, height)
            }
            RenderError::InvalidCamera(reason) => write!(f, "invalid camera: {}", reason),
        }
    }
}

impl std::error::Error for RenderError {}
