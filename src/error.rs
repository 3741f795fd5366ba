//! Error type for the fallible construction and I/O surfaces.
//!
//! Routing and editing are total and never return errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("invalid handle: {0}")]
    InvalidHandle(u32),

    #[error("handle {0} has no parent")]
    InvalidParent(u32),

    #[error("appending {child} under {parent} would create a cycle")]
    CycleDetected { parent: u32, child: u32 },

    #[error("unknown text alignment {0:?} (expected left, center or right)")]
    InvalidAlignment(String),

    #[error("theme configuration: {0}")]
    Theme(#[from] serde_json::Error),

    #[error("terminal backend: {0}")]
    Backend(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OverlayError>;
