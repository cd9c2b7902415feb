//! Error types shared across Eyestream crates.
//!
//! Errors are split in two tiers. [`FrameError`] covers problems confined to
//! a single received message: the session logs them and moves on to the next
//! message without touching any history window. Everything else in
//! [`EyestreamError`] is fatal for the processing loop.

use std::path::PathBuf;

/// A failure confined to one incoming frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Malformed or short multi-part message.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Image buffer could not be decoded to the configured shape.
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Gaze payload does not match the expected binary layout.
    #[error("Unpack error: {message}")]
    Unpack { message: String },
}

impl FrameError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    pub fn unpack(msg: impl Into<String>) -> Self {
        Self::Unpack {
            message: msg.into(),
        }
    }

    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Decode { .. } => "decode",
            Self::Unpack { .. } => "unpack",
        }
    }
}

/// Top-level error type for Eyestream operations.
#[derive(Debug, thiserror::Error)]
pub enum EyestreamError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("Frame source error: {message}")]
    Source { message: String },

    #[error("Outlet error: {message}")]
    Outlet { message: String },

    #[error("Scene error: {message}")]
    Scene { message: String },

    #[error("Display error: {message}")]
    Display { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using EyestreamError.
pub type EyestreamResult<T> = Result<T, EyestreamError>;

impl EyestreamError {
    pub fn source_failed(msg: impl Into<String>) -> Self {
        Self::Source {
            message: msg.into(),
        }
    }

    pub fn outlet(msg: impl Into<String>) -> Self {
        Self::Outlet {
            message: msg.into(),
        }
    }

    pub fn scene(msg: impl Into<String>) -> Self {
        Self::Scene {
            message: msg.into(),
        }
    }

    pub fn display(msg: impl Into<String>) -> Self {
        Self::Display {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether the loop may skip the offending frame and keep running.
    pub fn is_frame_local(&self) -> bool {
        matches!(self, Self::Frame(_))
    }
}
