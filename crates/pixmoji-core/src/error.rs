//! Error types for pixmoji
//!
//! Only contract violations travel through these types. Failed emoji
//! lookups are absorbed by the asset source and never reach a caller.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PixmojiError>;

/// Main error type for pixmoji
#[derive(Debug, Error)]
pub enum PixmojiError {
    #[error("Renderer is closed")]
    Closed,

    #[error("Renderer has already been closed")]
    AlreadyClosed,

    #[error("Renderer is already open")]
    AlreadyOpen,

    #[error("Invalid canvas dimensions: {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("Invalid anchor {0:?}: expected a horizontal code (l, m, r, s) followed by a vertical code (a, t, m, s, b, d)")]
    InvalidAnchor(String),

    #[error("Anchor {0:?} is not supported for multiline text")]
    UnsupportedMultilineAnchor(String),

    #[error("ttb direction is unsupported for multiline text")]
    UnsupportedMultilineDirection,

    #[error("align must be \"left\", \"center\" or \"right\", got {0:?}")]
    InvalidAlign(String),

    #[error("Unknown text direction: {0:?}")]
    InvalidDirection(String),

    #[error("Rendering failed: {0}")]
    Rendering(#[from] RenderError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failures of the fetch collaborator
///
/// A non-success HTTP status is not an error here; it comes back as a
/// response and the asset source decides what it means.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Fetch session is closed")]
    SessionClosed,
}

/// Canvas failures
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Font error: {0}")]
    Font(String),

    #[error("Bitmap out of bounds at ({x}, {y})")]
    OutOfBounds { x: i64, y: i64 },

    #[error("Backend error: {0}")]
    BackendError(String),
}
