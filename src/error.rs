//! Error types for the narration subsystem.

/// Top-level error type for the narration crate.
///
/// None of these ever cross the host tick boundary: every public entry point
/// used from the UI thread is total and degrades to "produce nothing".
/// Errors exist for the internals that genuinely can fail (config I/O, audio
/// devices, WAV decode, HTTP) and for binaries.
#[derive(Debug, thiserror::Error)]
pub enum ClarionError {
    /// Audio device or playback error.
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech backend error (HTTP transport, synthesis process).
    #[error("speech backend error: {0}")]
    Backend(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ClarionError>;
