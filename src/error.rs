//! Error handling for Volux
//!
//! Every error in this crate is recoverable at the session boundary:
//! out-of-domain input is rejected immediately, graph failures fall back
//! to unprocessed playback, and transport refusals leave the session
//! stopped for an explicit user retry.

use thiserror::Error;

/// Result type alias for Volux operations
pub type Result<T> = std::result::Result<T, VoluxError>;

/// Main error type for Volux operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoluxError {
    /// Out-of-domain numeric input. Rejected, never silently clamped.
    #[error("Invalid argument {param}: got {value}, expected {expected}")]
    InvalidArgument {
        param: &'static str,
        value: f64,
        expected: &'static str,
    },

    /// The platform could not allocate a real-time processing context.
    #[error("Signal graph initialization failed: {reason}")]
    GraphInitFailed { reason: String },

    /// A graph operation was requested before the graph was built,
    /// or after it was disposed.
    #[error("Signal graph is not ready")]
    GraphNotReady,

    /// The media transport rejected a play request (e.g. autoplay policy,
    /// decode error).
    #[error("Playback failed: {reason}")]
    PlaybackFailed { reason: String },

    /// File I/O failure from the offline render path
    #[error("I/O error: {reason}")]
    Io { reason: String },
}

impl VoluxError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            VoluxError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            VoluxError::GraphInitFailed { .. } => "GRAPH_INIT_FAILED",
            VoluxError::GraphNotReady => "GRAPH_NOT_READY",
            VoluxError::PlaybackFailed { .. } => "PLAYBACK_FAILED",
            VoluxError::Io { .. } => "IO_ERROR",
        }
    }

    /// Check if this error is recoverable.
    ///
    /// No error in this crate is fatal to the process; the distinction is
    /// whether the same call can be retried as-is (transport/graph errors)
    /// or the caller must fix its input first.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, VoluxError::InvalidArgument { .. })
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            VoluxError::GraphInitFailed { .. } => vec![
                "Playback continues unprocessed; EQ and volume shaping are unavailable",
                "Check that the host audio platform can allocate a processing context",
            ],
            VoluxError::GraphNotReady => vec![
                "Start playback (or call prepare()) before toggling the equalizer",
            ],
            VoluxError::PlaybackFailed { .. } => vec![
                "Retry playback from an explicit user action",
                "Check the host's autoplay policy and media source",
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = VoluxError::InvalidArgument {
            param: "slider",
            value: 1.5,
            expected: "0.0..=1.0",
        };
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
        assert_eq!(VoluxError::GraphNotReady.error_code(), "GRAPH_NOT_READY");
    }

    #[test]
    fn test_recoverability() {
        let err = VoluxError::PlaybackFailed {
            reason: "autoplay blocked".to_string(),
        };
        assert!(err.is_recoverable());
        assert!(!err.recovery_suggestions().is_empty());

        let err = VoluxError::InvalidArgument {
            param: "q",
            value: -1.0,
            expected: "> 0",
        };
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_display_includes_reason() {
        let err = VoluxError::GraphInitFailed {
            reason: "no audio device".to_string(),
        };
        assert!(err.to_string().contains("no audio device"));
    }
}
