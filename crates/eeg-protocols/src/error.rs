//! # Error Types
//!
//! Semantic error types for experiment protocols. Every variant carries
//! enough context to tell the operator which phase failed and what to check
//! on the rig before re-running.
//!
//! Device-level failures are split the way the board lifecycle is split:
//! opening/preparing a session ([`ProtocolError::ConnectionFailed`]),
//! streaming ([`ProtocolError::StreamFailed`]), and marker insertion
//! ([`ProtocolError::MarkerFailed`]). Persistence failures carry the target
//! path so the operator can recover the data block manually.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient Result alias for protocol operations.
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

/// All errors that can occur while running an experiment protocol.
#[derive(Error, Debug)]
pub enum ProtocolError {
    // ─── Device ─────────────────────────────────────────────────────
    /// The board could not be opened or its session could not be prepared.
    #[error("Failed to prepare board {board_id}: {reason}. Check the cable/dongle and connection flags.")]
    ConnectionFailed { board_id: i32, reason: String },

    /// Starting, stopping, or reading the data stream failed.
    #[error("Stream error: {reason}")]
    StreamFailed { reason: String },

    /// A marker could not be written into the stream.
    #[error("Failed to insert marker {value}: {reason}")]
    MarkerFailed { value: f64, reason: String },

    /// A board operation was called in the wrong lifecycle state.
    #[error("Cannot {operation} while the board session is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    // ─── Persistence ────────────────────────────────────────────────
    /// The captured data block could not be written to disk.
    #[error("Failed to save recording to '{}': {reason}", path.display())]
    PersistenceFailed { path: PathBuf, reason: String },

    // ─── Operator ───────────────────────────────────────────────────
    /// The operator aborted the protocol (Ctrl+C, Esc, or end of input).
    #[error("Protocol interrupted by operator")]
    Interrupted,

    /// Reading from the operator console failed.
    #[error("Console error: {reason}")]
    ConsoleError { reason: String },

    // ─── Audio ──────────────────────────────────────────────────────
    /// The audio cue could not be played.
    #[error("Audio cue error: {reason}")]
    AudioError { reason: String },

    // ─── Config ─────────────────────────────────────────────────────
    /// Configuration file error (missing, malformed, or invalid values).
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    // ─── I/O ────────────────────────────────────────────────────────
    /// Filesystem or I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Returns `true` if the error originated from the acquisition device.
    pub fn is_device_error(&self) -> bool {
        matches!(
            self,
            ProtocolError::ConnectionFailed { .. }
                | ProtocolError::StreamFailed { .. }
                | ProtocolError::MarkerFailed { .. }
                | ProtocolError::InvalidState { .. }
        )
    }

    /// Returns `true` if the operator aborted the run.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, ProtocolError::Interrupted)
    }
}

// ─── From impls for external error types ────────────────────────────────

#[cfg(feature = "config-toml")]
impl From<toml::de::Error> for ProtocolError {
    fn from(err: toml::de::Error) -> Self {
        ProtocolError::ConfigError {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_device_error() {
        assert!(
            ProtocolError::ConnectionFailed {
                board_id: 0,
                reason: "no such port".into(),
            }
            .is_device_error()
        );
        assert!(ProtocolError::StreamFailed { reason: "x".into() }.is_device_error());
        assert!(
            ProtocolError::MarkerFailed {
                value: 1.0,
                reason: "x".into(),
            }
            .is_device_error()
        );
        assert!(
            ProtocolError::InvalidState {
                operation: "start stream",
                state: "released",
            }
            .is_device_error()
        );
        assert!(!ProtocolError::Interrupted.is_device_error());
        assert!(
            !ProtocolError::PersistenceFailed {
                path: "data.npy".into(),
                reason: "disk full".into(),
            }
            .is_device_error()
        );
    }

    #[test]
    fn test_is_interrupt() {
        assert!(ProtocolError::Interrupted.is_interrupt());
        assert!(!ProtocolError::ConsoleError { reason: "x".into() }.is_interrupt());
    }

    #[test]
    fn test_messages_carry_context() {
        let err = ProtocolError::ConnectionFailed {
            board_id: 0,
            reason: "unable to open /dev/ttyUSB0".into(),
        };
        assert!(err.to_string().contains("board 0"));
        assert!(err.to_string().contains("/dev/ttyUSB0"));

        let err = ProtocolError::PersistenceFailed {
            path: PathBuf::from("out/data.npy"),
            reason: "permission denied".into(),
        };
        assert!(err.to_string().contains("out/data.npy"));

        let err = ProtocolError::InvalidState {
            operation: "insert marker",
            state: "prepared",
        };
        assert_eq!(
            err.to_string(),
            "Cannot insert marker while the board session is prepared"
        );
    }

    #[cfg(feature = "config-toml")]
    #[test]
    fn test_from_toml_error_conversion() {
        #[derive(Debug, serde::Deserialize)]
        struct DummyConfig {
            _value: String,
        }

        let toml_err = toml::from_str::<DummyConfig>("value = [").unwrap_err();
        let err: ProtocolError = toml_err.into();
        assert!(matches!(err, ProtocolError::ConfigError { .. }));
        assert!(err.to_string().contains("Configuration error"));
    }
}
