//! Error types for aether-core.
//!
//! Only session startup can fail in a way the caller sees. Everything on the
//! tick path is total: an unavailable snapshot skips the tick and a missing
//! haptic motor is ignored.

use thiserror::Error;

/// Failure to acquire the audio capture capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The user or platform refused microphone access.
    #[error("microphone permission denied")]
    PermissionDenied,

    /// No usable capture device.
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),
}

/// Failure reported by a haptic device. Never surfaced past the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HapticError {
    #[error("haptic feedback not supported on this device")]
    Unsupported,

    #[error("haptic pulse failed: {0}")]
    Failed(String),
}

/// Rejected session configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} out of range: {value} (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("anomaly vocabulary is empty")]
    EmptyVocabulary,
}

/// Errors surfaced by [`crate::SessionController::start`].
#[derive(Debug, Error)]
pub enum StartupError {
    /// Audio capture could not be acquired; the session stays `NotStarted`.
    #[error("permissions required to operate the device: {0}")]
    Audio(#[from] CaptureError),

    /// `start()` was called on a session that already left `NotStarted`.
    #[error("session already started")]
    AlreadyStarted,

    #[error("invalid session configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, StartupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_error_wraps_capture_error() {
        let err: StartupError = CaptureError::PermissionDenied.into();
        let msg = err.to_string();
        assert!(msg.contains("permissions required"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn config_error_display() {
        let e = ConfigError::OutOfRange {
            field: "anomaly.gate",
            value: 1.5,
            expected: "0.0..1.0",
        };
        let msg = e.to_string();
        assert!(msg.contains("anomaly.gate"));
        assert!(msg.contains("1.5"));

        let e = ConfigError::Zero {
            field: "log.capacity",
        };
        assert_eq!(e.to_string(), "log.capacity must be greater than zero");
    }

    #[test]
    fn invalid_config_converts() {
        let err: StartupError = ConfigError::EmptyVocabulary.into();
        assert!(matches!(err, StartupError::InvalidConfig(_)));
        assert!(err.to_string().contains("vocabulary"));
    }

    #[test]
    fn result_type_works() {
        let ok: SessionResult<u8> = Ok(1);
        assert!(ok.is_ok());
        let err: SessionResult<u8> = Err(StartupError::AlreadyStarted);
        assert!(err.is_err());
    }
}
