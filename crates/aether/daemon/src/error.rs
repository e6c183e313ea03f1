//! Error types for aether-daemon

use aether_core::StartupError;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session could not start
    #[error("Startup error: {0}")]
    Startup(#[from] StartupError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for DaemonError {
    fn from(err: config::ConfigError) -> Self {
        DaemonError::Config(err.to_string())
    }
}

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;

#[cfg(test)]
mod tests {
    use super::*;
    use aether_core::CaptureError;

    #[test]
    fn test_startup_error_message() {
        let err: DaemonError = StartupError::Audio(CaptureError::PermissionDenied).into();
        assert_eq!(
            err.to_string(),
            "Startup error: permissions required to operate the device: microphone permission denied"
        );
    }

    #[test]
    fn test_config_error_conversion() {
        let err: DaemonError = config::ConfigError::Message("bad value".into()).into();
        assert!(matches!(err, DaemonError::Config(ref msg) if msg.contains("bad value")));
    }
}
