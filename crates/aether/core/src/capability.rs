//! Seams to the outside world: microphone analysis, orientation events and
//! haptic output.
//!
//! The core never talks to hardware. A host hands the session controller a
//! [`Capabilities`] bundle and the controller acquires what it needs during
//! `start()`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::{CaptureError, HapticError};
use crate::orientation::OrientationReading;

/// Default number of frequency bins (half of a 256-sample transform window).
pub const DEFAULT_BIN_COUNT: usize = 128;

/// Live frequency analysis of the microphone stream.
pub trait FrequencyAnalyzer: Send {
    /// Latest byte magnitudes, one per bin. `None` while the analyzer has not
    /// produced its first frame.
    fn frequency_snapshot(&mut self) -> Option<&[u8]>;
}

/// Acquires microphone access and builds an analyzer over it.
#[async_trait]
pub trait AudioCapture: Send + Sync {
    async fn acquire(&self, bin_count: usize) -> Result<Box<dyn FrequencyAnalyzer>, CaptureError>;
}

/// Outcome of the orientation consent step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionOutcome {
    Granted,
    Denied,
    /// The platform does not gate orientation events.
    NotRequired,
}

impl PermissionOutcome {
    pub fn allows_updates(self) -> bool {
        !matches!(self, Self::Denied)
    }
}

impl fmt::Display for PermissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted => write!(f, "granted"),
            Self::Denied => write!(f, "denied"),
            Self::NotRequired => write!(f, "not required"),
        }
    }
}

/// Push-driven device orientation.
#[async_trait]
pub trait OrientationSource: Send + Sync {
    async fn request_permission(&self) -> PermissionOutcome;

    /// Start delivering readings. Dropping the receiver unsubscribes.
    async fn subscribe(&self) -> mpsc::Receiver<OrientationReading>;
}

/// Vibration motor. Fire-and-forget.
pub trait HapticDevice: Send + Sync {
    /// `pattern_ms` alternates on and off durations, starting with on.
    fn pulse(&self, pattern_ms: &[u64]) -> Result<(), HapticError>;
}

/// A device without a motor.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl HapticDevice for NoHaptics {
    fn pulse(&self, _pattern_ms: &[u64]) -> Result<(), HapticError> {
        Err(HapticError::Unsupported)
    }
}

/// Everything the session needs from its host.
#[derive(Clone)]
pub struct Capabilities {
    pub audio: Arc<dyn AudioCapture>,
    pub orientation: Arc<dyn OrientationSource>,
    pub haptics: Arc<dyn HapticDevice>,
}

impl Capabilities {
    pub fn new(
        audio: Arc<dyn AudioCapture>,
        orientation: Arc<dyn OrientationSource>,
        haptics: Arc<dyn HapticDevice>,
    ) -> Self {
        Self {
            audio,
            orientation,
            haptics,
        }
    }
}
