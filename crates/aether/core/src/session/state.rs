//! Session lifecycle state and the read-only view handed to presentation.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capability::PermissionOutcome;
use crate::entropy::EntropyScore;
use crate::event_log::LogEntry;
use crate::orientation::Heading;

/// Unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a session.
///
/// `NotStarted → Starting → Running → Stopped`. A failed start falls back
/// from `Starting` to `NotStarted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    NotStarted,
    Starting,
    Running,
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::Starting => write!(f, "starting"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Everything presentation may read. Republished on every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub state: SessionState,
    pub entropy: Option<EntropyScore>,
    pub heading: Option<Heading>,
    pub glitch: bool,
    pub active_anomaly: Option<String>,
    pub orientation_permission: Option<PermissionOutcome>,
    /// Newest first.
    pub log: Vec<LogEntry>,
}

impl SessionSnapshot {
    /// The view before `start()` has done anything.
    pub fn idle(session_id: SessionId) -> Self {
        Self {
            session_id,
            state: SessionState::NotStarted,
            entropy: None,
            heading: None,
            glitch: false,
            active_anomaly: None,
            orientation_permission: None,
            log: Vec::new(),
        }
    }

    /// Alert entries, newest first.
    pub fn alerts(&self) -> impl Iterator<Item = &LogEntry> {
        self.log.iter().filter(|e| e.is_alert())
    }
}
