#![deny(unsafe_code)]
//! # aether-core
//!
//! The sampling, scoring and triggering loop of the Aether detector.
//!
//! ## Architecture
//!
//! ```text
//!   AudioCapture ──► FrequencyAnalyzer ─┐
//!                                        ▼
//!                               ┌──────────────────┐
//!                               │  EntropyEngine   │  mean magnitude + U[0, K)
//!                               └────────┬─────────┘
//!                          ┌─────────────┴─────────────┐
//!                          ▼                           ▼
//!                 ┌─────────────────┐        ┌──────────────────┐
//!                 │ GlitchStateMach │        │  AnomalyTrigger  │──► HapticDevice
//!                 └────────┬────────┘        └────────┬─────────┘
//!                          │      DeferredResets      │
//!                          ▼                          ▼
//!                   SessionSnapshot ◄──────────── EventLog
//!                          ▲
//!   OrientationSource ──► OrientationTracker
//! ```
//!
//! All state lives in [`SessionCore`], owned by one runner task spawned by
//! [`SessionController::start`]. Presentation reads [`SessionSnapshot`]s from
//! [`SessionController::subscribe`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use aether_core::{Capabilities, SessionConfig, SessionController};
//!
//! let mut session = SessionController::new(SessionConfig::default(), capabilities);
//! session.start().await?;
//! let mut view = session.subscribe();
//! while view.changed().await.is_ok() {
//!     let snap = view.borrow().clone();
//!     println!("{:?} glitch={}", snap.entropy, snap.glitch);
//! }
//! ```

pub mod anomaly;
pub mod capability;
pub mod config;
pub mod deferred;
pub mod entropy;
pub mod error;
pub mod event_log;
pub mod glitch;
pub mod orientation;
pub mod random;
pub mod session;
pub mod word_bank;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use anomaly::{alert_message, AnomalyEvent, AnomalyTrigger};
pub use capability::{
    AudioCapture, Capabilities, FrequencyAnalyzer, HapticDevice, NoHaptics, OrientationSource,
    PermissionOutcome, DEFAULT_BIN_COUNT,
};
pub use config::{AnomalyConfig, GlitchConfig, LogConfig, Profile, SamplingConfig, SessionConfig};
pub use deferred::{DeferredResets, ResetTarget};
pub use entropy::{mean_magnitude, EntropyEngine, EntropyReading, EntropyScore};
pub use error::{CaptureError, ConfigError, HapticError, SessionResult, StartupError};
pub use event_log::{
    Clock, EventLog, LogEntry, Severity, SystemClock, ALERT_MARKER, DEFAULT_LOG_CAPACITY,
};
pub use glitch::GlitchStateMachine;
pub use orientation::{Heading, OrientationReading, OrientationTracker};
pub use random::{RandomSource, ScriptedRandom, StdRandom};
pub use session::{
    SessionController, SessionCore, SessionId, SessionSnapshot, SessionState, TickOutcome,
    CALIBRATING_MESSAGE, POWER_ON_MESSAGE,
};
pub use word_bank::{WordBank, DEFAULT_WORDS};
