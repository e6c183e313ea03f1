//! Synchronous owner of all session state.
//!
//! [`SessionCore`] holds the score, heading, glitch flag, active anomaly,
//! event log and the deferred-reset queue as fields. Every mutation goes
//! through one of its methods, which the session runner calls from a single
//! task. Time is passed in, so the whole loop can be driven by hand.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::debug;

use crate::anomaly::{AnomalyEvent, AnomalyTrigger};
use crate::capability::{FrequencyAnalyzer, HapticDevice, PermissionOutcome};
use crate::config::SessionConfig;
use crate::deferred::{DeferredResets, ResetTarget};
use crate::entropy::{EntropyEngine, EntropyReading, EntropyScore};
use crate::error::ConfigError;
use crate::event_log::{Clock, EventLog, SystemClock};
use crate::glitch::GlitchStateMachine;
use crate::orientation::{Heading, OrientationReading, OrientationTracker};
use crate::random::RandomSource;
use crate::session::state::{SessionId, SessionSnapshot, SessionState};

pub const POWER_ON_MESSAGE: &str = "AETHER-L unit powered on.";
pub const CALIBRATING_MESSAGE: &str = "Calibrating ambient sensors...";

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// `None` when the analyzer had no snapshot and the tick was skipped.
    pub reading: Option<EntropyReading>,
    pub glitch_crossed: bool,
    pub anomaly: Option<AnomalyEvent>,
}

impl TickOutcome {
    pub fn skipped(&self) -> bool {
        self.reading.is_none()
    }
}

/// Owner of every piece of session state. Not shared; the runner holds it.
pub struct SessionCore {
    id: SessionId,
    entropy: EntropyEngine,
    glitch: GlitchStateMachine,
    anomaly: AnomalyTrigger,
    log: EventLog,
    orientation: OrientationTracker,
    permission: Option<PermissionOutcome>,
    resets: DeferredResets,
    rng: Box<dyn RandomSource>,
}

impl SessionCore {
    pub fn new(
        id: SessionId,
        config: &SessionConfig,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, ConfigError> {
        Self::with_clock(id, config, rng, Arc::new(SystemClock))
    }

    pub fn with_clock(
        id: SessionId,
        config: &SessionConfig,
        rng: Box<dyn RandomSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            id,
            entropy: EntropyEngine::new(config.sampling.perturbation_max),
            glitch: GlitchStateMachine::new(config.glitch.threshold, config.glitch.reset_delay()),
            anomaly: AnomalyTrigger::new(&config.anomaly)?,
            log: EventLog::with_clock(config.log.capacity, clock),
            orientation: OrientationTracker::new(),
            permission: None,
            resets: DeferredResets::new(),
            rng,
        })
    }

    /// One sampling cycle: score, then glitch, then anomaly.
    ///
    /// Resets already due at `now` are applied first. A tick without a
    /// snapshot changes nothing else.
    pub fn tick(
        &mut self,
        analyzer: &mut dyn FrequencyAnalyzer,
        haptics: &dyn HapticDevice,
        now: Instant,
    ) -> TickOutcome {
        self.apply_due_resets(now);

        let Some(reading) = self.entropy.sample(analyzer, self.rng.as_mut()) else {
            debug!("frequency snapshot unavailable, tick skipped");
            return TickOutcome::default();
        };

        let glitch_crossed = self.glitch.observe(reading.score, now, &mut self.resets);
        if glitch_crossed {
            debug!(score = %reading.score, "glitch asserted");
        }

        let anomaly = self.anomaly.evaluate(reading.score, self.rng.as_mut());
        if let Some(event) = &anomaly {
            self.anomaly.fire(event, &mut self.log, haptics, now, &mut self.resets);
        }

        TickOutcome {
            reading: Some(reading),
            glitch_crossed,
            anomaly,
        }
    }

    /// Fire every deferred reset due at or before `now`. Returns how many fired.
    pub fn apply_due_resets(&mut self, now: Instant) -> usize {
        let due = self.resets.take_due(now);
        for target in &due {
            match target {
                ResetTarget::Glitch => self.glitch.reset(),
                ResetTarget::Anomaly => {
                    if let Some(word) = self.anomaly.active() {
                        debug!(word, "anomaly display cleared");
                    }
                    self.anomaly.clear();
                }
            }
        }
        due.len()
    }

    pub fn next_reset_due(&self) -> Option<Instant> {
        self.resets.next_due()
    }

    /// Cancel all pending resets and put the transient state at rest.
    pub fn settle(&mut self) {
        let cancelled = self.resets.cancel_all();
        if cancelled > 0 {
            debug!(cancelled, "pending resets cancelled");
        }
        self.glitch.reset();
        self.anomaly.clear();
    }

    pub fn update_heading(&mut self, reading: OrientationReading) -> bool {
        self.orientation.update(reading)
    }

    pub fn set_orientation_permission(&mut self, outcome: PermissionOutcome) {
        self.permission = Some(outcome);
    }

    /// Lifecycle message into the event log.
    pub fn notify(&mut self, message: impl Into<String>) {
        self.log.append_message(message);
    }

    pub fn snapshot(&self, state: SessionState) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            state,
            entropy: self.entropy.current(),
            heading: self.orientation.current(),
            glitch: self.glitch.is_active(),
            active_anomaly: self.anomaly.active().map(str::to_string),
            orientation_permission: self.permission,
            log: self.log.entries(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn entropy(&self) -> Option<EntropyScore> {
        self.entropy.current()
    }

    pub fn heading(&self) -> Option<Heading> {
        self.orientation.current()
    }

    pub fn glitch_active(&self) -> bool {
        self.glitch.is_active()
    }

    pub fn active_anomaly(&self) -> Option<&str> {
        self.anomaly.active()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }
}
