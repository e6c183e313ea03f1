//! Session startup, the sampling runner, and teardown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::capability::{Capabilities, FrequencyAnalyzer, HapticDevice};
use crate::config::SessionConfig;
use crate::error::{SessionResult, StartupError};
use crate::event_log::{Clock, SystemClock};
use crate::orientation::OrientationReading;
use crate::random::{RandomSource, StdRandom};
use crate::session::core::{SessionCore, CALIBRATING_MESSAGE, POWER_ON_MESSAGE};
use crate::session::state::{SessionId, SessionSnapshot, SessionState};

/// Drives one session: acquires capabilities, runs the tick loop in a
/// background task, and tears it down.
pub struct SessionController {
    id: SessionId,
    config: SessionConfig,
    capabilities: Capabilities,
    rng: Option<Box<dyn RandomSource>>,
    clock: Arc<dyn Clock>,
    state: SessionState,
    snapshot_tx: Arc<watch::Sender<SessionSnapshot>>,
    runner: Option<RunnerHandle>,
}

struct RunnerHandle {
    task: JoinHandle<()>,
    stop: mpsc::Sender<()>,
}

impl SessionController {
    pub fn new(config: SessionConfig, capabilities: Capabilities) -> Self {
        let id = SessionId::generate();
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::idle(id));
        Self {
            id,
            config,
            capabilities,
            rng: None,
            clock: Arc::new(SystemClock),
            state: SessionState::NotStarted,
            snapshot_tx: Arc::new(snapshot_tx),
            runner: None,
        }
    }

    /// Use a specific random source instead of a fresh `StdRandom`.
    pub fn with_random(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Presentation feed. Every change to the core republishes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Acquire audio and orientation, then start ticking.
    ///
    /// Audio failure is fatal to the attempt and leaves the session in
    /// `NotStarted`. Orientation denial is not: the session runs without a
    /// heading.
    pub async fn start(&mut self) -> SessionResult<()> {
        if self.state != SessionState::NotStarted {
            return Err(StartupError::AlreadyStarted);
        }
        self.config.validate()?;

        self.set_state(SessionState::Starting);
        info!(session_id = %self.id, "starting session");

        let analyzer = match self
            .capabilities
            .audio
            .acquire(self.config.sampling.bin_count)
            .await
        {
            Ok(analyzer) => analyzer,
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "audio capture unavailable");
                self.set_state(SessionState::NotStarted);
                return Err(e.into());
            }
        };

        let permission = self.capabilities.orientation.request_permission().await;
        let orientation_rx = if permission.allows_updates() {
            Some(self.capabilities.orientation.subscribe().await)
        } else {
            warn!(session_id = %self.id, "orientation permission denied, heading unavailable");
            None
        };

        let rng = self
            .rng
            .take()
            .unwrap_or_else(|| Box::new(StdRandom::from_entropy()));
        let mut core = match SessionCore::with_clock(self.id, &self.config, rng, self.clock.clone())
        {
            Ok(core) => core,
            Err(e) => {
                self.set_state(SessionState::NotStarted);
                return Err(e.into());
            }
        };
        core.set_orientation_permission(permission);
        core.notify(POWER_ON_MESSAGE);
        core.notify(CALIBRATING_MESSAGE);

        self.state = SessionState::Running;
        self.snapshot_tx.send_replace(core.snapshot(SessionState::Running));

        let (stop_tx, stop_rx) = mpsc::channel(1);
        let runner = SessionRunner {
            core,
            analyzer,
            haptics: self.capabilities.haptics.clone(),
            orientation_rx,
            tick_interval: self.config.sampling.tick_interval(),
            snapshot_tx: self.snapshot_tx.clone(),
            stop_rx,
        };
        let span = info_span!("session", session_id = %self.id);
        let task = tokio::spawn(runner.run().instrument(span));
        self.runner = Some(RunnerHandle {
            task,
            stop: stop_tx,
        });

        info!(
            session_id = %self.id,
            orientation = %permission,
            tick_ms = self.config.sampling.tick_interval_ms,
            "session running"
        );
        Ok(())
    }

    /// Stop ticking, drop the orientation subscription, cancel pending resets.
    ///
    /// Only a running session moves to `Stopped`; otherwise a no-op.
    pub async fn stop(&mut self) {
        let Some(runner) = self.runner.take() else {
            return;
        };
        let _ = runner.stop.send(()).await;
        if let Err(e) = runner.task.await {
            warn!(session_id = %self.id, error = %e, "session runner ended abnormally");
            self.snapshot_tx
                .send_modify(|snap| snap.state = SessionState::Stopped);
        }
        self.state = SessionState::Stopped;
        info!(session_id = %self.id, "session stopped");
    }

    fn set_state(&mut self, state: SessionState) {
        self.state = state;
        self.snapshot_tx.send_modify(|snap| snap.state = state);
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(runner) = self.runner.take() {
            runner.task.abort();
        }
    }
}

/// The single execution context that owns the core while running.
struct SessionRunner {
    core: SessionCore,
    analyzer: Box<dyn FrequencyAnalyzer>,
    haptics: Arc<dyn HapticDevice>,
    orientation_rx: Option<mpsc::Receiver<OrientationReading>>,
    tick_interval: Duration,
    snapshot_tx: Arc<watch::Sender<SessionSnapshot>>,
    stop_rx: mpsc::Receiver<()>,
}

impl SessionRunner {
    async fn run(mut self) {
        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut orientation_live = self.orientation_rx.is_some();

        debug!("sampling loop started");

        loop {
            let next_reset = self.core.next_reset_due();
            let reset_at = next_reset.unwrap_or_else(|| Instant::now() + self.tick_interval);

            tokio::select! {
                biased;

                _ = self.stop_rx.recv() => break,

                _ = sleep_until(reset_at), if next_reset.is_some() => {
                    self.core.apply_due_resets(Instant::now());
                }

                reading = next_reading(&mut self.orientation_rx), if orientation_live => {
                    match reading {
                        Some(reading) => {
                            self.core.update_heading(reading);
                        }
                        None => {
                            orientation_live = false;
                            debug!("orientation stream closed");
                        }
                    }
                }

                _ = ticker.tick() => {
                    self.core.tick(self.analyzer.as_mut(), self.haptics.as_ref(), Instant::now());
                }
            }

            self.publish(SessionState::Running);
        }

        self.orientation_rx = None;
        self.core.settle();
        self.publish(SessionState::Stopped);
        debug!("sampling loop stopped");
    }

    fn publish(&self, state: SessionState) {
        let next = self.core.snapshot(state);
        self.snapshot_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

async fn next_reading(
    rx: &mut Option<mpsc::Receiver<OrientationReading>>,
) -> Option<OrientationReading> {
    match rx {
        Some(rx) => rx.recv().await,
        None => None,
    }
}
