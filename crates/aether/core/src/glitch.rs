//! Transient visual-disturbance flag.

use std::time::Duration;

use tokio::time::Instant;

use crate::deferred::{DeferredResets, ResetTarget};
use crate::entropy::EntropyScore;

/// Boolean pulse asserted on threshold crossings and cleared by deferred resets.
#[derive(Debug, Clone)]
pub struct GlitchStateMachine {
    threshold: f64,
    reset_delay: Duration,
    active: bool,
}

impl GlitchStateMachine {
    pub fn new(threshold: f64, reset_delay: Duration) -> Self {
        Self {
            threshold,
            reset_delay,
            active: false,
        }
    }

    /// Assert the flag when `score` crosses the threshold and queue its reset.
    ///
    /// A crossing while already active still queues a reset; returns whether
    /// this call crossed.
    pub fn observe(
        &mut self,
        score: EntropyScore,
        now: Instant,
        resets: &mut DeferredResets,
    ) -> bool {
        if !score.exceeds(self.threshold) {
            return false;
        }
        self.active = true;
        resets.schedule(ResetTarget::Glitch, now + self.reset_delay);
        true
    }

    /// Clear the flag. Idempotent.
    pub fn reset(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}
