//! Probabilistic anomaly events.
//!
//! A tick qualifies when its score exceeds the anomaly threshold; a
//! qualifying tick fires only if an independent unit draw exceeds the gate.
//! Firing picks a word, shows it for the display duration, logs an alert and
//! asks the haptic device for a pulse.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::capability::HapticDevice;
use crate::config::AnomalyConfig;
use crate::deferred::{DeferredResets, ResetTarget};
use crate::entropy::EntropyScore;
use crate::error::ConfigError;
use crate::event_log::{EventLog, Severity};
use crate::random::RandomSource;
use crate::word_bank::WordBank;

/// Log text for a fired anomaly.
pub fn alert_message(word: &str) -> String {
    format!(">> ALERT: pattern detected [{}]", word)
}

/// Record of one fired anomaly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyEvent {
    /// Word drawn from the bank.
    pub word: String,
    /// Score of the tick that fired.
    pub score: EntropyScore,
    /// Gate draw that passed.
    pub gate_draw: f64,
}

/// Threshold-plus-gate trigger holding the active word.
#[derive(Debug, Clone)]
pub struct AnomalyTrigger {
    threshold: f64,
    gate: f64,
    display: Duration,
    haptic_pattern: Vec<u64>,
    bank: WordBank,
    active: Option<String>,
}

impl AnomalyTrigger {
    pub fn new(config: &AnomalyConfig) -> Result<Self, ConfigError> {
        let bank = config.word_bank()?;
        Ok(Self {
            threshold: config.threshold,
            gate: config.gate,
            display: config.display_duration(),
            haptic_pattern: config.haptic_pattern_ms.clone(),
            bank,
            active: None,
        })
    }

    /// Decide whether this tick fires and, if so, which word it surfaces.
    ///
    /// The gate draw is only taken for ticks above the threshold, and the
    /// word draw only when the gate passes.
    pub fn evaluate(
        &self,
        score: EntropyScore,
        rng: &mut dyn RandomSource,
    ) -> Option<AnomalyEvent> {
        if !score.exceeds(self.threshold) {
            return None;
        }
        let gate_draw = rng.next_unit();
        // Written negated so a NaN draw holds the gate.
        if !(gate_draw > self.gate) {
            debug!(score = %score, gate_draw, "anomaly gate held");
            return None;
        }
        let word = self.bank.choose(rng.next_unit()).to_string();
        Some(AnomalyEvent {
            word,
            score,
            gate_draw,
        })
    }

    /// Apply a fired event: show the word, log it, pulse, and (re)arm the clear.
    ///
    /// Haptic failure is swallowed.
    pub fn fire(
        &mut self,
        event: &AnomalyEvent,
        log: &mut EventLog,
        haptics: &dyn HapticDevice,
        now: Instant,
        resets: &mut DeferredResets,
    ) {
        info!(word = %event.word, score = %event.score, "anomaly detected");
        self.active = Some(event.word.clone());
        log.append(alert_message(&event.word), Severity::Alert);
        if let Err(e) = haptics.pulse(&self.haptic_pattern) {
            debug!(error = %e, "haptic pulse skipped");
        }
        resets.reschedule(ResetTarget::Anomaly, now + self.display);
    }

    /// Clear the displayed word. Idempotent.
    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn word_bank(&self) -> &WordBank {
        &self.bank
    }

    pub fn haptic_pattern(&self) -> &[u64] {
        &self.haptic_pattern
    }
}
