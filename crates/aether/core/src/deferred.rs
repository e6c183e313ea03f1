//! Deferred resets keyed by the state they reset.
//!
//! The session runner owns one [`DeferredResets`] queue and sleeps until
//! [`DeferredResets::next_due`]. Two scheduling modes exist:
//!
//! - [`DeferredResets::schedule`] stacks another entry. Used for the glitch
//!   flag: every entry only ever sets the flag to false, so any number of
//!   pending entries is harmless and the earliest one bounds the pulse.
//! - [`DeferredResets::reschedule`] cancels every pending entry for the
//!   target first. Used for the anomaly display, so a replacement word gets
//!   its full display time.

use tokio::time::Instant;

/// The piece of transient state a deferred entry resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetTarget {
    /// Glitch flag back to false.
    Glitch,
    /// Active anomaly back to none.
    Anomaly,
}

#[derive(Debug, Clone, Copy)]
struct PendingReset {
    target: ResetTarget,
    due: Instant,
}

/// Time-ordered queue of pending resets.
#[derive(Debug, Clone, Default)]
pub struct DeferredResets {
    pending: Vec<PendingReset>,
}

impl DeferredResets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry without touching existing ones.
    pub fn schedule(&mut self, target: ResetTarget, due: Instant) {
        self.pending.push(PendingReset { target, due });
    }

    /// Replace all pending entries for `target` with a single one.
    pub fn reschedule(&mut self, target: ResetTarget, due: Instant) {
        self.cancel(target);
        self.schedule(target, due);
    }

    /// Drop pending entries for `target`. Returns how many were dropped.
    pub fn cancel(&mut self, target: ResetTarget) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.target != target);
        before - self.pending.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Earliest deadline, if anything is pending.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.due).min()
    }

    /// Remove and return every entry due at or before `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<ResetTarget> {
        let mut due: Vec<PendingReset> = Vec::new();
        self.pending.retain(|p| {
            if p.due <= now {
                due.push(*p);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|p| p.due);
        due.into_iter().map(|p| p.target).collect()
    }

    pub fn pending(&self, target: ResetTarget) -> usize {
        self.pending.iter().filter(|p| p.target == target).count()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
