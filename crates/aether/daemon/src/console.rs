//! Console readout of the session feed.
//!
//! Everything shown here is derived from a [`SessionSnapshot`]; the renderer
//! keeps no state beyond which log entries it has already printed.

use aether_core::{EntropyScore, LogEntry, SessionSnapshot};

/// Cosmetic readouts derived from the score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indicators {
    pub led: bool,
    pub warning: bool,
    pub hot: bool,
    pub meter_percent: f64,
    pub base_resonance: f64,
}

impl Indicators {
    pub fn from_score(score: Option<EntropyScore>) -> Self {
        let value = score.map(|s| s.value()).unwrap_or(0.0);
        Self {
            led: value > 50.0,
            warning: value > 60.0,
            hot: value > 80.0,
            meter_percent: value.min(100.0),
            base_resonance: value * 0.4,
        }
    }
}

/// Output for one snapshot change.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Log lines not printed before, oldest first.
    pub new_lines: Vec<String>,
    pub status: String,
}

#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    newest_seen: Option<LogEntry>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, snapshot: &SessionSnapshot) -> Frame {
        let fresh = match &self.newest_seen {
            Some(seen) => snapshot
                .log
                .iter()
                .position(|entry| entry == seen)
                .unwrap_or(snapshot.log.len()),
            None => snapshot.log.len(),
        };
        let new_lines = snapshot.log[..fresh].iter().rev().map(log_line).collect();
        if let Some(newest) = snapshot.log.first() {
            self.newest_seen = Some(newest.clone());
        }

        Frame {
            new_lines,
            status: status_line(snapshot),
        }
    }
}

fn log_line(entry: &LogEntry) -> String {
    if entry.is_alert() {
        format!("!! {}", entry)
    } else {
        format!("   {}", entry)
    }
}

/// Single-line summary of a snapshot.
pub fn status_line(snapshot: &SessionSnapshot) -> String {
    let ind = Indicators::from_score(snapshot.entropy);
    let score = snapshot
        .entropy
        .map(|s| s.to_string())
        .unwrap_or_else(|| "--.-".to_string());
    let heading = snapshot
        .heading
        .map(|h| h.to_string())
        .unwrap_or_else(|| "---".to_string());
    let word = snapshot
        .active_anomaly
        .as_deref()
        .map(|w| format!("[{}]", w))
        .unwrap_or_default();

    format!(
        "{:<11} ENTROPY {:>5}{} | LED {} | {} | MTR {:>3.0}% | BASE {:>4.1} | HDG {:>4} | {} {}",
        snapshot.state.to_string(),
        score,
        if ind.hot { " HOT" } else { "    " },
        if ind.led { "*" } else { "." },
        if ind.warning { "WARN" } else { "    " },
        ind.meter_percent,
        ind.base_resonance,
        heading,
        if snapshot.glitch { "GLITCH" } else { "      " },
        word,
    )
    .trim_end()
    .to_string()
}
