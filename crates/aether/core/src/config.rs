//! Session configuration.
//!
//! Thresholds, timings and the vocabulary for one session. The defaults are
//! the classic cadence; [`Profile::Sensitive`] is the alternate tuning with a
//! lower trigger point and a longer haptic pattern.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capability::DEFAULT_BIN_COUNT;
use crate::error::ConfigError;
use crate::event_log::DEFAULT_LOG_CAPACITY;
use crate::word_bank::{WordBank, DEFAULT_WORDS};

/// Named tuning presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Classic,
    Sensitive,
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" => Ok(Self::Classic),
            "sensitive" => Ok(Self::Sensitive),
            other => Err(format!("unknown profile: {}", other)),
        }
    }
}

/// Full session configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub sampling: SamplingConfig,

    #[serde(default)]
    pub glitch: GlitchConfig,

    #[serde(default)]
    pub anomaly: AnomalyConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl SessionConfig {
    pub fn for_profile(profile: Profile) -> Self {
        let mut config = Self::default();

        match profile {
            Profile::Classic => {}
            Profile::Sensitive => {
                config.sampling.perturbation_max = 10.0;
                config.glitch.threshold = 50.0;
                config.anomaly.threshold = 85.0;
                config.anomaly.gate = 0.95;
                config.anomaly.display_ms = 3000;
                config.anomaly.haptic_pattern_ms = vec![200, 100, 200, 100, 500];
            }
        }

        config
    }

    /// Reject values the loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling.tick_interval_ms == 0 {
            return Err(ConfigError::Zero {
                field: "sampling.tick_interval_ms",
            });
        }
        if self.sampling.bin_count == 0 {
            return Err(ConfigError::Zero {
                field: "sampling.bin_count",
            });
        }
        if !(self.sampling.perturbation_max >= 0.0 && self.sampling.perturbation_max.is_finite()) {
            return Err(ConfigError::OutOfRange {
                field: "sampling.perturbation_max",
                value: self.sampling.perturbation_max,
                expected: ">= 0.0",
            });
        }
        if !(0.0..1.0).contains(&self.anomaly.gate) {
            return Err(ConfigError::OutOfRange {
                field: "anomaly.gate",
                value: self.anomaly.gate,
                expected: "0.0..1.0",
            });
        }
        if self.log.capacity == 0 {
            return Err(ConfigError::Zero {
                field: "log.capacity",
            });
        }
        if self.anomaly.vocabulary.is_empty() {
            return Err(ConfigError::EmptyVocabulary);
        }
        Ok(())
    }
}

/// Tick cadence and entropy scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Period of the sampling tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Upper bound (exclusive) of the uniform perturbation added to the signal.
    #[serde(default = "default_perturbation_max")]
    pub perturbation_max: f64,

    /// Frequency bins requested from the analyzer.
    #[serde(default = "default_bin_count")]
    pub bin_count: usize,
}

impl SamplingConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            perturbation_max: default_perturbation_max(),
            bin_count: default_bin_count(),
        }
    }
}

/// Visual disturbance pulse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlitchConfig {
    /// Scores strictly above this assert the glitch flag.
    #[serde(default = "default_glitch_threshold")]
    pub threshold: f64,

    /// Delay before an asserted flag falls back to false.
    #[serde(default = "default_glitch_reset_ms")]
    pub reset_delay_ms: u64,
}

impl GlitchConfig {
    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            threshold: default_glitch_threshold(),
            reset_delay_ms: default_glitch_reset_ms(),
        }
    }
}

/// Anomaly gate, display and haptic output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyConfig {
    /// Scores strictly above this qualify for the gate draw.
    #[serde(default = "default_anomaly_threshold")]
    pub threshold: f64,

    /// A qualifying tick fires only when its unit draw exceeds this value.
    #[serde(default = "default_anomaly_gate")]
    pub gate: f64,

    /// How long a fired word stays active.
    #[serde(default = "default_anomaly_display_ms")]
    pub display_ms: u64,

    /// On/off durations in milliseconds, starting with on.
    #[serde(default = "default_haptic_pattern")]
    pub haptic_pattern_ms: Vec<u64>,

    /// Candidate words, chosen uniformly on each firing.
    #[serde(default = "default_vocabulary")]
    pub vocabulary: Vec<String>,
}

impl AnomalyConfig {
    pub fn display_duration(&self) -> Duration {
        Duration::from_millis(self.display_ms)
    }

    /// The vocabulary as a [`WordBank`].
    pub fn word_bank(&self) -> Result<WordBank, ConfigError> {
        WordBank::new(self.vocabulary.iter().cloned()).ok_or(ConfigError::EmptyVocabulary)
    }
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            threshold: default_anomaly_threshold(),
            gate: default_anomaly_gate(),
            display_ms: default_anomaly_display_ms(),
            haptic_pattern_ms: default_haptic_pattern(),
            vocabulary: default_vocabulary(),
        }
    }
}

/// Event log sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Maximum entries kept; the oldest is evicted first.
    #[serde(default = "default_log_capacity")]
    pub capacity: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            capacity: default_log_capacity(),
        }
    }
}

fn default_tick_interval_ms() -> u64 {
    100
}

fn default_perturbation_max() -> f64 {
    15.0
}

fn default_bin_count() -> usize {
    DEFAULT_BIN_COUNT
}

fn default_glitch_threshold() -> f64 {
    60.0
}

fn default_glitch_reset_ms() -> u64 {
    150
}

fn default_anomaly_threshold() -> f64 {
    90.0
}

fn default_anomaly_gate() -> f64 {
    0.97
}

fn default_anomaly_display_ms() -> u64 {
    4000
}

fn default_haptic_pattern() -> Vec<u64> {
    vec![200, 100, 200]
}

fn default_vocabulary() -> Vec<String> {
    DEFAULT_WORDS.iter().map(|w| w.to_string()).collect()
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.sampling.tick_interval(), Duration::from_millis(100));
        assert_eq!(config.sampling.perturbation_max, 15.0);
        assert_eq!(config.sampling.bin_count, 128);
        assert_eq!(config.glitch.threshold, 60.0);
        assert_eq!(config.glitch.reset_delay(), Duration::from_millis(150));
        assert_eq!(config.anomaly.threshold, 90.0);
        assert_eq!(config.anomaly.gate, 0.97);
        assert_eq!(config.anomaly.display_duration(), Duration::from_secs(4));
        assert_eq!(config.anomaly.haptic_pattern_ms, vec![200, 100, 200]);
        assert_eq!(config.anomaly.vocabulary.len(), 20);
        assert_eq!(config.log.capacity, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sensitive_profile() {
        let config = SessionConfig::for_profile(Profile::Sensitive);
        assert_eq!(config.sampling.perturbation_max, 10.0);
        assert_eq!(config.glitch.threshold, 50.0);
        assert_eq!(config.anomaly.threshold, 85.0);
        assert_eq!(config.anomaly.gate, 0.95);
        assert_eq!(config.anomaly.display_ms, 3000);
        assert_eq!(config.anomaly.haptic_pattern_ms, vec![200, 100, 200, 100, 500]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn profile_parse() {
        assert_eq!("Classic".parse::<Profile>().unwrap(), Profile::Classic);
        assert_eq!("sensitive".parse::<Profile>().unwrap(), Profile::Sensitive);
        assert!("loud".parse::<Profile>().is_err());
    }

    #[test]
    fn rejects_zero_tick() {
        let mut config = SessionConfig::default();
        config.sampling.tick_interval_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Zero { .. })));
    }

    #[test]
    fn rejects_gate_out_of_range() {
        let mut config = SessionConfig::default();
        config.anomaly.gate = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "anomaly.gate", .. })
        ));
    }

    #[test]
    fn rejects_negative_perturbation() {
        let mut config = SessionConfig::default();
        config.sampling.perturbation_max = -1.0;
        assert!(config.validate().is_err());
        config.sampling.perturbation_max = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_vocabulary() {
        let mut config = SessionConfig::default();
        config.anomaly.vocabulary.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyVocabulary));
        assert!(config.anomaly.word_bank().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"glitch": {"threshold": 55.0}}"#).unwrap();
        assert_eq!(config.glitch.threshold, 55.0);
        assert_eq!(config.glitch.reset_delay_ms, 150);
        assert_eq!(config.anomaly.threshold, 90.0);
    }
}
