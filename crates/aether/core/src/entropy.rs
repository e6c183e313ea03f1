//! Entropy scoring.
//!
//! The score is a heuristic, not an information-theoretic entropy: the mean
//! magnitude of the current frequency snapshot plus a uniform perturbation in
//! `[0, K)`. Both terms are non-negative, so the score is too.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capability::FrequencyAnalyzer;
use crate::random::RandomSource;

/// A non-negative per-tick score.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct EntropyScore(f64);

impl EntropyScore {
    pub fn value(self) -> f64 {
        self.0
    }

    pub fn exceeds(self, threshold: f64) -> bool {
        self.0 > threshold
    }
}

impl fmt::Display for EntropyScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// The two terms behind a score, kept for tracing and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntropyReading {
    pub signal: f64,
    pub perturbation: f64,
    pub score: EntropyScore,
}

/// Arithmetic mean of the magnitudes. `None` for an empty snapshot.
pub fn mean_magnitude(magnitudes: &[u8]) -> Option<f64> {
    if magnitudes.is_empty() {
        return None;
    }
    let total: u64 = magnitudes.iter().map(|&m| u64::from(m)).sum();
    Some(total as f64 / magnitudes.len() as f64)
}

/// Reduces analyzer snapshots to scores and holds the latest one.
#[derive(Debug, Clone)]
pub struct EntropyEngine {
    perturbation_max: f64,
    current: Option<EntropyScore>,
}

impl EntropyEngine {
    /// `perturbation_max` is K; negative or non-finite values are treated as 0.
    pub fn new(perturbation_max: f64) -> Self {
        let perturbation_max = if perturbation_max.is_finite() {
            perturbation_max.max(0.0)
        } else {
            0.0
        };
        Self {
            perturbation_max,
            current: None,
        }
    }

    /// Pull a snapshot and publish a new score.
    ///
    /// Returns `None` without touching the published score when the analyzer
    /// has nothing yet.
    pub fn sample(
        &mut self,
        analyzer: &mut dyn FrequencyAnalyzer,
        rng: &mut dyn RandomSource,
    ) -> Option<EntropyReading> {
        let signal = analyzer.frequency_snapshot().and_then(mean_magnitude)?;
        // Keep the draw in [0, 1) so the perturbation stays below K.
        let draw = rng.next_unit().clamp(0.0, 1.0 - f64::EPSILON);
        let perturbation = draw * self.perturbation_max;
        let score = EntropyScore(signal + perturbation);
        self.current = Some(score);
        Some(EntropyReading {
            signal,
            perturbation,
            score,
        })
    }

    /// The last published score.
    pub fn current(&self) -> Option<EntropyScore> {
        self.current
    }

    pub fn perturbation_max(&self) -> f64 {
        self.perturbation_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;

    struct Flat(Option<Vec<u8>>);

    impl FrequencyAnalyzer for Flat {
        fn frequency_snapshot(&mut self) -> Option<&[u8]> {
            self.0.as_deref()
        }
    }

    #[test]
    fn mean_of_magnitudes() {
        assert_eq!(mean_magnitude(&[0, 10, 20]), Some(10.0));
        assert_eq!(mean_magnitude(&[255; 128]), Some(255.0));
        assert_eq!(mean_magnitude(&[]), None);
    }

    #[test]
    fn score_is_signal_plus_perturbation() {
        let mut engine = EntropyEngine::new(10.0);
        let mut analyzer = Flat(Some(vec![70; 128]));
        let mut rng = ScriptedRandom::constant(0.5);
        let reading = engine.sample(&mut analyzer, &mut rng).unwrap();
        assert_eq!(reading.signal, 70.0);
        assert_eq!(reading.perturbation, 5.0);
        assert_eq!(reading.score.value(), 75.0);
        assert_eq!(engine.current(), Some(reading.score));
    }

    #[test]
    fn unavailable_snapshot_skips() {
        let mut engine = EntropyEngine::new(15.0);
        let mut ready = Flat(Some(vec![40; 4]));
        let mut rng = ScriptedRandom::constant(0.0);
        engine.sample(&mut ready, &mut rng).unwrap();

        let mut pending = Flat(None);
        assert!(engine.sample(&mut pending, &mut rng).is_none());
        assert_eq!(engine.current().unwrap().value(), 40.0);
        // no draw was consumed by the skipped tick
        assert_eq!(rng.consumed(), 1);
    }

    #[test]
    fn empty_snapshot_skips() {
        let mut engine = EntropyEngine::new(15.0);
        let mut analyzer = Flat(Some(Vec::new()));
        let mut rng = ScriptedRandom::constant(0.3);
        assert!(engine.sample(&mut analyzer, &mut rng).is_none());
        assert!(engine.current().is_none());
    }

    #[test]
    fn perturbation_stays_below_k() {
        let mut analyzer = Flat(Some(vec![0; 8]));
        for k in [0.5, 10.0, 15.0, 1000.0] {
            let mut engine = EntropyEngine::new(k);
            for draw in [0.999_999, 1.0, 3.0] {
                let mut rng = ScriptedRandom::constant(draw);
                let reading = engine.sample(&mut analyzer, &mut rng).unwrap();
                assert!(reading.perturbation < k, "draw {} reached K={}", draw, k);
            }
        }
    }

    #[test]
    fn negative_k_clamped() {
        let engine = EntropyEngine::new(-3.0);
        assert_eq!(engine.perturbation_max(), 0.0);
    }

    #[test]
    fn display_one_decimal() {
        let mut engine = EntropyEngine::new(0.0);
        let mut analyzer = Flat(Some(vec![1, 2]));
        let mut rng = ScriptedRandom::constant(0.0);
        let reading = engine.sample(&mut analyzer, &mut rng).unwrap();
        assert_eq!(reading.score.to_string(), "1.5");
    }
}
