//! Simulated sensors for running a session without hardware.

use std::sync::Arc;
use std::time::Duration;

use aether_core::{
    AudioCapture, Capabilities, CaptureError, FrequencyAnalyzer, HapticDevice, HapticError,
    OrientationReading, OrientationSource, PermissionOutcome,
};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::SimulationConfig;

/// Build the capability bundle described by `config`.
pub fn capabilities(config: &SimulationConfig) -> Capabilities {
    Capabilities::new(
        Arc::new(SyntheticAudio::new(config.seed)),
        Arc::new(SimulatedCompass::new(
            config.orientation_permission,
            Duration::from_millis(config.compass_interval_ms),
            config.seed.map(|s| s.wrapping_add(1)),
        )),
        Arc::new(ConsoleHaptics::new(config.haptics)),
    )
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Microphone stand-in producing room noise with occasional bursts.
pub struct SyntheticAudio {
    seed: Option<u64>,
}

impl SyntheticAudio {
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }
}

#[async_trait]
impl AudioCapture for SyntheticAudio {
    async fn acquire(&self, bin_count: usize) -> Result<Box<dyn FrequencyAnalyzer>, CaptureError> {
        if bin_count == 0 {
            return Err(CaptureError::DeviceUnavailable(
                "analyzer needs at least one bin".into(),
            ));
        }
        info!(bin_count, "synthetic audio capture acquired");
        Ok(Box::new(SyntheticAnalyzer::new(bin_count, rng_from(self.seed))))
    }
}

const FLOOR_MIN: f64 = 5.0;
const FLOOR_MAX: f64 = 70.0;
const BURST_CHANCE: f64 = 0.03;

/// Spectrum generator behind [`SyntheticAudio`].
///
/// The noise floor takes a bounded random walk. Bursts lift every bin for a
/// few frames, strongest at the low end of the spectrum.
pub struct SyntheticAnalyzer {
    rng: StdRng,
    bins: Vec<u8>,
    floor: f64,
    burst_frames: u32,
    warmed_up: bool,
}

impl SyntheticAnalyzer {
    pub fn new(bin_count: usize, rng: StdRng) -> Self {
        Self {
            rng,
            bins: vec![0; bin_count],
            floor: 30.0,
            burst_frames: 0,
            warmed_up: false,
        }
    }

    fn advance(&mut self) {
        self.floor = (self.floor + self.rng.gen_range(-3.0..3.0)).clamp(FLOOR_MIN, FLOOR_MAX);

        if self.burst_frames == 0 && self.rng.gen_bool(BURST_CHANCE) {
            self.burst_frames = self.rng.gen_range(3..12);
            debug!(frames = self.burst_frames, "synthetic burst");
        }
        let boost = if self.burst_frames > 0 {
            self.burst_frames -= 1;
            self.rng.gen_range(25.0..70.0)
        } else {
            0.0
        };

        let len = self.bins.len() as f64;
        for (i, bin) in self.bins.iter_mut().enumerate() {
            let rolloff = 1.0 - (i as f64 / len) * 0.5;
            let jitter = self.rng.gen_range(-10.0..10.0);
            let level = (self.floor + boost) * rolloff + jitter;
            *bin = level.clamp(0.0, 255.0) as u8;
        }
    }
}

impl FrequencyAnalyzer for SyntheticAnalyzer {
    fn frequency_snapshot(&mut self) -> Option<&[u8]> {
        // First frame is not ready yet, like a freshly opened analyser node.
        if !self.warmed_up {
            self.warmed_up = true;
            return None;
        }
        self.advance();
        Some(&self.bins)
    }
}

/// Compass that answers consent from config and wanders once subscribed.
pub struct SimulatedCompass {
    permission: PermissionOutcome,
    interval: Duration,
    seed: Option<u64>,
}

impl SimulatedCompass {
    pub fn new(permission: PermissionOutcome, interval: Duration, seed: Option<u64>) -> Self {
        Self {
            permission,
            interval,
            seed,
        }
    }
}

#[async_trait]
impl OrientationSource for SimulatedCompass {
    async fn request_permission(&self) -> PermissionOutcome {
        self.permission
    }

    async fn subscribe(&self) -> mpsc::Receiver<OrientationReading> {
        let (tx, rx) = mpsc::channel(32);
        let mut rng = rng_from(self.seed);
        let base = self.interval.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut heading: f64 = rng.gen_range(0.0..360.0);
            loop {
                let jitter = rng.gen_range(0.5..1.5);
                sleep(base.mul_f64(jitter)).await;

                let reading = if rng.gen_bool(0.05) {
                    OrientationReading::undefined()
                } else {
                    heading = (heading + rng.gen_range(-8.0..8.0)).rem_euclid(360.0);
                    if heading >= 360.0 {
                        heading = 0.0;
                    }
                    OrientationReading::degrees(heading)
                };
                if tx.send(reading).await.is_err() {
                    debug!("compass unsubscribed");
                    break;
                }
            }
        });

        rx
    }
}

/// Haptic motor that reports pulses to the log.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleHaptics {
    enabled: bool,
}

impl ConsoleHaptics {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl HapticDevice for ConsoleHaptics {
    fn pulse(&self, pattern_ms: &[u64]) -> Result<(), HapticError> {
        if !self.enabled {
            return Err(HapticError::Unsupported);
        }
        info!(pattern_ms = ?pattern_ms, "haptic pulse");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_snapshot_not_ready() {
        let audio = SyntheticAudio::new(Some(1));
        let mut analyzer = audio.acquire(128).await.unwrap();
        assert!(analyzer.frequency_snapshot().is_none());
        assert_eq!(analyzer.frequency_snapshot().map(|b| b.len()), Some(128));
    }

    #[tokio::test]
    async fn test_zero_bins_rejected() {
        let audio = SyntheticAudio::new(None);
        assert!(matches!(
            audio.acquire(0).await,
            Err(CaptureError::DeviceUnavailable(_))
        ));
    }

    #[test]
    fn test_seeded_analyzer_is_reproducible() {
        let mut a = SyntheticAnalyzer::new(16, StdRng::seed_from_u64(9));
        let mut b = SyntheticAnalyzer::new(16, StdRng::seed_from_u64(9));
        for _ in 0..20 {
            assert_eq!(a.frequency_snapshot(), b.frequency_snapshot());
        }
    }

    #[test]
    fn test_floor_stays_bounded() {
        let mut analyzer = SyntheticAnalyzer::new(8, StdRng::seed_from_u64(3));
        for _ in 0..500 {
            analyzer.frequency_snapshot();
            assert!((FLOOR_MIN..=FLOOR_MAX).contains(&analyzer.floor));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_compass_emits_until_dropped() {
        let compass =
            SimulatedCompass::new(PermissionOutcome::Granted, Duration::from_millis(100), Some(5));
        assert_eq!(compass.request_permission().await, PermissionOutcome::Granted);

        let mut rx = compass.subscribe().await;
        let mut defined = 0;
        for _ in 0..20 {
            let reading = rx.recv().await.unwrap();
            if let Some(alpha) = reading.alpha {
                assert!((0.0..360.0).contains(&alpha));
                defined += 1;
            }
        }
        assert!(defined > 0);
        drop(rx);
    }

    #[test]
    fn test_disabled_haptics_unsupported() {
        assert_eq!(
            ConsoleHaptics::new(false).pulse(&[200]),
            Err(HapticError::Unsupported)
        );
        assert!(ConsoleHaptics::new(true).pulse(&[200, 100, 200]).is_ok());
    }
}
