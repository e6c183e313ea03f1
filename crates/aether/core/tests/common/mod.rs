#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use aether_core::{
    AudioCapture, Capabilities, CaptureError, FrequencyAnalyzer, HapticDevice, HapticError,
    OrientationReading, OrientationSource, PermissionOutcome,
};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Flat spectra replayed one per tick; the last frame repeats.
pub struct SeriesAnalyzer {
    frames: VecDeque<Option<Vec<u8>>>,
    current: Option<Vec<u8>>,
    requests: Arc<AtomicUsize>,
}

impl FrequencyAnalyzer for SeriesAnalyzer {
    fn frequency_snapshot(&mut self) -> Option<&[u8]> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(next) = self.frames.pop_front() {
            self.current = next;
        }
        self.current.as_deref()
    }
}

pub struct ScriptedAudio {
    levels: Vec<Option<u8>>,
    /// Snapshot requests across every analyzer handed out, one per tick.
    pub requests: Arc<AtomicUsize>,
}

impl ScriptedAudio {
    pub fn new(levels: &[Option<u8>]) -> Self {
        Self {
            levels: levels.to_vec(),
            requests: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl AudioCapture for ScriptedAudio {
    async fn acquire(&self, bin_count: usize) -> Result<Box<dyn FrequencyAnalyzer>, CaptureError> {
        Ok(Box::new(SeriesAnalyzer {
            frames: self
                .levels
                .iter()
                .map(|l| l.map(|v| vec![v; bin_count]))
                .collect(),
            current: None,
            requests: self.requests.clone(),
        }))
    }
}

pub struct DeniedAudio;

#[async_trait]
impl AudioCapture for DeniedAudio {
    async fn acquire(&self, _bin_count: usize) -> Result<Box<dyn FrequencyAnalyzer>, CaptureError> {
        Err(CaptureError::PermissionDenied)
    }
}

/// Orientation source whose readings are pushed by the test.
pub struct TestCompass {
    permission: PermissionOutcome,
    rx: Mutex<Option<mpsc::Receiver<OrientationReading>>>,
    pub subscribed: AtomicBool,
}

impl TestCompass {
    pub fn new(permission: PermissionOutcome) -> (Arc<Self>, mpsc::Sender<OrientationReading>) {
        let (tx, rx) = mpsc::channel(16);
        let compass = Arc::new(Self {
            permission,
            rx: Mutex::new(Some(rx)),
            subscribed: AtomicBool::new(false),
        });
        (compass, tx)
    }
}

#[async_trait]
impl OrientationSource for TestCompass {
    async fn request_permission(&self) -> PermissionOutcome {
        self.permission
    }

    async fn subscribe(&self) -> mpsc::Receiver<OrientationReading> {
        self.subscribed.store(true, Ordering::SeqCst);
        match self.rx.lock().unwrap().take() {
            Some(rx) => rx,
            None => mpsc::channel(1).1,
        }
    }
}

#[derive(Default)]
pub struct CountingHaptics {
    pub pulses: AtomicUsize,
}

impl HapticDevice for CountingHaptics {
    fn pulse(&self, _pattern_ms: &[u64]) -> Result<(), HapticError> {
        self.pulses.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct Rig {
    pub capabilities: Capabilities,
    pub snapshot_requests: Arc<AtomicUsize>,
    pub compass: Arc<TestCompass>,
    pub heading_tx: mpsc::Sender<OrientationReading>,
    pub haptics: Arc<CountingHaptics>,
}

pub fn rig(levels: &[Option<u8>], permission: PermissionOutcome) -> Rig {
    let (compass, heading_tx) = TestCompass::new(permission);
    let haptics = Arc::new(CountingHaptics::default());
    let audio = ScriptedAudio::new(levels);
    let snapshot_requests = audio.requests.clone();
    let capabilities = Capabilities::new(Arc::new(audio), compass.clone(), haptics.clone());
    Rig {
        capabilities,
        snapshot_requests,
        compass,
        heading_tx,
        haptics,
    }
}
