//! Latest device heading.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A compass heading in degrees, always within `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Heading(f64);

impl Heading {
    /// Normalise a finite angle into `[0, 360)`. Non-finite angles yield `None`.
    pub fn from_degrees(degrees: f64) -> Option<Self> {
        if !degrees.is_finite() {
            return None;
        }
        let normalised = degrees.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs
        if normalised >= 360.0 {
            Some(Self(0.0))
        } else {
            Some(Self(normalised))
        }
    }

    pub fn degrees(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}°", self.0)
    }
}

/// One reading from the orientation source. `alpha` is `None` when the
/// platform reported no angle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrientationReading {
    pub alpha: Option<f64>,
}

impl OrientationReading {
    pub fn degrees(alpha: f64) -> Self {
        Self { alpha: Some(alpha) }
    }

    pub fn undefined() -> Self {
        Self { alpha: None }
    }
}

/// Holds the last defined heading. No smoothing.
#[derive(Debug, Clone, Default)]
pub struct OrientationTracker {
    heading: Option<Heading>,
}

impl OrientationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the heading with a defined reading. Undefined readings are
    /// ignored and the prior value is kept. Returns whether the value changed.
    pub fn update(&mut self, reading: OrientationReading) -> bool {
        match reading.alpha.and_then(Heading::from_degrees) {
            Some(heading) => {
                let changed = self.heading != Some(heading);
                self.heading = Some(heading);
                changed
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<Heading> {
        self.heading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_until_first_reading() {
        let tracker = OrientationTracker::new();
        assert!(tracker.current().is_none());
    }

    #[test]
    fn defined_reading_overwrites() {
        let mut tracker = OrientationTracker::new();
        tracker.update(OrientationReading::degrees(120.0));
        tracker.update(OrientationReading::degrees(15.5));
        assert_eq!(tracker.current().unwrap().degrees(), 15.5);
    }

    #[test]
    fn undefined_reading_keeps_prior() {
        let mut tracker = OrientationTracker::new();
        tracker.update(OrientationReading::degrees(200.0));
        assert!(!tracker.update(OrientationReading::undefined()));
        assert!(!tracker.update(OrientationReading::degrees(f64::NAN)));
        assert_eq!(tracker.current().unwrap().degrees(), 200.0);
    }

    #[test]
    fn zero_is_a_defined_angle() {
        let mut tracker = OrientationTracker::new();
        tracker.update(OrientationReading::degrees(90.0));
        assert!(tracker.update(OrientationReading::degrees(0.0)));
        assert_eq!(tracker.current().unwrap().degrees(), 0.0);
    }

    #[test]
    fn heading_normalised() {
        assert_eq!(Heading::from_degrees(360.0).unwrap().degrees(), 0.0);
        assert_eq!(Heading::from_degrees(-90.0).unwrap().degrees(), 270.0);
        assert_eq!(Heading::from_degrees(725.0).unwrap().degrees(), 5.0);
        assert!(Heading::from_degrees(f64::INFINITY).is_none());
    }

    #[test]
    fn heading_display() {
        assert_eq!(Heading::from_degrees(42.4).unwrap().to_string(), "42°");
    }
}
