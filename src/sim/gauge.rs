//! Oscillating gauge
//!
//! A candidate value sweeps back and forth between `min` and `max` (triangle
//! wave, never random) until the player freezes it.

use serde::{Deserialize, Serialize};

use crate::triangle_wave;

/// Which launch parameter a gauge selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GaugeKind {
    Angle,
    Power,
}

impl GaugeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GaugeKind::Angle => "angle",
            GaugeKind::Power => "power",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OscillatingGauge {
    pub kind: GaugeKind,
    pub min: f32,
    pub max: f32,
    /// Sweep speed in value units per second
    pub speed: f32,
    /// Position along the triangle wave, in [0, 2)
    cycle: f32,
    running: bool,
}

impl OscillatingGauge {
    pub fn new(kind: GaugeKind, min: f32, max: f32, speed: f32) -> Self {
        Self {
            kind,
            min,
            max,
            speed,
            cycle: 0.0,
            running: false,
        }
    }

    /// Restart the sweep from `min`, rising
    pub fn start(&mut self) {
        self.cycle = 0.0;
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance the sweep; no-op unless running
    pub fn advance(&mut self, dt: f32) {
        if !self.running {
            return;
        }
        let span = self.max - self.min;
        if span <= 0.0 {
            return;
        }
        self.cycle = (self.cycle + dt * self.speed / span).rem_euclid(2.0);
    }

    /// Current candidate value, always within [min, max]
    pub fn value(&self) -> f32 {
        let v = self.min + (self.max - self.min) * triangle_wave(self.cycle);
        v.clamp(self.min, self.max)
    }

    /// Stop the sweep and return the value at this instant.
    /// Returns None if the gauge was not running (nothing to freeze).
    pub fn freeze(&mut self) -> Option<f32> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(self.value())
    }

    /// Stop without producing a value
    pub fn stop(&mut self) {
        self.running = false;
    }
}
