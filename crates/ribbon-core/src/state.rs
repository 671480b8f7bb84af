//! Cross-frame animation state: the phase clock and smoothed energy.

use crate::energy;

/// Phase advance per frame. Animation speed follows the frame rate.
pub const TIME_STEP: f64 = 0.015;

/// Monotonic animation phase, only ever fed to periodic functions
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PhaseClock {
    time: f64,
}

impl PhaseClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// The clock one frame later
    pub fn advanced(self) -> Self {
        Self {
            time: self.time + TIME_STEP,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AnimationState {
    pub clock: PhaseClock,
    /// Smoothed mean bin magnitude, 0-255
    pub energy: f64,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    /// State for the next frame: energy folds in `snapshot`, the clock ticks once
    pub fn next(self, snapshot: &[u8]) -> Self {
        Self {
            clock: self.clock.advanced(),
            energy: energy::integrate(self.energy, snapshot),
        }
    }
}
