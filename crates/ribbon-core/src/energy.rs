//! Energy integrator: spectral snapshot → smoothed loudness.
//!
//! The snapshot mean is run through a one-pole low-pass filter, which damps
//! frame-to-frame noise while following sustained changes within a few
//! hundred milliseconds at 60fps (time constant of roughly 8 frames).

/// Fraction of the gap to the new average closed each frame
pub const SMOOTHING: f64 = 0.12;

/// Arithmetic mean of all bin magnitudes. An empty snapshot averages to 0.
pub fn mean_magnitude(snapshot: &[u8]) -> f64 {
    if snapshot.is_empty() {
        return 0.0;
    }
    let sum: u64 = snapshot.iter().map(|&b| b as u64).sum();
    sum as f64 / snapshot.len() as f64
}

/// One smoothing step from `energy` towards `avg`
pub fn smooth(energy: f64, avg: f64) -> f64 {
    energy + (avg - energy) * SMOOTHING
}

/// Fold a new snapshot into the running energy
pub fn integrate(energy: f64, snapshot: &[u8]) -> f64 {
    smooth(energy, mean_magnitude(snapshot))
}
