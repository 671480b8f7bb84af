//! Ribbon curve generation.
//!
//! A ribbon is a circle whose radius is perturbed by two harmonics: an idle
//! 3-lobe wave advancing with time that keeps the ring breathing at
//! silence, and a 6-lobe wave regressing at three times the rate whose
//! amplitude follows the smoothed energy. The wave constants are tuned by
//! eye and kept as-is.

use std::f64::consts::TAU;

use crate::canvas::{Canvas, Point};

pub const BASE_RADIUS: f64 = 145.0;
/// Angular samples per revolution
pub const POINTS: usize = 360;

const IDLE_HARMONIC: f64 = 3.0;
const IDLE_AMPLITUDE: f64 = 7.0;
const ENERGY_HARMONIC: f64 = 6.0;
const ENERGY_GAIN: f64 = 0.35;
const ENERGY_PHASE_RATE: f64 = 3.0;

/// Closed polar polyline. The last point revisits the angle of the first,
/// so `points().len() == samples + 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct RibbonCurve {
    points: Vec<Point>,
}

impl RibbonCurve {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }
}

/// Fixed layout shared by every ribbon in a frame
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RibbonGeometry {
    pub center: Point,
    pub base_radius: f64,
    pub samples: usize,
}

impl Default for RibbonGeometry {
    fn default() -> Self {
        Self {
            center: Canvas::default().center(),
            base_radius: BASE_RADIUS,
            samples: POINTS,
        }
    }
}

impl RibbonGeometry {
    pub fn with_center(center: Point) -> Self {
        Self {
            center,
            ..Self::default()
        }
    }

    /// Angle of sample `i`, in radians
    pub fn angle(&self, i: usize) -> f64 {
        (i as f64 / self.samples as f64) * TAU
    }

    /// Distance from the center at `angle`
    pub fn radius(&self, angle: f64, time: f64, energy: f64, radius_offset: f64) -> f64 {
        let idle_wave = (angle * IDLE_HARMONIC + time).sin() * IDLE_AMPLITUDE;
        let energy_wave =
            (angle * ENERGY_HARMONIC - time * ENERGY_PHASE_RATE).sin() * energy * ENERGY_GAIN;
        self.base_radius + radius_offset + idle_wave + energy_wave
    }

    /// Generate the ribbon for one layer.
    ///
    /// Pure: the same inputs always give the same curve. Negative offsets
    /// are not rejected.
    pub fn ribbon(&self, time: f64, energy: f64, radius_offset: f64) -> RibbonCurve {
        let points = (0..=self.samples)
            .map(|i| {
                let angle = self.angle(i);
                let r = self.radius(angle, time, energy, radius_offset);
                Point::new(
                    self.center.x + angle.cos() * r,
                    self.center.y + angle.sin() * r,
                )
            })
            .collect();

        RibbonCurve { points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    #[test]
    fn test_rest_scenario_first_point() {
        let geometry = RibbonGeometry::default();
        let curve = geometry.ribbon(0.0, 0.0, 0.0);
        let first = curve.first().unwrap();

        assert_abs_diff_eq!(geometry.radius(0.0, 0.0, 0.0, 0.0), 145.0);
        assert_abs_diff_eq!(first.x, 365.0, epsilon = 1e-12);
        assert_abs_diff_eq!(first.y, 220.0, epsilon = 1e-12);
    }

    #[test]
    fn test_default_center_is_canvas_center() {
        let canvas = Canvas::default();
        assert_eq!(RibbonGeometry::default().center, canvas.center());
        assert_eq!(
            RibbonGeometry::default(),
            RibbonGeometry::with_center(canvas.center())
        );
    }

    #[test]
    fn test_sample_count_includes_closing_point() {
        let curve = RibbonGeometry::default().ribbon(1.0, 10.0, 4.0);
        assert_eq!(curve.points().len(), POINTS + 1);
    }

    #[test_case(0.0, 0.0, 0.0)]
    #[test_case(3.7, 120.0, 8.0)]
    #[test_case(1234.5, 255.0, 28.0)]
    #[test_case(0.015, 18.0, -4.0)]
    fn test_curve_closes(time: f64, energy: f64, offset: f64) {
        let curve = RibbonGeometry::default().ribbon(time, energy, offset);
        let (first, last) = (curve.first().unwrap(), curve.last().unwrap());
        assert!(first.distance(last) <= 1e-9, "{:?} vs {:?}", first, last);
    }

    #[test]
    fn test_deterministic() {
        let geometry = RibbonGeometry::default();
        let a = geometry.ribbon(42.42, 97.0, 12.0);
        let b = geometry.ribbon(42.42, 97.0, 12.0);
        assert_eq!(a, b);
        for (p, q) in a.points().iter().zip(b.points()) {
            assert_eq!(p.x.to_bits(), q.x.to_bits());
            assert_eq!(p.y.to_bits(), q.y.to_bits());
        }
    }

    #[test_case(0.0, 0.0)]
    #[test_case(2.5, 12.0)]
    #[test_case(-1.0, 28.0)]
    fn test_idle_only_at_zero_energy(time: f64, offset: f64) {
        let geometry = RibbonGeometry::default();
        let curve = geometry.ribbon(time, 0.0, offset);
        let mut max_dev = 0.0f64;

        for (i, p) in curve.points().iter().enumerate() {
            let angle = geometry.angle(i);
            let r = p.distance(geometry.center);
            let expected = BASE_RADIUS + offset + 7.0 * (angle * 3.0 + time).sin();
            assert_abs_diff_eq!(r, expected, epsilon = 1e-9);
            max_dev = max_dev.max((r - (BASE_RADIUS + offset)).abs());
        }

        assert!(max_dev <= 7.0 + 1e-9);
        // 360 samples of a 3-lobe wave land within a hair of every crest
        assert_abs_diff_eq!(max_dev, 7.0, epsilon = 1e-2);
    }

    #[test]
    fn test_energy_widens_excursion() {
        let geometry = RibbonGeometry::default();
        let spread = |energy: f64| {
            geometry
                .ribbon(0.7, energy, 0.0)
                .points()
                .iter()
                .map(|p| (p.distance(geometry.center) - BASE_RADIUS).abs())
                .fold(0.0f64, f64::max)
        };
        assert!(spread(200.0) > spread(0.0) + 50.0);
    }

    #[test]
    fn test_offset_shifts_radius_uniformly() {
        let geometry = RibbonGeometry::default();
        let inner = geometry.ribbon(5.0, 60.0, 0.0);
        let outer = geometry.ribbon(5.0, 60.0, 16.0);
        for (a, b) in inner.points().iter().zip(outer.points()) {
            let dr = b.distance(geometry.center) - a.distance(geometry.center);
            assert_abs_diff_eq!(dr, 16.0, epsilon = 1e-9);
        }
    }
}
