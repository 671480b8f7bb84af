//! Spectrum analyser producing byte frequency magnitudes.
//!
//! Follows the Web Audio `AnalyserNode` model: Blackman-windowed FFT over the
//! newest `fft_size` samples, per-bin smoothing against the previous frame,
//! then a linear map of a decibel window onto 0-255.

use num_complex::Complex;
use ribbon_core::SpectralSampler;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::TAU;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Analysis window length. 1024 samples give 512 bins.
pub const DEFAULT_FFT_SIZE: usize = 1024;

const MIN_FFT_SIZE: usize = 32;
const MAX_FFT_SIZE: usize = 32768;

#[derive(Clone, Debug, PartialEq)]
pub struct AnalyserSettings {
    pub fft_size: usize,
    /// Weight of the previous frame in per-bin smoothing (0-1)
    pub smoothing_time_constant: f64,
    /// Level mapped to byte 0
    pub min_decibels: f64,
    /// Level mapped to byte 255
    pub max_decibels: f64,
}

impl Default for AnalyserSettings {
    fn default() -> Self {
        Self {
            fft_size: DEFAULT_FFT_SIZE,
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyserSettings {
    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn validated(self) -> Result<Self> {
        if !self.fft_size.is_power_of_two()
            || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&self.fft_size)
        {
            return Err(Error::FftSize(self.fft_size));
        }
        if !(0.0..=1.0).contains(&self.smoothing_time_constant) {
            return Err(Error::SmoothingTimeConstant(self.smoothing_time_constant));
        }
        if !(self.min_decibels < self.max_decibels) {
            return Err(Error::DecibelRange {
                min: self.min_decibels,
                max: self.max_decibels,
            });
        }
        Ok(self)
    }
}

/// Anything that can hand over its most recent mono samples, oldest first
pub trait SampleSource {
    fn latest_samples(&mut self, out: &mut Vec<f32>);
}

pub struct Analyser {
    settings: AnalyserSettings,

    // FFT resources (pre-allocated)
    fft: Arc<dyn Fft<f32>>,
    fft_buffer: Vec<Complex<f32>>,
    fft_window: Vec<f32>,

    /// Smoothed linear magnitude per bin
    smoothed: Vec<f64>,
}

impl Analyser {
    pub fn new(settings: AnalyserSettings) -> Self {
        let n = settings.fft_size;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n);

        // Pre-compute Blackman window
        const A0: f64 = 0.42;
        const A1: f64 = 0.5;
        const A2: f64 = 0.08;
        let fft_window: Vec<f32> = (0..n)
            .map(|i| {
                let x = i as f64 / n as f64;
                (A0 - A1 * (TAU * x).cos() + A2 * (2.0 * TAU * x).cos()) as f32
            })
            .collect();

        Self {
            fft,
            fft_buffer: vec![Complex::new(0.0, 0.0); n],
            fft_window,
            smoothed: vec![0.0; settings.frequency_bin_count()],
            settings,
        }
    }

    pub fn frequency_bin_count(&self) -> usize {
        self.settings.frequency_bin_count()
    }

    /// Analyse the newest `fft_size` samples of `samples` (oldest first).
    /// Shorter input is treated as preceded by silence.
    pub fn process(&mut self, samples: &[f32]) {
        let n = self.settings.fft_size;
        let take = samples.len().min(n);
        let pad = n - take;
        let recent = &samples[samples.len() - take..];

        for (i, slot) in self.fft_buffer.iter_mut().enumerate() {
            let s = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(s * self.fft_window[i], 0.0);
        }

        self.fft.process(&mut self.fft_buffer);

        let tau = self.settings.smoothing_time_constant;
        let scale = 1.0 / n as f64;
        for (k, value) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.fft_buffer[k].norm() as f64 * scale;
            let next = tau * *value + (1.0 - tau) * magnitude;
            *value = if next.is_finite() { next } else { 0.0 };
        }
    }

    /// Current smoothed spectrum as bytes
    pub fn byte_frequency_data(&self, out: &mut [u8]) {
        let min = self.settings.min_decibels;
        let range = self.settings.max_decibels - min;

        for (byte, &magnitude) in out.iter_mut().zip(&self.smoothed) {
            let db = 20.0 * magnitude.log10();
            let scaled = 255.0 * (db - min) / range;
            // -inf for silent bins clamps to 0
            *byte = scaled.clamp(0.0, 255.0) as u8;
        }
        if out.len() > self.smoothed.len() {
            out[self.smoothed.len()..].iter_mut().for_each(|b| *b = 0);
        }
    }
}

/// Live spectral sampler: pulls captured samples and analyses them once per read
pub struct LiveSampler<S> {
    source: S,
    analyser: Analyser,
    samples: Vec<f32>,
}

impl<S: SampleSource> LiveSampler<S> {
    pub fn new(source: S, settings: AnalyserSettings) -> Self {
        let capacity = settings.fft_size;
        Self {
            source,
            analyser: Analyser::new(settings),
            samples: Vec::with_capacity(capacity),
        }
    }
}

impl<S: SampleSource> SpectralSampler for LiveSampler<S> {
    fn frequency_bin_count(&self) -> usize {
        self.analyser.frequency_bin_count()
    }

    fn byte_frequency_data(&mut self, out: &mut [u8]) {
        self.samples.clear();
        self.source.latest_samples(&mut self.samples);
        self.analyser.process(&self.samples);
        self.analyser.byte_frequency_data(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(bin: usize, n: usize, amplitude: f32) -> Vec<f32> {
        (0..n)
            .map(|i| amplitude * (TAU * bin as f64 * i as f64 / n as f64).sin() as f32)
            .collect()
    }

    struct Fixed(Vec<f32>);

    impl SampleSource for Fixed {
        fn latest_samples(&mut self, out: &mut Vec<f32>) {
            out.extend_from_slice(&self.0);
        }
    }

    #[test]
    fn test_default_bin_count() {
        let analyser = Analyser::new(AnalyserSettings::default());
        assert_eq!(analyser.frequency_bin_count(), 512);
    }

    #[test]
    fn test_blackman_window_shape() {
        let analyser = Analyser::new(AnalyserSettings::default());
        let w = &analyser.fft_window;
        assert!(w[0].abs() < 1e-6);
        assert!((w[512] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_silence_reads_zero() {
        let mut analyser = Analyser::new(AnalyserSettings::default());
        analyser.process(&vec![0.0; 1024]);
        let mut out = vec![7u8; 512];
        analyser.byte_frequency_data(&mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_empty_input_reads_zero() {
        let mut analyser = Analyser::new(AnalyserSettings::default());
        analyser.process(&[]);
        let mut out = vec![1u8; 512];
        analyser.byte_frequency_data(&mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        // Wide decibel window so the main lobe does not saturate
        let settings = AnalyserSettings {
            smoothing_time_constant: 0.0,
            max_decibels: 0.0,
            ..AnalyserSettings::default()
        };
        let mut analyser = Analyser::new(settings);
        analyser.process(&sine(64, 1024, 1.0));

        let mut out = vec![0u8; 512];
        analyser.byte_frequency_data(&mut out);

        let peak = out
            .iter()
            .enumerate()
            .max_by_key(|&(_, &b)| b)
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 64);
        assert!(out[64] > out[63] && out[64] > out[65]);
        assert_eq!(out[300], 0);
    }

    #[test]
    fn test_smoothing_rises_gradually() {
        let mut analyser = Analyser::new(AnalyserSettings::default());
        let tone = sine(32, 1024, 0.001);
        let mut out = vec![0u8; 512];

        analyser.process(&tone);
        analyser.byte_frequency_data(&mut out);
        let first = out[32];

        for _ in 0..30 {
            analyser.process(&tone);
        }
        analyser.byte_frequency_data(&mut out);
        assert!(out[32] > first, "{} should exceed {}", out[32], first);
    }

    #[test]
    fn test_short_input_is_front_padded() {
        let settings = AnalyserSettings {
            smoothing_time_constant: 0.0,
            ..AnalyserSettings::default()
        };
        let mut analyser = Analyser::new(settings);
        analyser.process(&sine(64, 512, 1.0));
        let mut out = vec![0u8; 512];
        analyser.byte_frequency_data(&mut out);
        assert!(out[128] > 200, "half-length tone lands on bin 128");
    }

    #[test]
    fn test_live_sampler_reads_source() {
        let source = Fixed(sine(10, 1024, 1.0));
        let mut sampler = LiveSampler::new(source, AnalyserSettings::default());
        let mut out = vec![0u8; sampler.frequency_bin_count()];
        sampler.byte_frequency_data(&mut out);
        assert!(out[10] > 0);
    }

    #[test]
    fn test_settings_validation() {
        let ok = AnalyserSettings::default().validated();
        assert!(ok.is_ok());

        let bad_size = AnalyserSettings {
            fft_size: 16,
            ..AnalyserSettings::default()
        };
        assert!(matches!(bad_size.validated(), Err(Error::FftSize(16))));

        let bad_tau = AnalyserSettings {
            smoothing_time_constant: 1.5,
            ..AnalyserSettings::default()
        };
        assert!(matches!(
            bad_tau.validated(),
            Err(Error::SmoothingTimeConstant(_))
        ));

        let bad_range = AnalyserSettings {
            min_decibels: -30.0,
            max_decibels: -30.0,
            ..AnalyserSettings::default()
        };
        assert!(matches!(
            bad_range.validated(),
            Err(Error::DecibelRange { .. })
        ));
    }
}
