//! Startup errors. Nothing in the frame loop is fallible.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read config {path:?}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path:?}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to write config {path:?}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize config")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("fft_size {0} must be a power of two between 32 and 32768")]
    FftSize(usize),

    #[error("smoothing_time_constant {0} must be between 0 and 1")]
    SmoothingTimeConstant(f64),

    #[error("min_decibels ({min}) must be below max_decibels ({max})")]
    DecibelRange { min: f64, max: f64 },

    #[error("no audio input devices found")]
    NoDevices,

    #[error("device index {index} out of range ({count} devices)")]
    DeviceIndex { index: usize, count: usize },

    #[error("device config timed out after {0:?}")]
    DeviceTimeout(Duration),

    #[error("failed to query device config")]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("unsupported sample format {0:?}")]
    SampleFormat(cpal::SampleFormat),

    #[error("failed to build input stream")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start input stream")]
    PlayStream(#[from] cpal::PlayStreamError),
}
