//! Configuration file management.
//!
//! Handles loading and saving user preferences to `~/.ribbon-viz.toml`.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::audio::AnalyserSettings;
use crate::error::{Error, Result};

const DEFAULT_DEVICE_TIMEOUT_SECS: u64 = 3;

const CONFIG_TEMPLATE: &str = r#"# ribbon-viz configuration file

# Timeout in seconds when opening an audio device (default: 3)
# device_timeout_secs = 3

# Last selected audio device (auto-saved when chosen with --device)
# last_device = "Device Name"
# last_device_is_input = true

# =============================================================================
# Spectrum analyser
# =============================================================================

# Samples per FFT frame, power of two in 32..=32768 (bins = fft_size / 2)
# fft_size = 1024

# Per-bin averaging with the previous frame, 0 = none, 1 = frozen
# smoothing_time_constant = 0.8

# Decibel window mapped onto byte magnitudes 0-255
# min_decibels = -100.0
# max_decibels = -30.0
"#;

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Config {
    pub last_device: Option<String>,
    pub last_device_is_input: Option<bool>,
    pub device_timeout_secs: Option<u64>,

    // Analyser parameters
    pub fft_size: Option<usize>,
    pub smoothing_time_constant: Option<f64>,
    pub min_decibels: Option<f64>,
    pub max_decibels: Option<f64>,
}

impl Config {
    fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".ribbon-viz.toml"))
    }

    /// Load from the home directory, writing a commented template on first run
    pub fn load() -> Result<Self> {
        let path = match Self::path() {
            Some(p) => p,
            None => {
                warn!("No home directory, using default config");
                return Ok(Self::default());
            }
        };

        if !path.exists() {
            match fs::write(&path, CONFIG_TEMPLATE) {
                Ok(()) => info!("Created config template at {:?}", path),
                Err(e) => warn!("Could not write config template {:?}: {}", path, e),
            }
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self) -> Result<()> {
        match Self::path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string(self)?;
        fs::write(path, content).map_err(|source| Error::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Config saved to {:?}", path);
        Ok(())
    }

    pub fn set_device(&mut self, name: &str, is_input: bool) {
        self.last_device = Some(name.to_string());
        self.last_device_is_input = Some(is_input);
    }

    pub fn device_timeout(&self) -> Duration {
        Duration::from_secs(
            self.device_timeout_secs
                .unwrap_or(DEFAULT_DEVICE_TIMEOUT_SECS),
        )
    }

    /// Analyser parameters with defaults filled in, validated
    pub fn analyser_settings(&self) -> Result<AnalyserSettings> {
        let defaults = AnalyserSettings::default();
        AnalyserSettings {
            fft_size: self.fft_size.unwrap_or(defaults.fft_size),
            smoothing_time_constant: self
                .smoothing_time_constant
                .unwrap_or(defaults.smoothing_time_constant),
            min_decibels: self.min_decibels.unwrap_or(defaults.min_decibels),
            max_decibels: self.max_decibels.unwrap_or(defaults.max_decibels),
        }
        .validated()
    }
}
