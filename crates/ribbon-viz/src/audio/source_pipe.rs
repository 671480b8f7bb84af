//! Audio device capture and stream management.
//!
//! Captures a device with cpal into a mono ring buffer the analyser reads
//! each frame. The stream starts suspended; nothing is recorded until
//! [`SourcePipe::resume`] is called.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use log::{error, info, warn};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::analyser::SampleSource;
use crate::error::{Error, Result};
use crate::utils::Config;

/// Mono ring of the newest captured samples, shared with the cpal callback.
/// Writes are dropped until the ring is started.
#[derive(Clone)]
struct CaptureRing {
    buffer: Arc<Mutex<VecDeque<f32>>>,
    running: Arc<AtomicBool>,
    capacity: usize,
}

impl CaptureRing {
    fn new(capacity: usize) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(VecDeque::from(vec![0.0; capacity]))),
            running: Arc::new(AtomicBool::new(false)),
            capacity,
        }
    }

    fn start(&self) {
        self.ring.start();
    }

    fn write<T>(&self, data: &[T], channels: usize)
    where
        T: Sample,
        f32: FromSample<T>,
    {
        if !self.running.load(Ordering::Relaxed) {
            return;
        }
        let mut buf = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        push_interleaved(&mut buf, data, channels, self.capacity);
    }
}

impl SampleSource for CaptureRing {
    fn latest_samples(&mut self, out: &mut Vec<f32>) {
        let buf = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        out.extend(buf.iter().copied());
    }
}

/// Mix interleaved frames down to mono and append them, dropping the oldest
/// samples beyond `capacity`
fn push_interleaved<T>(buf: &mut VecDeque<f32>, data: &[T], channels: usize, capacity: usize)
where
    T: Sample,
    f32: FromSample<T>,
{
    for frame in data.chunks(channels.max(1)) {
        let sum: f32 = frame.iter().map(|&s| f32::from_sample(s)).sum();
        buf.push_back(sum / frame.len() as f32);
    }
    while buf.len() > capacity {
        buf.pop_front();
    }
}

pub struct DeviceInfo {
    pub device: cpal::Device,
    pub name: String,
    pub is_input: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PipeState {
    Suspended,
    Running,
}

pub struct SourcePipe {
    ring: CaptureRing,
    state: PipeState,
    device: DeviceInfo,
    sample_rate: u32,
    stream: Stream,
}

impl SourcePipe {
    /// Open a capture device, suspended.
    ///
    /// `requested` is an index into the device list; without one the device
    /// saved in `config` is preferred, then PipeWire/Pulse inputs, then the
    /// host's default input.
    pub fn open(requested: Option<usize>, config: &Config, capacity: usize) -> Result<Self> {
        let mut devices = Self::collect_devices();
        let names: Vec<(&str, bool)> = devices
            .iter()
            .map(|d| (d.name.as_str(), d.is_input))
            .collect();

        let default_input = cpal::default_host()
            .default_input_device()
            .and_then(|d| d.name().ok());
        let index = preferred_index(&names, requested, config, default_input.as_deref())?;
        let device = devices.swap_remove(index);

        let kind = if device.is_input { "input" } else { "output" };
        info!("[{}] Selected: {} ({})", index, device.name, kind);

        let (stream_config, format) =
            Self::get_config_with_timeout(&device.device, device.is_input, config.device_timeout())?;
        let sample_rate = stream_config.sample_rate.0;

        let ring = CaptureRing::new(capacity);
        let stream = Self::build_stream(&device, &stream_config, format, ring.clone())?;

        info!(
            "  -> {} Hz, {} channel(s), suspended",
            sample_rate, stream_config.channels
        );

        Ok(Self {
            ring,
            state: PipeState::Suspended,
            device,
            sample_rate,
            stream,
        })
    }

    pub fn list_devices() {
        info!("=== Audio Devices ===");
        for (idx, info) in Self::collect_devices().iter().enumerate() {
            let kind = if info.is_input { "input" } else { "output" };
            info!("  [{}] {} ({})", idx, info.name, kind);
        }
        info!("Use --device <index> to pick one");
    }

    fn collect_devices() -> Vec<DeviceInfo> {
        let host = cpal::default_host();
        let mut devices = Vec::new();

        if let Ok(input_devices) = host.input_devices() {
            for device in input_devices {
                if let Ok(name) = device.name() {
                    devices.push(DeviceInfo {
                        device,
                        name,
                        is_input: true,
                    });
                }
            }
        }

        // Output devices can be captured as loopback on some hosts
        if let Ok(output_devices) = host.output_devices() {
            for device in output_devices {
                if let Ok(name) = device.name() {
                    devices.push(DeviceInfo {
                        device,
                        name,
                        is_input: false,
                    });
                }
            }
        }

        devices
    }

    /// Get device config with timeout (the config call often hangs on bad devices)
    fn get_config_with_timeout(
        device: &Device,
        is_input: bool,
        timeout: Duration,
    ) -> Result<(StreamConfig, SampleFormat)> {
        let device_clone = device.clone();
        let (tx, rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let config = if is_input {
                device_clone.default_input_config()
            } else {
                device_clone.default_output_config()
            };
            let _ = tx.send(config);
        });

        match rx.recv_timeout(timeout) {
            Ok(config) => {
                let config = config?;
                Ok((config.config(), config.sample_format()))
            }
            Err(_) => Err(Error::DeviceTimeout(timeout)),
        }
    }

    fn build_stream(
        device: &DeviceInfo,
        config: &StreamConfig,
        format: SampleFormat,
        ring: CaptureRing,
    ) -> Result<Stream> {
        let stream = match format {
            SampleFormat::F32 => {
                Self::build_typed::<f32>(&device.device, config, ring)
            }
            SampleFormat::I16 => {
                Self::build_typed::<i16>(&device.device, config, ring)
            }
            SampleFormat::U16 => {
                Self::build_typed::<u16>(&device.device, config, ring)
            }
            SampleFormat::I32 => {
                Self::build_typed::<i32>(&device.device, config, ring)
            }
            other => return Err(Error::SampleFormat(other)),
        }?;
        Ok(stream)
    }

    fn build_typed<T>(
        device: &Device,
        config: &StreamConfig,
        ring: CaptureRing,
    ) -> Result<Stream>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let channels = (config.channels as usize).max(1);
        let err_fn = |err| error!("Audio stream error: {}", err);

        let stream = device.build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| ring.write(data, channels),
            err_fn,
            None,
        )?;
        Ok(stream)
    }

    /// Start delivering samples. Frames before this see silence.
    pub fn resume(&mut self) -> Result<()> {
        if self.state == PipeState::Running {
            return Ok(());
        }
        self.stream.play()?;
        self.ring.start();
        self.state = PipeState::Running;
        info!("Audio capture running: {}", self.device.name);
        Ok(())
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl SampleSource for SourcePipe {
    fn latest_samples(&mut self, out: &mut Vec<f32>) {
        self.ring.latest_samples(out);
    }
}

/// Pick a device index from `(name, is_input)` pairs
fn preferred_index(
    devices: &[(&str, bool)],
    requested: Option<usize>,
    config: &Config,
    default_input: Option<&str>,
) -> Result<usize> {
    if devices.is_empty() {
        return Err(Error::NoDevices);
    }

    if let Some(index) = requested {
        if index >= devices.len() {
            return Err(Error::DeviceIndex {
                index,
                count: devices.len(),
            });
        }
        return Ok(index);
    }

    let saved = config.last_device.as_deref().and_then(|name| {
        let is_input = config.last_device_is_input.unwrap_or(true);
        let found = devices
            .iter()
            .position(|&(n, input)| n == name && input == is_input);
        if found.is_none() {
            warn!("Saved device {:?} not found", name);
        }
        found
    });

    let index = saved
        // Prefer pipewire or pulse input devices (more reliable on Linux)
        .or_else(|| devices.iter().position(|&(n, input)| input && n == "pipewire"))
        .or_else(|| devices.iter().position(|&(n, input)| input && n == "pulse"))
        .or_else(|| {
            default_input.and_then(|name| {
                devices
                    .iter()
                    .position(|&(n, input)| input && n == name)
            })
        })
        .unwrap_or(0);

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AnalyserSettings, LiveSampler};
    use ribbon_core::SpectralSampler;

    #[test]
    fn test_stereo_is_averaged_to_mono() {
        let mut buf = VecDeque::new();
        push_interleaved(&mut buf, &[1.0f32, -1.0, 0.5, 0.5], 2, 8);
        assert_eq!(buf, [0.0, 0.5]);
    }

    #[test]
    fn test_ring_drops_oldest_beyond_capacity() {
        let mut buf = VecDeque::from(vec![0.0; 4]);
        let data: Vec<f32> = (1..=6).map(|i| i as f32).collect();
        push_interleaved(&mut buf, &data, 1, 4);
        assert_eq!(buf.len(), 4);
        assert_eq!(buf, [3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_integer_samples_are_normalized() {
        let mut buf = VecDeque::new();
        push_interleaved(&mut buf, &[i16::MIN, 0, 16384, -16384], 1, 8);
        assert_eq!(buf, [-1.0, 0.0, 0.5, -0.5]);

        buf.clear();
        push_interleaved(&mut buf, &[16384i16, -16384], 2, 8);
        assert_eq!(buf, [0.0]);
    }

    #[test]
    fn test_ring_ignores_writes_until_started() {
        let ring = CaptureRing::new(1024);
        let tone: Vec<f32> = (0..2048)
            .map(|i| (std::f32::consts::TAU * 10.0 * i as f32 / 1024.0).sin())
            .collect();
        ring.write(&tone, 1);

        let mut samples = Vec::new();
        ring.clone().latest_samples(&mut samples);
        assert_eq!(samples.len(), 1024);
        assert!(samples.iter().all(|&s| s == 0.0));

        let mut sampler = LiveSampler::new(ring.clone(), AnalyserSettings::default());
        let mut bins = vec![9u8; sampler.frequency_bin_count()];
        sampler.byte_frequency_data(&mut bins);
        assert!(bins.iter().all(|&b| b == 0));

        ring.start();
        ring.write(&tone, 1);
        sampler.byte_frequency_data(&mut bins);
        assert!(bins[10] > 0);
    }

    const DEVICES: &[(&str, bool)] = &[
        ("default", true),
        ("hw:CARD=USB", true),
        ("pulse", true),
        ("HDMI", false),
    ];

    #[test]
    fn test_requested_index_wins() {
        let config = Config::default();
        assert_eq!(preferred_index(DEVICES, Some(3), &config, None).unwrap(), 3);
    }

    #[test]
    fn test_requested_index_out_of_range() {
        let config = Config::default();
        assert!(matches!(
            preferred_index(DEVICES, Some(9), &config, None),
            Err(Error::DeviceIndex { index: 9, count: 4 })
        ));
    }

    #[test]
    fn test_saved_device_preferred() {
        let mut config = Config::default();
        config.set_device("hw:CARD=USB", true);
        assert_eq!(preferred_index(DEVICES, None, &config, None).unwrap(), 1);
    }

    #[test]
    fn test_saved_device_direction_must_match() {
        let mut config = Config::default();
        config.set_device("HDMI", true);
        // Falls through to the pulse input
        assert_eq!(preferred_index(DEVICES, None, &config, None).unwrap(), 2);
    }

    #[test]
    fn test_default_input_fallback() {
        let config = Config::default();
        let devices = &[("HDMI", false), ("mic", true)];
        assert_eq!(
            preferred_index(devices, None, &config, Some("mic")).unwrap(),
            1
        );
        assert_eq!(preferred_index(devices, None, &config, None).unwrap(), 0);
    }

    #[test]
    fn test_no_devices() {
        let config = Config::default();
        assert!(matches!(
            preferred_index(&[], None, &config, None),
            Err(Error::NoDevices)
        ));
    }
}
