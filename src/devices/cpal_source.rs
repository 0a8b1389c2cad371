//! Input devices and live streams from the native audio host.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use std::collections::HashMap;
use std::sync::Arc;

use super::host::quiet_host;
use super::tap::mix_to_mono;
use super::{Device, DeviceId, DeviceSource, SampleTap, StreamHandle, StreamId};
use crate::recording::RecorderError;

/// Device source backed by the default cpal host.
///
/// Devices are identified by their host name. Open streams are owned here
/// and closed when released.
pub struct CpalDeviceSource {
    host: cpal::Host,
    /// "default", a device name, or an index into the enumerated list
    preferred: String,
    streams: HashMap<StreamId, cpal::Stream>,
    next_stream: u64,
}

impl CpalDeviceSource {
    pub fn new(preferred: impl Into<String>) -> Self {
        Self {
            host: cpal::default_host(),
            preferred: preferred.into(),
            streams: HashMap::new(),
            next_stream: 0,
        }
    }

    /// Default input config of a device as `(sample rate, channels)`.
    pub fn default_config(&self, id: &DeviceId) -> Option<(u32, u16)> {
        let device = self.find_device(id).ok()?;
        quiet_host(|| device.default_input_config().ok())
            .ok()
            .flatten()
            .map(|config| (config.sample_rate().0, config.channels()))
    }

    fn find_device(&self, id: &DeviceId) -> Result<cpal::Device, RecorderError> {
        let devices = quiet_host(|| self.host.input_devices())
            .and_then(|r| r.map_err(|e| anyhow::anyhow!("{e}")))
            .map_err(|e| RecorderError::Acquisition(format!("Failed to enumerate devices: {e}")))?;

        for device in devices {
            if device.name().ok().as_deref() == Some(id.0.as_str()) {
                return Ok(device);
            }
        }

        Err(RecorderError::Acquisition(format!(
            "Audio input device '{id}' not found"
        )))
    }

    fn build_stream(
        device: &cpal::Device,
        tap: Arc<SampleTap>,
    ) -> Result<(cpal::Stream, u32), RecorderError> {
        let supported = device
            .default_input_config()
            .map_err(|e| RecorderError::Acquisition(e.to_string()))?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        tracing::debug!(
            "Device configuration: {}Hz, {} channels, {:?}",
            sample_rate,
            channels,
            sample_format
        );

        let on_error = |err: cpal::StreamError| tracing::error!("Audio stream error: {}", err);

        let stream = match sample_format {
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let mut mono = Vec::with_capacity(data.len() / channels.max(1));
                    mix_to_mono(data, channels, &mut mono);
                    tap.push(&mono);
                },
                on_error,
                None,
            ),
            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let converted: Vec<i16> = data
                        .iter()
                        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                        .collect();
                    let mut mono = Vec::with_capacity(converted.len() / channels.max(1));
                    mix_to_mono(&converted, channels, &mut mono);
                    tap.push(&mono);
                },
                on_error,
                None,
            ),
            SampleFormat::U16 => device.build_input_stream(
                &config,
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    let converted: Vec<i16> =
                        data.iter().map(|&s| (s as i32 - 32768) as i16).collect();
                    let mut mono = Vec::with_capacity(converted.len() / channels.max(1));
                    mix_to_mono(&converted, channels, &mut mono);
                    tap.push(&mono);
                },
                on_error,
                None,
            ),
            other => {
                return Err(RecorderError::Acquisition(format!(
                    "Unsupported sample format {other:?}"
                )))
            }
        }
        .map_err(|e| RecorderError::Acquisition(e.to_string()))?;

        stream
            .play()
            .map_err(|e| RecorderError::Acquisition(e.to_string()))?;

        Ok((stream, sample_rate))
    }
}

impl DeviceSource for CpalDeviceSource {
    fn enumerate(&mut self) -> Result<Vec<Device>, RecorderError> {
        let names = quiet_host(|| -> Result<Vec<String>, cpal::DevicesError> {
            Ok(self
                .host
                .input_devices()?
                .filter_map(|d| d.name().ok())
                .collect())
        })
        .map_err(|e| RecorderError::Acquisition(e.to_string()))?
        .map_err(|e| RecorderError::Acquisition(format!("Failed to enumerate devices: {e}")))?;

        let devices: Vec<Device> = names
            .iter()
            .enumerate()
            .map(|(index, name)| Device::new(name.clone(), name, index))
            .collect();

        tracing::info!("Found {} input device(s)", devices.len());
        Ok(devices)
    }

    fn acquire_stream(&mut self, id: &DeviceId) -> Result<StreamHandle, RecorderError> {
        let device = self.find_device(id)?;
        let tap = Arc::new(SampleTap::new());

        let (stream, sample_rate) = quiet_host(|| Self::build_stream(&device, Arc::clone(&tap)))
            .map_err(|e| RecorderError::Acquisition(e.to_string()))??;

        self.next_stream += 1;
        let stream_id = StreamId(self.next_stream);
        self.streams.insert(stream_id, stream);

        tracing::info!("Recording device: {} ({}Hz)", id, sample_rate);
        Ok(StreamHandle {
            id: stream_id,
            device: id.clone(),
            sample_rate,
            tap,
        })
    }

    fn release_stream(&mut self, stream: StreamHandle) {
        if let Some(open) = self.streams.remove(&stream.id) {
            if let Err(e) = open.pause() {
                tracing::debug!("Failed to pause stream before release: {}", e);
            }
            drop(open);
            tracing::debug!("Released stream on {}", stream.device);
        }
    }

    fn preferred_device(&self, devices: &[Device]) -> Option<DeviceId> {
        if self.preferred != "default" {
            if let Ok(index) = self.preferred.parse::<usize>() {
                if let Some(device) = devices.get(index) {
                    return Some(device.id.clone());
                }
            }
            if let Some(device) = devices.iter().find(|d| d.id.0 == self.preferred) {
                return Some(device.id.clone());
            }
            tracing::warn!(
                "Configured device '{}' not found, falling back to default",
                self.preferred
            );
        }

        let default_name = quiet_host(|| self.host.default_input_device().and_then(|d| d.name().ok()))
            .ok()
            .flatten();

        default_name
            .and_then(|name| devices.iter().find(|d| d.id.0 == name))
            .or_else(|| devices.first())
            .map(|d| d.id.clone())
    }
}
