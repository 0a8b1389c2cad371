//! Audio input devices, live streams and capture.
//!
//! The recorder controller only sees the traits defined here. The cpal
//! backed implementations are what the terminal app wires in.

pub mod capture;
pub mod cpal_source;
mod host;
pub mod tap;

use std::fmt;
use std::sync::Arc;

use crate::recording::RecorderError;

pub use capture::{CaptureSink, PcmCapture, RecorderHandle};
pub use cpal_source::CpalDeviceSource;
pub use tap::SampleTap;

/// Stable identifier of an input device.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(pub String);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An input device as listed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: DeviceId,
    pub label: String,
}

impl Device {
    /// Builds a device entry, naming unlabeled devices `Microphone {n}`.
    pub fn new(id: impl Into<String>, label: &str, index: usize) -> Self {
        let label = if label.trim().is_empty() {
            format!("Microphone {}", index + 1)
        } else {
            label.to_string()
        };
        Self {
            id: DeviceId(id.into()),
            label,
        }
    }
}

/// Identifies one acquired stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(pub u64);

/// A live input stream.
///
/// Holding a handle does not keep the stream open; the device source owns
/// the underlying resources until [`DeviceSource::release_stream`].
#[derive(Debug, Clone)]
pub struct StreamHandle {
    pub id: StreamId,
    pub device: DeviceId,
    pub sample_rate: u32,
    pub tap: Arc<SampleTap>,
}

/// Supplies input devices and live streams.
pub trait DeviceSource {
    /// Lists the available input devices.
    fn enumerate(&mut self) -> Result<Vec<Device>, RecorderError>;

    /// Opens a live stream on `device`.
    ///
    /// Fails with [`RecorderError::Acquisition`] when the device is busy,
    /// denied or missing.
    fn acquire_stream(&mut self, device: &DeviceId) -> Result<StreamHandle, RecorderError>;

    /// Closes a stream and frees its resources.
    fn release_stream(&mut self, stream: StreamHandle);

    /// Device to select first when none was requested.
    fn preferred_device(&self, devices: &[Device]) -> Option<DeviceId> {
        devices.first().map(|d| d.id.clone())
    }
}
