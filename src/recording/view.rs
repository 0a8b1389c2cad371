//! Screen state assembled from controller updates.

use super::binding::{ControlMode, Severity, UiBinding, UiUpdate};
use super::time_format::format_time;
use crate::clips::{ClipId, ClipSummary};
use crate::devices::{Device, DeviceId};

/// Everything the terminal UI draws, plus the clip selection cursor.
#[derive(Debug, Clone)]
pub struct RecorderView {
    pub status: Option<(String, Severity)>,
    pub devices: Vec<Device>,
    pub selected_device: Option<DeviceId>,
    pub clips: Vec<ClipSummary>,
    pub countdown: String,
    pub mode: ControlMode,
    pub record_enabled: bool,
    clip_cursor: Option<usize>,
}

impl RecorderView {
    pub fn new(default_duration_secs: u32) -> Self {
        Self {
            status: None,
            devices: Vec::new(),
            selected_device: None,
            clips: Vec::new(),
            countdown: format_time(default_duration_secs as f64),
            mode: ControlMode::Record,
            record_enabled: false,
            clip_cursor: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.mode == ControlMode::Stop
    }

    /// Index of the highlighted clip.
    pub fn clip_cursor(&self) -> Option<usize> {
        self.clip_cursor
    }

    pub fn selected_clip(&self) -> Option<ClipId> {
        self.clip_cursor
            .and_then(|i| self.clips.get(i))
            .map(|c| c.id)
    }

    pub fn select_next_clip(&mut self) {
        if self.clips.is_empty() {
            return;
        }
        let last = self.clips.len() - 1;
        self.clip_cursor = Some(self.clip_cursor.map_or(0, |i| (i + 1).min(last)));
    }

    pub fn select_previous_clip(&mut self) {
        if self.clips.is_empty() {
            return;
        }
        self.clip_cursor = Some(self.clip_cursor.map_or(0, |i| i.saturating_sub(1)));
    }

    /// Device `offset` places away from the selected one, wrapping around.
    pub fn device_after(&self, offset: isize) -> Option<DeviceId> {
        if self.devices.is_empty() {
            return None;
        }
        let len = self.devices.len() as isize;
        let current = self
            .selected_device
            .as_ref()
            .and_then(|id| self.devices.iter().position(|d| &d.id == id))
            .unwrap_or(0) as isize;
        let index = (current + offset).rem_euclid(len) as usize;
        Some(self.devices[index].id.clone())
    }

    pub fn selected_device_label(&self) -> Option<&str> {
        let id = self.selected_device.as_ref()?;
        self.devices
            .iter()
            .find(|d| &d.id == id)
            .map(|d| d.label.as_str())
    }

    fn set_clips(&mut self, clips: Vec<ClipSummary>) {
        let previous = self.selected_clip();
        let previous_index = self.clip_cursor;
        let grew = clips.len() > self.clips.len();
        self.clips = clips;

        self.clip_cursor = if self.clips.is_empty() {
            None
        } else if grew {
            // Highlight the newest clip.
            Some(self.clips.len() - 1)
        } else if let Some(index) = previous.and_then(|id| self.clips.iter().position(|c| c.id == id)) {
            Some(index)
        } else {
            Some(previous_index.unwrap_or(0).min(self.clips.len() - 1))
        };
    }
}

impl UiBinding for RecorderView {
    fn apply(&mut self, update: UiUpdate) {
        match update {
            UiUpdate::Status { message, severity } => self.status = Some((message, severity)),
            UiUpdate::Devices { devices, selected } => {
                self.devices = devices;
                self.selected_device = selected;
            }
            UiUpdate::Clips(clips) => self.set_clips(clips),
            UiUpdate::Countdown(text) => self.countdown = text,
            UiUpdate::Controls {
                mode,
                record_enabled,
            } => {
                self.mode = mode;
                self.record_enabled = record_enabled;
            }
        }
    }
}
