//! Notifications from the controller to whatever renders it.

use crate::clips::ClipSummary;
use crate::devices::{Device, DeviceId};

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Neutral,
    Success,
    Error,
}

/// Which primary control the UI offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    /// Idle: offer to record
    Record,
    /// Recording: offer to stop, show the recording indicator
    Stop,
}

/// A state change the UI must reflect.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    Status { message: String, severity: Severity },
    Devices { devices: Vec<Device>, selected: Option<DeviceId> },
    Clips(Vec<ClipSummary>),
    Countdown(String),
    Controls { mode: ControlMode, record_enabled: bool },
}

/// Receives controller state. Never read back by the controller.
pub trait UiBinding {
    fn apply(&mut self, update: UiUpdate);
}

/// Collects every update; handy for tests and headless runs.
impl UiBinding for Vec<UiUpdate> {
    fn apply(&mut self, update: UiUpdate) {
        self.push(update);
    }
}
