//! Fake collaborators for driving the recorder controller in tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use clipdeck::clips::export::AudioPlayer;
use clipdeck::clips::{MemoryPlayables, PlayableRef, PlayableResource};
use clipdeck::devices::{
    CaptureSink, Device, DeviceId, DeviceSource, RecorderHandle, SampleTap, StreamHandle,
    StreamId,
};
use clipdeck::recording::{
    Collaborators, ControlMode, ManualClock, RecorderController, RecorderError, Severity,
    UiUpdate,
};

pub const CHUNK: [u8; 4] = [1, 2, 3, 4];
pub const TAIL: [u8; 2] = [9, 9];

/// Device source activity in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    Acquired(DeviceId),
    Released(DeviceId),
}

#[derive(Debug, Clone, Default)]
pub struct DeviceLog(Rc<RefCell<Vec<DeviceEvent>>>);

impl DeviceLog {
    pub fn events(&self) -> Vec<DeviceEvent> {
        self.0.borrow().clone()
    }

    fn push(&self, event: DeviceEvent) {
        self.0.borrow_mut().push(event);
    }
}

pub struct FakeDevices {
    devices: Vec<Device>,
    denied: Vec<DeviceId>,
    enumerate_error: Option<RecorderError>,
    log: DeviceLog,
    next_stream: u64,
}

impl FakeDevices {
    /// Devices with ids `mic-0`, `mic-1`, ... and the given labels.
    pub fn with_labels(labels: &[&str], log: DeviceLog) -> Self {
        let devices = labels
            .iter()
            .enumerate()
            .map(|(i, label)| Device::new(format!("mic-{i}"), label, i))
            .collect();
        Self {
            devices,
            denied: Vec::new(),
            enumerate_error: None,
            log,
            next_stream: 0,
        }
    }

    pub fn none(log: DeviceLog) -> Self {
        Self::with_labels(&[], log)
    }

    /// Acquiring `id` fails like a denied permission prompt.
    pub fn denying(mut self, id: &str) -> Self {
        self.denied.push(DeviceId(id.to_string()));
        self
    }

    pub fn failing_enumeration(mut self, error: RecorderError) -> Self {
        self.enumerate_error = Some(error);
        self
    }
}

impl DeviceSource for FakeDevices {
    fn enumerate(&mut self) -> Result<Vec<Device>, RecorderError> {
        match &self.enumerate_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.devices.clone()),
        }
    }

    fn acquire_stream(&mut self, device: &DeviceId) -> Result<StreamHandle, RecorderError> {
        if self.denied.contains(device) {
            return Err(RecorderError::Acquisition("Permission denied".to_string()));
        }
        self.next_stream += 1;
        self.log.push(DeviceEvent::Acquired(device.clone()));

        let tap = Arc::new(SampleTap::with_window(4));
        tap.push(&[0, 16384, 0, -16384]);
        Ok(StreamHandle {
            id: StreamId(self.next_stream),
            device: device.clone(),
            sample_rate: 8000,
            tap,
        })
    }

    fn release_stream(&mut self, stream: StreamHandle) {
        self.log.push(DeviceEvent::Released(stream.device));
    }
}

/// Yields one [`CHUNK`] per poll and a [`TAIL`] when stopped.
#[derive(Debug, Default)]
pub struct FakeCapture {
    next: u64,
    active: Option<RecorderHandle>,
    fail_begin: bool,
    fail_finalize: bool,
}

impl FakeCapture {
    pub fn failing_begin() -> Self {
        Self {
            fail_begin: true,
            ..Self::default()
        }
    }

    pub fn failing_finalize() -> Self {
        Self {
            fail_finalize: true,
            ..Self::default()
        }
    }
}

impl CaptureSink for FakeCapture {
    fn begin(&mut self, _stream: &StreamHandle) -> Result<RecorderHandle, RecorderError> {
        if self.fail_begin {
            return Err(RecorderError::CaptureStart("recorder unavailable".to_string()));
        }
        self.next += 1;
        let handle = RecorderHandle(self.next);
        self.active = Some(handle);
        Ok(handle)
    }

    fn take_chunks(&mut self, handle: &RecorderHandle) -> Vec<Vec<u8>> {
        if self.active.as_ref() == Some(handle) {
            vec![CHUNK.to_vec()]
        } else {
            Vec::new()
        }
    }

    fn end(&mut self, handle: RecorderHandle) -> Vec<Vec<u8>> {
        if self.active == Some(handle) {
            self.active = None;
            vec![TAIL.to_vec()]
        } else {
            Vec::new()
        }
    }

    fn finalize(&self, chunks: &[Vec<u8>]) -> Result<Vec<u8>, RecorderError> {
        if self.fail_finalize {
            return Err(RecorderError::Encode("encoder crashed".to_string()));
        }
        Ok(chunks.concat())
    }
}

/// In-memory playables whose live count stays observable after the
/// controller takes ownership.
#[derive(Clone, Default)]
pub struct SharedPlayables(Rc<RefCell<MemoryPlayables>>);

impl SharedPlayables {
    pub fn live(&self) -> usize {
        self.0.borrow().live()
    }
}

impl PlayableResource for SharedPlayables {
    fn create(&mut self, audio: Arc<[u8]>) -> PlayableRef {
        self.0.borrow_mut().create(audio)
    }

    fn resolve(&self, reference: &PlayableRef) -> Option<Arc<[u8]>> {
        self.0.borrow().resolve(reference)
    }

    fn revoke(&mut self, reference: &PlayableRef) {
        self.0.borrow_mut().revoke(reference)
    }
}

/// Records the files it was asked to play.
#[derive(Clone, Default)]
pub struct FakePlayer {
    played: Rc<RefCell<Vec<PathBuf>>>,
    fail: bool,
}

impl FakePlayer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn played(&self) -> Vec<PathBuf> {
        self.played.borrow().clone()
    }
}

impl AudioPlayer for FakePlayer {
    fn play(&mut self, path: &Path) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("No audio player found");
        }
        self.played.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

pub struct Harness {
    pub controller: RecorderController<Vec<UiUpdate>>,
    pub clock: ManualClock,
    pub devices: DeviceLog,
    pub playables: SharedPlayables,
    pub player: FakePlayer,
    pub playback_dir: tempfile::TempDir,
}

/// 2:05 PM local time.
pub fn wall_origin() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 1, 14, 5, 0).unwrap()
}

pub fn harness(labels: &[&str]) -> Harness {
    let log = DeviceLog::default();
    harness_with(FakeDevices::with_labels(labels, log.clone()), FakeCapture::default(), log)
}

pub fn harness_with(devices: FakeDevices, capture: FakeCapture, log: DeviceLog) -> Harness {
    harness_playing(devices, capture, log, FakePlayer::default())
}

pub fn harness_playing(
    devices: FakeDevices,
    capture: FakeCapture,
    log: DeviceLog,
    player: FakePlayer,
) -> Harness {
    let clock = ManualClock::starting_at(wall_origin());
    let playables = SharedPlayables::default();
    let playback_dir = tempfile::tempdir().unwrap();
    let controller = RecorderController::new(
        Collaborators {
            devices: Box::new(devices),
            capture: Box::new(capture),
            playables: Box::new(playables.clone()),
            clock: Box::new(clock.clone()),
            player: Box::new(player.clone()),
            ui: Vec::new(),
        },
        10,
    )
    .with_playback_dir(playback_dir.path());
    Harness {
        controller,
        clock,
        devices: log,
        playables,
        player,
        playback_dir,
    }
}

/// A harness with two microphones, initialized and connected to the first.
pub fn ready() -> Harness {
    let mut h = harness(&["Built-in", "USB Mic"]);
    h.controller.initialize().unwrap();
    h.controller.ui_mut().clear();
    h
}

pub fn statuses(updates: &[UiUpdate]) -> Vec<(String, Severity)> {
    updates
        .iter()
        .filter_map(|u| match u {
            UiUpdate::Status { message, severity } => Some((message.clone(), *severity)),
            _ => None,
        })
        .collect()
}

pub fn errors(updates: &[UiUpdate]) -> Vec<String> {
    statuses(updates)
        .into_iter()
        .filter(|(_, severity)| *severity == Severity::Error)
        .map(|(message, _)| message)
        .collect()
}

pub fn last_countdown(updates: &[UiUpdate]) -> Option<String> {
    updates.iter().rev().find_map(|u| match u {
        UiUpdate::Countdown(text) => Some(text.clone()),
        _ => None,
    })
}

pub fn last_clip_count(updates: &[UiUpdate]) -> Option<usize> {
    updates.iter().rev().find_map(|u| match u {
        UiUpdate::Clips(clips) => Some(clips.len()),
        _ => None,
    })
}

pub fn last_controls(updates: &[UiUpdate]) -> Option<(ControlMode, bool)> {
    updates.iter().rev().find_map(|u| match u {
        UiUpdate::Controls {
            mode,
            record_enabled,
        } => Some((*mode, *record_enabled)),
        _ => None,
    })
}

pub fn clip_names(h: &Harness) -> Vec<String> {
    h.controller.clips().list().map(|c| c.name.clone()).collect()
}
