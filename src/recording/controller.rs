//! The recording state machine.
//!
//! [`RecorderController`] owns the selected stream, the active session, its
//! timers and the clip queue. Every input arrives as an explicit call: user
//! commands, [`RecorderController::tick`] from the frame ticker, and frame
//! requests for the waveform. Nothing here blocks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use super::binding::{ControlMode, Severity, UiBinding, UiUpdate};
use super::clock::Clock;
use super::duration::resolve_duration;
use super::error::{RecorderError, Result};
use super::scheduler::{Scheduler, TimerKind};
use super::time_format::format_time;
use super::visualizations::{WaveformFrame, WaveformRenderer};
use crate::clips::export::{self, AudioPlayer};
use crate::clips::{Clip, ClipId, ClipQueue, PlayableResource};
use crate::devices::{CaptureSink, Device, DeviceId, DeviceSource, RecorderHandle, StreamHandle};

/// Interval of the remaining-time display updates.
pub const COUNTDOWN_TICK: Duration = Duration::from_millis(100);

/// A recording in progress.
#[derive(Debug)]
struct RecordingSession {
    handle: RecorderHandle,
    duration_secs: u32,
    started_at: Instant,
    chunks: Vec<Vec<u8>>,
}

impl RecordingSession {
    fn remaining_secs(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.started_at).as_secs_f64();
        (self.duration_secs as f64 - elapsed).max(0.0)
    }
}

#[derive(Debug)]
enum RecorderState {
    Idle,
    Recording(RecordingSession),
}

/// Public view of the controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Recording,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Manual,
    Deadline,
    CountdownElapsed,
    DeviceSwitch,
}

/// Result of a command that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Started { duration_secs: u32 },
    Stopped { clip: ClipId, reason: StopReason },
    DeviceSelected(DeviceId),
    ClipDeleted(ClipId),
    ClipSaved(std::path::PathBuf),
    ClipPlaying(ClipId),
    /// A tick that did not end a session
    Ticked,
    /// The command does not apply in the current state
    Ignored,
}

/// Collaborators injected into the controller.
pub struct Collaborators<U> {
    pub devices: Box<dyn DeviceSource>,
    pub capture: Box<dyn CaptureSink>,
    pub playables: Box<dyn PlayableResource>,
    pub clock: Box<dyn Clock>,
    pub player: Box<dyn AudioPlayer>,
    pub ui: U,
}

/// Owns the recorder state machine and its collaborators.
pub struct RecorderController<U: UiBinding> {
    devices: Box<dyn DeviceSource>,
    capture: Box<dyn CaptureSink>,
    clock: Box<dyn Clock>,
    player: Box<dyn AudioPlayer>,
    ui: U,
    clips: ClipQueue,
    /// Files handed to the player, removed with their clip
    playback_files: HashMap<ClipId, PathBuf>,
    playback_dir: PathBuf,
    scheduler: Scheduler,
    waveform: WaveformRenderer,
    state: RecorderState,
    stream: Option<StreamHandle>,
    device_list: Vec<Device>,
    selected: Option<DeviceId>,
    default_duration_secs: u32,
}

impl<U: UiBinding> RecorderController<U> {
    /// Creates an idle controller. `default_duration_secs` is used when the
    /// duration input holds no number.
    pub fn new(parts: Collaborators<U>, default_duration_secs: u32) -> Self {
        Self {
            devices: parts.devices,
            capture: parts.capture,
            clock: parts.clock,
            player: parts.player,
            ui: parts.ui,
            clips: ClipQueue::new(parts.playables),
            playback_files: HashMap::new(),
            playback_dir: std::env::temp_dir(),
            scheduler: Scheduler::new(),
            waveform: WaveformRenderer::new(),
            state: RecorderState::Idle,
            stream: None,
            device_list: Vec::new(),
            selected: None,
            default_duration_secs,
        }
    }

    /// Writes playback files into `dir` instead of the system temp directory.
    pub fn with_playback_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.playback_dir = dir.into();
        self
    }

    // Commands

    /// Lists devices and connects the preferred one.
    ///
    /// # Errors
    /// - `NoDevicesFound` if the device source lists nothing
    /// - `Acquisition` if listing or connecting fails
    pub fn initialize(&mut self) -> Result<CommandOutcome> {
        let devices = match self.devices.enumerate() {
            Ok(devices) => devices,
            Err(e) => return self.fail(e),
        };
        self.device_list = devices;
        self.publish_devices();
        self.publish_controls();
        self.publish_clips();
        self.ui
            .apply(UiUpdate::Countdown(format_time(self.default_duration_secs as f64)));

        if self.device_list.is_empty() {
            return self.fail(RecorderError::NoDevicesFound);
        }

        self.report("Select a microphone and press r to record", Severity::Success);

        match self.devices.preferred_device(&self.device_list) {
            Some(id) => self.select_device(&id),
            None => Ok(CommandOutcome::Ignored),
        }
    }

    /// Switches the live stream to `id`.
    ///
    /// A running session is finalized first and the old stream is released
    /// before the new one is acquired.
    ///
    /// # Errors
    /// - `Acquisition` if the device is unknown or cannot be opened
    pub fn select_device(&mut self, id: &DeviceId) -> Result<CommandOutcome> {
        if self.stream.as_ref().is_some_and(|s| &s.device == id) {
            return Ok(CommandOutcome::Ignored);
        }
        if !self.device_list.iter().any(|d| &d.id == id) {
            return self.fail(RecorderError::Acquisition(format!(
                "Audio input device '{id}' not found"
            )));
        }

        self.waveform.cancel();
        if matches!(self.state, RecorderState::Recording(_)) {
            // Finalization errors are already reported; the switch goes on.
            if let Err(e) = self.finish_session(StopReason::DeviceSwitch) {
                tracing::debug!("Session ended without a clip on device switch: {}", e);
            }
        }
        if let Some(previous) = self.stream.take() {
            tracing::debug!("Releasing stream on {}", previous.device);
            self.devices.release_stream(previous);
        }

        self.selected = Some(id.clone());
        self.publish_devices();
        self.publish_controls();

        match self.devices.acquire_stream(id) {
            Ok(stream) => {
                tracing::info!("Connected to {} at {}Hz", id, stream.sample_rate);
                self.stream = Some(stream);
                self.waveform.start();
                self.publish_controls();
                Ok(CommandOutcome::DeviceSelected(id.clone()))
            }
            Err(e) => self.fail(e),
        }
    }

    /// Starts a session using the duration typed by the user.
    ///
    /// Ignored while already recording.
    ///
    /// # Errors
    /// - `CaptureStart` if no stream is connected or capture cannot begin
    pub fn request_start(&mut self, duration_input: &str) -> Result<CommandOutcome> {
        if matches!(self.state, RecorderState::Recording(_)) {
            tracing::debug!("Start ignored: already recording");
            return Ok(CommandOutcome::Ignored);
        }

        let Some(stream) = self.stream.as_ref() else {
            return self.fail(RecorderError::CaptureStart(
                "no microphone is connected".to_string(),
            ));
        };

        let duration_secs = resolve_duration(duration_input, self.default_duration_secs);
        let handle = match self.capture.begin(stream) {
            Ok(handle) => handle,
            Err(e) => return self.fail(e),
        };

        let now = self.clock.now();
        self.scheduler.cancel_all();
        // Scheduled first so the deadline wins when both fall due together.
        self.scheduler.schedule_once(
            TimerKind::Deadline,
            now + Duration::from_secs(duration_secs as u64),
        );
        self.scheduler
            .schedule_every(TimerKind::CountdownTick, now + COUNTDOWN_TICK, COUNTDOWN_TICK);

        self.state = RecorderState::Recording(RecordingSession {
            handle,
            duration_secs,
            started_at: now,
            chunks: Vec::new(),
        });

        tracing::info!("Recording started: {}s", duration_secs);
        self.ui
            .apply(UiUpdate::Countdown(format_time(duration_secs as f64)));
        self.publish_controls();
        self.report("Recording in progress...", Severity::Success);
        Ok(CommandOutcome::Started { duration_secs })
    }

    /// Stops the running session and queues its clip. Ignored while idle.
    ///
    /// # Errors
    /// - `Encode` if the captured audio cannot be finalized
    pub fn request_stop(&mut self) -> Result<CommandOutcome> {
        if matches!(self.state, RecorderState::Idle) {
            tracing::debug!("Stop ignored: not recording");
            return Ok(CommandOutcome::Ignored);
        }
        self.finish_session(StopReason::Manual)
    }

    /// Collects captured chunks and runs due timers.
    ///
    /// Returns `Stopped` when a timer ended the session.
    ///
    /// # Errors
    /// - `Encode` if a timed stop cannot finalize the captured audio
    pub fn tick(&mut self) -> Result<CommandOutcome> {
        if let RecorderState::Recording(session) = &mut self.state {
            let chunks = self.capture.take_chunks(&session.handle);
            session.chunks.extend(chunks);
        }

        let now = self.clock.now();
        let mut outcome = CommandOutcome::Ticked;

        for fired in self.scheduler.poll(now) {
            let remaining = match &self.state {
                RecorderState::Recording(session) => session.remaining_secs(now),
                RecorderState::Idle => continue,
            };

            match fired.kind {
                TimerKind::CountdownTick => {
                    self.ui.apply(UiUpdate::Countdown(format_time(remaining)));
                    if remaining <= 0.0 {
                        outcome = self.finish_session(StopReason::CountdownElapsed)?;
                    }
                }
                TimerKind::Deadline => {
                    outcome = self.finish_session(StopReason::Deadline)?;
                }
            }
        }

        Ok(outcome)
    }

    /// Deletes a clip and its playback file. Unknown ids are ignored.
    pub fn delete_clip(&mut self, id: ClipId) -> Result<CommandOutcome> {
        match self.clips.remove(id) {
            Some(clip) => {
                tracing::info!("Deleted {} ({})", clip.name, id);
                if let Some(path) = self.playback_files.remove(&id) {
                    export::remove_playback_file(&path);
                }
                self.publish_clips();
                self.report(&format!("Deleted {}", clip.name), Severity::Neutral);
                Ok(CommandOutcome::ClipDeleted(id))
            }
            None => Ok(CommandOutcome::Ignored),
        }
    }

    /// Writes a clip to its playback file and hands that to the player.
    ///
    /// The file lives until the clip is deleted or the recorder is torn down.
    ///
    /// # Errors
    /// - `ClipNotFound` / `ClipUnavailable` if the clip cannot be resolved
    /// - `Export` if the file cannot be written or no player could be launched
    pub fn play_clip(&mut self, id: ClipId) -> Result<CommandOutcome> {
        let (name, audio) = self.clip_audio(id)?;
        let path = match export::write_playback_file(&audio, &self.playback_dir, id.get()) {
            Ok(path) => path,
            Err(e) => return self.fail(RecorderError::Export(e.to_string())),
        };
        self.playback_files.insert(id, path.clone());

        match self.player.play(&path) {
            Ok(()) => {
                self.report(&format!("Playing {name}"), Severity::Success);
                Ok(CommandOutcome::ClipPlaying(id))
            }
            Err(e) => self.fail(RecorderError::Export(e.to_string())),
        }
    }

    /// Saves a clip into `dir` as `audio-clip-YYYYMMDDTHHMMSS.wav`.
    ///
    /// # Errors
    /// - `ClipNotFound` / `ClipUnavailable` if the clip cannot be resolved
    /// - `Export` if the file cannot be written
    pub fn download_clip(&mut self, id: ClipId, dir: &Path) -> Result<CommandOutcome> {
        let (_, audio) = self.clip_audio(id)?;
        let at = self.clock.local_now().with_timezone(&Utc);
        match export::save_clip(&audio, dir, &at) {
            Ok(path) => {
                self.report(&format!("Saved {}", path.display()), Severity::Success);
                Ok(CommandOutcome::ClipSaved(path))
            }
            Err(e) => self.fail(RecorderError::Export(e.to_string())),
        }
    }

    /// Ends the UI session: discards a running recording, cancels timers and
    /// the waveform loop, releases the stream, revokes every clip and removes
    /// playback files. The binding ends up showing an empty, idle recorder.
    pub fn teardown(&mut self) {
        if let RecorderState::Recording(session) =
            std::mem::replace(&mut self.state, RecorderState::Idle)
        {
            self.capture.end(session.handle);
            tracing::info!("Discarded recording in progress");
        }
        self.scheduler.cancel_all();
        self.waveform.cancel();
        if let Some(stream) = self.stream.take() {
            self.devices.release_stream(stream);
        }
        self.clips.clear();
        for (_, path) in self.playback_files.drain() {
            export::remove_playback_file(&path);
        }
        self.publish_clips();
        self.publish_controls();
        tracing::debug!("Recorder torn down");
    }

    /// Shows a message on the status line.
    pub fn report(&mut self, message: &str, severity: Severity) {
        self.ui.apply(UiUpdate::Status {
            message: message.to_string(),
            severity,
        });
    }

    // Queries

    pub fn phase(&self) -> Phase {
        match self.state {
            RecorderState::Idle => Phase::Idle,
            RecorderState::Recording(_) => Phase::Recording,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.phase() == Phase::Recording
    }

    /// Seconds left in the running session.
    pub fn remaining_secs(&self) -> Option<f64> {
        match &self.state {
            RecorderState::Recording(session) => Some(session.remaining_secs(self.clock.now())),
            RecorderState::Idle => None,
        }
    }

    pub fn clips(&self) -> &ClipQueue {
        &self.clips
    }

    pub fn devices(&self) -> &[Device] {
        &self.device_list
    }

    pub fn selected_device(&self) -> Option<&DeviceId> {
        self.selected.as_ref()
    }

    pub fn default_duration_secs(&self) -> u32 {
        self.default_duration_secs
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    /// Renders the waveform of the connected stream for a `width` x `height`
    /// surface. `None` when no loop is running.
    pub fn waveform_frame(&self, width: f64, height: f64) -> Option<WaveformFrame> {
        let stream = self.stream.as_ref()?;
        let handle = self.waveform.active()?;
        let samples = stream.tap.snapshot();
        self.waveform
            .frame(handle, &samples, width, height, self.is_recording())
    }

    // Internals

    /// The single `Recording → Idle` transition. A no-op when idle.
    fn finish_session(&mut self, reason: StopReason) -> Result<CommandOutcome> {
        let RecorderState::Recording(mut session) =
            std::mem::replace(&mut self.state, RecorderState::Idle)
        else {
            return Ok(CommandOutcome::Ignored);
        };

        self.scheduler.cancel_all();
        session.chunks.extend(self.capture.take_chunks(&session.handle));
        session.chunks.extend(self.capture.end(session.handle));

        self.ui
            .apply(UiUpdate::Countdown(format_time(session.duration_secs as f64)));
        self.publish_controls();

        let audio = match self.capture.finalize(&session.chunks) {
            Ok(audio) => audio,
            Err(e) => return self.fail(e),
        };

        let created_at = self.clock.local_now();
        let clip = Clip {
            id: self.clips.next_id(),
            name: self.clips.next_name(&created_at),
            audio: Arc::from(audio),
            created_at,
            duration_secs: session.duration_secs,
        };
        let id = clip.id;

        tracing::info!(
            "Recording stopped ({:?}): {} chunk(s), queued as {}",
            reason,
            session.chunks.len(),
            clip.name
        );

        self.clips.append(clip);
        self.publish_clips();
        self.report(
            "Recording complete! Select it below to play or download.",
            Severity::Success,
        );
        Ok(CommandOutcome::Stopped { clip: id, reason })
    }

    fn clip_audio(&mut self, id: ClipId) -> Result<(String, Arc<[u8]>)> {
        let Some(clip) = self.clips.get(id) else {
            return self.fail(RecorderError::ClipNotFound(id));
        };
        let name = clip.name.clone();
        let audio = self
            .clips
            .playable(id)
            .and_then(|reference| self.clips.resolve(reference));
        match audio {
            Some(audio) => Ok((name, audio)),
            None => self.fail(RecorderError::ClipUnavailable(id)),
        }
    }

    fn fail<T>(&mut self, error: RecorderError) -> Result<T> {
        tracing::error!("{}", error);
        self.report(&error.to_string(), Severity::Error);
        Err(error)
    }

    fn publish_controls(&mut self) {
        let recording = self.is_recording();
        let mode = if recording {
            ControlMode::Stop
        } else {
            ControlMode::Record
        };
        let record_enabled = recording || self.stream.is_some();
        self.ui.apply(UiUpdate::Controls {
            mode,
            record_enabled,
        });
    }

    fn publish_clips(&mut self) {
        self.ui.apply(UiUpdate::Clips(self.clips.summaries()));
    }

    fn publish_devices(&mut self) {
        self.ui.apply(UiUpdate::Devices {
            devices: self.device_list.clone(),
            selected: self.selected.clone(),
        });
    }
}
