//! Interactive recorder.
//!
//! Wires the cpal device source, PCM capture and the terminal UI into a
//! [`RecorderController`] and drives it from a frame ticker. Supports an
//! external record/stop toggle via the SIGUSR1 signal.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, Interval, MissedTickBehavior};

use crate::clips::export::{default_download_dir, SystemPlayer};
use crate::clips::MemoryPlayables;
use crate::config::ClipdeckConfig;
use crate::devices::{CpalDeviceSource, PcmCapture};
use crate::recording::duration::{clamp_duration, resolve_duration};
use crate::recording::{
    format_time, ClipdeckTui, Collaborators, CommandOutcome, RecorderController, RecorderError,
    RecorderView, SystemClock, UserCommand,
};

/// Redraw and tick period, about 60 frames per second.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

type Recorder = RecorderController<RecorderView>;

/// Runs the interactive recorder until the user quits.
///
/// `device` and `duration` override the config file for this run.
///
/// # Errors
/// - If the configuration cannot be loaded
/// - If the terminal UI cannot be initialized or drawn
/// - If the signal handler cannot be registered
pub async fn handle_record(device: Option<String>, duration: Option<u32>) -> anyhow::Result<()> {
    tracing::info!("=== clipdeck recorder started ===");

    let config = ClipdeckConfig::load_or_create()
        .map_err(|e| anyhow::anyhow!("Configuration error: {e}"))?;

    let device = device.unwrap_or_else(|| config.audio.device.clone());
    let default_duration = clamp_duration(
        duration
            .map(i64::from)
            .unwrap_or(config.recording.default_duration as i64),
    );
    let download_dir = config
        .clips
        .download_dir
        .clone()
        .unwrap_or_else(default_download_dir);

    tracing::info!(
        "Configuration loaded: device={}, default_duration={}s, download_dir={}",
        device,
        default_duration,
        download_dir.display()
    );

    let toggle = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, Arc::clone(&toggle))
        .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;

    let mut controller = RecorderController::new(
        Collaborators {
            devices: Box::new(CpalDeviceSource::new(device)),
            capture: Box::new(PcmCapture::new()),
            playables: Box::new(MemoryPlayables::new()),
            clock: Box::new(SystemClock),
            player: Box::new(SystemPlayer),
            ui: RecorderView::new(default_duration),
        },
        default_duration,
    );

    let mut tui = ClipdeckTui::new(default_duration)
        .map_err(|e| anyhow::anyhow!("Failed to initialize UI: {e}"))?;

    // Failures are on the status line; the user can still switch devices.
    if let Err(e) = controller.initialize() {
        tracing::warn!("Recorder started without a microphone: {}", e);
    }

    let mut ticker = interval(FRAME_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let result = run_loop(&mut controller, &mut tui, &mut ticker, &toggle, &download_dir).await;

    controller.teardown();
    tui.cleanup()
        .map_err(|e| anyhow::anyhow!("Cleanup failed: {e}"))?;

    match &result {
        Ok(()) => tracing::info!("=== clipdeck recorder exited ==="),
        Err(e) => tracing::error!("Recorder loop failed: {}", e),
    }
    result
}

async fn run_loop(
    controller: &mut Recorder,
    tui: &mut ClipdeckTui,
    ticker: &mut Interval,
    toggle: &AtomicBool,
    download_dir: &Path,
) -> anyhow::Result<()> {
    loop {
        ticker.tick().await;

        if toggle.swap(false, Ordering::Relaxed) {
            tracing::info!("Received SIGUSR1: toggling recording");
            log_result(
                UserCommand::ToggleRecord,
                toggle_recording(controller, tui.duration_input()),
            );
        }

        for command in tui.drain_input()? {
            if command == UserCommand::Quit {
                tracing::debug!("Quit requested");
                return Ok(());
            }
            let result = dispatch(controller, command, tui.duration_input(), download_dir);
            log_result(command, result);
        }

        if let Err(e) = controller.tick() {
            tracing::debug!("Tick failed: {}", e);
        }

        tui.draw(controller.ui(), |width, height| {
            controller.waveform_frame(width, height)
        })
        .map_err(|e| anyhow::anyhow!("Render failed: {e}"))?;
    }
}

fn dispatch(
    controller: &mut Recorder,
    command: UserCommand,
    duration_input: &str,
    download_dir: &Path,
) -> Result<CommandOutcome, RecorderError> {
    match command {
        UserCommand::ToggleRecord => toggle_recording(controller, duration_input),
        UserCommand::NextDevice => switch_device(controller, 1),
        UserCommand::PreviousDevice => switch_device(controller, -1),
        UserCommand::NextClip => {
            controller.ui_mut().select_next_clip();
            Ok(CommandOutcome::Ignored)
        }
        UserCommand::PreviousClip => {
            controller.ui_mut().select_previous_clip();
            Ok(CommandOutcome::Ignored)
        }
        UserCommand::PlayClip => match controller.ui().selected_clip() {
            Some(id) => controller.play_clip(id),
            None => Ok(CommandOutcome::Ignored),
        },
        UserCommand::SaveClip => match controller.ui().selected_clip() {
            Some(id) => controller.download_clip(id, download_dir),
            None => Ok(CommandOutcome::Ignored),
        },
        UserCommand::DeleteClip => match controller.ui().selected_clip() {
            Some(id) => controller.delete_clip(id),
            None => Ok(CommandOutcome::Ignored),
        },
        UserCommand::DurationEdited => {
            if !controller.is_recording() {
                let preview = resolve_duration(duration_input, controller.default_duration_secs());
                controller.ui_mut().countdown = format_time(preview as f64);
            }
            Ok(CommandOutcome::Ignored)
        }
        UserCommand::Quit => Ok(CommandOutcome::Ignored),
    }
}

fn toggle_recording(
    controller: &mut Recorder,
    duration_input: &str,
) -> Result<CommandOutcome, RecorderError> {
    if controller.is_recording() {
        controller.request_stop()
    } else {
        controller.request_start(duration_input)
    }
}

fn switch_device(controller: &mut Recorder, step: isize) -> Result<CommandOutcome, RecorderError> {
    match controller.ui().device_after(step) {
        Some(id) => controller.select_device(&id),
        None => Ok(CommandOutcome::Ignored),
    }
}

/// Errors are already on the status line, so they only go to the log here.
fn log_result(command: UserCommand, result: Result<CommandOutcome, RecorderError>) {
    match result {
        Ok(CommandOutcome::Ignored) => {}
        Ok(outcome) => tracing::debug!("{:?} -> {:?}", command, outcome),
        Err(e) => tracing::debug!("{:?} failed: {}", command, e),
    }
}
