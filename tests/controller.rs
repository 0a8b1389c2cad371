mod common;

use std::time::Duration;

use chrono::Utc;
use clipdeck::clips::ClipId;
use clipdeck::devices::DeviceId;
use clipdeck::recording::{
    CommandOutcome, ControlMode, Phase, RecorderError, Severity, StopReason, UiUpdate,
};
use clipdeck::recording::visualizations::StrokeColor;

use common::*;

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn mic(n: usize) -> DeviceId {
    DeviceId(format!("mic-{n}"))
}

/// Records one manual clip of `input` seconds and returns its id.
fn record_clip(h: &mut Harness, input: &str) -> ClipId {
    h.controller.request_start(input).unwrap();
    h.clock.advance(Duration::from_millis(500));
    h.controller.tick().unwrap();
    match h.controller.request_stop().unwrap() {
        CommandOutcome::Stopped { clip, .. } => clip,
        other => panic!("expected a stopped session, got {other:?}"),
    }
}

#[test]
fn test_initialize_connects_preferred_device() {
    let mut h = harness(&["Built-in", ""]);

    let outcome = h.controller.initialize().unwrap();

    assert_eq!(outcome, CommandOutcome::DeviceSelected(mic(0)));
    assert!(h.controller.has_stream());
    assert_eq!(h.controller.selected_device(), Some(&mic(0)));
    assert_eq!(h.controller.devices()[1].label, "Microphone 2");
    assert_eq!(h.devices.events(), vec![DeviceEvent::Acquired(mic(0))]);

    let updates = h.controller.ui();
    assert_eq!(last_countdown(updates).as_deref(), Some("00:10"));
    assert_eq!(last_controls(updates), Some((ControlMode::Record, true)));
    assert!(errors(updates).is_empty());
}

#[test]
fn test_start_then_stop_queues_one_clip() {
    let mut h = ready();

    assert_eq!(
        h.controller.request_start("5").unwrap(),
        CommandOutcome::Started { duration_secs: 5 }
    );
    assert_eq!(h.controller.phase(), Phase::Recording);
    assert_eq!(last_controls(h.controller.ui()), Some((ControlMode::Stop, true)));
    assert_eq!(
        statuses(h.controller.ui()).last(),
        Some(&("Recording in progress...".to_string(), Severity::Success))
    );

    h.clock.advance(secs(2));
    h.controller.tick().unwrap();
    let outcome = h.controller.request_stop().unwrap();

    let CommandOutcome::Stopped { clip, reason } = outcome else {
        panic!("expected a stopped session, got {outcome:?}");
    };
    assert_eq!(reason, StopReason::Manual);
    assert_eq!(h.controller.phase(), Phase::Idle);
    assert_eq!(h.controller.clips().len(), 1);

    let queued = h.controller.clips().get(clip).unwrap();
    assert_eq!(queued.duration_secs, 5);
    assert_eq!(&queued.audio[..], &[1, 2, 3, 4, 1, 2, 3, 4, 9, 9][..]);

    let updates = h.controller.ui();
    assert_eq!(last_countdown(updates).as_deref(), Some("00:05"));
    assert_eq!(last_controls(updates), Some((ControlMode::Record, true)));
    assert_eq!(
        statuses(updates).last(),
        Some(&(
            "Recording complete! Select it below to play or download.".to_string(),
            Severity::Success
        ))
    );
}

#[test]
fn test_stop_while_idle_is_a_no_op() {
    let mut h = ready();

    assert_eq!(h.controller.request_stop().unwrap(), CommandOutcome::Ignored);
    assert!(h.controller.ui().is_empty());
    assert!(h.controller.clips().is_empty());
}

#[test]
fn test_start_while_recording_is_ignored() {
    let mut h = ready();
    h.controller.request_start("20").unwrap();
    h.clock.advance(secs(5));

    assert_eq!(h.controller.request_start("3").unwrap(), CommandOutcome::Ignored);
    assert_eq!(h.controller.remaining_secs(), Some(15.0));

    h.controller.request_stop().unwrap();
    assert_eq!(h.controller.clips().len(), 1);
}

#[test]
fn test_duration_input_is_clamped() {
    let mut h = ready();
    for (input, expected) in [("0", 1), ("-5", 1), ("500", 300), ("abc", 10), ("", 10), ("12.7", 12)] {
        assert_eq!(
            h.controller.request_start(input).unwrap(),
            CommandOutcome::Started {
                duration_secs: expected
            },
            "input {input:?}"
        );
        h.controller.request_stop().unwrap();
    }
}

#[test]
fn test_long_request_stops_at_three_hundred_seconds() {
    let mut h = ready();
    h.controller.request_start("500").unwrap();

    h.clock.advance(secs(299));
    assert_eq!(h.controller.tick().unwrap(), CommandOutcome::Ticked);
    assert!(h.controller.is_recording());
    assert_eq!(last_countdown(h.controller.ui()).as_deref(), Some("00:01"));

    h.clock.advance(secs(1));
    let outcome = h.controller.tick().unwrap();

    assert!(matches!(outcome, CommandOutcome::Stopped { .. }));
    assert_eq!(h.controller.phase(), Phase::Idle);
    assert_eq!(h.controller.clips().len(), 1);
    assert_eq!(h.controller.clips().list().next().unwrap().duration_secs, 300);
}

#[test]
fn test_countdown_updates_every_tick() {
    let mut h = ready();
    h.controller.request_start("3").unwrap();
    assert_eq!(last_countdown(h.controller.ui()).as_deref(), Some("00:03"));

    h.clock.advance(Duration::from_millis(100));
    h.controller.tick().unwrap();
    assert_eq!(last_countdown(h.controller.ui()).as_deref(), Some("00:02"));

    h.clock.advance(Duration::from_millis(1_000));
    h.controller.tick().unwrap();
    assert_eq!(last_countdown(h.controller.ui()).as_deref(), Some("00:01"));
}

#[test]
fn test_timed_stop_happens_exactly_once() {
    let mut h = ready();
    h.controller.request_start("2").unwrap();

    h.clock.advance(secs(5));
    assert!(matches!(
        h.controller.tick().unwrap(),
        CommandOutcome::Stopped {
            reason: StopReason::CountdownElapsed,
            ..
        }
    ));
    assert_eq!(h.controller.tick().unwrap(), CommandOutcome::Ticked);
    assert_eq!(h.controller.request_stop().unwrap(), CommandOutcome::Ignored);
    assert_eq!(h.controller.clips().len(), 1);
}

#[test]
fn test_deadline_without_countdown_tick_still_stops() {
    let mut h = ready();
    h.controller.request_start("1").unwrap();

    h.clock.advance(Duration::from_millis(1_000));
    let outcome = h.controller.tick().unwrap();

    assert!(matches!(
        outcome,
        CommandOutcome::Stopped {
            reason: StopReason::Deadline,
            ..
        }
    ));
    assert_eq!(h.controller.clips().len(), 1);
}

#[test]
fn test_deadline_wins_when_due_with_the_countdown() {
    let mut h = ready();
    h.controller.request_start("1").unwrap();

    for _ in 0..9 {
        h.clock.advance(Duration::from_millis(100));
        assert_eq!(h.controller.tick().unwrap(), CommandOutcome::Ticked);
    }
    assert_eq!(h.controller.phase(), Phase::Recording);

    h.clock.advance(Duration::from_millis(100));
    let outcome = h.controller.tick().unwrap();

    assert!(matches!(
        outcome,
        CommandOutcome::Stopped {
            reason: StopReason::Deadline,
            ..
        }
    ));
    assert_eq!(h.controller.clips().len(), 1);
}

#[test]
fn test_late_tick_ends_session_on_countdown() {
    let mut h = ready();
    h.controller.request_start("2").unwrap();
    h.clock.advance(Duration::from_millis(100));
    h.controller.tick().unwrap();

    // A stalled frame loop: the overdue countdown tick fires before the deadline.
    h.clock.advance(Duration::from_millis(2_400));
    let outcome = h.controller.tick().unwrap();

    assert!(matches!(
        outcome,
        CommandOutcome::Stopped {
            reason: StopReason::CountdownElapsed,
            ..
        }
    ));
    assert_eq!(h.controller.clips().len(), 1);
    assert_eq!(h.controller.tick().unwrap(), CommandOutcome::Ticked);
}

#[test]
fn test_clips_are_named_by_position() {
    let mut h = ready();
    record_clip(&mut h, "5");
    record_clip(&mut h, "5");

    assert_eq!(
        clip_names(&h),
        vec!["Clip 1 - 02:05 PM".to_string(), "Clip 2 - 02:05 PM".to_string()]
    );
}

#[test]
fn test_delete_removes_only_that_clip() {
    let mut h = ready();
    let first = record_clip(&mut h, "5");
    let second = record_clip(&mut h, "5");
    let third = record_clip(&mut h, "5");
    assert_eq!(h.playables.live(), 3);

    assert_eq!(
        h.controller.delete_clip(second).unwrap(),
        CommandOutcome::ClipDeleted(second)
    );

    let ids: Vec<ClipId> = h.controller.clips().list().map(|c| c.id).collect();
    assert_eq!(ids, vec![first, third]);
    assert_eq!(h.playables.live(), 2);
    assert!(clip_names(&h)[1].starts_with("Clip 3 - "));

    let listed = h.controller.ui().iter().rev().find_map(|u| match u {
        UiUpdate::Clips(clips) => Some(clips.len()),
        _ => None,
    });
    assert_eq!(listed, Some(2));

    h.controller.ui_mut().clear();
    assert_eq!(h.controller.delete_clip(second).unwrap(), CommandOutcome::Ignored);
    assert!(h.controller.ui().is_empty());
    assert_eq!(h.controller.clips().len(), 2);
}

#[test]
fn test_clip_ids_are_never_reused() {
    let mut h = ready();
    let first = record_clip(&mut h, "5");
    h.controller.delete_clip(first).unwrap();
    let second = record_clip(&mut h, "5");

    assert_ne!(first, second);
    assert!(second > first);
}

#[test]
fn test_no_devices_is_reported_once() {
    let log = DeviceLog::default();
    let mut h = harness_with(FakeDevices::none(log.clone()), FakeCapture::default(), log);

    assert_eq!(h.controller.initialize(), Err(RecorderError::NoDevicesFound));
    assert_eq!(errors(h.controller.ui()), vec!["No microphones found".to_string()]);
    assert_eq!(last_controls(h.controller.ui()), Some((ControlMode::Record, false)));
    assert!(!h.controller.has_stream());
    assert!(h.devices.events().is_empty());
}

#[test]
fn test_enumeration_failure_is_reported() {
    let log = DeviceLog::default();
    let devices = FakeDevices::with_labels(&["Built-in"], log.clone())
        .failing_enumeration(RecorderError::Acquisition("host unavailable".to_string()));
    let mut h = harness_with(devices, FakeCapture::default(), log);

    assert!(matches!(
        h.controller.initialize(),
        Err(RecorderError::Acquisition(_))
    ));
    assert_eq!(errors(h.controller.ui()).len(), 1);
}

#[test]
fn test_denied_device_leaves_recorder_idle_without_stream() {
    let log = DeviceLog::default();
    let devices = FakeDevices::with_labels(&["Built-in", "USB Mic"], log.clone()).denying("mic-0");
    let mut h = harness_with(devices, FakeCapture::default(), log);

    let result = h.controller.initialize();

    assert!(matches!(result, Err(RecorderError::Acquisition(_))));
    let reported = errors(h.controller.ui());
    assert_eq!(reported.len(), 1);
    assert_eq!(
        reported[0],
        "Error connecting to microphone: Permission denied"
    );
    assert_eq!(h.controller.phase(), Phase::Idle);
    assert!(!h.controller.has_stream());
    assert_eq!(last_controls(h.controller.ui()), Some((ControlMode::Record, false)));

    // The other device still works.
    assert_eq!(
        h.controller.select_device(&mic(1)).unwrap(),
        CommandOutcome::DeviceSelected(mic(1))
    );
    assert!(h.controller.has_stream());
}

#[test]
fn test_start_without_stream_fails() {
    let log = DeviceLog::default();
    let devices = FakeDevices::with_labels(&["Built-in"], log.clone()).denying("mic-0");
    let mut h = harness_with(devices, FakeCapture::default(), log);
    let _ = h.controller.initialize();
    h.controller.ui_mut().clear();

    assert!(matches!(
        h.controller.request_start("5"),
        Err(RecorderError::CaptureStart(_))
    ));
    assert_eq!(errors(h.controller.ui()).len(), 1);
    assert_eq!(h.controller.phase(), Phase::Idle);
}

#[test]
fn test_capture_failure_leaves_recorder_idle() {
    let log = DeviceLog::default();
    let devices = FakeDevices::with_labels(&["Built-in"], log.clone());
    let mut h = harness_with(devices, FakeCapture::failing_begin(), log);
    h.controller.initialize().unwrap();

    assert!(matches!(
        h.controller.request_start("5"),
        Err(RecorderError::CaptureStart(_))
    ));
    assert_eq!(h.controller.phase(), Phase::Idle);

    h.clock.advance(secs(10));
    assert_eq!(h.controller.tick().unwrap(), CommandOutcome::Ticked);
    assert!(h.controller.clips().is_empty());
}

#[test]
fn test_encode_failure_discards_session() {
    let log = DeviceLog::default();
    let devices = FakeDevices::with_labels(&["Built-in"], log.clone());
    let mut h = harness_with(devices, FakeCapture::failing_finalize(), log);
    h.controller.initialize().unwrap();
    h.controller.request_start("5").unwrap();

    assert!(matches!(
        h.controller.request_stop(),
        Err(RecorderError::Encode(_))
    ));
    assert_eq!(h.controller.phase(), Phase::Idle);
    assert!(h.controller.clips().is_empty());
    assert_eq!(errors(h.controller.ui()).len(), 1);

    h.clock.advance(secs(10));
    assert_eq!(h.controller.tick().unwrap(), CommandOutcome::Ticked);
}

#[test]
fn test_switch_releases_old_stream_before_acquiring() {
    let mut h = ready();

    assert_eq!(
        h.controller.select_device(&mic(1)).unwrap(),
        CommandOutcome::DeviceSelected(mic(1))
    );
    assert_eq!(
        h.devices.events(),
        vec![
            DeviceEvent::Acquired(mic(0)),
            DeviceEvent::Released(mic(0)),
            DeviceEvent::Acquired(mic(1)),
        ]
    );

    assert_eq!(h.controller.select_device(&mic(1)).unwrap(), CommandOutcome::Ignored);
    assert_eq!(h.devices.events().len(), 3);
}

#[test]
fn test_switch_while_recording_keeps_the_clip() {
    let mut h = ready();
    h.controller.request_start("30").unwrap();
    h.clock.advance(secs(3));

    h.controller.select_device(&mic(1)).unwrap();

    assert_eq!(h.controller.phase(), Phase::Idle);
    assert_eq!(h.controller.clips().len(), 1);
    assert_eq!(h.controller.selected_device(), Some(&mic(1)));

    // The old session's timers are gone.
    h.clock.advance(secs(60));
    assert_eq!(h.controller.tick().unwrap(), CommandOutcome::Ticked);
    assert_eq!(h.controller.clips().len(), 1);
}

#[test]
fn test_switch_proceeds_when_the_session_cannot_be_encoded() {
    let log = DeviceLog::default();
    let mut h = harness_with(
        FakeDevices::with_labels(&["Built-in", "USB Mic"], log.clone()),
        FakeCapture::failing_finalize(),
        log,
    );
    h.controller.initialize().unwrap();
    h.controller.request_start("30").unwrap();

    let outcome = h.controller.select_device(&mic(1)).unwrap();

    assert_eq!(outcome, CommandOutcome::DeviceSelected(mic(1)));
    assert_eq!(h.controller.phase(), Phase::Idle);
    assert!(h.controller.clips().is_empty());
    assert!(h.controller.has_stream());
    assert_eq!(
        h.devices.events(),
        vec![
            DeviceEvent::Acquired(mic(0)),
            DeviceEvent::Released(mic(0)),
            DeviceEvent::Acquired(mic(1)),
        ]
    );
}

#[test]
fn test_unknown_device_is_an_acquisition_error() {
    let mut h = ready();

    assert!(matches!(
        h.controller.select_device(&DeviceId("nope".to_string())),
        Err(RecorderError::Acquisition(_))
    ));
    assert!(h.controller.has_stream());
    assert_eq!(h.controller.selected_device(), Some(&mic(0)));
}

#[test]
fn test_teardown_releases_everything() {
    let mut h = ready();
    let clip = record_clip(&mut h, "5");
    h.controller.play_clip(clip).unwrap();
    h.controller.request_start("30").unwrap();
    h.controller.ui_mut().clear();

    h.controller.teardown();

    assert_eq!(last_clip_count(h.controller.ui()), Some(0));
    assert_eq!(
        last_controls(h.controller.ui()),
        Some((ControlMode::Record, false))
    );
    assert_eq!(std::fs::read_dir(h.playback_dir.path()).unwrap().count(), 0);
    assert_eq!(h.controller.phase(), Phase::Idle);
    assert!(h.controller.clips().is_empty());
    assert_eq!(h.playables.live(), 0);
    assert!(!h.controller.has_stream());
    assert_eq!(h.devices.events().last(), Some(&DeviceEvent::Released(mic(0))));
    assert!(h.controller.waveform_frame(100.0, 50.0).is_none());

    h.clock.advance(secs(60));
    assert_eq!(h.controller.tick().unwrap(), CommandOutcome::Ticked);
    assert!(h.controller.clips().is_empty());
}

#[test]
fn test_waveform_stroke_follows_recording_state() {
    let mut h = ready();

    let idle = h.controller.waveform_frame(100.0, 50.0).unwrap();
    assert_eq!(idle.stroke, StrokeColor::Neutral);
    assert_eq!(
        idle.points,
        vec![(0.0, 25.0), (25.0, 37.5), (50.0, 25.0), (75.0, 12.5), (100.0, 25.0)]
    );

    h.controller.request_start("5").unwrap();
    let recording = h.controller.waveform_frame(100.0, 50.0).unwrap();
    assert_eq!(recording.stroke, StrokeColor::Active);

    h.controller.request_stop().unwrap();
    let stopped = h.controller.waveform_frame(100.0, 50.0).unwrap();
    assert_eq!(stopped.stroke, StrokeColor::Neutral);
}

#[test]
fn test_download_writes_timestamped_wav_name() {
    let mut h = ready();
    let clip = record_clip(&mut h, "5");
    let dir = tempfile::tempdir().unwrap();

    let outcome = h.controller.download_clip(clip, dir.path()).unwrap();

    let CommandOutcome::ClipSaved(path) = outcome else {
        panic!("expected a saved clip, got {outcome:?}");
    };
    let at = (wall_origin() + chrono::Duration::from_std(h.clock.elapsed()).unwrap())
        .with_timezone(&Utc);
    let expected = format!("audio-clip-{}.wav", at.format("%Y%m%dT%H%M%S"));
    assert_eq!(path.file_name().unwrap().to_string_lossy(), expected);

    let written = std::fs::read(&path).unwrap();
    assert_eq!(&written[..], &h.controller.clips().get(clip).unwrap().audio[..]);
    assert_eq!(
        statuses(h.controller.ui()).last().map(|(_, s)| *s),
        Some(Severity::Success)
    );
}

#[test]
fn test_download_of_deleted_clip_fails() {
    let mut h = ready();
    let clip = record_clip(&mut h, "5");
    h.controller.delete_clip(clip).unwrap();
    let dir = tempfile::tempdir().unwrap();

    assert_eq!(
        h.controller.download_clip(clip, dir.path()),
        Err(RecorderError::ClipNotFound(clip))
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_report_shows_status() {
    let mut h = ready();
    h.controller.report("Hello", Severity::Neutral);

    assert_eq!(
        statuses(h.controller.ui()),
        vec![("Hello".to_string(), Severity::Neutral)]
    );
}

#[test]
fn test_play_hands_a_wav_file_to_the_player() {
    let mut h = ready();
    let clip = record_clip(&mut h, "5");

    let outcome = h.controller.play_clip(clip).unwrap();

    assert_eq!(outcome, CommandOutcome::ClipPlaying(clip));
    let played = h.player.played();
    assert_eq!(played.len(), 1);
    assert!(played[0].starts_with(h.playback_dir.path()));
    let written = std::fs::read(&played[0]).unwrap();
    assert_eq!(&written[..], &h.controller.clips().get(clip).unwrap().audio[..]);
    assert_eq!(
        statuses(h.controller.ui()).last(),
        Some(&("Playing Clip 1 - 02:05 PM".to_string(), Severity::Success))
    );
}

#[test]
fn test_delete_removes_the_playback_file() {
    let mut h = ready();
    let first = record_clip(&mut h, "5");
    let second = record_clip(&mut h, "5");
    h.controller.play_clip(first).unwrap();
    h.controller.play_clip(second).unwrap();
    let played = h.player.played();

    h.controller.delete_clip(first).unwrap();

    assert!(!played[0].exists());
    assert!(played[1].exists());
}

#[test]
fn test_play_without_a_player_reports_export_error() {
    let log = DeviceLog::default();
    let mut h = harness_playing(
        FakeDevices::with_labels(&["Built-in"], log.clone()),
        FakeCapture::default(),
        log,
        FakePlayer::failing(),
    );
    h.controller.initialize().unwrap();
    let clip = record_clip(&mut h, "5");

    let result = h.controller.play_clip(clip);

    assert!(matches!(result, Err(RecorderError::Export(_))));
    assert_eq!(
        errors(h.controller.ui()).last().map(String::as_str),
        Some("Error exporting clip: No audio player found")
    );

    // The written file still goes away with its clip.
    h.controller.delete_clip(clip).unwrap();
    assert_eq!(std::fs::read_dir(h.playback_dir.path()).unwrap().count(), 0);
}
