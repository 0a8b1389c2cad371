//! Shared sample buffer between the audio callback and the controller.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Samples kept for the waveform display.
pub const WAVEFORM_WINDOW: usize = 2048;

#[derive(Debug)]
struct TapState {
    window: VecDeque<i16>,
    capacity: usize,
    capturing: bool,
    pending: Vec<i16>,
}

/// Mono `i16` samples from a live stream.
///
/// Keeps a rolling window of the latest samples for display and, while a
/// capture is armed, every sample since the last drain.
#[derive(Debug)]
pub struct SampleTap {
    state: Mutex<TapState>,
}

impl Default for SampleTap {
    fn default() -> Self {
        Self::with_window(WAVEFORM_WINDOW)
    }
}

impl SampleTap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(capacity: usize) -> Self {
        Self {
            state: Mutex::new(TapState {
                window: VecDeque::with_capacity(capacity),
                capacity,
                capturing: false,
                pending: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TapState> {
        // Recover the state a panicking audio callback left behind.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends mono samples from the audio callback.
    pub fn push(&self, samples: &[i16]) {
        let mut state = self.lock();
        if state.capturing {
            state.pending.extend_from_slice(samples);
        }
        let capacity = state.capacity;
        let overflow = (state.window.len() + samples.len()).saturating_sub(capacity);
        let drop_from_window = overflow.min(state.window.len());
        state.window.drain(..drop_from_window);
        let skip = samples.len().saturating_sub(capacity);
        state.window.extend(&samples[skip..]);
    }

    /// Latest samples, oldest first. Shorter than the window until it fills.
    pub fn snapshot(&self) -> Vec<i16> {
        self.lock().window.iter().copied().collect()
    }

    /// Starts collecting samples for a capture, discarding stale ones.
    pub fn begin_capture(&self) {
        let mut state = self.lock();
        state.pending.clear();
        state.capturing = true;
    }

    /// Takes the samples collected since the last call.
    pub fn take_pending(&self) -> Vec<i16> {
        std::mem::take(&mut self.lock().pending)
    }

    /// Stops collecting and returns whatever was not taken yet.
    pub fn end_capture(&self) -> Vec<i16> {
        let mut state = self.lock();
        state.capturing = false;
        std::mem::take(&mut state.pending)
    }

    pub fn is_capturing(&self) -> bool {
        self.lock().capturing
    }
}

/// Averages interleaved frames down to mono.
pub fn mix_to_mono(data: &[i16], channels: usize, out: &mut Vec<i16>) {
    match channels {
        0 => {}
        1 => out.extend_from_slice(data),
        2 => {
            for frame in data.chunks_exact(2) {
                let mono = (frame[0] as i32 + frame[1] as i32) / 2;
                out.push(mono as i16);
            }
        }
        _ => {
            for frame in data.chunks_exact(channels) {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                out.push((sum / channels as i32) as i16);
            }
        }
    }
}
