//! Capture of a live stream into encoded clip audio.

use std::io::Cursor;
use std::sync::Arc;

use super::{SampleTap, StreamHandle};
use crate::recording::RecorderError;

/// Identifies one capture started with [`CaptureSink::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecorderHandle(pub u64);

/// Records a live stream into byte chunks.
pub trait CaptureSink {
    /// Starts capturing `stream`.
    fn begin(&mut self, stream: &StreamHandle) -> Result<RecorderHandle, RecorderError>;

    /// Chunks that became available since the last call.
    fn take_chunks(&mut self, handle: &RecorderHandle) -> Vec<Vec<u8>>;

    /// Stops capturing and returns any trailing chunks.
    fn end(&mut self, handle: RecorderHandle) -> Vec<Vec<u8>>;

    /// Joins a session's chunks into one playable buffer.
    fn finalize(&self, chunks: &[Vec<u8>]) -> Result<Vec<u8>, RecorderError> {
        Ok(chunks.concat())
    }
}

#[derive(Debug)]
struct ActiveCapture {
    handle: RecorderHandle,
    tap: Arc<SampleTap>,
    sample_rate: u32,
}

/// Captures 16-bit mono PCM from a [`SampleTap`] and finalizes it as WAV.
///
/// Chunks are little-endian PCM bytes; [`CaptureSink::finalize`] wraps them in
/// a WAV container at the sample rate of the most recent capture.
#[derive(Debug, Default)]
pub struct PcmCapture {
    next: u64,
    active: Option<ActiveCapture>,
    sample_rate: u32,
}

impl PcmCapture {
    pub fn new() -> Self {
        Self::default()
    }

    fn to_chunk(samples: Vec<i16>) -> Option<Vec<u8>> {
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().flat_map(|s| s.to_le_bytes()).collect())
    }
}

impl CaptureSink for PcmCapture {
    fn begin(&mut self, stream: &StreamHandle) -> Result<RecorderHandle, RecorderError> {
        if let Some(previous) = self.active.take() {
            tracing::warn!("Capture {:?} still active, discarding it", previous.handle);
            previous.tap.end_capture();
        }

        self.next += 1;
        let handle = RecorderHandle(self.next);
        stream.tap.begin_capture();
        self.sample_rate = stream.sample_rate;
        self.active = Some(ActiveCapture {
            handle,
            tap: Arc::clone(&stream.tap),
            sample_rate: stream.sample_rate,
        });
        tracing::debug!("Capture {:?} started at {}Hz", handle, stream.sample_rate);
        Ok(handle)
    }

    fn take_chunks(&mut self, handle: &RecorderHandle) -> Vec<Vec<u8>> {
        match &self.active {
            Some(active) if active.handle == *handle => {
                Self::to_chunk(active.tap.take_pending()).into_iter().collect()
            }
            _ => Vec::new(),
        }
    }

    fn end(&mut self, handle: RecorderHandle) -> Vec<Vec<u8>> {
        match self.active.take() {
            Some(active) if active.handle == handle => {
                self.sample_rate = active.sample_rate;
                Self::to_chunk(active.tap.end_capture()).into_iter().collect()
            }
            other => {
                self.active = other;
                Vec::new()
            }
        }
    }

    fn finalize(&self, chunks: &[Vec<u8>]) -> Result<Vec<u8>, RecorderError> {
        let pcm = chunks.concat();
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate.max(1),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::with_capacity(pcm.len() + 44));
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| RecorderError::Encode(e.to_string()))?;
            for sample in pcm.chunks_exact(2) {
                writer
                    .write_sample(i16::from_le_bytes([sample[0], sample[1]]))
                    .map_err(|e| RecorderError::Encode(e.to_string()))?;
            }
            writer
                .finalize()
                .map_err(|e| RecorderError::Encode(e.to_string()))?;
        }

        let duration_secs = pcm.len() as f32 / 2.0 / spec.sample_rate as f32;
        tracing::info!(
            "Recording finalized: {:.2}s ({} bytes at {}Hz)",
            duration_secs,
            pcm.len(),
            spec.sample_rate
        );
        Ok(cursor.into_inner())
    }
}
