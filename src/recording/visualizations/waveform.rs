//! Time-domain waveform trace of the live input.
//!
//! The renderer turns the latest sample window into a path across a drawing
//! surface. It is driven by the frame ticker, and its loop is represented by
//! a handle so a stale loop can never draw.

/// Stroke used for the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeColor {
    /// A recording is in progress
    Active,
    Neutral,
}

/// One frame of the waveform: a connected path in surface coordinates.
///
/// `y` grows downwards from 0 to `height`, with silence at `height / 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformFrame {
    pub points: Vec<(f64, f64)>,
    pub stroke: StrokeColor,
    pub width: f64,
    pub height: f64,
}

/// Identifies a running render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopHandle(u64);

/// Produces waveform frames for at most one active loop.
#[derive(Debug, Default)]
pub struct WaveformRenderer {
    generation: u64,
    active: Option<LoopHandle>,
}

impl WaveformRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new loop, cancelling the current one first.
    pub fn start(&mut self) -> LoopHandle {
        self.cancel();
        self.generation += 1;
        let handle = LoopHandle(self.generation);
        self.active = Some(handle);
        tracing::debug!("Waveform loop {} started", self.generation);
        handle
    }

    /// Cancels the active loop, if any.
    pub fn cancel(&mut self) {
        if let Some(LoopHandle(generation)) = self.active.take() {
            tracing::debug!("Waveform loop {} cancelled", generation);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<LoopHandle> {
        self.active
    }

    /// Renders one frame for `handle`.
    ///
    /// Returns `None` when `handle` is not the active loop or the surface
    /// has no area.
    pub fn frame(
        &self,
        handle: LoopHandle,
        samples: &[i16],
        width: f64,
        height: f64,
        recording: bool,
    ) -> Option<WaveformFrame> {
        if self.active != Some(handle) || width <= 0.0 || height <= 0.0 {
            return None;
        }

        let stroke = if recording {
            StrokeColor::Active
        } else {
            StrokeColor::Neutral
        };

        let mut points = Vec::with_capacity(samples.len() + 1);
        if !samples.is_empty() {
            let slice_width = width / samples.len() as f64;
            for (i, &sample) in samples.iter().enumerate() {
                let v = sample as f64 / 32768.0 + 1.0;
                points.push((i as f64 * slice_width, v * height / 2.0));
            }
        }
        points.push((width, height / 2.0));

        Some(WaveformFrame {
            points,
            stroke,
            width,
            height,
        })
    }
}
