//! Live input visualizations.

pub mod waveform;

pub use waveform::{LoopHandle, StrokeColor, WaveformFrame, WaveformRenderer};
