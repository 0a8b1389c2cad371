//! clipdeck: a terminal microphone recorder.
//!
//! Shows a live waveform of the selected input, records fixed-length clips
//! with a visible countdown and keeps them in an in-session queue from which
//! they can be played, saved or deleted.

pub mod app;
pub mod clips;
pub mod commands;
pub mod config;
pub mod devices;
pub mod logging;
pub mod recording;
