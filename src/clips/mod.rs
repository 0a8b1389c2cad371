//! Finalized recordings and the queue that owns them.

pub mod export;
pub mod playable;
pub mod queue;

use chrono::{DateTime, Local};
use std::fmt;
use std::sync::Arc;

pub use playable::{MemoryPlayables, PlayableRef, PlayableResource};
pub use queue::ClipQueue;

/// Unique, monotonically assigned clip identifier.
///
/// Only [`ClipQueue::next_id`] hands these out, so ids are never reused
/// within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipId(u64);

impl ClipId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A completed recording.
#[derive(Debug, Clone)]
pub struct Clip {
    pub id: ClipId,
    pub name: String,
    /// Encoded audio (a WAV container when captured from a native device)
    pub audio: Arc<[u8]>,
    pub created_at: DateTime<Local>,
    /// The clamped target duration of the session that produced this clip
    pub duration_secs: u32,
}

impl Clip {
    pub fn summary(&self) -> ClipSummary {
        ClipSummary {
            id: self.id,
            name: self.name.clone(),
            created_at: self.created_at,
            duration_secs: self.duration_secs,
            size_bytes: self.audio.len(),
        }
    }
}

/// What the UI needs to show a clip in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipSummary {
    pub id: ClipId,
    pub name: String,
    pub created_at: DateTime<Local>,
    pub duration_secs: u32,
    pub size_bytes: usize,
}

/// Auto-generated clip name: `Clip {n} - {HH:MM AM/PM}`.
pub fn clip_name(position: usize, created_at: &DateTime<Local>) -> String {
    format!("Clip {} - {}", position, created_at.format("%I:%M %p"))
}
