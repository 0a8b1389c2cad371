//! Ordered, in-memory clip queue.

use super::{clip_name, Clip, ClipId, ClipSummary, PlayableRef, PlayableResource};
use chrono::{DateTime, Local};
use std::sync::Arc;

#[derive(Debug)]
struct QueuedClip {
    clip: Clip,
    playable: PlayableRef,
}

/// Clips in display order, each paired with a playable reference.
///
/// Removing a clip revokes its reference before the entry is dropped.
pub struct ClipQueue {
    entries: Vec<QueuedClip>,
    playables: Box<dyn PlayableResource>,
    last_id: u64,
}

impl ClipQueue {
    pub fn new(playables: Box<dyn PlayableResource>) -> Self {
        Self {
            entries: Vec::new(),
            playables,
            last_id: 0,
        }
    }

    /// Allocates the id for the next clip.
    pub fn next_id(&mut self) -> ClipId {
        self.last_id += 1;
        ClipId(self.last_id)
    }

    /// Name for a clip created now: its 1-based position after appending.
    pub fn next_name(&self, created_at: &DateTime<Local>) -> String {
        clip_name(self.entries.len() + 1, created_at)
    }

    /// Adds a clip at the end of the queue.
    pub fn append(&mut self, clip: Clip) {
        debug_assert!(self.get(clip.id).is_none(), "duplicate clip id {}", clip.id);
        let playable = self.playables.create(Arc::clone(&clip.audio));
        tracing::debug!("Queued {} as {} ({})", clip.name, clip.id, playable);
        self.entries.push(QueuedClip { clip, playable });
    }

    /// Removes the clip with `id`, revoking its playable reference first.
    ///
    /// Returns the removed clip, or `None` if no clip had that id.
    pub fn remove(&mut self, id: ClipId) -> Option<Clip> {
        let index = self.entries.iter().position(|e| e.clip.id == id)?;
        self.playables.revoke(&self.entries[index].playable);
        let removed = self.entries.remove(index);
        Some(removed.clip)
    }

    /// Removes every clip, revoking all references.
    pub fn clear(&mut self) {
        for entry in self.entries.drain(..) {
            self.playables.revoke(&entry.playable);
        }
    }

    pub fn get(&self, id: ClipId) -> Option<&Clip> {
        self.entries.iter().find(|e| e.clip.id == id).map(|e| &e.clip)
    }

    /// The playable reference of a queued clip.
    pub fn playable(&self, id: ClipId) -> Option<&PlayableRef> {
        self.entries.iter().find(|e| e.clip.id == id).map(|e| &e.playable)
    }

    /// Resolves a reference to audio, if it has not been revoked.
    pub fn resolve(&self, reference: &PlayableRef) -> Option<Arc<[u8]>> {
        self.playables.resolve(reference)
    }

    pub fn list(&self) -> impl Iterator<Item = &Clip> {
        self.entries.iter().map(|e| &e.clip)
    }

    pub fn summaries(&self) -> Vec<ClipSummary> {
        self.list().map(Clip::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
