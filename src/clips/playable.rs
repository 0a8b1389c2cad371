//! Revocable references to clip audio.
//!
//! A reference stands in for a playable/downloadable handle on the audio.
//! Once revoked it no longer resolves, so anything still holding it sees the
//! clip as gone.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Opaque handle to registered audio.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayableRef(String);

impl PlayableRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry of playable audio buffers.
pub trait PlayableResource {
    /// Registers a buffer and returns a reference to it.
    fn create(&mut self, audio: Arc<[u8]>) -> PlayableRef;
    /// Looks up a live reference. Revoked references yield `None`.
    fn resolve(&self, reference: &PlayableRef) -> Option<Arc<[u8]>>;
    /// Frees the reference. Revoking twice is harmless.
    fn revoke(&mut self, reference: &PlayableRef);
}

/// In-process registry keyed by `clip:{n}` references.
#[derive(Debug, Default)]
pub struct MemoryPlayables {
    next: u64,
    entries: HashMap<PlayableRef, Arc<[u8]>>,
}

impl MemoryPlayables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live references.
    pub fn live(&self) -> usize {
        self.entries.len()
    }
}

impl PlayableResource for MemoryPlayables {
    fn create(&mut self, audio: Arc<[u8]>) -> PlayableRef {
        self.next += 1;
        let reference = PlayableRef(format!("clip:{}", self.next));
        self.entries.insert(reference.clone(), audio);
        reference
    }

    fn resolve(&self, reference: &PlayableRef) -> Option<Arc<[u8]>> {
        self.entries.get(reference).cloned()
    }

    fn revoke(&mut self, reference: &PlayableRef) {
        if self.entries.remove(reference).is_some() {
            tracing::debug!("Revoked playable reference {}", reference);
        }
    }
}
