//! Debounced autosave. Edits stream in as full-content snapshots; the
//! pipeline coalesces each burst into a single persist call carrying the
//! latest snapshot, and only persists while the content is actually dirty.
//!
//! The pieces:
//!  - [debounce::DebounceState] is the pure trailing-edge state machine.
//!  - [module::AutosaveModule] drives it on the event loop and invokes the
//!    persist operation.
//!  - [saver::Persister] is the seam the persist operation hides behind.

pub mod debounce;
pub mod module;
pub mod saver;

use std::sync::Arc;

/// A content snapshot produced by the owning editor. `dirty` is false only
/// for the snapshot delivered on initial load; loading existing content is
/// not an edit and must never trigger a persist.
#[derive(Debug, Clone)]
pub struct EditEvent {
    pub snapshot: Arc<str>,
    pub dirty: bool,
}

impl EditEvent {
    pub fn loaded(snapshot: impl Into<Arc<str>>) -> Self {
        Self {
            snapshot: snapshot.into(),
            dirty: false,
        }
    }

    pub fn edited(snapshot: impl Into<Arc<str>>) -> Self {
        Self {
            snapshot: snapshot.into(),
            dirty: true,
        }
    }
}
