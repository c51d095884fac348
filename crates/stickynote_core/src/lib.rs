//! Core note lifecycle and persistence for the sticky-notes widget.
//! Hosts render elements and deliver events; this crate owns the notes.

pub mod clock;
pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;
pub mod surface;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::NotesConfig;
pub use controller::debounce::DebounceTimer;
pub use controller::drag::{ActiveDrag, DragState};
pub use controller::event::{EventDisposition, NoteEvent};
pub use controller::note_controller::{ControllerError, ControllerResult, NoteController};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{parse_px, px, NoteId, NoteRecord, NoteValidationError, Point};
pub use storage::{KeyValueStorage, MemoryStorage, SqliteStorage, StorageError, StorageResult};
pub use store::note_store::{
    decode_notes, encode_notes, NoteCollection, NoteEntry, NoteStore, StoreError, StoreResult,
};
pub use surface::{NoteSurface, NoteView, RecordingSurface, RenderOp};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
