//! Domain model for sticky notes.
//!
//! # Responsibility
//! - Define the persisted note record and its session-scoped identity.
//! - Provide CSS length helpers shared by store and controller.
//!
//! # Invariants
//! - The persisted shape is exactly `{x, y, width, height, color, content}`.
//! - `NoteId` is never written to storage.

pub mod note;
