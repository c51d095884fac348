//! Event-driven note controller.
//!
//! # Responsibility
//! - Translate host UI events into note record mutations and saves.
//! - Own per-note debounce timers and the single drag slot.
//!
//! # Invariants
//! - Every record in the store has exactly one rendered element.
//! - At most one note is dragged at a time.
//! - A later content edit always supersedes an earlier pending save.

pub mod debounce;
pub mod drag;
pub mod event;
pub mod note_controller;
