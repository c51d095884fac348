//! Note collection ownership and persistence.
//!
//! # Responsibility
//! - Own the ordered in-memory note collection.
//! - Mirror the whole collection into one key-value entry.
//!
//! # Invariants
//! - Writes always replace the full serialized collection.
//! - Collection order is creation order and survives a save/load cycle.

pub mod note_store;
