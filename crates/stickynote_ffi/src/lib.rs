//! Host-facing bindings for the sticky-notes core.

pub mod api;
