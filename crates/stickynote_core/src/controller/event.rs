//! Host events consumed by the controller.

use crate::model::note::{NoteId, Point};

/// UI event delivered by the host environment.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteEvent {
    /// Creation gesture on the canvas (right-click / long-press).
    ContextMenu { position: Point },
    /// Element content changed; carries the element's full HTML.
    ContentInput { note: NoteId, html: String },
    /// Primary click released on an element; also ends interactive resizes.
    Click { note: NoteId },
    /// Drag gesture began on an element.
    DragStart { note: NoteId, pointer: Point },
    PointerMove { pointer: Point },
    /// Pointer released anywhere on the page.
    PointerUp,
}

/// Whether the host should run its own default handling for the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    Default,
    PreventDefault,
}
