//! Pointer-tracking drag state machine.
//!
//! # Invariants
//! - `Idle -> Dragging` only from `Idle`; a second start while dragging is
//!   ignored and the original drag continues.
//! - While dragging, the element's top-left is `pointer - offset`, so it
//!   never jumps to the pointer.
//! - `release` always leaves the machine `Idle`.

use crate::model::note::{NoteId, Point};

/// Drag in progress for one note.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDrag {
    pub note: NoteId,
    /// Pointer position minus element top-left at drag start.
    pub offset: Point,
    /// Last top-left applied to the element, if the pointer moved.
    pub position: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(ActiveDrag),
}

impl DragState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn active_note(&self) -> Option<NoteId> {
        match self {
            Self::Idle => None,
            Self::Dragging(drag) => Some(drag.note),
        }
    }

    /// Starts dragging `note` whose top-left is at `origin`.
    ///
    /// Returns `false` (and changes nothing) when a drag is already active.
    pub fn begin(&mut self, note: NoteId, pointer: Point, origin: Point) -> bool {
        if !self.is_idle() {
            return false;
        }
        *self = Self::Dragging(ActiveDrag {
            note,
            offset: Point::new(pointer.x - origin.x, pointer.y - origin.y),
            position: None,
        });
        true
    }

    /// Computes and records the new top-left for the dragged note.
    pub fn pointer_moved(&mut self, pointer: Point) -> Option<(NoteId, Point)> {
        let Self::Dragging(drag) = self else {
            return None;
        };
        let top_left = Point::new(pointer.x - drag.offset.x, pointer.y - drag.offset.y);
        drag.position = Some(top_left);
        Some((drag.note, top_left))
    }

    /// Ends the drag, returning what was being dragged.
    pub fn release(&mut self) -> Option<ActiveDrag> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Dragging(drag) => Some(drag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DragState;
    use crate::model::note::Point;
    use uuid::Uuid;

    #[test]
    fn move_preserves_grab_offset() {
        let note = Uuid::new_v4();
        let mut drag = DragState::default();
        assert!(drag.begin(note, Point::new(130.0, 90.0), Point::new(100.0, 80.0)));

        let (moved, top_left) = drag.pointer_moved(Point::new(200.0, 150.0)).unwrap();
        assert_eq!(moved, note);
        // E + (P' - P) = (100, 80) + (70, 60)
        assert_eq!(top_left, Point::new(170.0, 140.0));
    }

    #[test]
    fn second_begin_is_ignored_while_dragging() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let mut drag = DragState::default();
        assert!(drag.begin(first, Point::new(1.0, 1.0), Point::new(0.0, 0.0)));
        assert!(!drag.begin(second, Point::new(5.0, 5.0), Point::new(0.0, 0.0)));
        assert_eq!(drag.active_note(), Some(first));
    }

    #[test]
    fn release_returns_to_idle_and_is_noop_when_idle() {
        let note = Uuid::new_v4();
        let mut drag = DragState::default();
        assert!(drag.release().is_none());
        assert!(drag.pointer_moved(Point::new(3.0, 3.0)).is_none());

        drag.begin(note, Point::new(0.0, 0.0), Point::new(0.0, 0.0));
        let released = drag.release().unwrap();
        assert_eq!(released.note, note);
        assert_eq!(released.position, None);
        assert!(drag.is_idle());
    }
}
