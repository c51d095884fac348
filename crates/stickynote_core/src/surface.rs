//! Rendering port for visual note elements.
//!
//! # Responsibility
//! - Abstract the host's rendering surface behind `NoteSurface`.
//! - Provide `RecordingSurface`, a view-model surface whose queued
//!   operations a host replays onto real elements.
//!
//! # Invariants
//! - A surface renders at most one element per `NoteId`.
//! - Geometry queries reflect the latest placement or reported resize.
//! - Positions in non-`px` units resolve only through a host-reported
//!   layout origin.

use crate::model::note::{parse_px, px, NoteId, NoteRecord, Point};
use std::collections::HashMap;

/// Host-side rendering operations the controller needs.
pub trait NoteSurface {
    /// Creates an editable, resizable element mirroring `record`.
    fn create_note(&mut self, id: NoteId, record: &NoteRecord);
    /// Moves an element's top-left corner; lengths are CSS strings.
    fn place_note(&mut self, id: NoteId, x: &str, y: &str);
    fn remove_note(&mut self, id: NoteId);
    /// Current top-left corner of the element in canvas pixels.
    fn note_origin(&self, id: NoteId) -> Option<Point>;
    /// Current rendered `(width, height)` as CSS lengths.
    fn note_size(&self, id: NoteId) -> Option<(String, String)>;
}

/// One queued change for the host to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOp {
    Create {
        id: NoteId,
        x: String,
        y: String,
        width: String,
        height: String,
        color: String,
        content: String,
    },
    Place {
        id: NoteId,
        x: String,
        y: String,
    },
    Remove {
        id: NoteId,
    },
}

/// Last known visual state of one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteView {
    pub x: String,
    pub y: String,
    pub width: String,
    pub height: String,
    pub color: String,
    pub content: String,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    views: HashMap<NoteId, NoteView>,
    /// Host-resolved top-left corners for elements not placed in `px`.
    layout_origins: HashMap<NoteId, Point>,
    ops: Vec<RenderOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every operation queued since the last drain.
    pub fn drain_ops(&mut self) -> Vec<RenderOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn view(&self, id: NoteId) -> Option<&NoteView> {
        self.views.get(&id)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Records an interactive resize done by the host.
    ///
    /// Returns `false` when no element exists for `id` or a dimension is
    /// not finite.
    pub fn report_resize(&mut self, id: NoteId, width: f64, height: f64) -> bool {
        if !width.is_finite() || !height.is_finite() {
            return false;
        }
        let Some(view) = self.views.get_mut(&id) else {
            return false;
        };
        view.width = px(width);
        view.height = px(height);
        true
    }

    /// Records the on-screen top-left corner the host resolved for `id`.
    ///
    /// Used as the drag origin while the element's position is not in `px`.
    pub fn report_layout_origin(&mut self, id: NoteId, origin: Point) -> bool {
        if !origin.is_finite() || !self.views.contains_key(&id) {
            return false;
        }
        self.layout_origins.insert(id, origin);
        true
    }

    /// Records text typed into an element.
    pub fn report_content(&mut self, id: NoteId, html: &str) -> bool {
        let Some(view) = self.views.get_mut(&id) else {
            return false;
        };
        view.content = html.to_string();
        true
    }
}

impl NoteSurface for RecordingSurface {
    fn create_note(&mut self, id: NoteId, record: &NoteRecord) {
        let view = NoteView {
            x: record.x.clone(),
            y: record.y.clone(),
            width: record.width.clone(),
            height: record.height.clone(),
            color: record.color().to_string(),
            content: record.content.clone(),
        };
        self.ops.push(RenderOp::Create {
            id,
            x: view.x.clone(),
            y: view.y.clone(),
            width: view.width.clone(),
            height: view.height.clone(),
            color: view.color.clone(),
            content: view.content.clone(),
        });
        self.views.insert(id, view);
    }

    fn place_note(&mut self, id: NoteId, x: &str, y: &str) {
        let Some(view) = self.views.get_mut(&id) else {
            return;
        };
        view.x = x.to_string();
        view.y = y.to_string();
        self.layout_origins.remove(&id);
        self.ops.push(RenderOp::Place {
            id,
            x: x.to_string(),
            y: y.to_string(),
        });
    }

    fn remove_note(&mut self, id: NoteId) {
        self.layout_origins.remove(&id);
        if self.views.remove(&id).is_some() {
            self.ops.push(RenderOp::Remove { id });
        }
    }

    fn note_origin(&self, id: NoteId) -> Option<Point> {
        let view = self.views.get(&id)?;
        match (parse_px(&view.x), parse_px(&view.y)) {
            (Some(x), Some(y)) => Some(Point::new(x, y)),
            _ => self.layout_origins.get(&id).copied(),
        }
    }

    fn note_size(&self, id: NoteId) -> Option<(String, String)> {
        self.views
            .get(&id)
            .map(|view| (view.width.clone(), view.height.clone()))
    }
}
