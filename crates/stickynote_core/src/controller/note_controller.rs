//! Note controller.
//!
//! # Responsibility
//! - Render every stored note once at initialization.
//! - Create notes on the canvas creation gesture.
//! - Persist content edits after a quiet period, resizes on click and
//!   positions on drag release.
//!
//! # Invariants
//! - Construction is initialization; it happens exactly once per controller.
//! - Records are appended and rendered before the save is attempted, so a
//!   failed save never leaves a record without an element.
//! - Pointer moves update the element only; the record changes on release.
//! - Every record passes `NoteRecord::validate` before it is saved, so a
//!   save never writes a note the loader would drop.

use crate::clock::Clock;
use crate::config::NotesConfig;
use crate::controller::debounce::DebounceTimer;
use crate::controller::drag::DragState;
use crate::controller::event::{EventDisposition, NoteEvent};
use crate::model::note::{px, NoteId, NoteRecord, NoteValidationError, Point};
use crate::storage::KeyValueStorage;
use crate::store::note_store::{NoteStore, StoreError};
use crate::surface::NoteSurface;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub type ControllerResult<T> = Result<T, ControllerError>;

#[derive(Debug)]
pub enum ControllerError {
    Store(StoreError),
    /// Event referenced a note that is not in the collection.
    NoteNotFound(NoteId),
    /// Geometry from the host does not form a storable record.
    InvalidNote(NoteValidationError),
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidNote(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::NoteNotFound(_) => None,
            Self::InvalidNote(err) => Some(err),
        }
    }
}

impl From<NoteValidationError> for ControllerError {
    fn from(value: NoteValidationError) -> Self {
        Self::InvalidNote(value)
    }
}

impl From<StoreError> for ControllerError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Drives note lifecycle from host events.
pub struct NoteController<S: KeyValueStorage, V: NoteSurface, C: Clock> {
    store: NoteStore<S>,
    surface: V,
    clock: C,
    config: NotesConfig,
    content_timers: HashMap<NoteId, DebounceTimer<String>>,
    drag: DragState,
    rng: StdRng,
}

impl<S: KeyValueStorage, V: NoteSurface, C: Clock> NoteController<S, V, C> {
    /// Renders every loaded note and returns a controller ready for events.
    pub fn initialize(store: NoteStore<S>, surface: V, clock: C, config: NotesConfig) -> Self {
        let mut controller = Self {
            store,
            surface,
            clock,
            config,
            content_timers: HashMap::new(),
            drag: DragState::default(),
            rng: StdRng::from_entropy(),
        };

        for id in controller.store.notes().ids() {
            if let Err(err) = controller.render_note_element(id) {
                warn!("event=controller_init module=controller status=render_failed error={err}");
            }
        }
        info!(
            "event=controller_init module=controller status=ok count={}",
            controller.store.notes().len()
        );
        controller
    }

    /// Replaces the color RNG, e.g. with a seeded one.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Dispatches one host event.
    pub fn handle_event(&mut self, event: NoteEvent) -> ControllerResult<EventDisposition> {
        match event {
            NoteEvent::ContextMenu { position } => {
                self.create_note(position)?;
                Ok(EventDisposition::PreventDefault)
            }
            NoteEvent::ContentInput { note, html } => {
                self.edit_content(note, html)?;
                Ok(EventDisposition::Default)
            }
            NoteEvent::Click { note } => {
                self.complete_resize(note)?;
                Ok(EventDisposition::Default)
            }
            NoteEvent::DragStart { note, pointer } => {
                self.begin_drag(note, pointer)?;
                Ok(EventDisposition::PreventDefault)
            }
            NoteEvent::PointerMove { pointer } => Ok(if self.drag_to(pointer) {
                EventDisposition::PreventDefault
            } else {
                EventDisposition::Default
            }),
            NoteEvent::PointerUp => {
                self.end_drag()?;
                Ok(EventDisposition::Default)
            }
        }
    }

    /// Creates a default note at `position`, renders it and saves.
    pub fn create_note(&mut self, position: Point) -> ControllerResult<NoteId> {
        let color = self.config.pick_color(&mut self.rng);
        let record = NoteRecord::new(
            px(position.x),
            px(position.y),
            self.config.default_width.clone(),
            self.config.default_height.clone(),
            color,
        );
        record.validate()?;
        let id = self.store.append(record);
        self.render_note_element(id)?;
        self.store.save()?;

        info!(
            "event=note_create module=controller status=ok count={}",
            self.store.notes().len()
        );
        Ok(id)
    }

    /// Creates the visual element for one stored note.
    pub fn render_note_element(&mut self, id: NoteId) -> ControllerResult<()> {
        let record = self.store.get(id).ok_or(ControllerError::NoteNotFound(id))?;
        self.surface.create_note(id, record);
        Ok(())
    }

    /// Schedules a content save after the configured quiet period.
    pub fn edit_content(&mut self, id: NoteId, html: impl Into<String>) -> ControllerResult<()> {
        if self.store.get(id).is_none() {
            return Err(ControllerError::NoteNotFound(id));
        }

        let now = self.clock.now();
        let delay = self.config.content_debounce;
        let deadline = self
            .content_timers
            .entry(id)
            .or_insert_with(|| DebounceTimer::new(delay))
            .arm(now, html.into());
        debug!(
            "event=content_debounce module=controller status=armed deadline_ms={}",
            deadline.as_millis()
        );
        Ok(())
    }

    /// Applies every content edit whose quiet period has elapsed.
    ///
    /// Saves once when anything was applied. Returns the number of notes
    /// updated.
    pub fn run_due_timers(&mut self) -> ControllerResult<usize> {
        let now = self.clock.now();
        let mut due = Vec::new();
        self.content_timers.retain(|id, timer| {
            if let Some(html) = timer.fire_if_due(now) {
                due.push((*id, html));
            }
            timer.is_armed()
        });

        self.apply_content(due)
    }

    /// Earliest pending content deadline, for scheduling host wake-ups.
    pub fn next_timer_deadline(&self) -> Option<Duration> {
        self.content_timers
            .values()
            .filter_map(DebounceTimer::deadline)
            .min()
    }

    /// Time left before the earliest pending deadline; zero when overdue.
    pub fn time_until_next_timer(&self) -> Option<Duration> {
        let deadline = self.next_timer_deadline()?;
        Some(deadline.saturating_sub(self.clock.now()))
    }

    /// Captures the element's current size into its record and saves.
    pub fn complete_resize(&mut self, id: NoteId) -> ControllerResult<()> {
        let (width, height) = self
            .surface
            .note_size(id)
            .ok_or(ControllerError::NoteNotFound(id))?;
        let record = self
            .store
            .get_mut(id)
            .ok_or(ControllerError::NoteNotFound(id))?;
        let mut resized = record.clone();
        resized.width = width;
        resized.height = height;
        resized.validate()?;
        *record = resized;
        self.store.save()?;
        Ok(())
    }

    /// Starts dragging `id` grabbed at `pointer`.
    ///
    /// Returns `Ok(false)` when another drag is active, the pointer is not
    /// finite, or the element's position cannot be resolved in pixels.
    pub fn begin_drag(&mut self, id: NoteId, pointer: Point) -> ControllerResult<bool> {
        if self.store.get(id).is_none() {
            return Err(ControllerError::NoteNotFound(id));
        }
        if let Some(active) = self.drag.active_note() {
            debug!(
                "event=drag_start module=controller status=ignored reason=already_dragging active={active}"
            );
            return Ok(false);
        }
        if !pointer.is_finite() {
            warn!("event=drag_start module=controller status=ignored reason=non_finite_pointer");
            return Ok(false);
        }
        let Some(origin) = self.surface.note_origin(id) else {
            warn!("event=drag_start module=controller status=ignored reason=unresolved_origin");
            return Ok(false);
        };

        Ok(self.drag.begin(id, pointer, origin))
    }

    /// Moves the dragged element; returns `false` when nothing is dragged.
    ///
    /// Non-finite pointer coordinates are ignored.
    pub fn drag_to(&mut self, pointer: Point) -> bool {
        if !pointer.is_finite() {
            return false;
        }
        let Some((id, top_left)) = self.drag.pointer_moved(pointer) else {
            return false;
        };
        self.surface.place_note(id, &px(top_left.x), &px(top_left.y));
        true
    }

    /// Ends any active drag, writing the element position back and saving.
    ///
    /// Returns the released note, or `None` when nothing was dragged.
    pub fn end_drag(&mut self) -> ControllerResult<Option<NoteId>> {
        let Some(drag) = self.drag.release() else {
            return Ok(None);
        };

        let record = self
            .store
            .get_mut(drag.note)
            .ok_or(ControllerError::NoteNotFound(drag.note))?;
        if let Some(position) = drag.position {
            let mut moved = record.clone();
            moved.x = px(position.x);
            moved.y = px(position.y);
            moved.validate()?;
            *record = moved;
        }
        self.store.save()?;
        Ok(Some(drag.note))
    }

    /// Flushes pending edits and removes every rendered element.
    ///
    /// Elements are removed even when the flush fails to save.
    pub fn shutdown(&mut self) -> ControllerResult<()> {
        let pending: Vec<(NoteId, String)> = self
            .content_timers
            .drain()
            .filter_map(|(id, mut timer)| timer.cancel().map(|html| (id, html)))
            .collect();
        let flushed = self.apply_content(pending);

        self.drag = DragState::Idle;
        for id in self.store.notes().ids() {
            self.surface.remove_note(id);
        }
        info!(
            "event=controller_shutdown module=controller status={}",
            if flushed.is_ok() { "ok" } else { "error" }
        );
        flushed.map(|_| ())
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn store(&self) -> &NoteStore<S> {
        &self.store
    }

    pub fn surface(&self) -> &V {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut V {
        &mut self.surface
    }

    pub fn config(&self) -> &NotesConfig {
        &self.config
    }

    pub fn into_store(self) -> NoteStore<S> {
        self.store
    }

    fn apply_content(&mut self, updates: Vec<(NoteId, String)>) -> ControllerResult<usize> {
        let mut applied = 0;
        for (id, html) in updates {
            match self.store.get_mut(id) {
                Some(record) => {
                    record.content = html;
                    applied += 1;
                }
                None => warn!("event=content_save module=controller status=skipped reason=missing_note"),
            }
        }

        if applied > 0 {
            self.store.save()?;
            debug!("event=content_save module=controller status=ok count={applied}");
        }
        Ok(applied)
    }
}
