//! FFI use-case API for the note canvas host.
//!
//! # Responsibility
//! - Expose the note controller to a UI host as sync FRB calls.
//! - Hold the single process-wide notes session.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every event call requires an open session; none opens one implicitly.
//! - Render operations queue up until the host drains them.
//! - Non-finite coordinates and sizes are rejected before reaching the core.

use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use stickynote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    EventDisposition, NoteController, NoteEvent, NoteId, NoteStore, NotesConfig, Point,
    RecordingSurface, RenderOp, SqliteStorage, SystemClock,
};
use uuid::Uuid;

type SessionController = NoteController<SqliteStorage, RecordingSurface, SystemClock>;

struct Session {
    db_path: PathBuf,
    controller: SessionController,
}

static SESSION: Mutex<Option<Session>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and an error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Outcome of one event call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    /// Whether the event was applied and persisted where required.
    pub ok: bool,
    /// Note the event created or affected, if any.
    pub note_id: Option<String>,
    /// Host should suppress its default handling (context menu, native drag).
    pub prevent_default: bool,
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note_id: Option<NoteId>, prevent_default: bool) -> Self {
        Self {
            ok: true,
            note_id: note_id.map(|id| id.to_string()),
            prevent_default,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note_id: None,
            prevent_default: false,
            message: message.into(),
        }
    }
}

/// Result of running due timers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTickResponse {
    pub ok: bool,
    /// Notes whose debounced content was saved.
    pub applied: u32,
    /// Milliseconds until the next pending timer, if any.
    pub next_timer_in_ms: Option<u64>,
    pub message: String,
}

/// One render operation flattened for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOpItem {
    /// `create|place|remove`.
    pub kind: String,
    pub note_id: String,
    pub x: Option<String>,
    pub y: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub color: Option<String>,
    pub content: Option<String>,
}

/// Opens the notes session backed by the SQLite file at `db_path`.
///
/// Idempotent for the same path; a different path is rejected until
/// `notes_close`. Returns an empty string on success.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_open(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let path = PathBuf::from(trimmed);

    let mut slot = lock_session();
    if let Some(session) = slot.as_ref() {
        if session.db_path == path {
            return String::new();
        }
        return format!(
            "notes session already open at `{}`; refusing to switch to `{}`",
            session.db_path.display(),
            path.display()
        );
    }

    let storage = match SqliteStorage::open(&path) {
        Ok(storage) => storage,
        Err(err) => return format!("notes_open failed: {err}"),
    };
    let config = NotesConfig::default();
    let store = NoteStore::open(storage, config.storage_key.clone());
    let controller = NoteController::initialize(
        store,
        RecordingSurface::new(),
        SystemClock::new(),
        config,
    );
    *slot = Some(Session {
        db_path: path,
        controller,
    });
    String::new()
}

/// Flushes pending edits and closes the session. Returns an error message
/// (empty on success); the session is closed either way.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_close() -> String {
    let Some(mut session) = lock_session().take() else {
        return String::new();
    };
    match session.controller.shutdown() {
        Ok(()) => String::new(),
        Err(err) => format!("notes_close failed: {err}"),
    }
}

/// Canvas creation gesture at `(x, y)`.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_context_menu(x: f64, y: f64) -> NoteActionResponse {
    if !all_finite(&[x, y]) {
        return non_finite("position");
    }
    with_session(|controller| {
        let id = controller.create_note(Point::new(x, y))?;
        Ok(NoteActionResponse::success("Note created.", Some(id), true))
    })
}

/// Content of a note element changed.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_input(note_id: String, html: String) -> NoteActionResponse {
    let Some(id) = parse_note_id(&note_id) else {
        return invalid_note_id(&note_id);
    };
    with_session(|controller| {
        controller.surface_mut().report_content(id, &html);
        let disposition = controller.handle_event(NoteEvent::ContentInput { note: id, html })?;
        Ok(respond("Edit scheduled.", id, disposition))
    })
}

/// Host finished an interactive resize; size is kept until the next click.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_resized(note_id: String, width: f64, height: f64) -> NoteActionResponse {
    let Some(id) = parse_note_id(&note_id) else {
        return invalid_note_id(&note_id);
    };
    if !all_finite(&[width, height]) {
        return non_finite("size");
    }
    with_session(|controller| {
        if controller.surface_mut().report_resize(id, width, height) {
            Ok(NoteActionResponse::success("Resize recorded.", Some(id), false))
        } else {
            Ok(NoteActionResponse::failure(format!("note not found: {id}")))
        }
    })
}

/// Host resolved the on-screen top-left corner of a note element.
///
/// Lets notes positioned in units other than `px` be dragged.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_layout(note_id: String, x: f64, y: f64) -> NoteActionResponse {
    let Some(id) = parse_note_id(&note_id) else {
        return invalid_note_id(&note_id);
    };
    if !all_finite(&[x, y]) {
        return non_finite("origin");
    }
    with_session(|controller| {
        if controller
            .surface_mut()
            .report_layout_origin(id, Point::new(x, y))
        {
            Ok(NoteActionResponse::success("Layout recorded.", Some(id), false))
        } else {
            Ok(NoteActionResponse::failure(format!("note not found: {id}")))
        }
    })
}

/// Primary click on a note element.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_click(note_id: String) -> NoteActionResponse {
    let Some(id) = parse_note_id(&note_id) else {
        return invalid_note_id(&note_id);
    };
    with_session(|controller| {
        let disposition = controller.handle_event(NoteEvent::Click { note: id })?;
        Ok(respond("Size saved.", id, disposition))
    })
}

/// Drag gesture began on a note element with the pointer at `(x, y)`.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_drag_start(note_id: String, x: f64, y: f64) -> NoteActionResponse {
    let Some(id) = parse_note_id(&note_id) else {
        return invalid_note_id(&note_id);
    };
    if !all_finite(&[x, y]) {
        return non_finite("pointer");
    }
    with_session(|controller| {
        let started = controller.begin_drag(id, Point::new(x, y))?;
        let message = if started {
            "Drag started."
        } else {
            "Drag ignored."
        };
        Ok(NoteActionResponse::success(message, Some(id), true))
    })
}

/// Pointer moved anywhere. Returns whether a note was dragged (and the
/// host should prevent default handling).
#[flutter_rust_bridge::frb(sync)]
pub fn notes_pointer_move(x: f64, y: f64) -> bool {
    let mut slot = lock_session();
    let Some(session) = slot.as_mut() else {
        return false;
    };
    session.controller.drag_to(Point::new(x, y))
}

/// Pointer released anywhere on the page.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_pointer_up() -> NoteActionResponse {
    with_session(|controller| match controller.end_drag()? {
        Some(id) => Ok(NoteActionResponse::success("Position saved.", Some(id), false)),
        None => Ok(NoteActionResponse::success("No active drag.", None, false)),
    })
}

/// Runs due debounce timers; hosts call this on a timer or animation frame.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_tick() -> NoteTickResponse {
    let mut slot = lock_session();
    let Some(session) = slot.as_mut() else {
        return NoteTickResponse {
            ok: false,
            applied: 0,
            next_timer_in_ms: None,
            message: "notes session is not open".to_string(),
        };
    };
    let result = session.controller.run_due_timers();
    let next_timer_in_ms = next_timer_in_ms(&session.controller);
    match result {
        Ok(applied) => NoteTickResponse {
            ok: true,
            applied: u32::try_from(applied).unwrap_or(u32::MAX),
            next_timer_in_ms,
            message: String::new(),
        },
        Err(err) => NoteTickResponse {
            ok: false,
            applied: 0,
            next_timer_in_ms,
            message: format!("notes_tick failed: {err}"),
        },
    }
}

/// Takes every queued render operation, oldest first.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_drain_render_ops() -> Vec<RenderOpItem> {
    let mut slot = lock_session();
    let Some(session) = slot.as_mut() else {
        return Vec::new();
    };
    session
        .controller
        .surface_mut()
        .drain_ops()
        .into_iter()
        .map(to_render_op_item)
        .collect()
}

fn with_session(
    f: impl FnOnce(&mut SessionController) -> stickynote_core::ControllerResult<NoteActionResponse>,
) -> NoteActionResponse {
    let mut slot = lock_session();
    let Some(session) = slot.as_mut() else {
        return NoteActionResponse::failure("notes session is not open");
    };
    match f(&mut session.controller) {
        Ok(response) => response,
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error error={err}");
            NoteActionResponse::failure(err.to_string())
        }
    }
}

fn lock_session() -> MutexGuard<'static, Option<Session>> {
    // A panic while holding the lock leaves the session usable.
    SESSION.lock().unwrap_or_else(PoisonError::into_inner)
}

fn respond(message: &str, id: NoteId, disposition: EventDisposition) -> NoteActionResponse {
    NoteActionResponse::success(
        message,
        Some(id),
        disposition == EventDisposition::PreventDefault,
    )
}

fn parse_note_id(value: &str) -> Option<NoteId> {
    Uuid::parse_str(value.trim()).ok()
}

fn invalid_note_id(value: &str) -> NoteActionResponse {
    NoteActionResponse::failure(format!("invalid note id `{value}`"))
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|value| value.is_finite())
}

fn non_finite(what: &str) -> NoteActionResponse {
    NoteActionResponse::failure(format!("{what} must be finite"))
}

fn next_timer_in_ms(controller: &SessionController) -> Option<u64> {
    let remaining = controller.time_until_next_timer()?;
    Some(u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX))
}

fn to_render_op_item(op: RenderOp) -> RenderOpItem {
    match op {
        RenderOp::Create {
            id,
            x,
            y,
            width,
            height,
            color,
            content,
        } => RenderOpItem {
            kind: "create".to_string(),
            note_id: id.to_string(),
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
            color: Some(color),
            content: Some(content),
        },
        RenderOp::Place { id, x, y } => RenderOpItem {
            kind: "place".to_string(),
            note_id: id.to_string(),
            x: Some(x),
            y: Some(y),
            width: None,
            height: None,
            color: None,
            content: None,
        },
        RenderOp::Remove { id } => RenderOpItem {
            kind: "remove".to_string(),
            note_id: id.to_string(),
            x: None,
            y: None,
            width: None,
            height: None,
            color: None,
            content: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, notes_click, notes_close, notes_context_menu,
        notes_drag_start, notes_drain_render_ops, notes_input, notes_layout, notes_open,
        notes_pointer_move, notes_pointer_up, notes_resized, notes_tick, ping,
    };

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn malformed_note_ids_are_rejected_before_touching_session() {
        let response = notes_input("not-a-uuid".to_string(), "x".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("invalid note id"));

        let response = notes_click(String::new());
        assert!(!response.ok);
    }

    #[test]
    fn non_finite_geometry_is_rejected_before_touching_session() {
        let note_id = uuid::Uuid::new_v4().to_string();

        let response = notes_context_menu(f64::NAN, 5.0);
        assert!(!response.ok);
        assert_eq!(response.message, "position must be finite");

        let response = notes_resized(note_id.clone(), f64::INFINITY, 100.0);
        assert_eq!(response.message, "size must be finite");

        let response = notes_drag_start(note_id.clone(), 0.0, f64::NEG_INFINITY);
        assert_eq!(response.message, "pointer must be finite");

        let response = notes_layout(note_id, f64::NAN, f64::NAN);
        assert_eq!(response.message, "origin must be finite");
    }

    // The only test that opens the process-wide session.
    #[test]
    fn session_flow_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("notes.sqlite3");
        let db_path = db_path.to_str().unwrap().to_string();

        assert_eq!(notes_open(db_path.clone()), "");
        assert_eq!(notes_open(db_path.clone()), "");
        assert!(!notes_open(format!("{db_path}.other")).is_empty());

        let created = notes_context_menu(50.0, 60.0);
        assert!(created.ok, "{}", created.message);
        assert!(created.prevent_default);
        let note_id = created.note_id.clone().unwrap();

        let ops = notes_drain_render_ops();
        let create = ops
            .iter()
            .find(|op| op.note_id == note_id)
            .expect("created note should be rendered");
        assert_eq!(create.kind, "create");
        assert_eq!(create.x.as_deref(), Some("50px"));
        assert_eq!(create.width.as_deref(), Some("200px"));

        // Debounce timing is covered in the core; close flushes the edit.
        let edited = notes_input(note_id.clone(), "hello".to_string());
        assert!(edited.ok, "{}", edited.message);
        let tick = notes_tick();
        assert!(tick.ok, "{}", tick.message);

        assert!(notes_resized(note_id.clone(), 240.0, 180.0).ok);
        assert!(notes_layout(note_id.clone(), 50.0, 60.0).ok);
        assert!(notes_click(note_id.clone()).ok);

        let drag = notes_drag_start(note_id.clone(), 55.0, 65.0);
        assert!(drag.ok && drag.prevent_default, "{}", drag.message);
        assert!(notes_pointer_move(75.0, 85.0));
        let released = notes_pointer_up();
        assert_eq!(released.note_id.as_deref(), Some(note_id.as_str()));
        assert!(!notes_pointer_move(0.0, 0.0));

        assert_eq!(notes_close(), "");
        assert!(!notes_context_menu(1.0, 1.0).ok);

        assert_eq!(notes_open(db_path), "");
        let ops = notes_drain_render_ops();
        assert_eq!(ops.len(), 1);
        let restored = &ops[0];
        assert_eq!(restored.x.as_deref(), Some("70px"));
        assert_eq!(restored.y.as_deref(), Some("80px"));
        assert_eq!(restored.width.as_deref(), Some("240px"));
        assert_eq!(restored.height.as_deref(), Some("180px"));
        assert_eq!(restored.content.as_deref(), Some("hello"));
        assert_eq!(notes_close(), "");
    }
}
