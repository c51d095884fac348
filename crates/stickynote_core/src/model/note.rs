//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical record rendered by one visual note element.
//! - Validate CSS length and color fields.
//! - Normalize legacy numeric coordinates into `px` lengths on decode.
//!
//! # Invariants
//! - `color` is set once at creation and has no mutator.
//! - Length fields are strings; numbers are accepted only while decoding.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Session-scoped identifier a visual element uses to reference its record.
///
/// Assigned when a record enters the collection; never persisted.
pub type NoteId = Uuid;

static CSS_LENGTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(\d+(\.\d*)?|\.\d+)(px|%|em|rem|vw|vh|pt)?$").expect("valid length regex")
});
static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid color regex"));

/// Canvas coordinate pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are neither NaN nor infinite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Persisted sticky note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Left offset on the canvas, e.g. `"120px"`.
    #[serde(deserialize_with = "deserialize_length")]
    pub x: String,
    /// Top offset on the canvas.
    #[serde(deserialize_with = "deserialize_length")]
    pub y: String,
    #[serde(deserialize_with = "deserialize_length")]
    pub width: String,
    #[serde(deserialize_with = "deserialize_length")]
    pub height: String,
    color: String,
    /// User-entered HTML fragment.
    pub content: String,
}

impl NoteRecord {
    /// Creates an empty note with the given geometry and background color.
    pub fn new(
        x: impl Into<String>,
        y: impl Into<String>,
        width: impl Into<String>,
        height: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            width: width.into(),
            height: height.into(),
            color: color.into(),
            content: String::new(),
        }
    }

    /// Background color chosen at creation.
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Checks that every geometry field is a CSS length and `color` is hex.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        for (field, value) in [
            ("x", &self.x),
            ("y", &self.y),
            ("width", &self.width),
            ("height", &self.height),
        ] {
            if !is_css_length(value) {
                return Err(NoteValidationError::InvalidLength {
                    field,
                    value: value.clone(),
                });
            }
        }

        if !HEX_COLOR_RE.is_match(&self.color) {
            return Err(NoteValidationError::InvalidColor(self.color.clone()));
        }

        Ok(())
    }
}

/// Validation failure for one note record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    InvalidLength { field: &'static str, value: String },
    InvalidColor(String),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLength { field, value } => {
                write!(f, "note {field} is not a CSS length: `{value}`")
            }
            Self::InvalidColor(value) => write!(f, "note color is not a hex color: `{value}`"),
        }
    }
}

impl Error for NoteValidationError {}

/// Formats a pixel value as a CSS length (`50.0` -> `"50px"`).
pub fn px(value: f64) -> String {
    format!("{value}px")
}

/// Parses a `px` (or unitless) CSS length into pixels.
///
/// Returns `None` for other units, since they cannot be resolved without
/// layout information.
pub fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed);
    number.parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

fn is_css_length(value: &str) -> bool {
    value == "auto" || CSS_LENGTH_RE.is_match(value)
}

fn deserialize_length<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLength {
        Text(String),
        Number(f64),
    }

    // Notes that were never dragged carry raw numeric pointer coordinates.
    Ok(match RawLength::deserialize(deserializer)? {
        RawLength::Text(value) => value,
        RawLength::Number(value) => px(value),
    })
}
