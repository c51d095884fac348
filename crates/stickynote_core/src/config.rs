//! Runtime configuration for the notes core.
//!
//! # Responsibility
//! - Hold the storage key, note defaults and timing knobs in one place.
//!
//! # Invariants
//! - `palette` must be non-empty; `pick_color` falls back to the first
//!   default color otherwise.

use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

/// Key of the single durable entry holding every note.
pub const DEFAULT_STORAGE_KEY: &str = "sticky-notes";
pub const DEFAULT_NOTE_WIDTH: &str = "200px";
pub const DEFAULT_NOTE_HEIGHT: &str = "200px";
pub const DEFAULT_PALETTE: [&str; 3] = ["#ff7eb9", "#7afcff", "#feff9c"];
pub const DEFAULT_CONTENT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Tunables shared by `NoteStore` and `NoteController`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesConfig {
    pub storage_key: String,
    pub default_width: String,
    pub default_height: String,
    /// Background colors new notes draw from, uniformly.
    pub palette: Vec<String>,
    /// Quiet period after the latest content edit before it is saved.
    pub content_debounce: Duration,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_width: DEFAULT_NOTE_WIDTH.to_string(),
            default_height: DEFAULT_NOTE_HEIGHT.to_string(),
            palette: DEFAULT_PALETTE.iter().map(|c| (*c).to_string()).collect(),
            content_debounce: DEFAULT_CONTENT_DEBOUNCE,
        }
    }
}

impl NotesConfig {
    /// Draws one palette color uniformly at random.
    pub fn pick_color<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        self.palette
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| DEFAULT_PALETTE[0].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{NotesConfig, DEFAULT_PALETTE};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn pick_color_stays_in_palette_and_covers_it() {
        let config = NotesConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let seen: HashSet<String> = (0..200).map(|_| config.pick_color(&mut rng)).collect();
        assert_eq!(seen.len(), DEFAULT_PALETTE.len());
        assert!(seen.iter().all(|c| DEFAULT_PALETTE.contains(&c.as_str())));
    }

    #[test]
    fn empty_palette_falls_back_to_first_default() {
        let config = NotesConfig {
            palette: Vec::new(),
            ..NotesConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(config.pick_color(&mut rng), DEFAULT_PALETTE[0]);
    }
}
