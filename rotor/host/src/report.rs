//! Host-side mirror of the visible strip
//!
//! A real surface keeps one view per visible glyph and animates each
//! [`RotationEvent`] as a slide-out at the front and a slide-in at the back.
//! The headless host keeps the same bookkeeping as plain strings so the
//! reported strip always matches what a surface would be showing.

use std::fmt;

use rotor_core::RotationEvent;
use serde::Serialize;

/// The glyphs a surface currently shows, in display order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StripMirror {
    glyphs: Vec<String>,
}

impl StripMirror {
    /// Start from the sequencer's initial strip
    pub fn new(glyphs: Vec<String>) -> Self {
        Self { glyphs }
    }

    /// Apply one rotation
    ///
    /// Returns `false` and leaves the mirror untouched when the event does
    /// not line up with it; the caller should then resync from the sequencer.
    pub fn apply(&mut self, event: &RotationEvent) -> bool {
        let lines_up = self.glyphs.get(event.removed_index) == Some(&event.evicted_value)
            && event.inserted_index < self.glyphs.len();
        if !lines_up {
            return false;
        }
        self.glyphs.remove(event.removed_index);
        self.glyphs
            .insert(event.inserted_index, event.inserted_value.clone());
        true
    }

    /// Replace the mirror wholesale
    pub fn resync(&mut self, glyphs: Vec<String>) {
        self.glyphs = glyphs;
    }

    pub fn glyphs(&self) -> &[String] {
        &self.glyphs
    }
}

impl fmt::Display for StripMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.glyphs.join(" | "))
    }
}

/// One line of `--json` output
#[derive(Debug, Serialize)]
pub struct RotationReport<'a> {
    #[serde(flatten)]
    pub event: &'a RotationEvent,
    pub strip: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(glyphs: &[&str]) -> StripMirror {
        StripMirror::new(glyphs.iter().map(|g| (*g).to_string()).collect())
    }

    #[test]
    fn test_apply_rotation() {
        let mut mirror = strip(&["B", "D"]);
        let event = RotationEvent::rotation(2, "B", "C", 1);

        assert!(mirror.apply(&event));
        assert_eq!(mirror.glyphs(), ["D", "C"]);
        assert_eq!(mirror.to_string(), "[D | C]");
    }

    #[test]
    fn test_mismatched_event_is_rejected() {
        let mut mirror = strip(&["A", "B"]);
        let event = RotationEvent::rotation(2, "Z", "C", 4);

        assert!(!mirror.apply(&event));
        assert_eq!(mirror.glyphs(), ["A", "B"]);

        mirror.resync(vec!["B".into(), "C".into()]);
        assert_eq!(mirror.glyphs(), ["B", "C"]);
    }

    #[test]
    fn test_out_of_range_insert_leaves_mirror_untouched() {
        let mut mirror = strip(&["A", "B"]);
        // built for a strip of three, so the insert lands past the end
        let event = RotationEvent::rotation(3, "A", "C", 1);

        assert!(!mirror.apply(&event));
        assert_eq!(mirror.glyphs(), ["A", "B"]);
    }

    #[test]
    fn test_empty_mirror_rejects_events() {
        let mut mirror = StripMirror::default();
        let event = RotationEvent::rotation(1, "A", "B", 1);
        assert!(!mirror.apply(&event));
    }

    #[test]
    fn test_report_flattens_event() {
        let event = RotationEvent::rotation(2, "B", "C", 7);
        let mirror = strip(&["D", "C"]);
        let report = RotationReport {
            event: &event,
            strip: mirror.glyphs(),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["tick"], 7);
        assert_eq!(json["inserted_value"], "C");
        assert_eq!(json["strip"], serde_json::json!(["D", "C"]));
    }
}
