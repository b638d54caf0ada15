//! Events emitted to the host surface
//!
//! The sequencer never renders. Each tick is described as a remove/insert
//! pair that the host replays on its list control.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a sequencer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequencerState {
    /// No visible glyphs, no timer
    #[default]
    Idle,
    /// Visible glyphs present, timer active
    Running,
}

/// One rotation step: the oldest glyph left, a new one arrived at the end
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationEvent {
    /// Index removed from the strip (always the oldest, 0)
    pub removed_index: usize,
    /// Index the new glyph was inserted at (always `visible_count - 1`)
    pub inserted_index: usize,
    /// The glyph inserted
    pub inserted_value: String,
    /// The glyph that was evicted
    pub evicted_value: String,
    /// Tick number within the current run, starting at 1
    pub tick: u64,
}

impl RotationEvent {
    /// Describe a rotation of a strip with `visible_count` glyphs
    #[must_use]
    pub fn rotation(
        visible_count: usize,
        evicted: impl Into<String>,
        inserted: impl Into<String>,
        tick: u64,
    ) -> Self {
        Self {
            removed_index: 0,
            inserted_index: visible_count.saturating_sub(1),
            inserted_value: inserted.into(),
            evicted_value: evicted.into(),
            tick,
        }
    }
}
