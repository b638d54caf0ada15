//! Symbol Pool Model
//!
//! Holds the candidate glyphs for one strip and decides which of them
//! appear. The model is immutable after construction apart from its
//! [`GlyphSource`], which advances with every draw.

use std::fmt;

use tracing::{debug, warn};

use crate::error::{Result, SpinnerError};
use crate::source::{GlyphSource, RngGlyphSource};

/// Glyph returned when a draw yields nothing usable
pub const FALLBACK_GLYPH: &str = "questionmark.circle.fill";

/// Number of glyphs shown by the demo strip
pub const DEFAULT_VISIBLE_COUNT: usize = 4;

/// Glyph pool of the demo strip
pub const DEFAULT_POOL: &[&str] = &[
    "microphone.circle.fill",
    "message.circle.fill",
    "phone.circle.fill",
    "video.circle.fill",
    "envelope.circle.fill",
    "recordingtape.circle.fill",
    "personalhotspot.circle.fill",
    "icloud.circle.fill",
    "wifi.circle.fill",
    "antenna.radiowaves.left.and.right.circle.fill",
    "play.circle.fill",
    "pause.circle.fill",
    "stop.circle.fill",
    "record.circle.fill",
    "shuffle.circle.fill",
    "repeat.circle.fill",
    "infinity.circle.fill",
    "popcorn.circle.fill",
    "house.circle.fill",
    "restart.circle.fill",
    "power.circle.fill",
    "speaker.wave.2.circle.fill",
    "iphone.circle.fill",
];

/// Pool of glyph identifiers plus the number shown at once
pub struct SymbolPoolModel {
    pool: Vec<String>,
    visible_count: usize,
    source: Box<dyn GlyphSource>,
}

impl SymbolPoolModel {
    /// Create a model drawing from OS entropy
    ///
    /// # Errors
    ///
    /// See [`SymbolPoolModel::with_source`].
    pub fn new<S: Into<String>>(
        visible_count: usize,
        pool: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        Self::with_source(visible_count, pool, RngGlyphSource::from_entropy())
    }

    /// Create a model with an explicit glyph source
    ///
    /// Duplicate glyphs are collapsed, keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`SpinnerError::EmptyVisibleCount`] for a zero visible count and
    /// [`SpinnerError::Configuration`] when the pool holds fewer distinct
    /// glyphs than `visible_count`.
    pub fn with_source<S: Into<String>>(
        visible_count: usize,
        pool: impl IntoIterator<Item = S>,
        source: impl GlyphSource + 'static,
    ) -> Result<Self> {
        if visible_count == 0 {
            return Err(SpinnerError::EmptyVisibleCount);
        }

        let mut distinct: Vec<String> = Vec::new();
        for glyph in pool {
            let glyph = glyph.into();
            if !distinct.contains(&glyph) {
                distinct.push(glyph);
            }
        }

        if distinct.len() < visible_count {
            warn!(
                pool_size = distinct.len(),
                visible_count, "Glyph pool too small for the strip"
            );
            return Err(SpinnerError::Configuration {
                pool_size: distinct.len(),
                visible_count,
            });
        }

        debug!(pool_size = distinct.len(), visible_count, "Glyph pool ready");
        Ok(Self {
            pool: distinct,
            visible_count,
            source: Box::new(source),
        })
    }

    /// The demo pool with [`DEFAULT_VISIBLE_COUNT`] visible glyphs
    #[must_use]
    pub fn demo(source: impl GlyphSource + 'static) -> Self {
        Self {
            pool: DEFAULT_POOL.iter().map(|g| (*g).to_string()).collect(),
            visible_count: DEFAULT_VISIBLE_COUNT,
            source: Box::new(source),
        }
    }

    /// Number of glyphs shown at once
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    /// Distinct glyphs in draw order
    #[must_use]
    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    /// Draw `visible_count` distinct glyphs
    ///
    /// The result is in shuffle-draw order; only its length and distinctness
    /// are guaranteed.
    pub fn generate_initial_set(&mut self) -> Vec<String> {
        let mut shuffled = self.pool.clone();
        self.source.shuffle(&mut shuffled);

        let mut chosen: Vec<String> = Vec::with_capacity(self.visible_count);
        while chosen.len() < self.visible_count {
            let Some(glyph) = shuffled.pop() else { break };
            if !chosen.contains(&glyph) {
                chosen.push(glyph);
            }
        }

        // Unreachable while the construction invariant holds.
        if chosen.len() < self.visible_count {
            for glyph in &self.pool {
                if chosen.len() == self.visible_count {
                    break;
                }
                if !chosen.contains(glyph) {
                    chosen.push(glyph.clone());
                }
            }
        }

        chosen
    }

    /// Draw the glyph to append next, trying not to repeat `excluding`
    ///
    /// Exactly one retry is made: if the first draw equals `excluding` and the
    /// pool has alternatives, the second draw comes from the pool without it.
    /// A single-glyph pool therefore repeats its only glyph.
    pub fn generate_next(&mut self, excluding: Option<&str>) -> String {
        let first = self.source.pick(self.pool.len());
        let mut next = self
            .pool
            .get(first)
            .cloned()
            .unwrap_or_else(|| FALLBACK_GLYPH.to_string());

        if self.pool.len() > 1 {
            if let Some(last) = excluding {
                if next == last {
                    let alternatives: Vec<&String> =
                        self.pool.iter().filter(|g| g.as_str() != last).collect();
                    next = if alternatives.is_empty() {
                        FALLBACK_GLYPH.to_string()
                    } else {
                        let retry = self.source.pick(alternatives.len());
                        alternatives
                            .get(retry)
                            .map_or_else(|| FALLBACK_GLYPH.to_string(), |g| (*g).clone())
                    };
                }
            }
        }

        next
    }
}

impl fmt::Debug for SymbolPoolModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolPoolModel")
            .field("pool", &self.pool)
            .field("visible_count", &self.visible_count)
            .finish_non_exhaustive()
    }
}
