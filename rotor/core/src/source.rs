//! Glyph Sources
//!
//! The randomness seam of the pool model. Production code draws from a
//! [`rand`] generator; tests and replays script the draws so that every
//! rotation is reproducible.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Source of the random choices a [`SymbolPoolModel`](crate::SymbolPoolModel) makes
pub trait GlyphSource: Send {
    /// Pick an index uniformly from `0..len`
    ///
    /// Callers never pass `len == 0`.
    fn pick(&mut self, len: usize) -> usize;

    /// Shuffle the glyphs in place
    fn shuffle(&mut self, glyphs: &mut [String]);
}

/// [`GlyphSource`] backed by any [`rand::Rng`]
#[derive(Debug, Clone)]
pub struct RngGlyphSource<R> {
    rng: R,
}

impl<R: Rng + Send> RngGlyphSource<R> {
    /// Wrap an existing generator
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngGlyphSource<StdRng> {
    /// Generator seeded from OS entropy
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Deterministic generator for reproducible runs
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> GlyphSource for RngGlyphSource<R> {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn shuffle(&mut self, glyphs: &mut [String]) {
        glyphs.shuffle(&mut self.rng);
    }
}

/// Scripted [`GlyphSource`] for deterministic tests and replays
///
/// Picks are replayed in order (wrapped into range); once the script runs
/// out every pick returns `0`. Shuffles reorder glyphs to follow the scripted
/// order, glyphs missing from it keep their relative order at the end.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGlyphSource {
    picks: VecDeque<usize>,
    shuffle_order: Option<Vec<String>>,
}

impl ScriptedGlyphSource {
    /// Source that always picks index 0 and never reorders
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue picks to replay
    #[must_use]
    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }

    /// Order that every shuffle produces
    #[must_use]
    pub fn with_shuffle_order<S: Into<String>>(mut self, order: impl IntoIterator<Item = S>) -> Self {
        self.shuffle_order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    /// Append one more pick to the script
    pub fn push_pick(&mut self, pick: usize) {
        self.picks.push_back(pick);
    }

    /// Number of scripted picks not yet consumed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.picks.len()
    }
}

impl GlyphSource for ScriptedGlyphSource {
    fn pick(&mut self, len: usize) -> usize {
        self.picks.pop_front().map_or(0, |p| p % len.max(1))
    }

    fn shuffle(&mut self, glyphs: &mut [String]) {
        if let Some(order) = &self.shuffle_order {
            // stable sort keeps unlisted glyphs in their current relative order
            glyphs.sort_by_key(|g| order.iter().position(|o| o == g).unwrap_or(usize::MAX));
        }
    }
}
