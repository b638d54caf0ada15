//! Error types for the rotation engine
//!
//! Every error here is raised at construction time. Once a model and a
//! sequencer exist, `start`, `tick` and `stop` are total.

use thiserror::Error;

/// Errors raised while building a pool model, timing or sequencer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpinnerError {
    /// The pool holds fewer distinct glyphs than the strip shows at once
    #[error(
        "symbol pool must contain at least {visible_count} distinct glyphs, found {pool_size}"
    )]
    Configuration {
        /// Number of distinct glyphs in the pool
        pool_size: usize,
        /// Requested number of simultaneously visible glyphs
        visible_count: usize,
    },

    /// A strip must show at least one glyph
    #[error("visible count must be positive")]
    EmptyVisibleCount,

    /// A timing value is out of range (zero cadence and the like)
    #[error("invalid timing: {0}")]
    InvalidTiming(String),

    /// The sequencer was built outside a Tokio runtime and no handle was given
    #[error("no Tokio runtime available to drive the rotation timer")]
    NoRuntime,
}

/// Convenience alias for results produced by this crate
pub type Result<T> = std::result::Result<T, SpinnerError>;
