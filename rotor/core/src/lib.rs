//! Rotor Core - Surface-Agnostic Glyph Rotation for Spinner Strips
//!
//! A spinner strip shows a fixed number of icon glyphs while a user action
//! is pending. On a fixed cadence the oldest glyph leaves and a freshly drawn
//! one arrives at the end. This crate decides *which* glyphs are visible and
//! *how* the strip evolves; drawing them is the host's job.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Host Surface                         │
//! │   (list control, blur, tint, entry/exit animation, layout)   │
//! │                                                              │
//! │   DecorationRegistry ── at most one spinner per control      │
//! └──────────────┬──────────────────────────────▲────────────────┘
//!                │ start / stop                 │ RotationEvent
//!                │                              │ completions
//! ┌──────────────▼──────────────────────────────┴────────────────┐
//! │                      RotationSequencer                       │
//! │   Idle ⇄ Running, visible strip, tick loop on Tokio          │
//! │                              │                               │
//! │                    SymbolPoolModel ── GlyphSource (rand)     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`SymbolPoolModel`]: glyph pool, initial draw, anti-repeat next draw
//! - [`RotationSequencer`]: state machine and tick loop
//! - [`RotationEvent`]: the diff the host animates per tick
//! - [`RotationTiming`]: cadence and lifecycle delays
//! - [`SpinnerControl`]: the interface hosts program against
//! - [`DecorationRegistry`]: spinner ownership per host control
//! - [`RotorConfig`]: file/env/CLI configuration
//!
//! # Quick Start
//!
//! ```ignore
//! use rotor_core::{RotationSequencer, RotationTiming, SymbolPoolModel};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let model = SymbolPoolModel::new(3, ["wifi", "phone", "play", "house"])?;
//!     let sequencer = RotationSequencer::new(model, RotationTiming::default())?;
//!     let mut events = sequencer.subscribe();
//!
//!     sequencer.start_and_wait().await;
//!     let event = events.recv().await?;
//!     println!("slide in {} at {}", event.inserted_value, event.inserted_index);
//!     sequencer.stop_and_wait().await;
//!     Ok(())
//! }
//! ```
//!
//! # No UI Dependencies
//!
//! This crate has no dependency on any UI toolkit. It can back a TUI, a
//! native GUI or a web surface alike.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod model;
pub mod registry;
pub mod sequencer;
pub mod source;
pub mod timing;

// Re-exports for convenience
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, RotorConfig, RotorToml,
};
pub use control::SpinnerControl;
pub use error::{Result, SpinnerError};
pub use events::{RotationEvent, SequencerState};
pub use model::{SymbolPoolModel, DEFAULT_POOL, DEFAULT_VISIBLE_COUNT, FALLBACK_GLYPH};
pub use registry::{ControlId, DecorationRegistry};
pub use sequencer::{Completion, RotationSequencer, EVENT_CHANNEL_CAPACITY};
pub use source::{GlyphSource, RngGlyphSource, ScriptedGlyphSource};
pub use timing::RotationTiming;
