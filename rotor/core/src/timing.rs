//! Rotation Timing
//!
//! Timing knobs for one spinner strip. The steady-state cadence is derived
//! from the animation, pause and buffer phases so that the host can drive its
//! transition animation from [`RotationTiming::animation_duration`] while the
//! sequencer ticks at [`RotationTiming::cadence`].
//!
//! ```text
//! start()                                                     stop()
//!   │ first_tick_delay                                          │ exit_delay
//!   ├──────┤tick├───── cadence ─────┤tick├───── cadence ─────┤  ├──────┤on_stopped
//!   │      │ animation │ pause │buf │                            │
//!   ├──── settle_delay ────┤on_started
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpinnerError};

/// Length of the slide animation for one rotation
pub const DEFAULT_ANIMATION_MS: u64 = 850;

/// Rest between the end of one slide and the next tick
pub const DEFAULT_PAUSE_MS: u64 = 450;

/// Extra slack so consecutive slides never overlap
pub const DEFAULT_BUFFER_MS: u64 = 100;

/// Delay before the first tick after `start()`
pub const DEFAULT_FIRST_TICK_DELAY_MS: u64 = 100;

/// Entry animation length, after which `on_started` fires
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 500;

/// Exit animation length, after which `on_stopped` fires
pub const DEFAULT_EXIT_DELAY_MS: u64 = 400;

/// Timing configuration for a [`RotationSequencer`](crate::RotationSequencer)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationTiming {
    /// Duration of the host's per-tick transition animation
    pub animation: Duration,
    /// Pause after the transition before the next tick
    pub pause: Duration,
    /// Small buffer added on top of animation and pause
    pub buffer: Duration,
    /// Delay between `start()` and the first tick
    pub first_tick_delay: Duration,
    /// Delay between `start()` and the started completion
    pub settle_delay: Duration,
    /// Delay between `stop()` and the stopped completion
    pub exit_delay: Duration,
}

impl Default for RotationTiming {
    fn default() -> Self {
        Self {
            animation: Duration::from_millis(DEFAULT_ANIMATION_MS),
            pause: Duration::from_millis(DEFAULT_PAUSE_MS),
            buffer: Duration::from_millis(DEFAULT_BUFFER_MS),
            first_tick_delay: Duration::from_millis(DEFAULT_FIRST_TICK_DELAY_MS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            exit_delay: Duration::from_millis(DEFAULT_EXIT_DELAY_MS),
        }
    }
}

impl RotationTiming {
    /// Create timing with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Timing with a fixed cadence and no animation split
    ///
    /// The whole cadence is attributed to the animation phase.
    #[must_use]
    pub fn with_cadence(cadence: Duration) -> Self {
        Self {
            animation: cadence,
            pause: Duration::ZERO,
            buffer: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Short timings for tests
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            animation: Duration::from_millis(30),
            pause: Duration::from_millis(15),
            buffer: Duration::from_millis(5),
            first_tick_delay: Duration::from_millis(10),
            settle_delay: Duration::from_millis(20),
            exit_delay: Duration::from_millis(20),
        }
    }

    /// Set the animation phase
    #[must_use]
    pub fn with_animation(mut self, animation: Duration) -> Self {
        self.animation = animation;
        self
    }

    /// Set the pause phase
    #[must_use]
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Set the buffer phase
    #[must_use]
    pub fn with_buffer(mut self, buffer: Duration) -> Self {
        self.buffer = buffer;
        self
    }

    /// Set the first tick delay
    #[must_use]
    pub fn with_first_tick_delay(mut self, delay: Duration) -> Self {
        self.first_tick_delay = delay;
        self
    }

    /// Set the settle delay
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the exit delay
    #[must_use]
    pub fn with_exit_delay(mut self, delay: Duration) -> Self {
        self.exit_delay = delay;
        self
    }

    /// Duration of the host's transition animation for one tick
    #[must_use]
    pub fn animation_duration(&self) -> Duration {
        self.animation
    }

    /// Total cycle duration between ticks
    #[must_use]
    pub fn cadence(&self) -> Duration {
        self.animation + self.pause + self.buffer
    }

    /// Check that the cadence is positive
    ///
    /// # Errors
    ///
    /// Returns [`SpinnerError::InvalidTiming`] if animation, pause and buffer
    /// sum to zero. A zero period would make the tick loop spin.
    pub fn validate(&self) -> Result<()> {
        if self.cadence().is_zero() {
            return Err(SpinnerError::InvalidTiming(
                "cadence (animation + pause + buffer) must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
