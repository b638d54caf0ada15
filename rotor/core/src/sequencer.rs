//! Rotation Sequencer
//!
//! Owns the visible strip of one spinner and advances it on a fixed cadence
//! while running. Each tick evicts the oldest glyph, appends one drawn from
//! the [`SymbolPoolModel`], and broadcasts a [`RotationEvent`] for the host
//! to animate.
//!
//! # Execution context
//!
//! A sequencer captures a Tokio runtime handle when it is built. The tick
//! loop and the settle/exit completions run on that runtime, so `start` and
//! `stop` may be called from any thread. All state lives behind one mutex and
//! a tick checks, mutates and emits while holding it: once `stop` returns, no
//! further event is emitted.
//!
//! Each run carries an epoch. A timer task or settle callback belonging to an
//! earlier run sees a different epoch and does nothing.
//!
//! # Example
//!
//! ```ignore
//! let model = SymbolPoolModel::new(4, DEFAULT_POOL.iter().copied())?;
//! let sequencer = RotationSequencer::new(model, RotationTiming::default())?;
//! let mut events = sequencer.subscribe();
//!
//! sequencer.start(|| tracing::info!("spinner settled"));
//! while let Ok(event) = events.recv().await {
//!     // remove item 0, insert event.inserted_value at event.inserted_index
//! }
//! ```

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::error::{Result, SpinnerError};
use crate::events::{RotationEvent, SequencerState};
use crate::model::SymbolPoolModel;
use crate::timing::RotationTiming;

/// Capacity of the rotation event channel
///
/// A subscriber that falls further behind receives `RecvError::Lagged`.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Boxed completion callback
pub type Completion = Box<dyn FnOnce() + Send + 'static>;

/// Result of one attempted tick
enum TickOutcome {
    Rotated(RotationEvent),
    Idle,
    Superseded,
}

struct Inner {
    state: SequencerState,
    visible: Vec<String>,
    model: SymbolPoolModel,
    /// Glyphs to show on the next start instead of a fresh draw
    seed: Option<Vec<String>>,
    epoch: u64,
    tick_count: u64,
    tick_task: Option<JoinHandle<()>>,
    pending_started: Option<Completion>,
}

struct Shared {
    inner: Mutex<Inner>,
    events: broadcast::Sender<RotationEvent>,
    timing: RotationTiming,
    visible_count: usize,
    handle: Handle,
}

impl Shared {
    fn advance(&self, epoch: Option<u64>) -> TickOutcome {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if epoch.is_some_and(|e| e != inner.epoch) {
            return TickOutcome::Superseded;
        }
        if inner.state != SequencerState::Running || inner.visible.is_empty() {
            return TickOutcome::Idle;
        }

        let newest = inner.visible.last().cloned();
        let next = inner.model.generate_next(newest.as_deref());
        let evicted = inner.visible.remove(0);
        inner.visible.push(next.clone());
        inner.tick_count += 1;

        let event = RotationEvent::rotation(self.visible_count, evicted, next, inner.tick_count);
        trace!(
            tick = event.tick,
            evicted = %event.evicted_value,
            inserted = %event.inserted_value,
            "Rotated"
        );
        // No subscribers is fine; the host may only poll `visible()`.
        let _ = self.events.send(event.clone());

        TickOutcome::Rotated(event)
    }

    fn fire_started(&self, epoch: u64) {
        let pending = {
            let mut inner = self.inner.lock();
            if inner.epoch == epoch {
                inner.pending_started.take()
            } else {
                None
            }
        };
        if let Some(on_started) = pending {
            debug!(epoch, "Spinner settled");
            on_started();
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(task) = self.inner.get_mut().tick_task.take() {
            task.abort();
        }
    }
}

async fn run_tick_loop(shared: Weak<Shared>, epoch: u64, first_tick: Instant, cadence: Duration) {
    let mut interval = tokio::time::interval_at(first_tick, cadence);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let Some(shared) = shared.upgrade() else {
            break;
        };
        match shared.advance(Some(epoch)) {
            TickOutcome::Rotated(_) => {}
            TickOutcome::Idle | TickOutcome::Superseded => {
                debug!(epoch, "Tick loop finished");
                break;
            }
        }
    }
}

/// Drives the visible strip of one spinner
///
/// Cloning yields another handle to the same sequencer.
#[derive(Clone)]
pub struct RotationSequencer {
    shared: Arc<Shared>,
}

impl RotationSequencer {
    /// Create a sequencer on the current Tokio runtime
    ///
    /// # Errors
    ///
    /// Returns [`SpinnerError::InvalidTiming`] for a zero cadence and
    /// [`SpinnerError::NoRuntime`] when called outside a runtime.
    pub fn new(model: SymbolPoolModel, timing: RotationTiming) -> Result<Self> {
        let handle = Handle::try_current().map_err(|_| SpinnerError::NoRuntime)?;
        Self::with_handle(model, timing, handle)
    }

    /// Create a sequencer whose timers run on `handle`
    ///
    /// # Errors
    ///
    /// Returns [`SpinnerError::InvalidTiming`] for a zero cadence.
    pub fn with_handle(model: SymbolPoolModel, timing: RotationTiming, handle: Handle) -> Result<Self> {
        timing.validate()?;

        let visible_count = model.visible_count();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: SequencerState::Idle,
                    visible: Vec::with_capacity(visible_count),
                    model,
                    seed: None,
                    epoch: 0,
                    tick_count: 0,
                    tick_task: None,
                    pending_started: None,
                }),
                events,
                timing,
                visible_count,
                handle,
            }),
        })
    }

    /// Start rotating
    ///
    /// Already running: `on_started` runs immediately and nothing else
    /// changes. Otherwise the strip is seeded, the tick loop begins (first
    /// tick after `first_tick_delay`) and `on_started` runs once the settle
    /// delay has passed.
    pub fn start<F>(&self, on_started: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut inner = self.shared.inner.lock();

        if inner.state == SequencerState::Running {
            drop(inner);
            debug!("Start ignored, already running");
            on_started();
            return;
        }

        let visible_count = self.shared.visible_count;
        let seed = inner.seed.take().filter(|s| s.len() == visible_count);
        let visible = match seed {
            Some(seed) => seed,
            None => inner.model.generate_initial_set(),
        };
        inner.visible = visible;
        inner.state = SequencerState::Running;
        inner.epoch += 1;
        inner.tick_count = 0;

        let epoch = inner.epoch;
        let timing = self.shared.timing;
        let first_tick = Instant::now() + timing.first_tick_delay;
        inner.tick_task = Some(self.shared.handle.spawn(run_tick_loop(
            Arc::downgrade(&self.shared),
            epoch,
            first_tick,
            timing.cadence(),
        )));
        inner.pending_started = Some(Box::new(on_started));

        info!(
            epoch,
            visible = ?inner.visible,
            cadence_ms = u64::try_from(timing.cadence().as_millis()).unwrap_or(u64::MAX),
            "Spinner started"
        );
        drop(inner);

        let shared = Arc::clone(&self.shared);
        self.shared.handle.spawn(async move {
            tokio::time::sleep(timing.settle_delay).await;
            shared.fire_started(epoch);
        });
    }

    /// Stop rotating
    ///
    /// Already idle: `on_stopped` runs immediately. Otherwise the tick loop
    /// is cancelled, the strip is cleared and `on_stopped` runs after the exit
    /// delay. A started completion still waiting for its settle delay fires
    /// first, so hosts always see started before stopped.
    pub fn stop<F>(&self, on_stopped: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut inner = self.shared.inner.lock();

        if inner.state == SequencerState::Idle {
            drop(inner);
            debug!("Stop ignored, already idle");
            on_stopped();
            return;
        }

        if let Some(task) = inner.tick_task.take() {
            task.abort();
        }
        inner.state = SequencerState::Idle;
        inner.visible.clear();
        inner.epoch += 1;
        let ticks = inner.tick_count;
        let pending_started = inner.pending_started.take();
        drop(inner);

        if let Some(on_started) = pending_started {
            debug!("Stopped before settling, completing start first");
            on_started();
        }

        info!(ticks, "Spinner stopped");

        let exit_delay = self.shared.timing.exit_delay;
        self.shared.handle.spawn(async move {
            tokio::time::sleep(exit_delay).await;
            on_stopped();
        });
    }

    /// Start and wait until the started completion fires
    pub async fn start_and_wait(&self) {
        let (tx, rx) = oneshot::channel();
        self.start(move || {
            let _ = tx.send(());
        });
        let _ = rx.await;
    }

    /// Stop and wait until the stopped completion fires
    pub async fn stop_and_wait(&self) {
        let (tx, rx) = oneshot::channel();
        self.stop(move || {
            let _ = tx.send(());
        });
        let _ = rx.await;
    }

    /// Advance one rotation step immediately
    ///
    /// Returns `None` when idle. The timer calls the same path, so a manual
    /// tick is indistinguishable from a scheduled one.
    pub fn tick(&self) -> Option<RotationEvent> {
        match self.shared.advance(None) {
            TickOutcome::Rotated(event) => Some(event),
            TickOutcome::Idle | TickOutcome::Superseded => None,
        }
    }

    /// Glyphs to show on the next start instead of a fresh draw
    ///
    /// Accepted only while idle and when `glyphs` has exactly
    /// `visible_count` entries. Returns whether the seed was stored.
    pub fn seed_visible(&self, glyphs: Vec<String>) -> bool {
        let mut inner = self.shared.inner.lock();
        if inner.state != SequencerState::Idle || glyphs.len() != self.shared.visible_count {
            return false;
        }
        inner.seed = Some(glyphs);
        true
    }

    /// Subscribe to rotation events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RotationEvent> {
        self.shared.events.subscribe()
    }

    /// Snapshot of the visible strip, oldest first
    #[must_use]
    pub fn visible(&self) -> Vec<String> {
        self.shared.inner.lock().visible.clone()
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> SequencerState {
        self.shared.inner.lock().state
    }

    /// Whether the sequencer is running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == SequencerState::Running
    }

    /// Number of glyphs shown at once
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.shared.visible_count
    }

    /// Timing this sequencer was built with
    #[must_use]
    pub fn timing(&self) -> RotationTiming {
        self.shared.timing
    }
}

impl std::fmt::Debug for RotationSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("RotationSequencer")
            .field("state", &inner.state)
            .field("visible", &inner.visible)
            .field("epoch", &inner.epoch)
            .field("timing", &self.shared.timing)
            .finish_non_exhaustive()
    }
}
