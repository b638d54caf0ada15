//! Decoration Registry - Spinner Ownership per Host Control
//!
//! A host decorates its controls (buttons, text fields) with spinners. The
//! registry is the one place that knows which control currently owns which
//! spinner; at most one spinner is attached to a control at a time.
//!
//! ```text
//!                  DecorationRegistry
//!           ┌──────────────────────────────────────┐
//!           │ DashMap<ControlId, Arc<dyn Spinner>> │
//!           └──────────────────┬───────────────────┘
//!                              │
//!        ┌─────────────────────┼─────────────────────┐
//!  ┌─────▼──────┐       ┌──────▼──────┐       ┌──────▼──────┐
//!  │ send-button│       │ search-field│       │  ...        │
//!  │ sequencer  │       │ sequencer   │       │             │
//!  └────────────┘       └─────────────┘       └─────────────┘
//! ```
//!
//! # Attachment rules
//!
//! - Starting a spinner on a control that already has one with the same
//!   visible count restarts the existing one instead of replacing it.
//! - Any other existing spinner is ended, then replaced.
//! - Ending a control with no spinner still runs the completion.
//! - A spinner is detached only once its stop has completed, only if it is
//!   still the one attached, and only if nothing restarted it meanwhile.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::control::SpinnerControl;
use crate::error::Result;
use crate::model::SymbolPoolModel;
use crate::sequencer::{Completion, RotationSequencer};
use crate::timing::RotationTiming;

/// Identifier of a host control that can carry a spinner
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlId(String);

impl ControlId {
    /// Create a control ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ControlId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ControlId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Tracks which spinner each host control owns
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct DecorationRegistry {
    spinners: Arc<DashMap<ControlId, Arc<dyn SpinnerControl>>>,
}

impl DecorationRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a spinner on `control`
    ///
    /// Reuses the attached spinner when its visible count matches `model`;
    /// otherwise ends it and attaches a new [`RotationSequencer`].
    ///
    /// # Errors
    ///
    /// Propagates sequencer construction errors. The previously attached
    /// spinner has already been ended when that happens.
    pub fn start_spinner<F>(
        &self,
        control: impl Into<ControlId>,
        model: SymbolPoolModel,
        timing: RotationTiming,
        on_started: F,
    ) -> Result<Arc<dyn SpinnerControl>>
    where
        F: FnOnce() + Send + 'static,
    {
        let control = control.into();

        if let Some(existing) = self.get(&control) {
            if existing.visible_count() == model.visible_count() {
                debug!(control = %control, "Reusing attached spinner");
                existing.begin(Box::new(on_started));
                return Ok(existing);
            }
            self.end_spinner(control.clone(), || {});
        }

        let spinner: Arc<dyn SpinnerControl> = Arc::new(RotationSequencer::new(model, timing)?);
        self.spinners.insert(control.clone(), Arc::clone(&spinner));
        info!(
            control = %control,
            visible_count = spinner.visible_count(),
            "Spinner attached"
        );

        spinner.begin(Box::new(on_started));
        Ok(spinner)
    }

    /// Attach an externally built spinner to `control`, replacing any other
    ///
    /// The replaced spinner is ended. The new one is not started.
    pub fn attach(&self, control: impl Into<ControlId>, spinner: Arc<dyn SpinnerControl>) {
        let control = control.into();
        if let Some(existing) = self.get(&control) {
            if Arc::ptr_eq(&existing, &spinner) {
                return;
            }
            self.end_spinner(control.clone(), || {});
        }
        self.spinners.insert(control, spinner);
    }

    /// End the spinner on `control` and detach it once stopped
    ///
    /// With no spinner attached `on_ended` runs immediately.
    pub fn end_spinner<F>(&self, control: impl Into<ControlId>, on_ended: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let control = control.into();

        let Some(spinner) = self.get(&control) else {
            on_ended();
            return;
        };

        let spinners = Arc::clone(&self.spinners);
        let attached = Arc::clone(&spinner);
        let on_stopped: Completion = Box::new(move || {
            // a restart inside the exit delay keeps the spinner attached
            let removed = spinners
                .remove_if(&control, |_, current| {
                    Arc::ptr_eq(current, &attached) && !current.is_running()
                })
                .is_some();
            if removed {
                info!(control = %control, "Spinner detached");
            }
            on_ended();
        });
        spinner.end(on_stopped);
    }

    /// The spinner attached to `control`, if any
    #[must_use]
    pub fn get(&self, control: &ControlId) -> Option<Arc<dyn SpinnerControl>> {
        self.spinners.get(control).map(|entry| Arc::clone(entry.value()))
    }

    /// Whether `control` has a spinner attached
    #[must_use]
    pub fn contains(&self, control: &ControlId) -> bool {
        self.spinners.contains_key(control)
    }

    /// Number of controls with a spinner attached
    #[must_use]
    pub fn len(&self) -> usize {
        self.spinners.len()
    }

    /// Whether no control has a spinner attached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spinners.is_empty()
    }

    /// IDs of all decorated controls
    #[must_use]
    pub fn controls(&self) -> Vec<ControlId> {
        self.spinners.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl fmt::Debug for DecorationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecorationRegistry")
            .field("controls", &self.controls())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::source::RngGlyphSource;

    const POOL: [&str; 5] = ["A", "B", "C", "D", "E"];

    fn model(visible_count: usize) -> SymbolPoolModel {
        SymbolPoolModel::with_source(visible_count, POOL, RngGlyphSource::seeded(3)).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_attaches_and_runs() {
        let registry = DecorationRegistry::new();
        let spinner = registry
            .start_spinner("send", model(3), RotationTiming::default(), || {})
            .unwrap();

        assert!(spinner.is_running());
        assert!(registry.contains(&ControlId::from("send")));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_visible_count_reuses_spinner() {
        let registry = DecorationRegistry::new();
        let first = registry
            .start_spinner("send", model(3), RotationTiming::default(), || {})
            .unwrap();
        let second = registry
            .start_spinner("send", model(3), RotationTiming::default(), || {})
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_visible_count_replaces_spinner() {
        let registry = DecorationRegistry::new();
        let first = registry
            .start_spinner("send", model(3), RotationTiming::default(), || {})
            .unwrap();
        let second = registry
            .start_spinner("send", model(4), RotationTiming::default(), || {})
            .unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(!first.is_running());
        assert!(second.is_running());

        // the old spinner's delayed detach must not remove the new one
        tokio::time::sleep(Duration::from_secs(1)).await;
        let attached = registry.get(&ControlId::from("send")).unwrap();
        assert!(Arc::ptr_eq(&attached, &second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_without_spinner_completes_immediately() {
        let registry = DecorationRegistry::new();
        let done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&done);
        registry.end_spinner("missing", move || flag.store(true, Ordering::SeqCst));
        assert!(done.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_detaches_after_exit_delay() {
        let registry = DecorationRegistry::new();
        registry
            .start_spinner("field", model(2), RotationTiming::default(), || {})
            .unwrap();

        let (tx, rx) = tokio::sync::oneshot::channel();
        registry.end_spinner("field", move || {
            let _ = tx.send(());
        });
        assert!(registry.contains(&ControlId::from("field")));

        rx.await.unwrap();
        assert!(registry.is_empty());
    }
}
