//! Spinner Control Trait
//!
//! The interface a host talks to. [`RotationSequencer`] implements it
//! directly; a host-specific visual variant that wraps a sequencer (adding
//! its own entry/exit animation, say) implements it too, and the
//! [`DecorationRegistry`](crate::DecorationRegistry) treats both the same.

use tokio::sync::broadcast;

use crate::events::RotationEvent;
use crate::sequencer::{Completion, RotationSequencer};

/// Start/stop/subscribe interface for one spinner
pub trait SpinnerControl: Send + Sync {
    /// Begin rotating; `on_started` fires once the strip has settled
    fn begin(&self, on_started: Completion);

    /// Stop rotating; `on_stopped` fires once the exit transition is over
    fn end(&self, on_stopped: Completion);

    /// Receive every rotation from now on
    fn subscribe(&self) -> broadcast::Receiver<RotationEvent>;

    /// Whether the spinner is currently rotating
    fn is_running(&self) -> bool;

    /// Number of glyphs the spinner shows at once
    fn visible_count(&self) -> usize;
}

impl SpinnerControl for RotationSequencer {
    fn begin(&self, on_started: Completion) {
        self.start(on_started);
    }

    fn end(&self, on_stopped: Completion) {
        self.stop(on_stopped);
    }

    fn subscribe(&self) -> broadcast::Receiver<RotationEvent> {
        RotationSequencer::subscribe(self)
    }

    fn is_running(&self) -> bool {
        RotationSequencer::is_running(self)
    }

    fn visible_count(&self) -> usize {
        RotationSequencer::visible_count(self)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::SymbolPoolModel;
    use crate::source::RngGlyphSource;
    use crate::timing::RotationTiming;

    #[tokio::test(start_paused = true)]
    async fn test_sequencer_through_trait_object() {
        let model = SymbolPoolModel::with_source(2, ["A", "B", "C"], RngGlyphSource::seeded(5))
            .unwrap();
        let control: Arc<dyn SpinnerControl> =
            Arc::new(RotationSequencer::new(model, RotationTiming::default()).unwrap());

        let mut events = control.subscribe();
        control.begin(Box::new(|| {}));
        assert!(control.is_running());
        assert_eq!(control.visible_count(), 2);

        let event = events.recv().await.unwrap();
        assert_eq!(event.inserted_index, 1);

        control.end(Box::new(|| {}));
        assert!(!control.is_running());
    }
}
