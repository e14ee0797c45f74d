//! Observer trait for session phase and per-image events.
//!
//! Inject an [`Arc<dyn SessionObserver>`] via
//! [`crate::config::SessionConfigBuilder::observer`] to receive events as a
//! [`crate::session::Session`] moves through its phases.
//!
//! The callback approach keeps the library ignorant of how the host shows
//! progress: the CLI drives an indicatif spinner, a server could forward the
//! same events to a WebSocket. The trait is `Send + Sync` so one observer can
//! be shared with whatever renders it.
//!
//! # Example
//!
//! ```rust
//! use sermon_card::{PhaseKind, SessionConfig, SessionObserver};
//! use std::sync::Arc;
//!
//! struct PrintPhases;
//!
//! impl SessionObserver for PrintPhases {
//!     fn on_phase_change(&self, from: PhaseKind, to: PhaseKind) {
//!         eprintln!("{from} -> {to}");
//!     }
//! }
//!
//! let config = SessionConfig::builder()
//!     .observer(Arc::new(PrintPhases))
//!     .build()
//!     .unwrap();
//! ```

use crate::session::PhaseKind;
use std::sync::Arc;

/// Called by the session as it moves through a request cycle.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive strictly in order: image `i` always
/// completes before image `i + 1` starts.
pub trait SessionObserver: Send + Sync {
    /// Called after every phase transition.
    fn on_phase_change(&self, from: PhaseKind, to: PhaseKind) {
        let _ = (from, to);
    }

    /// Called once the PDF has been read.
    ///
    /// # Arguments
    /// * `page_count`: pages in the document
    /// * `chars`: characters of extracted text, after trimming
    fn on_text_extracted(&self, page_count: usize, chars: usize) {
        let _ = (page_count, chars);
    }

    /// Called just before image `index` (0-based) is requested.
    fn on_image_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when image `index` is settled.
    ///
    /// `fallback` is true when the static fallback image was substituted.
    fn on_image_complete(&self, index: usize, total: usize, fallback: bool) {
        let _ = (index, total, fallback);
    }
}

/// A no-op implementation for callers that don't need events.
///
/// This is the default when no observer is configured.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Convenience alias matching the type stored in [`crate::config::SessionConfig`].
pub type Observer = Arc<dyn SessionObserver>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingObserver {
        phases: Mutex<Vec<(PhaseKind, PhaseKind)>>,
        fallbacks: AtomicUsize,
    }

    impl SessionObserver for TrackingObserver {
        fn on_phase_change(&self, from: PhaseKind, to: PhaseKind) {
            self.phases.lock().unwrap().push((from, to));
        }

        fn on_image_complete(&self, _index: usize, _total: usize, fallback: bool) {
            if fallback {
                self.fallbacks.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn noop_observer_does_not_panic() {
        let o = NoopObserver;
        o.on_phase_change(PhaseKind::Idle, PhaseKind::Analyzing);
        o.on_text_extracted(3, 1200);
        o.on_image_start(0, 3);
        o.on_image_complete(0, 3, true);
    }

    #[test]
    fn tracking_observer_receives_events() {
        let t = TrackingObserver::default();
        t.on_phase_change(PhaseKind::Idle, PhaseKind::Analyzing);
        t.on_image_complete(0, 3, false);
        t.on_image_complete(1, 3, true);

        assert_eq!(
            *t.phases.lock().unwrap(),
            vec![(PhaseKind::Idle, PhaseKind::Analyzing)]
        );
        assert_eq!(t.fallbacks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_observer_works() {
        let o: Observer = Arc::new(NoopObserver);
        o.on_image_start(2, 3);
    }
}
