//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] through
//! [`crate::config::FlattenConfigBuilder::progress_callback`] or
//! [`crate::config::ExtractConfigBuilder::progress_callback`] to receive
//! events as each PDF or résumé image is processed. The binaries use this to
//! drive an indicatif progress bar; library callers can forward events
//! anywhere else.
//!
//! # Example
//!
//! ```rust
//! use resume_vlm::{BatchProgressCallback, ExtractConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     failed: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_item_error(&self, index: usize, total: usize, name: &str, error: &str) {
//!         self.failed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{index}/{total} {name}: {error}");
//!     }
//! }
//!
//! let config = ExtractConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { failed: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the batch drivers as they process each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `index` is 1-based. The flattener calls these from a
/// blocking worker thread, hence `Send + Sync`.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after the input directory has been listed.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before a file is processed.
    fn on_item_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when a file has been processed successfully.
    ///
    /// `detail` is the output location (JPEG path or CSV path).
    fn on_item_complete(&self, index: usize, total: usize, name: &str, detail: &str) {
        let _ = (index, total, name, detail);
    }

    /// Called when a file failed.
    fn on_item_error(&self, index: usize, total: usize, name: &str, error: &str) {
        let _ = (index, total, name, error);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in the config structs.
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: Mutex<Vec<String>>,
        success_total: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_item_start(&self, _index: usize, _total: usize, _name: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_item_complete(&self, _index: usize, _total: usize, _name: &str, _detail: &str) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_item_error(&self, _index: usize, _total: usize, name: &str, _error: &str) {
            self.errors.lock().unwrap().push(name.to_string());
        }

        fn on_batch_complete(&self, _total: usize, success_count: usize) {
            self.success_total.store(success_count, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_item_start(1, 2, "a.pdf");
        cb.on_item_complete(1, 2, "a.pdf", "out/a.jpg");
        cb.on_item_error(2, 2, "b.pdf", "No pages found");
        cb.on_batch_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_item_start(1, 2, "a.png");
        tracker.on_item_complete(1, 2, "a.png", "resumes.csv");
        tracker.on_item_start(2, 2, "b.png");
        tracker.on_item_error(2, 2, "b.png", "Failed to parse JSON response");
        tracker.on_batch_complete(2, 1);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(*tracker.errors.lock().unwrap(), vec!["b.png".to_string()]);
        assert_eq!(tracker.success_total.load(Ordering::SeqCst), 1);
    }
}
