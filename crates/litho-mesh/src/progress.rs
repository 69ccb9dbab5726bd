//! Progress reporting and cancellation for staged operations.
//!
//! Long operations are split into stages. Between stages the operation calls
//! [`ProgressTracker::checkpoint`], which reports a [`Progress`] snapshot to an
//! optional callback. Cancellation is cooperative: either the callback returns
//! `false`, or another thread calls [`ProgressTracker::cancel`] on a shared
//! tracker. A stage that is already running is allowed to finish.
//!
//! # Example
//!
//! ```
//! use litho_mesh::progress::{ProgressCallback, ProgressTracker};
//!
//! let callback: ProgressCallback = Box::new(|progress| {
//!     println!("{}% {}", progress.percent(), progress.message);
//!     progress.current < 2 // cancel once two stages are done
//! });
//!
//! let tracker = ProgressTracker::new(4);
//! assert!(tracker.checkpoint(Some(&callback), "mapping"));
//! tracker.increment();
//! assert!(tracker.checkpoint(Some(&callback), "building"));
//! tracker.increment();
//! assert!(!tracker.checkpoint(Some(&callback), "validating"));
//! assert!(tracker.is_cancelled());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Progress information passed to callbacks.
#[derive(Debug, Clone)]
pub struct Progress {
    /// Completed steps.
    pub current: u64,

    /// Total number of steps.
    pub total: u64,

    /// Name of the stage about to run.
    pub message: String,

    /// Elapsed time since the operation started.
    pub elapsed: Duration,
}

impl Progress {
    /// Create a new progress report.
    pub fn new(current: u64, total: u64, message: impl Into<String>) -> Self {
        Self {
            current,
            total,
            message: message.into(),
            elapsed: Duration::ZERO,
        }
    }

    /// Get progress as a fraction (0.0 to 1.0).
    #[inline]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.current as f64) / (self.total as f64)
        }
    }

    /// Get progress as a percentage (0 to 100).
    #[inline]
    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).round() as u32
    }

    /// Check if the operation is complete.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.current >= self.total
    }
}

/// Callback function for progress reporting.
///
/// Returns `true` to continue, `false` to request cancellation.
pub type ProgressCallback = Box<dyn Fn(&Progress) -> bool + Send + Sync>;

/// A thread-safe progress tracker with a cancellation flag.
#[derive(Debug)]
pub struct ProgressTracker {
    current: AtomicU64,
    total: u64,
    cancelled: AtomicBool,
    start_time: Instant,
}

impl ProgressTracker {
    /// Create a new progress tracker.
    pub fn new(total: u64) -> Self {
        Self {
            current: AtomicU64::new(0),
            total,
            cancelled: AtomicBool::new(false),
            start_time: Instant::now(),
        }
    }

    /// Increment progress by one.
    #[inline]
    pub fn increment(&self) {
        self.current.fetch_add(1, Ordering::Relaxed);
    }

    /// Set the current progress value.
    #[inline]
    pub fn set(&self, value: u64) {
        self.current.store(value, Ordering::Relaxed);
    }

    /// Get the current progress value.
    #[inline]
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Relaxed)
    }

    /// Get the total count.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Check if cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation. Takes effect at the next checkpoint.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Get elapsed time.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Create a Progress snapshot.
    pub fn snapshot(&self, message: impl Into<String>) -> Progress {
        Progress {
            current: self.current(),
            total: self.total,
            message: message.into(),
            elapsed: self.elapsed(),
        }
    }

    /// Report progress at a stage boundary.
    ///
    /// Returns `false` if cancellation was requested, either earlier through
    /// [`cancel`](Self::cancel) or now by the callback.
    pub fn checkpoint(&self, callback: Option<&ProgressCallback>, stage: &str) -> bool {
        if self.is_cancelled() {
            return false;
        }

        let Some(callback) = callback else {
            return true;
        };

        let should_continue = callback(&self.snapshot(stage));
        if !should_continue {
            self.cancel();
        }
        should_continue
    }
}

/// Arc-wrapped progress tracker for sharing across threads.
pub type SharedProgressTracker = Arc<ProgressTracker>;

/// Create a shared progress tracker.
pub fn shared_tracker(total: u64) -> SharedProgressTracker {
    Arc::new(ProgressTracker::new(total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn test_progress_fraction() {
        let p = Progress::new(50, 100, "test");
        assert!((p.fraction() - 0.5).abs() < 1e-10);
        assert_eq!(p.percent(), 50);
        assert!(!p.is_complete());
        assert!(Progress::new(4, 4, "done").is_complete());
    }

    #[test]
    fn test_progress_zero_total() {
        let p = Progress::new(0, 0, "empty");
        assert!((p.fraction() - 0.0).abs() < 1e-10);
        assert_eq!(p.percent(), 0);
    }

    #[test]
    fn test_progress_tracker() {
        let tracker = ProgressTracker::new(4);
        assert_eq!(tracker.current(), 0);
        assert_eq!(tracker.total(), 4);

        tracker.increment();
        tracker.increment();
        assert_eq!(tracker.current(), 2);

        tracker.set(4);
        assert!(tracker.snapshot("done").is_complete());
    }

    #[test]
    fn test_checkpoint_without_callback() {
        let tracker = ProgressTracker::new(4);
        assert!(tracker.checkpoint(None, "mapping"));
        tracker.cancel();
        assert!(!tracker.checkpoint(None, "building"));
    }

    #[test]
    fn test_checkpoint_callback_sees_stage_names() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let callback: ProgressCallback = Box::new(move |p| {
            seen_clone.lock().unwrap().push(p.message.clone());
            true
        });

        let tracker = ProgressTracker::new(2);
        assert!(tracker.checkpoint(Some(&callback), "a"));
        tracker.increment();
        assert!(tracker.checkpoint(Some(&callback), "b"));

        assert_eq!(*seen.lock().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_callback_cancels_tracker() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let callback: ProgressCallback = Box::new(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            false
        });

        let tracker = ProgressTracker::new(4);
        assert!(!tracker.checkpoint(Some(&callback), "mapping"));
        assert!(tracker.is_cancelled());

        // Once cancelled the callback is not consulted again.
        assert!(!tracker.checkpoint(Some(&callback), "building"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_shared_tracker_cancel_from_other_thread() {
        let tracker = shared_tracker(4);
        let remote = tracker.clone();

        std::thread::spawn(move || remote.cancel())
            .join()
            .unwrap();

        assert!(tracker.is_cancelled());
        assert!(!tracker.checkpoint(None, "validating"));
    }
}
