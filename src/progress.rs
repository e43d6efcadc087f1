//! The user-facing progress handle.
//!
//! [`Progress`] owns one [`Tracker`] and times units of work for it. Each call to
//! [`Progress::run`] measures how long the callback takes and records that as one sample:
//!
//! ```
//! use eta_progress::Progress;
//!
//! let items = vec!["a", "b", "c"];
//! let mut progress = Progress::new(Some(items.len() as u64)).unwrap();
//!
//! for item in &items {
//!     progress.run(|state| println!("[{state}] processing {item}"));
//! }
//! assert_eq!(progress.current(), 3);
//! ```
//!
//! The handle is single-owner state. It performs no locking, so reporting from several
//! threads requires wrapping it in a mutex.

use std::{fmt, time::Duration};

use compact_str::CompactString;
use web_time::Instant;

use crate::{
    builder::ProgressBuilder,
    error::Result,
    sequence::{Sequence, Tracker},
};

/// Times units of work and forwards their durations to a [`Tracker`].
#[derive(Clone, Debug)]
pub struct Progress {
    tracker: Tracker,
}

impl Progress {
    /// Creates a progress handle with default sample settings.
    ///
    /// A `Some` total selects the limited tracker, `None` the unlimited one.
    ///
    /// # Errors
    ///
    /// Never fails with the default settings; the signature matches [`ProgressBuilder::build`].
    pub fn new(total_count: Option<u64>) -> Result<Self> {
        ProgressBuilder::from_total(total_count).build()
    }

    /// Wraps an existing tracker.
    #[must_use]
    pub const fn from_tracker(tracker: Tracker) -> Self {
        Self { tracker }
    }

    /// Runs `work`, handing it the tracker for display, and records its duration.
    ///
    /// If `work` panics, the panic unwinds past the recording step and no sample is taken.
    pub fn run<T>(&mut self, work: impl FnOnce(&Tracker) -> T) -> T {
        let start = Instant::now();
        let value = work(&self.tracker);
        self.record(start.elapsed());
        value
    }

    /// Like [`run`](Self::run), for fallible work.
    ///
    /// A successful result records the duration. An error is returned unchanged and the
    /// measurement is discarded, so failed units of work do not skew the estimate.
    ///
    /// # Errors
    ///
    /// Returns whatever error `work` returns.
    pub fn try_run<T, E>(&mut self, work: impl FnOnce(&Tracker) -> Result<T, E>) -> Result<T, E> {
        let start = Instant::now();
        match work(&self.tracker) {
            Ok(value) => {
                self.record(start.elapsed());
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(
                    current = self.tracker.current(),
                    "work failed, discarding sample"
                );
                Err(err)
            }
        }
    }

    fn record(&mut self, elapsed: Duration) {
        self.tracker.push(elapsed.as_secs_f64());
    }

    /// Removes `n` iterations from the expected total. No-op for the unlimited variant.
    pub fn skip(&mut self, n: u64) {
        self.tracker.skip(n);
    }

    /// The underlying tracker.
    #[must_use]
    pub const fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Number of completed, recorded units of work.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.tracker.current()
    }

    /// Smoothed time per iteration in seconds.
    #[must_use]
    pub fn per_iteration(&self) -> Option<f64> {
        self.tracker.per_iteration()
    }

    /// Estimated seconds until completion. Always `None` without a total.
    #[must_use]
    pub fn eta(&self) -> Option<f64> {
        self.tracker.eta()
    }

    /// Formatted time since the tracker started.
    #[must_use]
    pub fn elapsed_time(&self) -> CompactString {
        self.tracker.elapsed_time()
    }

    /// Textual state of the tracker; identical to the [`Display`](fmt::Display) output.
    #[must_use]
    pub fn describe(&self) -> String {
        self.tracker.describe()
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tracker, f)
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::Progress;
    use crate::{ProgressBuilder, Sequence};

    /// Basic Lifecycle
    /// Every run records one sample and returns the callback's value.
    #[test]
    fn test_run_records_samples() {
        let mut progress = Progress::new(Some(10)).unwrap();
        assert_eq!(progress.describe(), "00/10, 000%, t/i: ?s, ETA: ?s");

        let doubled = progress.run(|_| 21 * 2);
        assert_eq!(doubled, 42);
        assert_eq!(progress.current(), 1);
        assert!(progress.per_iteration().is_some());
        assert!(progress.eta().is_some());

        progress.run(|_| ());
        assert!(progress.describe().starts_with("02/10, 020%, t/i: "));
    }

    /// Handle Passing
    /// The callback sees the state before its own sample is recorded.
    #[test]
    fn test_run_passes_tracker() {
        let mut progress = Progress::new(Some(100)).unwrap();
        progress.run(|_| ());

        let seen = progress.run(|tracker| (tracker.current(), tracker.to_string()));
        assert_eq!(seen.0, 1);
        assert!(seen.1.starts_with("001/100, 001%"));
        assert_eq!(progress.current(), 2);
    }

    /// Failed Work
    /// Errors propagate and leave the tracker untouched.
    #[test]
    fn test_try_run_discards_failures() {
        let mut progress = Progress::new(None).unwrap();

        let ok: Result<u8, &str> = progress.try_run(|_| Ok(7));
        assert_eq!(ok, Ok(7));
        assert_eq!(progress.current(), 1);

        let failed: Result<u8, &str> = progress.try_run(|_| Err("boom"));
        assert_eq!(failed, Err("boom"));
        assert_eq!(progress.current(), 1);
    }

    /// Panicking Work
    #[test]
    fn test_run_panic_records_nothing() {
        let mut progress = Progress::new(Some(5)).unwrap();

        let result = catch_unwind(AssertUnwindSafe(|| {
            let _: u8 = progress.run(|_| panic!("work failed"));
        }));
        assert!(result.is_err());
        assert_eq!(progress.current(), 0);
    }

    /// Skip Passthrough
    #[test]
    fn test_skip() {
        let mut progress = Progress::new(Some(10)).unwrap();
        progress.skip(4);
        assert_eq!(progress.tracker().total_count(), Some(6));
        assert_eq!(progress.current(), 0);

        let mut open = Progress::new(None).unwrap();
        open.skip(4);
        assert_eq!(open.tracker().total_count(), None);
    }

    /// Open-Ended Display
    #[test]
    fn test_unlimited_display() {
        let mut progress = ProgressBuilder::new_unlimited()
            .with_min_samples(2)
            .with_max_samples(10)
            .build()
            .unwrap();

        progress.run(|_| ());
        let description = progress.to_string();
        assert!(description.starts_with("2, t: "), "got {description}");
        assert!(description.ends_with("t/i: ?s"), "got {description}");
        assert!(progress.eta().is_none());
    }
}
