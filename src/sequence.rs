//! Windowed time-per-iteration estimation.
//!
//! A sequence receives one duration sample per finished iteration and keeps two
//! capacity-bounded windows:
//!
//! * the raw **durations**, and
//! * the **running averages**, where each entry is the mean of the duration window at the
//!   moment that sample was pushed.
//!
//! The per-iteration estimate is the mean of the running averages. Averaging the averages
//! smooths the estimate from loop to loop, so a single slow iteration nudges it rather than
//! yanking it. For pushes of `[1, 1, 1, 1, 6]` the running averages are `[1, 1, 1, 1, 2]` and
//! the estimate is `1.2`, where a flat moving average would report `2.0`.
//!
//! Two variants exist:
//!
//! * [`LimitedSequence`] knows how many iterations to expect and reports a percentage and ETA.
//! * [`UnlimitedSequence`] has no total and reports elapsed wall-clock time instead.
//!
//! [`Tracker`] wraps either one behind the common [`Sequence`] interface.
//!
//! # Concurrency
//!
//! Sequences are plain owned state with no interior synchronization. Sharing one across
//! threads requires external locking around [`Sequence::push`] and [`Sequence::skip`].

use std::{fmt, sync::Arc, time::Duration};

use compact_str::CompactString;
use web_time::Instant;

use crate::{
    builder::SampleConfig,
    error::Result,
    format::{format_duration, format_time, round2},
    window::Window,
};

/// Caller-supplied rendering function that replaces the default description of a sequence.
pub type Formatter = Arc<dyn Fn(&dyn Sequence) -> String + Send + Sync>;

/// How a sequence renders itself.
#[derive(Clone, Default)]
pub enum Rendering {
    /// The built-in format of the sequence variant.
    #[default]
    Default,
    /// A custom [`Formatter`].
    Custom(Formatter),
}

impl fmt::Debug for Rendering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl<F> From<F> for Rendering
where
    F: Fn(&dyn Sequence) -> String + Send + Sync + 'static,
{
    fn from(formatter: F) -> Self {
        Self::Custom(Arc::new(formatter))
    }
}

/// Common interface of the tracker variants.
pub trait Sequence {
    /// Number of pushed samples, i.e. completed iterations.
    fn current(&self) -> u64;

    /// Expected number of iterations, if known. May go negative through [`skip`](Self::skip).
    fn total_count(&self) -> Option<i64>;

    /// Samples required before any estimate is produced.
    fn min_samples(&self) -> usize;

    /// Capacity of the sample windows.
    fn max_samples(&self) -> usize;

    /// The instant the sequence was created.
    fn start_time(&self) -> Instant;

    /// Records the duration, in seconds, of one finished iteration.
    fn push(&mut self, duration: f64);

    /// Removes `n` iterations from the expected total.
    fn skip(&mut self, n: u64);

    /// Smoothed time per iteration in seconds, once enough samples exist.
    fn per_iteration(&self) -> Option<f64>;

    /// Estimated seconds until the expected total is reached.
    fn eta(&self) -> Option<f64>;

    /// Full textual description, as produced by the sequence's [`Rendering`].
    fn describe(&self) -> String;

    /// Wall-clock time since [`start_time`](Self::start_time).
    fn elapsed(&self) -> Duration {
        self.start_time().elapsed()
    }

    /// [`elapsed`](Self::elapsed), formatted like every other duration.
    fn elapsed_time(&self) -> CompactString {
        format_duration(self.elapsed())
    }
}

/// Sample state shared by both variants.
#[derive(Clone, Debug)]
struct Sampler {
    min_samples: usize,
    current: u64,
    start: Instant,
    durations: Window,
    averages: Window,
}

impl Sampler {
    fn new(min_samples: usize, capacity: usize, start: Instant) -> Self {
        Self {
            min_samples,
            current: 0,
            start,
            durations: Window::new(capacity),
            averages: Window::new(capacity),
        }
    }

    fn capacity(&self) -> usize {
        self.durations.capacity()
    }

    fn push(&mut self, duration: f64) {
        self.current += 1;
        self.durations.push(duration);
        if let Some(mean) = self.durations.mean() {
            self.averages.push(mean);
        }

        tracing::trace!(
            current = self.current,
            duration,
            samples = self.durations.len(),
            "recorded iteration sample"
        );
    }

    fn per_iteration(&self) -> Option<f64> {
        if self.durations.len() < self.min_samples {
            return None;
        }
        self.averages.mean()
    }
}

/// A sequence with a known number of expected iterations.
///
/// Renders as `005/100, 005%, t/i: 1.00s, ETA: 01m:35.00s`, or, once more iterations than
/// expected have completed, as `11 (expected 10), t/i: 1.00s, ETA: ???`.
#[derive(Clone, Debug)]
pub struct LimitedSequence {
    sampler: Sampler,
    total_count: i64,
    total_count_digits: usize,
    rendering: Rendering,
}

impl LimitedSequence {
    /// Creates a sequence expecting `total_count` iterations, starting now.
    ///
    /// The sample windows hold at most `min(config.max_samples, total_count)` values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`](crate::Error::InvalidConfiguration) if
    /// `config` fails [`SampleConfig::validate`].
    pub fn new(total_count: u64, config: SampleConfig) -> Result<Self> {
        Self::with_parts(total_count, config, Instant::now(), Rendering::Default)
    }

    pub(crate) fn with_parts(
        total_count: u64,
        config: SampleConfig,
        start: Instant,
        rendering: Rendering,
    ) -> Result<Self> {
        config.validate()?;

        let capacity = match usize::try_from(total_count) {
            Ok(total) => config.max_samples.min(total),
            Err(_) => config.max_samples,
        };
        let sampler = Sampler::new(config.min_samples, capacity, start);
        tracing::debug!(
            total_count,
            min_samples = config.min_samples,
            capacity = sampler.capacity(),
            "created limited sequence"
        );

        Ok(Self {
            sampler,
            total_count: i64::try_from(total_count).unwrap_or(i64::MAX),
            total_count_digits: total_count.to_string().len(),
            rendering,
        })
    }

    fn is_over_limit(&self) -> bool {
        i128::from(self.sampler.current) > i128::from(self.total_count)
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn default_description(&self) -> String {
        let current = self.sampler.current;
        let total = self.total_count;
        let per_iteration = format_time(self.per_iteration());

        if self.is_over_limit() {
            return format!("{current} (expected {total}), t/i: {per_iteration}, ETA: ???");
        }

        // 0/0 is NaN, which the cast turns into 0.
        let percent = ((current as f64 / total as f64) * 100.0).round() as i64;
        format!(
            "{current:0width$}/{total}, {percent:03}%, t/i: {per_iteration}, ETA: {eta}",
            width = self.total_count_digits,
            eta = format_time(self.eta()),
        )
    }
}

impl Sequence for LimitedSequence {
    fn current(&self) -> u64 {
        self.sampler.current
    }

    fn total_count(&self) -> Option<i64> {
        Some(self.total_count)
    }

    fn min_samples(&self) -> usize {
        self.sampler.min_samples
    }

    fn max_samples(&self) -> usize {
        self.sampler.capacity()
    }

    fn start_time(&self) -> Instant {
        self.sampler.start
    }

    fn push(&mut self, duration: f64) {
        self.sampler.push(duration);
    }

    fn skip(&mut self, n: u64) {
        self.total_count = self.total_count.saturating_sub_unsigned(n);
        tracing::debug!(
            skipped = n,
            total_count = self.total_count,
            "skipped iterations"
        );
        if self.is_over_limit() {
            tracing::warn!(
                current = self.sampler.current,
                total_count = self.total_count,
                "expected total dropped below completed iterations"
            );
        }
    }

    fn per_iteration(&self) -> Option<f64> {
        self.sampler.per_iteration()
    }

    #[allow(clippy::cast_precision_loss)]
    fn eta(&self) -> Option<f64> {
        let per_iteration = self.per_iteration()?;
        let remaining = i128::from(self.total_count) - i128::from(self.sampler.current);
        Some(round2(per_iteration * remaining as f64))
    }

    fn describe(&self) -> String {
        match &self.rendering {
            Rendering::Custom(formatter) => formatter(self),
            Rendering::Default => self.default_description(),
        }
    }
}

impl fmt::Display for LimitedSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// A sequence with no known end.
///
/// Renders as `3, t: 10.00s, t/i: 3.00s`: the 1-indexed number of the iteration in
/// progress, the elapsed time and the per-iteration estimate. No ETA is ever produced.
#[derive(Clone, Debug)]
pub struct UnlimitedSequence {
    sampler: Sampler,
    rendering: Rendering,
}

impl UnlimitedSequence {
    /// Creates an open-ended sequence, starting now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`](crate::Error::InvalidConfiguration) if
    /// `config` fails [`SampleConfig::validate`].
    pub fn new(config: SampleConfig) -> Result<Self> {
        Self::with_parts(config, Instant::now(), Rendering::Default)
    }

    pub(crate) fn with_parts(
        config: SampleConfig,
        start: Instant,
        rendering: Rendering,
    ) -> Result<Self> {
        config.validate()?;

        let sampler = Sampler::new(config.min_samples, config.max_samples, start);
        tracing::debug!(
            min_samples = config.min_samples,
            capacity = sampler.capacity(),
            "created unlimited sequence"
        );

        Ok(Self { sampler, rendering })
    }

    fn default_description(&self) -> String {
        format!(
            "{}, t: {}, t/i: {}",
            self.sampler.current + 1,
            self.elapsed_time(),
            format_time(self.per_iteration()),
        )
    }
}

impl Sequence for UnlimitedSequence {
    fn current(&self) -> u64 {
        self.sampler.current
    }

    fn total_count(&self) -> Option<i64> {
        None
    }

    fn min_samples(&self) -> usize {
        self.sampler.min_samples
    }

    fn max_samples(&self) -> usize {
        self.sampler.capacity()
    }

    fn start_time(&self) -> Instant {
        self.sampler.start
    }

    fn push(&mut self, duration: f64) {
        self.sampler.push(duration);
    }

    // Nothing to adjust without a total.
    fn skip(&mut self, _n: u64) {}

    fn per_iteration(&self) -> Option<f64> {
        self.sampler.per_iteration()
    }

    fn eta(&self) -> Option<f64> {
        None
    }

    fn describe(&self) -> String {
        match &self.rendering {
            Rendering::Custom(formatter) => formatter(self),
            Rendering::Default => self.default_description(),
        }
    }
}

impl fmt::Display for UnlimitedSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Either tracker variant, selected by whether a total is known.
#[derive(Clone, Debug)]
pub enum Tracker {
    /// Known total: percentage and ETA.
    Limited(LimitedSequence),
    /// Unknown total: elapsed time only.
    Unlimited(UnlimitedSequence),
}

impl Tracker {
    fn inner(&self) -> &dyn Sequence {
        match self {
            Self::Limited(sequence) => sequence,
            Self::Unlimited(sequence) => sequence,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Sequence {
        match self {
            Self::Limited(sequence) => sequence,
            Self::Unlimited(sequence) => sequence,
        }
    }
}

impl Sequence for Tracker {
    fn current(&self) -> u64 {
        self.inner().current()
    }

    fn total_count(&self) -> Option<i64> {
        self.inner().total_count()
    }

    fn min_samples(&self) -> usize {
        self.inner().min_samples()
    }

    fn max_samples(&self) -> usize {
        self.inner().max_samples()
    }

    fn start_time(&self) -> Instant {
        self.inner().start_time()
    }

    fn push(&mut self, duration: f64) {
        self.inner_mut().push(duration);
    }

    fn skip(&mut self, n: u64) {
        self.inner_mut().skip(n);
    }

    fn per_iteration(&self) -> Option<f64> {
        self.inner().per_iteration()
    }

    fn eta(&self) -> Option<f64> {
        self.inner().eta()
    }

    fn describe(&self) -> String {
        self.inner().describe()
    }
}

impl fmt::Display for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl From<LimitedSequence> for Tracker {
    fn from(sequence: LimitedSequence) -> Self {
        Self::Limited(sequence)
    }
}

impl From<UnlimitedSequence> for Tracker {
    fn from(sequence: UnlimitedSequence) -> Self {
        Self::Unlimited(sequence)
    }
}
