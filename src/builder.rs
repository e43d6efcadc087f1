//! Fluent interface for constructing [`Progress`] instances.
//!
//! While a default tracker can be created via [`Progress::new`], the [`ProgressBuilder`]
//! gives access to every knob:
//!
//! * **Sample windows:** how many samples to collect before estimating, and how many to keep.
//! * **Custom rendering:** replace the default description with a [`Formatter`].
//! * **Time Travel:** set the `start` time explicitly, e.g. to account for setup work done
//!   before the tracker existed.

use std::sync::Arc;

use web_time::Instant;

use crate::{
    error::{Error, Result},
    progress::Progress,
    sequence::{Formatter, LimitedSequence, Rendering, Sequence, Tracker, UnlimitedSequence},
};

/// Sample window settings shared by both tracker variants.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SampleConfig {
    /// Samples to collect before a time per iteration is estimated. Must be positive.
    pub min_samples: usize,
    /// Capacity of the duration and running-average windows. Must exceed `min_samples`.
    pub max_samples: usize,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            min_samples: 1,
            max_samples: 100,
        }
    }
}

impl SampleConfig {
    /// Checks that the settings describe a usable window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `min_samples` is zero or `max_samples`
    /// is not larger than `min_samples`.
    pub fn validate(&self) -> Result<()> {
        if self.min_samples == 0 {
            return Err(Error::InvalidConfiguration(
                "min_samples needs to be a positive number",
            ));
        }
        if self.max_samples <= self.min_samples {
            return Err(Error::InvalidConfiguration(
                "max_samples needs to be larger than min_samples",
            ));
        }
        Ok(())
    }
}

/// A builder pattern for constructing [`Progress`] and [`Tracker`] instances.
#[derive(Debug, Default)]
pub struct ProgressBuilder {
    total_count: Option<u64>,
    config: SampleConfig,
    rendering: Rendering,
    start: Option<Instant>,
}

impl ProgressBuilder {
    /// Starts building a tracker with a known total.
    #[must_use]
    pub fn new_limited(total_count: impl Into<u64>) -> Self {
        Self {
            total_count: Some(total_count.into()),
            ..Default::default()
        }
    }

    /// Starts building an open-ended tracker.
    #[must_use]
    pub fn new_unlimited() -> Self {
        Self::default()
    }

    /// Picks the variant from an optional total.
    #[must_use]
    pub fn from_total(total_count: Option<u64>) -> Self {
        Self {
            total_count,
            ..Default::default()
        }
    }

    /// Replaces the expected total, switching variants when it turns `Some` or `None`.
    #[must_use]
    pub const fn with_total_count(mut self, total_count: Option<u64>) -> Self {
        self.total_count = total_count;
        self
    }

    /// Replaces both sample window settings.
    #[must_use]
    pub const fn with_config(mut self, config: SampleConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the number of samples collected before estimating.
    #[must_use]
    pub const fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.config.min_samples = min_samples;
        self
    }

    /// Sets the capacity of the sample windows.
    #[must_use]
    pub const fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.config.max_samples = max_samples;
        self
    }

    /// Replaces the default description with `formatter`.
    #[must_use]
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&dyn Sequence) -> String + Send + Sync + 'static,
    {
        self.rendering = Rendering::Custom(Arc::new(formatter));
        self
    }

    /// Uses an already shared [`Formatter`].
    #[must_use]
    pub fn with_shared_formatter(mut self, formatter: Formatter) -> Self {
        self.rendering = Rendering::Custom(formatter);
        self
    }

    /// Sets the start time explicitly.
    #[must_use]
    pub const fn with_start_time(mut self, start: Instant) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the start time to `Instant::now()`.
    #[must_use]
    pub fn with_start_time_now(self) -> Self {
        self.with_start_time(Instant::now())
    }

    /// Consumes the builder and returns a bare [`Tracker`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the sample settings are invalid.
    pub fn build_tracker(self) -> Result<Tracker> {
        let Self {
            total_count,
            config,
            rendering,
            start,
        } = self;
        let start = start.unwrap_or_else(Instant::now);

        let tracker: Tracker = match total_count {
            Some(total) => LimitedSequence::with_parts(total, config, start, rendering)?.into(),
            None => UnlimitedSequence::with_parts(config, start, rendering)?.into(),
        };
        Ok(tracker)
    }

    /// Consumes the builder and returns the constructed [`Progress`] instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the sample settings are invalid.
    pub fn build(self) -> Result<Progress> {
        self.build_tracker().map(Progress::from_tracker)
    }
}
