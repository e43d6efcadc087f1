//! Sample averaging and capacity-bounded FIFO windows.

use std::collections::VecDeque;

use crate::error::{Error, Result};

/// Computes the arithmetic mean of `samples`.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] if `samples` yields nothing.
#[allow(clippy::cast_precision_loss)]
pub fn average<'a, I>(samples: I) -> Result<f64>
where
    I: IntoIterator<Item = &'a f64>,
{
    let mut sum = 0.0;
    let mut count = 0usize;
    for sample in samples {
        sum += sample;
        count += 1;
    }

    if count == 0 {
        return Err(Error::EmptyInput);
    }

    Ok(sum / count as f64)
}

/// A FIFO sequence of samples holding at most `capacity` values.
///
/// Pushing onto a full window evicts the oldest value.
#[derive(Clone, Debug)]
pub struct Window {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl Window {
    /// Creates an empty window. A `capacity` of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, evicting the oldest one if the window overflows.
    pub fn push(&mut self, sample: f64) {
        self.samples.push_back(sample);
        if self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Mean of the samples currently held, or `None` if the window is empty.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        average(&self.samples).ok()
    }

    /// Maximum number of samples retained.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of samples currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if no samples have been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterates samples from oldest to newest.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &f64> {
        self.samples.iter()
    }
}
