//! # `eta_progress`
//!
//! Progress tracking for long-running loops, with time-per-iteration and ETA estimates.
//!
//! Each finished iteration contributes one duration sample. Estimates come from a rolling
//! window of running averages rather than raw durations, which keeps them steady when a
//! single iteration is unusually slow.
//!
//! ```
//! use eta_progress::Progress;
//!
//! let mut progress = Progress::new(Some(1000)).unwrap();
//! progress.run(|state| println!("[{state}] first item"));
//! // [0000/1000, 000%, t/i: ?s, ETA: ?s] first item
//! ```
//!
//! ## Modules
//!
//! * [`builder`]: Fluent interface for constructing [`Progress`] instances and [`SampleConfig`].
//! * [`format`]: Human readable durations.
//! * [`io`]: [`timed_block`](io::timed_block), announcing and timing a block of work.
//! * [`iter`]: Driving a [`Progress`] over a collection.
//! * [`progress`]: The [`Progress`] handle that times units of work.
//! * [`sequence`]: The estimation engine and its two variants.
//! * [`window`]: Averaging and bounded sample windows.
//!
//! ## Concurrency
//!
//! Everything here is synchronous, single-owner state. Callers that report progress from
//! several threads must guard the [`Progress`] with their own lock.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod builder;
mod error;
pub mod format;
pub mod io;
pub mod iter;
pub mod progress;
pub mod sequence;
pub mod window;

pub use builder::{ProgressBuilder, SampleConfig};
pub use error::{Error, Result};
pub use format::{format_duration, format_time};
pub use io::timed_block;
pub use iter::{Collection, IterCollection, Method, ProgressIteratorExt};
pub use progress::Progress;
pub use sequence::{Formatter, LimitedSequence, Rendering, Sequence, Tracker, UnlimitedSequence};
pub use window::{Window, average};
