//! Timing a labeled block of work.
//!
//! [`timed_block`] is independent of any tracker. It announces a piece of work, runs it and
//! reports how long it took:
//!
//! ```text
//! Working on a thing...
//! Working on a thing DONE: 2.10s
//! ```
//!
//! Output goes to any [`std::io::Write`] sink, e.g. `std::io::stdout()` or a `Vec<u8>` in tests.

use std::io::Write;

use web_time::Instant;

use crate::{error::Result, format::format_duration};

/// Writes `<label>...`, runs `work`, then writes `<label> DONE: <duration>`.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if writing to `sink` fails. When the first line
/// cannot be written, `work` is not run.
pub fn timed_block<W, T>(sink: &mut W, label: &str, work: impl FnOnce() -> T) -> Result<T>
where
    W: Write + ?Sized,
{
    writeln!(sink, "{label}...")?;

    let start = Instant::now();
    let value = work();
    let elapsed = start.elapsed();

    writeln!(sink, "{label} DONE: {}", format_duration(elapsed))?;
    Ok(value)
}
