//! Human readable rendering of durations.
//!
//! Every time field shown by a tracker goes through [`format_time`], which picks a unit
//! based on magnitude:
//!
//! | Range (seconds)     | Output           |
//! |---------------------|------------------|
//! | unknown             | `?s`             |
//! | `< 1`               | `123.00ms`       |
//! | `1 ..< 60`          | `12.34s`         |
//! | `60 ..< 3600`       | `01m:40.00s`     |
//! | `>= 3600`           | `01h:01m:01.00s` |

use std::time::Duration;

use compact_str::{CompactString, format_compact};

/// Rounds to two decimal places.
#[must_use]
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats a number of seconds, or its absence, for display.
///
/// Minutes and hours are zero-padded to two digits, and so is the integer part of the
/// trailing seconds component.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn format_time(time: Option<f64>) -> CompactString {
    let Some(time) = time else {
        return CompactString::const_new("?s");
    };

    if time < 1.0 {
        format_compact!("{:.2}ms", round2(time * 1000.0))
    } else if time < 60.0 {
        format_compact!("{:.2}s", round2(time))
    } else if time < 3600.0 {
        let minutes = time as u64 / 60;
        let seconds = round2(time - (minutes * 60) as f64);
        format_compact!("{minutes:02}m:{seconds:05.2}s")
    } else {
        let whole = time as u64;
        let hours = whole / 3600;
        let minutes = (whole % 3600) / 60;
        let seconds = round2(time - (hours * 3600 + minutes * 60) as f64);
        format_compact!("{hours:02}h:{minutes:02}m:{seconds:05.2}s")
    }
}

/// Formats a [`Duration`] with the same rules as [`format_time`].
#[must_use]
pub fn format_duration(duration: Duration) -> CompactString {
    format_time(Some(duration.as_secs_f64()))
}
