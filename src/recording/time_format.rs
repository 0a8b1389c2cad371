//! `MM:SS` formatting for the countdown display.

/// Formats a number of seconds as `MM:SS`.
///
/// Fractional seconds are truncated, never rounded, so `59.9` renders as
/// `00:59`. Both fields are zero-padded to two digits; the minute field is
/// not bounded and widens past 99 minutes (`6000.0` renders as `100:00`).
/// Negative and NaN inputs render as `00:00`.
pub fn format_time(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let minutes = whole / 60;
    let secs = whole % 60;
    format!("{minutes:02}:{secs:02}")
}
