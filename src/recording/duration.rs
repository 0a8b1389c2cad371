//! Recording duration input handling.
//!
//! The duration field is free text. Numeric input is clamped into the
//! supported range; anything that does not start with a number falls back to
//! the configured default.

/// Shortest clip that can be requested, in seconds.
pub const MIN_DURATION_SECS: u32 = 1;
/// Longest clip that can be requested, in seconds.
pub const MAX_DURATION_SECS: u32 = 300;
/// Fallback used when the duration field holds no number.
pub const DEFAULT_DURATION_SECS: u32 = 10;

/// Clamps a requested duration into `[MIN_DURATION_SECS, MAX_DURATION_SECS]`.
///
/// Out-of-range values are clamped, not rejected.
pub fn clamp_duration(requested: i64) -> u32 {
    requested.clamp(MIN_DURATION_SECS as i64, MAX_DURATION_SECS as i64) as u32
}

/// Reads the leading integer of a duration field.
///
/// Leading whitespace and one sign are accepted; parsing stops at the first
/// non-digit, so `"12.7"` yields 12 and `"15s"` yields 15. Returns `None`
/// when no digit follows.
pub fn parse_duration_input(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = {
        let end = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        &rest[..end]
    };

    if digits.is_empty() {
        return None;
    }

    // Saturate absurdly long inputs; they clamp to the maximum anyway.
    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// Resolves a duration field into the clamped duration used for a session.
pub fn resolve_duration(input: &str, fallback_secs: u32) -> u32 {
    match parse_duration_input(input) {
        Some(requested) => clamp_duration(requested),
        None => {
            tracing::debug!("Non-numeric duration '{}', using {}s", input, fallback_secs);
            clamp_duration(fallback_secs as i64)
        }
    }
}
