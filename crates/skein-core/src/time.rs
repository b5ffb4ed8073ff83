//! Wall-clock helpers. The engine itself never reads a clock; callers
//! stamp events with these and pass the value down.

use chrono::{DateTime, Utc};

/// Current wall-clock time in microseconds since the Unix epoch.
#[must_use]
pub fn wall_now_us() -> i64 {
    Utc::now().timestamp_micros()
}

/// Render a microsecond timestamp for terminal display.
///
/// Out-of-range values render as a placeholder rather than panicking.
#[must_use]
pub fn format_us(ts_us: i64) -> String {
    DateTime::<Utc>::from_timestamp_micros(ts_us).map_or_else(
        || "<invalid time>".to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::{format_us, wall_now_us};

    #[test]
    fn now_is_after_2020() {
        // 2020-01-01T00:00:00Z in microseconds
        assert!(wall_now_us() > 1_577_836_800_000_000);
    }

    #[test]
    fn formatting_is_stable() {
        assert_eq!(format_us(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(format_us(i64::MAX), "<invalid time>");
    }
}
