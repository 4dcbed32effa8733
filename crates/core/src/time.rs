const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_MICRO: u64 = 1_000;

pub fn nanos_to_millis(nanos: u64) -> i64 {
    (nanos / NANOS_PER_MILLI) as i64
}

pub fn nanos_to_micros(nanos: u64) -> i64 {
    (nanos / NANOS_PER_MICRO) as i64
}

/// Start time and duration in milliseconds.
///
/// An unset end timestamp (0) yields a zero duration, and an end before the
/// start is clamped to zero.
pub fn span_times(start_unix_nano: u64, end_unix_nano: u64) -> (i64, i64) {
    let start_millis = nanos_to_millis(start_unix_nano);
    if end_unix_nano == 0 {
        return (start_millis, 0);
    }
    let duration_millis = (nanos_to_millis(end_unix_nano) - start_millis).max(0);
    (start_millis, duration_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_start_and_duration() {
        let (start, duration) = span_times(1_700_000_000_000_000_000, 1_700_000_000_250_000_000);
        assert_eq!(start, 1_700_000_000_000);
        assert_eq!(duration, 250);
    }

    #[test]
    fn unset_end_is_zero_duration() {
        let (start, duration) = span_times(1_700_000_000_000_000_000, 0);
        assert_eq!(start, 1_700_000_000_000);
        assert_eq!(duration, 0);
    }

    #[test]
    fn end_before_start_is_clamped() {
        let (_, duration) = span_times(2_000_000_000, 1_000_000_000);
        assert_eq!(duration, 0);
    }

    #[test]
    fn micros_truncate() {
        assert_eq!(nanos_to_micros(1_500), 1);
        assert_eq!(nanos_to_micros(1_700_000_000_123_456_789), 1_700_000_000_123_456);
    }
}
