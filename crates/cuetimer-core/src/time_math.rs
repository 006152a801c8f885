//! Pure conversions between seconds, hour/minute/second triples and display
//! strings. Whole-second granularity throughout.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// An hours/minutes/seconds breakdown of a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hms {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

pub fn seconds_to_hms(total: u64) -> Hms {
    Hms {
        hours: total / 3600,
        minutes: (total % 3600) / 60,
        seconds: total % 60,
    }
}

/// Inverse of [`seconds_to_hms`]. Minutes/seconds above 59 are accepted and
/// simply carry over.
pub fn hms_to_seconds(hours: u64, minutes: u64, seconds: u64) -> u64 {
    hours
        .saturating_mul(3600)
        .saturating_add(minutes.saturating_mul(60))
        .saturating_add(seconds)
}

/// `MM:SS`, or `HH:MM:SS` once the value reaches an hour.
pub fn format_time(total: u64) -> String {
    let Hms {
        hours,
        minutes,
        seconds,
    } = seconds_to_hms(total);
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Parse `SS`, `MM:SS` or `HH:MM:SS` into seconds.
pub fn parse_time(input: &str) -> Result<u64, ValidationError> {
    let invalid = |message: &str| ValidationError::InvalidValue {
        field: "time".into(),
        message: format!("'{input}': {message}"),
    };

    let parts: Vec<&str> = input.trim().split(':').collect();
    if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(invalid("expected SS, MM:SS or HH:MM:SS"));
    }

    let mut numbers = Vec::with_capacity(3);
    for part in &parts {
        let n = part
            .parse::<u64>()
            .map_err(|_| invalid("components must be non-negative integers"))?;
        numbers.push(n);
    }

    Ok(match numbers.as_slice() {
        [s] => *s,
        [m, s] => hms_to_seconds(0, *m, *s),
        [h, m, s] => hms_to_seconds(*h, *m, *s),
        _ => unreachable!("length checked above"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn format_short_durations_without_hours() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(59), "00:59");
        assert_eq!(format_time(25 * 60), "25:00");
        assert_eq!(format_time(3599), "59:59");
    }

    #[test]
    fn format_includes_hours_from_one_hour() {
        assert_eq!(format_time(3600), "01:00:00");
        assert_eq!(format_time(3661), "01:01:01");
        assert_eq!(format_time(100 * 3600), "100:00:00");
    }

    #[test]
    fn breakdown_of_mixed_duration() {
        assert_eq!(
            seconds_to_hms(3723),
            Hms {
                hours: 1,
                minutes: 2,
                seconds: 3
            }
        );
    }

    #[test]
    fn parse_accepts_all_three_shapes() {
        assert_eq!(parse_time("45").unwrap(), 45);
        assert_eq!(parse_time("5:00").unwrap(), 300);
        assert_eq!(parse_time("1:02:03").unwrap(), 3723);
        assert_eq!(parse_time(" 00:10 ").unwrap(), 10);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_time("").is_err());
        assert!(parse_time("1::2").is_err());
        assert!(parse_time("-5").is_err());
        assert!(parse_time("1:2:3:4").is_err());
        assert!(parse_time("ten").is_err());
    }

    proptest! {
        #[test]
        fn hms_round_trip(n in 0u64..10_000_000) {
            let hms = seconds_to_hms(n);
            prop_assert_eq!(hms_to_seconds(hms.hours, hms.minutes, hms.seconds), n);
            prop_assert!(hms.minutes < 60 && hms.seconds < 60);
        }

        #[test]
        fn formatted_time_parses_back(n in 0u64..1_000_000) {
            prop_assert_eq!(parse_time(&format_time(n)).unwrap(), n);
        }
    }
}
