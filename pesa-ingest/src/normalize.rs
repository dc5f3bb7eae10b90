//! Amount and timestamp normalization for captured message fields.
//!
//! Amounts look like `1,234.50` (comma grouping, exactly two decimals).
//! Timestamps are split by the message into `5/3/24` and `10:15 AM`, in the
//! sender's local time.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

use pesa_core::{TimestampSource, local_to_utc};

use crate::error::ParseError;

const MESSAGE_TIME_FORMAT: &str = "%d/%m/%y %I:%M %p";

/// Parse a locale-formatted amount into a non-negative decimal.
pub fn parse_amount(raw: &str) -> Result<Decimal, ParseError> {
    let malformed = || ParseError::MalformedAmount(raw.to_string());

    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let (whole, frac) = cleaned.split_once('.').ok_or_else(malformed)?;

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(frac) || frac.len() != 2 {
        return Err(malformed());
    }

    Decimal::from_str(&cleaned).map_err(|_| malformed())
}

/// `10:15am`, `10:15 AM` and `10:15  pm` all become `10:15 AM`/`10:15 PM`.
fn normalize_clock(time: &str) -> Option<String> {
    let compact: String = time
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();
    if compact.len() < 3 || !compact.is_char_boundary(compact.len() - 2) {
        return None;
    }
    let (clock, meridiem) = compact.split_at(compact.len() - 2);
    Some(format!("{clock} {meridiem}"))
}

fn parse_local(date: &str, time: &str) -> Option<NaiveDateTime> {
    let clock = normalize_clock(time)?;
    let joined = format!("{} {}", date.trim(), clock);
    NaiveDateTime::parse_from_str(&joined, MESSAGE_TIME_FORMAT).ok()
}

/// Parse a message's `day/month/yy` date and `h:mm AM|PM` time in `tz`.
///
/// Never fails: an unparseable or non-existent local time yields `now`
/// tagged as `TimestampSource::ProcessingTime`.
pub fn parse_timestamp(
    date: &str,
    time: &str,
    tz: Tz,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, TimestampSource) {
    match parse_local(date, time).and_then(|local| local_to_utc(local, tz)) {
        Some(ts) => (ts, TimestampSource::Message),
        None => {
            warn!(date, time, "message timestamp did not parse; using processing time");
            (now, TimestampSource::ProcessingTime)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pesa_core::DEFAULT_TIMEZONE;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_with_grouping() {
        assert_eq!(parse_amount("1,234.50").unwrap(), dec!(1234.50));
        assert_eq!(parse_amount("1,000,000.00").unwrap(), dec!(1000000.00));
        assert_eq!(parse_amount(" 7.00 ").unwrap(), dec!(7.00));
    }

    #[test]
    fn test_amount_requires_two_decimals() {
        assert_eq!(
            parse_amount("12.5"),
            Err(ParseError::MalformedAmount("12.5".to_string()))
        );
        assert!(parse_amount("12").is_err());
        assert!(parse_amount("12.500").is_err());
        assert!(parse_amount(".50").is_err());
        assert!(parse_amount("1.2.30").is_err());
        assert!(parse_amount("-5.00").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_timestamp_in_nairobi() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let (ts, source) = parse_timestamp("5/3/24", "10:15 AM", DEFAULT_TIMEZONE, now);
        assert_eq!(source, TimestampSource::Message);
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 5, 7, 15, 0).unwrap());
    }

    #[test]
    fn test_timestamp_pm_and_compact_clock() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let (ts, _) = parse_timestamp("15/11/23", "1:05pm", DEFAULT_TIMEZONE, now);
        assert_eq!(ts, Utc.with_ymd_and_hms(2023, 11, 15, 10, 5, 0).unwrap());
    }

    #[test]
    fn test_bad_timestamp_falls_back_to_now() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        for (date, time) in [("35/13/24", "10:15 AM"), ("yesterday", "10:15 AM"), ("5/3/24", "25:61 PM")] {
            let (ts, source) = parse_timestamp(date, time, DEFAULT_TIMEZONE, now);
            assert_eq!(ts, now);
            assert_eq!(source, TimestampSource::ProcessingTime);
        }
    }
}
