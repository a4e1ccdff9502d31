//! Duration strings
//!
//! A duration string is a possibly signed sequence of decimal numbers, each
//! with an optional fraction and a unit suffix, such as `"300ms"`, `"-1.5h"`
//! or `"2h45m"`. Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`,
//! `d` (24h), `w` (7d) and `y` (365d).
//!
//! Durations are rendered back in the canonical form `1h2m3.5s`, so that a
//! catchup window written as `"60s"` reads back from the server as `"1m0s"`.

use crate::error::{ProviderError, Result};
use chrono::Duration;

const NANOSECOND: u128 = 1;
const MICROSECOND: u128 = 1_000 * NANOSECOND;
const MILLISECOND: u128 = 1_000 * MICROSECOND;
const SECOND: u128 = 1_000 * MILLISECOND;
const MINUTE: u128 = 60 * SECOND;
const HOUR: u128 = 60 * MINUTE;
const DAY: u128 = 24 * HOUR;
const WEEK: u128 = 7 * DAY;
const YEAR: u128 = 365 * DAY;

/// Fraction digits beyond this cannot change a nanosecond result
const MAX_FRACTION_DIGITS: usize = 18;

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(NANOSECOND),
        "us" | "µs" | "μs" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        "d" => Some(DAY),
        "w" => Some(WEEK),
        "y" => Some(YEAR),
        _ => None,
    }
}

/// Parse a duration string into a signed duration
///
/// # Examples
///
/// ```
/// use temporal_provider::duration::parse_duration;
///
/// assert_eq!(parse_duration("2h45m").unwrap(), chrono::Duration::minutes(165));
/// assert_eq!(parse_duration("-1.5h").unwrap(), chrono::Duration::minutes(-90));
/// assert!(parse_duration("10").is_err());
/// ```
pub fn parse_duration(input: &str) -> Result<Duration> {
    let (negative, mut s) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if s == "0" {
        return Ok(Duration::zero());
    }
    if s.is_empty() {
        return Err(ProviderError::invalid_duration(input, "empty duration"));
    }

    let mut total: u128 = 0;
    while !s.is_empty() {
        let int_len = s.bytes().take_while(u8::is_ascii_digit).count();
        let (int_part, rest) = s.split_at(int_len);
        s = rest;

        let mut frac_part = "";
        if let Some(rest) = s.strip_prefix('.') {
            let frac_len = rest.bytes().take_while(u8::is_ascii_digit).count();
            frac_part = &rest[..frac_len];
            s = &rest[frac_len..];
        }

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(ProviderError::invalid_duration(
                input,
                format!("expected a number at '{}'", s),
            ));
        }

        let unit_len = s
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(s.len());
        let (unit, rest) = s.split_at(unit_len);
        s = rest;

        if unit.is_empty() {
            return Err(ProviderError::invalid_duration(
                input,
                format!("missing unit after '{}{}'", int_part, dotted(frac_part)),
            ));
        }
        let scale = unit_nanos(unit).ok_or_else(|| {
            ProviderError::invalid_duration(input, format!("unknown unit '{}'", unit))
        })?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| ProviderError::invalid_duration(input, "value out of range"))?
        };
        let mut value = whole
            .checked_mul(scale)
            .ok_or_else(|| ProviderError::invalid_duration(input, "value out of range"))?;

        if !frac_part.is_empty() {
            let digits = &frac_part[..frac_part.len().min(MAX_FRACTION_DIGITS)];
            let frac: u128 = digits
                .parse()
                .map_err(|_| ProviderError::invalid_duration(input, "malformed fraction"))?;
            value += frac * scale / 10u128.pow(digits.len() as u32);
        }

        total = total
            .checked_add(value)
            .filter(|t| *t <= i64::MAX as u128)
            .ok_or_else(|| ProviderError::invalid_duration(input, "value out of range"))?;
    }

    let nanos = total as i64;
    Ok(Duration::nanoseconds(if negative { -nanos } else { nanos }))
}

fn dotted(frac: &str) -> String {
    if frac.is_empty() {
        String::new()
    } else {
        format!(".{}", frac)
    }
}

/// Parse a duration string that must not be negative
pub fn parse_std_duration(input: &str) -> Result<std::time::Duration> {
    parse_duration(input)?
        .to_std()
        .map_err(|_| ProviderError::invalid_duration(input, "must not be negative"))
}

/// Render a duration in canonical form (`0s`, `1.5s`, `1m0s`, `300ms`)
pub fn format_duration(d: Duration) -> String {
    let nanos = d
        .num_nanoseconds()
        .map(i128::from)
        .unwrap_or_else(|| i128::from(d.num_milliseconds()) * 1_000_000);
    let text = format_nanos(nanos.unsigned_abs());
    if nanos < 0 {
        format!("-{}", text)
    } else {
        text
    }
}

/// Render a non-negative duration in canonical form
pub fn format_std_duration(d: std::time::Duration) -> String {
    format_nanos(d.as_nanos())
}

/// Whether two duration strings denote the same length of time
pub fn same_duration(a: &str, b: &str) -> bool {
    matches!((parse_duration(a), parse_duration(b)), (Ok(x), Ok(y)) if x == y)
}

fn format_nanos(n: u128) -> String {
    if n == 0 {
        return "0s".to_string();
    }

    if n < SECOND {
        let (scale, unit) = if n < MICROSECOND {
            (NANOSECOND, "ns")
        } else if n < MILLISECOND {
            (MICROSECOND, "µs")
        } else {
            (MILLISECOND, "ms")
        };
        return format!("{}{}", decimal(n, scale), unit);
    }

    let hours = n / HOUR;
    let minutes = (n % HOUR) / MINUTE;
    let rest = n % MINUTE;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    out.push_str(&decimal(rest, SECOND));
    out.push('s');
    out
}

fn decimal(value: u128, scale: u128) -> String {
    let whole = value / scale;
    let frac = value % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let width = scale.to_string().len() - 1;
    let frac = format!("{:0width$}", frac, width = width);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Serde adapter storing `std::time::Duration` as a duration string
pub mod serde_str {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        d: &std::time::Duration,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_std_duration(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<std::time::Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_std_duration(&text).map_err(serde::de::Error::custom)
    }

    /// Same as the parent module, for optional durations
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            d: &Option<std::time::Duration>,
            serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            match d {
                Some(d) => serializer.serialize_some(&crate::duration::format_std_duration(*d)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> std::result::Result<Option<std::time::Duration>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|text| {
                    crate::duration::parse_std_duration(&text).map_err(serde::de::Error::custom)
                })
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_units() {
        assert_eq!(parse_duration("300ms").unwrap(), Duration::milliseconds(300));
        assert_eq!(parse_duration("10s").unwrap(), Duration::seconds(10));
        assert_eq!(parse_duration("5m").unwrap(), Duration::minutes(5));
        assert_eq!(parse_duration("1h").unwrap(), Duration::hours(1));
        assert_eq!(parse_duration("1d").unwrap(), Duration::hours(24));
        assert_eq!(parse_duration("1w").unwrap(), Duration::days(7));
        assert_eq!(parse_duration("1y").unwrap(), Duration::days(365));
        assert_eq!(parse_duration("42ns").unwrap(), Duration::nanoseconds(42));
        assert_eq!(parse_duration("7us").unwrap(), Duration::microseconds(7));
        assert_eq!(parse_duration("7µs").unwrap(), Duration::microseconds(7));
    }

    #[test]
    fn test_parse_compound_and_sign() {
        assert_eq!(parse_duration("2h45m").unwrap(), Duration::minutes(165));
        assert_eq!(parse_duration("1h1m1s").unwrap(), Duration::seconds(3661));
        assert_eq!(parse_duration("-1.5h").unwrap(), Duration::minutes(-90));
        assert_eq!(parse_duration("+15m").unwrap(), Duration::minutes(15));
        assert_eq!(parse_duration("0").unwrap(), Duration::zero());
        assert_eq!(parse_duration("-0").unwrap(), Duration::zero());
    }

    #[test]
    fn test_parse_fractions() {
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::milliseconds(1500));
        assert_eq!(parse_duration(".5s").unwrap(), Duration::milliseconds(500));
        assert_eq!(parse_duration("1.s").unwrap(), Duration::seconds(1));
        assert_eq!(parse_duration("0.25d").unwrap(), Duration::hours(6));
    }

    #[test]
    fn test_parse_failures() {
        for bad in ["", "-", "10", "5x", ".s", "s", "1h-5m", "1..5s", "abc"] {
            let err = parse_duration(bad).unwrap_err();
            assert!(
                matches!(err, ProviderError::InvalidDuration { .. }),
                "expected InvalidDuration for {:?}, got {:?}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_parse_overflow() {
        assert!(parse_duration("1000y").is_err());
        assert!(parse_duration("99999999999999999999999999999999999999999h").is_err());
    }

    #[test]
    fn test_format_canonical() {
        assert_eq!(format_duration(Duration::zero()), "0s");
        assert_eq!(format_duration(Duration::seconds(10)), "10s");
        assert_eq!(format_duration(Duration::seconds(60)), "1m0s");
        assert_eq!(format_duration(Duration::minutes(165)), "2h45m0s");
        assert_eq!(format_duration(Duration::milliseconds(1500)), "1.5s");
        assert_eq!(format_duration(Duration::microseconds(1500)), "1.5ms");
        assert_eq!(format_duration(Duration::nanoseconds(1500)), "1.5µs");
        assert_eq!(format_duration(Duration::nanoseconds(12)), "12ns");
        assert_eq!(format_duration(Duration::hours(72)), "72h0m0s");
        assert_eq!(format_duration(Duration::minutes(-90)), "-1h30m0s");
    }

    #[test]
    fn test_format_then_parse_is_stable() {
        for text in ["1m0s", "10s", "2h45m0s", "1.5ms", "0s"] {
            let d = parse_duration(text).unwrap();
            assert_eq!(format_duration(d), text);
        }
    }

    #[test]
    fn test_std_duration() {
        assert_eq!(
            parse_std_duration("1m").unwrap(),
            std::time::Duration::from_secs(60)
        );
        assert!(parse_std_duration("-1m").is_err());
        assert_eq!(
            format_std_duration(std::time::Duration::from_secs(3600)),
            "1h0m0s"
        );
    }

    #[test]
    fn test_same_duration() {
        assert!(same_duration("60s", "1m0s"));
        assert!(same_duration("1d", "24h"));
        assert!(!same_duration("1m", "61s"));
        assert!(!same_duration("bogus", "bogus"));
    }

    #[test]
    fn test_serde_adapter() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Holder {
            #[serde(with = "serde_str")]
            every: std::time::Duration,
            #[serde(with = "serde_str::option", default)]
            timeout: Option<std::time::Duration>,
        }

        let holder = Holder {
            every: std::time::Duration::from_secs(90),
            timeout: None,
        };
        let json = serde_json::to_string(&holder).unwrap();
        assert_eq!(json, r#"{"every":"1m30s","timeout":null}"#);

        let parsed: Holder = serde_json::from_str(r#"{"every":"2h","timeout":"10s"}"#).unwrap();
        assert_eq!(parsed.every, std::time::Duration::from_secs(7200));
        assert_eq!(parsed.timeout, Some(std::time::Duration::from_secs(10)));
    }
}
