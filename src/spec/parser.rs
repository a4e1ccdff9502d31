//! Cron-style spec string parser
//!
//! Field syntax:
//! - `*` - any value (rendered as an empty range list)
//! - `,` - list separator (e.g., `1,3,5`), order preserved
//! - `-` - range (e.g., `1-5`)
//! - `/` - step (e.g., `*/5`, `10/5` or `0-30/5`)
//!
//! Only numeric values are accepted; names such as `MON` or `JAN` are
//! rejected.

use super::{CalendarSpec, IntervalSpec, ParsedSpec, ScheduleRange, SpecKind};
use crate::duration::parse_duration;
use crate::error::{ProviderError, Result};
use chrono::Duration;
use std::fmt;

/// A calendar field and its value domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Second,
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
    Year,
}

impl Field {
    /// All fields in seven-field order
    pub const ALL: [Field; 7] = [
        Field::Second,
        Field::Minute,
        Field::Hour,
        Field::DayOfMonth,
        Field::Month,
        Field::DayOfWeek,
        Field::Year,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Second => "second",
            Field::Minute => "minute",
            Field::Hour => "hour",
            Field::DayOfMonth => "day-of-month",
            Field::Month => "month",
            Field::DayOfWeek => "day-of-week",
            Field::Year => "year",
        }
    }

    /// Inclusive value domain
    pub fn bounds(self) -> (u32, u32) {
        match self {
            Field::Second | Field::Minute => (0, 59),
            Field::Hour => (0, 23),
            Field::DayOfMonth => (1, 31),
            Field::Month => (1, 12),
            Field::DayOfWeek => (0, 6),
            Field::Year => (2000, 2100),
        }
    }

    /// Check a structured range against this field's domain
    pub fn validate(self, range: &ScheduleRange) -> Result<()> {
        self.check(range)
            .map_err(|reason| ProviderError::invalid_spec(&range.to_string(), reason))
    }

    fn check(self, range: &ScheduleRange) -> std::result::Result<(), String> {
        let (min, max) = self.bounds();
        for value in [range.start, range.end] {
            if value < min || value > max {
                return Err(format!(
                    "{}: value {} out of range {}-{}",
                    self.name(),
                    value,
                    min,
                    max
                ));
            }
        }
        if range.start > range.end {
            return Err(format!(
                "{}: range start {} is after end {}",
                self.name(),
                range.start,
                range.end
            ));
        }
        if range.step == 0 {
            return Err(format!("{}: step must be at least 1", self.name()));
        }
        Ok(())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const FIVE_FIELDS: [Field; 5] = [
    Field::Minute,
    Field::Hour,
    Field::DayOfMonth,
    Field::Month,
    Field::DayOfWeek,
];

const SIX_FIELDS: [Field; 6] = [
    Field::Minute,
    Field::Hour,
    Field::DayOfMonth,
    Field::Month,
    Field::DayOfWeek,
    Field::Year,
];

/// Parse a spec string into a calendar or interval spec
///
/// # Examples
///
/// ```
/// use temporal_provider::spec::parse_spec;
///
/// let parsed = parse_spec("CRON_TZ=America/New_York 0 9 * * 1-5").unwrap();
/// assert_eq!(parsed.time_zone.as_deref(), Some("America/New_York"));
/// assert_eq!(parsed.calendar().unwrap().to_string(), "0 0 9 * * 1-5 *");
///
/// let parsed = parse_spec("@every 1h/15m").unwrap();
/// assert_eq!(parsed.interval().unwrap().offset.as_secs(), 900);
/// ```
pub fn parse_spec(input: &str) -> Result<ParsedSpec> {
    let mut rest = input.trim();

    let mut time_zone = None;
    for prefix in ["CRON_TZ=", "TZ="] {
        if let Some(after) = rest.strip_prefix(prefix) {
            let end = after.find(char::is_whitespace).unwrap_or(after.len());
            let name = &after[..end];
            if name.is_empty() {
                return Err(ProviderError::invalid_spec(
                    input,
                    format!("empty time zone name after '{}'", prefix),
                ));
            }
            time_zone = Some(name.to_string());
            rest = after[end..].trim_start();
            break;
        }
    }

    let mut comment = None;
    if let Some(idx) = rest.find('#') {
        let text = rest[idx + 1..].trim();
        if !text.is_empty() {
            comment = Some(text.to_string());
        }
        rest = rest[..idx].trim_end();
    }

    if rest.is_empty() {
        return Err(ProviderError::invalid_spec(input, "no schedule fields"));
    }

    let mut kind = match rest.strip_prefix('@') {
        Some(directive) => parse_directive(input, directive)?,
        None => SpecKind::Calendar(parse_fields(input, rest)?),
    };
    if let SpecKind::Calendar(calendar) = &mut kind {
        calendar.comment = comment.clone();
    }

    Ok(ParsedSpec {
        kind,
        time_zone,
        comment,
    })
}

fn parse_directive(input: &str, directive: &str) -> Result<SpecKind> {
    if let Some(arg) = directive.strip_prefix("every") {
        if !arg.starts_with(char::is_whitespace) || arg.trim().is_empty() {
            return Err(ProviderError::invalid_spec(
                input,
                "expected '@every <interval>[/<phase>]'",
            ));
        }
        return parse_every(input, arg.trim()).map(SpecKind::Interval);
    }

    let calendar = match directive {
        "yearly" | "annually" => shorthand(Some(0), Some(1), Some(1), None),
        "monthly" => shorthand(Some(0), Some(1), None, None),
        "weekly" => shorthand(Some(0), None, None, Some(0)),
        "daily" | "midnight" => shorthand(Some(0), None, None, None),
        "hourly" => shorthand(None, None, None, None),
        other => {
            return Err(ProviderError::invalid_spec(
                input,
                format!("unrecognized shorthand '@{}'", other),
            ))
        }
    };
    Ok(SpecKind::Calendar(calendar))
}

/// Second and minute are pinned to 0; `None` leaves a field unconstrained
fn shorthand(
    hour: Option<u32>,
    day_of_month: Option<u32>,
    month: Option<u32>,
    day_of_week: Option<u32>,
) -> CalendarSpec {
    let pinned = |value: Option<u32>| {
        value
            .map(|v| vec![ScheduleRange::single(v)])
            .unwrap_or_default()
    };
    CalendarSpec {
        second: vec![ScheduleRange::single(0)],
        minute: vec![ScheduleRange::single(0)],
        hour: pinned(hour),
        day_of_month: pinned(day_of_month),
        month: pinned(month),
        day_of_week: pinned(day_of_week),
        year: Vec::new(),
        comment: None,
    }
}

fn parse_every(input: &str, arg: &str) -> Result<IntervalSpec> {
    let (every_text, phase_text) = match arg.split_once('/') {
        Some((every, phase)) => (every.trim(), Some(phase.trim())),
        None => (arg, None),
    };

    let every = parse_duration(every_text)?;
    if every <= Duration::zero() {
        return Err(ProviderError::invalid_spec(
            input,
            format!("interval '{}' must be positive", every_text),
        ));
    }

    let offset = match phase_text {
        Some(text) => {
            let phase = parse_duration(text)?;
            if phase < Duration::zero() {
                return Err(ProviderError::invalid_spec(
                    input,
                    format!("phase '{}' must not be negative", text),
                ));
            }
            phase
        }
        None => Duration::zero(),
    };

    let to_std = |d: Duration| {
        d.to_std()
            .map_err(|_| ProviderError::invalid_spec(input, "interval out of range"))
    };
    Ok(IntervalSpec {
        every: to_std(every)?,
        offset: to_std(offset)?,
    })
}

fn parse_fields(input: &str, text: &str) -> Result<CalendarSpec> {
    let parts: Vec<&str> = text.split_whitespace().collect();

    let fields: &[Field] = match parts.len() {
        5 => &FIVE_FIELDS,
        6 => &SIX_FIELDS,
        7 => &Field::ALL,
        n => {
            return Err(ProviderError::invalid_spec(
                input,
                format!("expected 5, 6 or 7 fields, got {}", n),
            ))
        }
    };

    let mut calendar = CalendarSpec {
        second: vec![ScheduleRange::single(0)],
        ..Default::default()
    };
    for (part, field) in parts.iter().zip(fields) {
        *calendar.field_mut(*field) = parse_field(input, part, *field)?;
    }

    Ok(calendar)
}

/// Parse a single field into its ranges
fn parse_field(input: &str, text: &str, field: Field) -> Result<Vec<ScheduleRange>> {
    if text == "*" {
        return Ok(Vec::new());
    }

    let (min, max) = field.bounds();
    let mut ranges = Vec::new();

    for part in text.split(',') {
        if part.is_empty() {
            return Err(ProviderError::invalid_spec(
                input,
                format!("{}: empty list element in '{}'", field, text),
            ));
        }

        let (range_part, step) = match part.split_once('/') {
            Some((range_part, step_text)) => {
                let step = parse_number(input, field, step_text, "step")?;
                if step == 0 {
                    return Err(ProviderError::invalid_spec(
                        input,
                        format!("{}: step must be at least 1", field),
                    ));
                }
                (range_part, Some(step))
            }
            None => (part, None),
        };

        let (start, end) = if range_part == "*" {
            (min, max)
        } else if let Some((start, end)) = range_part.split_once('-') {
            (
                parse_number(input, field, start, "range start")?,
                parse_number(input, field, end, "range end")?,
            )
        } else {
            let value = parse_number(input, field, range_part, "value")?;
            // `N/S` runs from N to the end of the domain
            (value, if step.is_some() { max } else { value })
        };

        let range = ScheduleRange {
            start,
            end,
            step: step.unwrap_or(1),
        };
        field
            .check(&range)
            .map_err(|reason| ProviderError::invalid_spec(input, reason))?;
        ranges.push(range);
    }

    Ok(ranges)
}

fn parse_number(input: &str, field: Field, text: &str, what: &str) -> Result<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProviderError::invalid_spec(
            input,
            format!("{}: invalid {} '{}'", field, what, text),
        ));
    }
    text.parse().map_err(|_| {
        ProviderError::invalid_spec(input, format!("{}: {} '{}' out of range", field, what, text))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar(input: &str) -> CalendarSpec {
        parse_spec(input).unwrap().calendar().unwrap().clone()
    }

    fn reason(input: &str) -> String {
        match parse_spec(input).unwrap_err() {
            ProviderError::InvalidSpec { reason, .. } => reason,
            other => panic!("expected InvalidSpec for {:?}, got {:?}", input, other),
        }
    }

    #[test]
    fn test_five_fields_default_second_and_year() {
        let spec = calendar("30 2 * * *");
        assert_eq!(spec.second, vec![ScheduleRange::single(0)]);
        assert_eq!(spec.minute, vec![ScheduleRange::single(30)]);
        assert_eq!(spec.hour, vec![ScheduleRange::single(2)]);
        assert!(spec.day_of_month.is_empty());
        assert!(spec.month.is_empty());
        assert!(spec.day_of_week.is_empty());
        assert!(spec.year.is_empty());
    }

    #[test]
    fn test_six_fields_include_year() {
        let spec = calendar("0 12 1 6 * 2030");
        assert_eq!(spec.second, vec![ScheduleRange::single(0)]);
        assert_eq!(spec.day_of_month, vec![ScheduleRange::single(1)]);
        assert_eq!(spec.month, vec![ScheduleRange::single(6)]);
        assert_eq!(spec.year, vec![ScheduleRange::single(2030)]);
    }

    #[test]
    fn test_seven_fields_include_second() {
        let spec = calendar("15 0 12 * * * *");
        assert_eq!(spec.second, vec![ScheduleRange::single(15)]);
        assert_eq!(spec.minute, vec![ScheduleRange::single(0)]);
        assert_eq!(spec.hour, vec![ScheduleRange::single(12)]);
        assert!(spec.year.is_empty());

        let spec = calendar("* 0 12 * * * *");
        assert!(spec.second.is_empty());
    }

    #[test]
    fn test_field_grammar() {
        let spec = calendar("*/15 9-17 1,15 */3 1-5/2");
        assert_eq!(
            spec.minute,
            vec![ScheduleRange {
                start: 0,
                end: 59,
                step: 15
            }]
        );
        assert_eq!(spec.hour, vec![ScheduleRange::span(9, 17)]);
        assert_eq!(
            spec.day_of_month,
            vec![ScheduleRange::single(1), ScheduleRange::single(15)]
        );
        assert_eq!(
            spec.month,
            vec![ScheduleRange {
                start: 1,
                end: 12,
                step: 3
            }]
        );
        assert_eq!(
            spec.day_of_week,
            vec![ScheduleRange {
                start: 1,
                end: 5,
                step: 2
            }]
        );
    }

    #[test]
    fn test_value_with_step_runs_to_domain_end() {
        let spec = calendar("10/20 * * * *");
        assert_eq!(
            spec.minute,
            vec![ScheduleRange {
                start: 10,
                end: 59,
                step: 20
            }]
        );
    }

    #[test]
    fn test_list_order_preserved_and_star_in_list() {
        let spec = calendar("0 0 * * 5,1-3,*");
        assert_eq!(
            spec.day_of_week,
            vec![
                ScheduleRange::single(5),
                ScheduleRange::span(1, 3),
                ScheduleRange::span(0, 6),
            ]
        );
    }

    #[test]
    fn test_shorthands() {
        let hourly = calendar("@hourly");
        assert_eq!(hourly.second, vec![ScheduleRange::single(0)]);
        assert_eq!(hourly.minute, vec![ScheduleRange::single(0)]);
        assert!(hourly.hour.is_empty());
        assert!(hourly.day_of_month.is_empty());

        let daily = calendar("@daily");
        assert_eq!(daily.hour, vec![ScheduleRange::single(0)]);
        assert_eq!(calendar("@midnight"), daily);

        let weekly = calendar("@weekly");
        assert_eq!(weekly.day_of_week, vec![ScheduleRange::single(0)]);

        let monthly = calendar("@monthly");
        assert_eq!(monthly.day_of_month, vec![ScheduleRange::single(1)]);
        assert!(monthly.month.is_empty());

        let yearly = calendar("@yearly");
        assert_eq!(yearly.day_of_month, vec![ScheduleRange::single(1)]);
        assert_eq!(yearly.month, vec![ScheduleRange::single(1)]);
        assert_eq!(calendar("@annually"), yearly);
    }

    #[test]
    fn test_unknown_shorthand() {
        assert!(reason("@fortnightly").contains("unrecognized shorthand"));
        assert!(reason("@daily 5").contains("unrecognized shorthand"));
    }

    #[test]
    fn test_every() {
        let parsed = parse_spec("@every 10s").unwrap();
        assert_eq!(
            parsed.interval(),
            Some(&IntervalSpec::new(std::time::Duration::from_secs(10)))
        );

        let parsed = parse_spec("@every 1h/15m").unwrap();
        assert_eq!(
            parsed.interval(),
            Some(
                &IntervalSpec::new(std::time::Duration::from_secs(3600))
                    .with_offset(std::time::Duration::from_secs(900))
            )
        );
    }

    #[test]
    fn test_every_failures() {
        assert!(matches!(
            parse_spec("@every 10x").unwrap_err(),
            ProviderError::InvalidDuration { .. }
        ));
        assert!(matches!(
            parse_spec("@every 1h/abc").unwrap_err(),
            ProviderError::InvalidDuration { .. }
        ));
        assert!(reason("@every 0s").contains("must be positive"));
        assert!(reason("@every -5m").contains("must be positive"));
        assert!(reason("@every 1h/-5m").contains("must not be negative"));
        assert!(reason("@every").contains("@every <interval>"));
        assert!(reason("@everyday").contains("@every <interval>"));
    }

    #[test]
    fn test_time_zone_prefix() {
        let parsed = parse_spec("CRON_TZ=America/New_York 0 9 * * 1-5").unwrap();
        assert_eq!(parsed.time_zone.as_deref(), Some("America/New_York"));
        let spec = parsed.calendar().unwrap();
        assert_eq!(spec.second, vec![ScheduleRange::single(0)]);
        assert_eq!(spec.hour, vec![ScheduleRange::single(9)]);
        assert_eq!(spec.day_of_week, vec![ScheduleRange::span(1, 5)]);

        let parsed = parse_spec("TZ=UTC @daily").unwrap();
        assert_eq!(parsed.time_zone.as_deref(), Some("UTC"));

        let parsed = parse_spec("0 9 * * *").unwrap();
        assert_eq!(parsed.time_zone, None);

        assert!(reason("CRON_TZ= 0 9 * * *").contains("empty time zone"));
    }

    #[test]
    fn test_comment_suffix() {
        let parsed = parse_spec("0 12 * * 1-3,5 # business hours").unwrap();
        assert_eq!(parsed.comment.as_deref(), Some("business hours"));
        assert_eq!(
            parsed.calendar().unwrap().comment.as_deref(),
            Some("business hours")
        );

        let parsed = parse_spec("@every 5m #poll").unwrap();
        assert_eq!(parsed.comment.as_deref(), Some("poll"));

        let parsed = parse_spec("0 12 * * * #").unwrap();
        assert_eq!(parsed.comment, None);

        assert!(reason("# only a comment").contains("no schedule fields"));
    }

    #[test]
    fn test_weekday_names_rejected() {
        assert!(reason("0 12 * * MON-WED,FRI # business hours").contains("day-of-week"));
        assert!(reason("0 12 * JAN *").contains("month: invalid value 'JAN'"));
    }

    #[test]
    fn test_field_count_violation() {
        assert_eq!(reason("* * *"), "expected 5, 6 or 7 fields, got 3");
        assert_eq!(reason("* * * * * * * *"), "expected 5, 6 or 7 fields, got 8");
    }

    #[test]
    fn test_out_of_domain() {
        assert_eq!(reason("99 * * * *"), "minute: value 99 out of range 0-59");
        assert!(reason("0 24 * * *").starts_with("hour"));
        assert!(reason("0 0 0 * *").starts_with("day-of-month"));
        assert!(reason("0 0 * 13 *").starts_with("month"));
        assert!(reason("0 0 * * 7").starts_with("day-of-week"));
        assert!(reason("0 0 * * * 1999").starts_with("year"));
        assert!(reason("60 0 0 * * * *").starts_with("second"));
    }

    #[test]
    fn test_malformed_ranges_and_steps() {
        assert!(reason("30-10 * * * *").contains("after end"));
        assert!(reason("*/0 * * * *").contains("step must be at least 1"));
        assert!(reason("*/x * * * *").contains("invalid step"));
        assert!(reason("1- * * * *").contains("invalid range end"));
        assert!(reason("1,,2 * * * *").contains("empty list element"));
        assert!(reason("-1 * * * *").contains("invalid range start"));
    }

    #[test]
    fn test_day_fields_combine_with_and() {
        let spec = calendar("0 0 13 * 5");
        assert!(spec.matches(Field::DayOfMonth, 13));
        assert!(!spec.matches(Field::DayOfMonth, 14));
        assert!(spec.matches(Field::DayOfWeek, 5));
        assert!(!spec.matches(Field::DayOfWeek, 4));
    }

    #[test]
    fn test_canonical_round_trip() {
        for input in [
            "30 2 * * *",
            "*/15 9-17 1,15 */3 1-5/2",
            "15 0 12 * * * 2030-2040/2",
            "10/20 * * * *",
            "0 0 * * 5,1-3,*",
            "@weekly",
            "0 12 * * 1-3,5 # business hours",
        ] {
            let first = calendar(input);
            let second = calendar(&first.to_string());
            assert_eq!(first, second, "round trip of {:?}", input);
        }
    }

    #[test]
    fn test_parsed_spec_display_round_trip() {
        for input in [
            "CRON_TZ=Europe/Paris 0 9 * * 1-5",
            "@every 1h/15m # hourly poll",
            "@every 90s",
        ] {
            let first = parse_spec(input).unwrap();
            let second = parse_spec(&first.to_string()).unwrap();
            assert_eq!(first, second, "round trip of {:?}", input);
        }
    }

    #[test]
    fn test_validate_structured_range() {
        assert!(Field::Hour.validate(&ScheduleRange::span(9, 17)).is_ok());
        assert!(Field::Hour.validate(&ScheduleRange::span(17, 9)).is_err());
        assert!(Field::Month.validate(&ScheduleRange::single(0)).is_err());
        let zero_step = ScheduleRange {
            start: 0,
            end: 10,
            step: 0,
        };
        assert!(Field::Minute.validate(&zero_step).is_err());
    }

    #[test]
    fn test_pure_and_deterministic() {
        let input = "CRON_TZ=Asia/Tokyo */5 * * * * # ping";
        assert_eq!(parse_spec(input).unwrap(), parse_spec(input).unwrap());
    }
}
