//! Schedule time specifications
//!
//! A schedule's timing is described either by calendar specs (per-field
//! ranges, analogous to cron fields) or by interval specs ("every N, offset
//! M"). Both can be written as a single legacy cron-style string and parsed
//! with [`parse_spec`]:
//!
//! ```text
//! [CRON_TZ=<zone>|TZ=<zone>] <fields | @shorthand | @every D[/P]> [# comment]
//!
//! 5 fields:         minute hour day-of-month month day-of-week
//! 6 fields:         minute hour day-of-month month day-of-week year
//! 7 fields:  second minute hour day-of-month month day-of-week year
//! ```
//!
//! Day-of-month and day-of-week are always combined with AND. The special
//! case some cron dialects have (OR when both are restricted) is not
//! implemented.

mod parser;

pub use parser::{parse_spec, Field};

use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive range of values with a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleRange {
    /// First value (inclusive)
    pub start: u32,
    /// Last value (inclusive)
    pub end: u32,
    /// Distance between matched values
    pub step: u32,
}

impl ScheduleRange {
    /// A range matching exactly one value
    pub fn single(value: u32) -> Self {
        Self {
            start: value,
            end: value,
            step: 1,
        }
    }

    /// A contiguous range with step 1
    pub fn span(start: u32, end: u32) -> Self {
        Self {
            start,
            end,
            step: 1,
        }
    }

    /// Whether `value` is matched by this range
    pub fn contains(&self, value: u32) -> bool {
        value >= self.start
            && value <= self.end
            && (value - self.start) % self.step.max(1) == 0
    }
}

impl fmt::Display for ScheduleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end && self.step == 1 {
            write!(f, "{}", self.start)
        } else if self.step == 1 {
            write!(f, "{}-{}", self.start, self.end)
        } else {
            write!(f, "{}-{}/{}", self.start, self.end, self.step)
        }
    }
}

/// Per-field calendar matching specification
///
/// An empty field matches every value in its domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSpec {
    pub second: Vec<ScheduleRange>,
    pub minute: Vec<ScheduleRange>,
    pub hour: Vec<ScheduleRange>,
    pub day_of_month: Vec<ScheduleRange>,
    pub month: Vec<ScheduleRange>,
    pub day_of_week: Vec<ScheduleRange>,
    pub year: Vec<ScheduleRange>,
    /// Description of the intention of this calendar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl CalendarSpec {
    /// Ranges of one field
    pub fn field(&self, field: Field) -> &[ScheduleRange] {
        match field {
            Field::Second => &self.second,
            Field::Minute => &self.minute,
            Field::Hour => &self.hour,
            Field::DayOfMonth => &self.day_of_month,
            Field::Month => &self.month,
            Field::DayOfWeek => &self.day_of_week,
            Field::Year => &self.year,
        }
    }

    pub(crate) fn field_mut(&mut self, field: Field) -> &mut Vec<ScheduleRange> {
        match field {
            Field::Second => &mut self.second,
            Field::Minute => &mut self.minute,
            Field::Hour => &mut self.hour,
            Field::DayOfMonth => &mut self.day_of_month,
            Field::Month => &mut self.month,
            Field::DayOfWeek => &mut self.day_of_week,
            Field::Year => &mut self.year,
        }
    }

    /// Whether a field value is matched (empty field matches everything)
    pub fn matches(&self, field: Field, value: u32) -> bool {
        let ranges = self.field(field);
        ranges.is_empty() || ranges.iter().any(|r| r.contains(value))
    }
}

/// Blank comments are dropped; the parser would read them back as `None`
fn write_comment(f: &mut fmt::Formatter<'_>, comment: Option<&str>) -> fmt::Result {
    match comment.map(str::trim) {
        Some(text) if !text.is_empty() => write!(f, " # {}", text),
        _ => Ok(()),
    }
}

fn write_field(f: &mut fmt::Formatter<'_>, ranges: &[ScheduleRange]) -> fmt::Result {
    if ranges.is_empty() {
        return f.write_str("*");
    }
    for (i, range) in ranges.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}", range)?;
    }
    Ok(())
}

/// Canonical seven-field rendering; parses back to an equal spec
impl fmt::Display for CalendarSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in Field::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write_field(f, self.field(*field))?;
        }
        write_comment(f, self.comment.as_deref())
    }
}

/// Periodic specification: fires at every `offset + k * every`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalSpec {
    #[serde(with = "crate::duration::serde_str")]
    pub every: std::time::Duration,
    #[serde(with = "crate::duration::serde_str", default)]
    pub offset: std::time::Duration,
}

impl IntervalSpec {
    pub fn new(every: std::time::Duration) -> Self {
        Self {
            every,
            offset: std::time::Duration::ZERO,
        }
    }

    pub fn with_offset(mut self, offset: std::time::Duration) -> Self {
        self.offset = offset;
        self
    }
}

impl fmt::Display for IntervalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@every {}",
            crate::duration::format_std_duration(self.every)
        )?;
        if !self.offset.is_zero() {
            write!(f, "/{}", crate::duration::format_std_duration(self.offset))?;
        }
        Ok(())
    }
}

/// What a spec string compiled to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecKind {
    Calendar(CalendarSpec),
    Interval(IntervalSpec),
}

/// Result of parsing a spec string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSpec {
    pub kind: SpecKind,
    /// Zone from a `CRON_TZ=` / `TZ=` prefix; `None` leaves it to the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    /// Text after `#`, trimmed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ParsedSpec {
    pub fn calendar(&self) -> Option<&CalendarSpec> {
        match &self.kind {
            SpecKind::Calendar(c) => Some(c),
            SpecKind::Interval(_) => None,
        }
    }

    pub fn interval(&self) -> Option<&IntervalSpec> {
        match &self.kind {
            SpecKind::Interval(i) => Some(i),
            SpecKind::Calendar(_) => None,
        }
    }
}

impl fmt::Display for ParsedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tz) = &self.time_zone {
            write!(f, "CRON_TZ={} ", tz)?;
        }
        match &self.kind {
            // the calendar carries the comment itself
            SpecKind::Calendar(c) => write!(f, "{}", c),
            SpecKind::Interval(i) => {
                write!(f, "{}", i)?;
                write_comment(f, self.comment.as_deref())
            }
        }
    }
}
