//! Typed pattern data produced by the parser.
//!
//! A pattern string is turned into a [`ScheduleFormat`]: one list of
//! [`PatternEntry`] clauses per [`Field`]. Nothing here knows about calendars;
//! the merger turns these lists into queryable intervals.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// FIELDS AND THEIR DOMAINS
// ============================================================================

/// Day-of-month value meaning "the last calendar day of the month".
pub const LAST_DAY_OF_MONTH: u32 = 32;

/// One temporal component of a schedule pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Year,
    Month,
    Day,
    DayOfWeek,
    Hour,
    Minute,
    Second,
    Millisecond,
}

impl Field {
    /// Every field, in pattern order.
    pub const ALL: [Field; 8] = [
        Field::Year,
        Field::Month,
        Field::Day,
        Field::DayOfWeek,
        Field::Hour,
        Field::Minute,
        Field::Second,
        Field::Millisecond,
    ];

    /// Inclusive `(min, max)` bounds of the field.
    pub const fn domain(self) -> (u32, u32) {
        match self {
            Field::Year => (2000, 2100),
            Field::Month => (1, 12),
            Field::Day => (1, LAST_DAY_OF_MONTH),
            Field::DayOfWeek => (0, 6),
            Field::Hour => (0, 23),
            Field::Minute | Field::Second => (0, 59),
            Field::Millisecond => (0, 999),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Field::Year => "year",
            Field::Month => "month",
            Field::Day => "day",
            Field::DayOfWeek => "day of week",
            Field::Hour => "hour",
            Field::Minute => "minute",
            Field::Second => "second",
            Field::Millisecond => "millisecond",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// PATTERN ENTRIES
// ============================================================================

/// One comma-separated clause of a field.
///
/// Legal shapes:
/// - `*` → `(None, None, None)`
/// - `*/s` → `(None, None, Some(s))`
/// - `b` → `(Some(b), None, None)`
/// - `b/s` → `(Some(b), None, Some(s))`, from `b` to the end of the domain
/// - `b-e` and `b-e/s` → `(Some(b), Some(e), step)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternEntry {
    pub begin: Option<u64>,
    pub end: Option<u64>,
    pub step: Option<u64>,
}

impl PatternEntry {
    /// The bare wildcard `*`.
    pub const ALWAYS: PatternEntry = PatternEntry {
        begin: None,
        end: None,
        step: None,
    };

    pub const fn new(begin: Option<u64>, end: Option<u64>, step: Option<u64>) -> Self {
        Self { begin, end, step }
    }

    pub const fn point(value: u64) -> Self {
        Self::new(Some(value), None, None)
    }

    pub const fn range(begin: u64, end: u64) -> Self {
        Self::new(Some(begin), Some(end), None)
    }

    pub const fn stepped_range(begin: u64, end: u64, step: u64) -> Self {
        Self::new(Some(begin), Some(end), Some(step))
    }

    pub const fn every(step: u64) -> Self {
        Self::new(None, None, Some(step))
    }

    pub fn is_wildcard(&self) -> bool {
        *self == Self::ALWAYS
    }
}

impl fmt::Display for PatternEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.begin, self.end) {
            (None, _) => write!(f, "*")?,
            (Some(b), None) => write!(f, "{}", b)?,
            (Some(b), Some(e)) => write!(f, "{}-{}", b, e)?,
        }
        if let Some(step) = self.step {
            write!(f, "/{}", step)?;
        }
        Ok(())
    }
}

// ============================================================================
// SCHEDULE FORMAT
// ============================================================================

/// Entry lists for every field of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleFormat {
    pub years: Vec<PatternEntry>,
    pub months: Vec<PatternEntry>,
    pub days: Vec<PatternEntry>,
    pub days_of_week: Vec<PatternEntry>,
    pub hours: Vec<PatternEntry>,
    pub minutes: Vec<PatternEntry>,
    pub seconds: Vec<PatternEntry>,
    pub milliseconds: Vec<PatternEntry>,
}

impl ScheduleFormat {
    /// Every field set to `*`.
    pub fn always() -> Self {
        let always = || vec![PatternEntry::ALWAYS];
        Self {
            years: always(),
            months: always(),
            days: always(),
            days_of_week: always(),
            hours: always(),
            minutes: always(),
            seconds: always(),
            milliseconds: always(),
        }
    }

    pub fn entries(&self, field: Field) -> &[PatternEntry] {
        match field {
            Field::Year => &self.years,
            Field::Month => &self.months,
            Field::Day => &self.days,
            Field::DayOfWeek => &self.days_of_week,
            Field::Hour => &self.hours,
            Field::Minute => &self.minutes,
            Field::Second => &self.seconds,
            Field::Millisecond => &self.milliseconds,
        }
    }

    pub fn entries_mut(&mut self, field: Field) -> &mut Vec<PatternEntry> {
        match field {
            Field::Year => &mut self.years,
            Field::Month => &mut self.months,
            Field::Day => &mut self.days,
            Field::DayOfWeek => &mut self.days_of_week,
            Field::Hour => &mut self.hours,
            Field::Minute => &mut self.minutes,
            Field::Second => &mut self.seconds,
            Field::Millisecond => &mut self.milliseconds,
        }
    }
}

impl Default for ScheduleFormat {
    fn default() -> Self {
        Self::always()
    }
}
