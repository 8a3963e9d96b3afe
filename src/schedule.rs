//! The public schedule handle.

use chrono::{Duration, NaiveDateTime};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::{ErrorKind, ErrorReporting, PatternContext, ScheduleError, SourceContext};
use crate::format::ScheduleFormat;
use crate::merge::MergedSchedule;
use crate::search::{self, Direction};
use crate::syntax;

/// Pattern equivalent to the default schedule: every millisecond.
pub const EVERY_MILLISECOND: &str = "*.*.* * *:*:*.*";

/// An immutable, parsed schedule pattern.
///
/// ```rust
/// use cadence::Schedule;
/// use chrono::NaiveDate;
///
/// let schedule = Schedule::parse("*.*.01 01:30:00").unwrap();
/// let t = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap().and_hms_opt(2, 0, 0).unwrap();
/// let next = schedule.strict_next(t).unwrap();
/// assert_eq!(next.to_string(), "2001-02-01 01:30:00");
/// ```
#[derive(Debug, Clone)]
pub struct Schedule {
    pattern: Arc<str>,
    format: ScheduleFormat,
    merged: MergedSchedule,
}

impl Schedule {
    /// Parses and validates `pattern`. This is the only way to build a
    /// schedule from text.
    pub fn parse(pattern: &str) -> Result<Self, ScheduleError> {
        let format = syntax::parse(pattern)?;
        let merged = MergedSchedule::from_validated(&format);
        Ok(Self {
            pattern: Arc::from(pattern),
            format,
            merged,
        })
    }

    /// Nearest matching instant at or after `instant`.
    pub fn nearest_next(&self, instant: NaiveDateTime) -> Result<NaiveDateTime, ScheduleError> {
        self.nearest(instant, Direction::Forward)
    }

    /// Nearest matching instant at or before `instant`.
    pub fn nearest_prev(&self, instant: NaiveDateTime) -> Result<NaiveDateTime, ScheduleError> {
        self.nearest(instant, Direction::Backward)
    }

    /// First matching instant strictly after `instant`.
    pub fn strict_next(&self, instant: NaiveDateTime) -> Result<NaiveDateTime, ScheduleError> {
        let start = self.shift(instant, Duration::milliseconds(1), Direction::Forward)?;
        self.nearest_next(start)
    }

    /// Last matching instant strictly before `instant`.
    pub fn strict_prev(&self, instant: NaiveDateTime) -> Result<NaiveDateTime, ScheduleError> {
        let start = self.shift(instant, Duration::milliseconds(-1), Direction::Backward)?;
        self.nearest_prev(start)
    }

    /// Whether `instant`, at millisecond resolution, satisfies the pattern.
    pub fn matches(&self, instant: NaiveDateTime) -> bool {
        search::matches(&self.merged, instant)
    }

    /// Successive matching instants strictly after `from`.
    pub fn upcoming(&self, from: NaiveDateTime) -> Upcoming<'_> {
        Upcoming {
            schedule: self,
            cursor: Some(from),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn format(&self) -> &ScheduleFormat {
        &self.format
    }

    pub fn merged(&self) -> &MergedSchedule {
        &self.merged
    }

    fn nearest(&self, instant: NaiveDateTime, direction: Direction) -> Result<NaiveDateTime, ScheduleError> {
        search::nearest(&self.merged, instant, direction)
            .ok_or_else(|| self.unsatisfiable(instant, direction))
    }

    fn shift(
        &self,
        instant: NaiveDateTime,
        by: Duration,
        direction: Direction,
    ) -> Result<NaiveDateTime, ScheduleError> {
        instant
            .checked_add_signed(by)
            .ok_or_else(|| self.unsatisfiable(instant, direction))
    }

    fn unsatisfiable(&self, from: NaiveDateTime, direction: Direction) -> ScheduleError {
        let ctx = PatternContext::new(SourceContext::from_pattern(&*self.pattern), "search");
        ctx.report(
            ErrorKind::Unsatisfiable { direction, from },
            ctx.source.full_span(),
        )
    }
}

impl Default for Schedule {
    /// Matches every millisecond.
    fn default() -> Self {
        Self {
            pattern: Arc::from(EVERY_MILLISECOND),
            format: ScheduleFormat::always(),
            merged: MergedSchedule::always(),
        }
    }
}

impl FromStr for Schedule {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Iterator over successive matches, see [`Schedule::upcoming`].
///
/// Ends once the year domain is exhausted.
pub struct Upcoming<'a> {
    schedule: &'a Schedule,
    cursor: Option<NaiveDateTime>,
}

impl Iterator for Upcoming<'_> {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.schedule.strict_next(self.cursor?).ok();
        self.cursor = next;
        next
    }
}
