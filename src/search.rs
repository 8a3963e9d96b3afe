//! Cascading nearest-instant search.
//!
//! Fields are resolved coarsest to finest: year, month, day, hour, minute,
//! second, millisecond. A field whose value is allowed lets the cascade move
//! on with the instant untouched. Otherwise the field jumps to its next (or
//! previous) allowed value and every finer field is reset to the start (or the
//! last millisecond) of its unit. When a field has no allowed value left
//! inside its coarser unit, the instant rolls into the neighbouring coarser
//! unit and the whole cascade starts again from the year.
//!
//! The year domain is finite, so every search either finds an instant or runs
//! off the end of the domain and reports that instead of looping.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};
use std::fmt;
use tracing::{debug, trace};

use crate::format::{Field, LAST_DAY_OF_MONTH};
use crate::interval::Interval;
use crate::merge::MergedSchedule;

/// Which way along the timeline a search runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("at or after"),
            Direction::Backward => f.write_str("at or before"),
        }
    }
}

/// Fields walked by the cascade, coarsest first. Day of week is folded into
/// the day check.
const CASCADE: [Field; 7] = [
    Field::Year,
    Field::Month,
    Field::Day,
    Field::Hour,
    Field::Minute,
    Field::Second,
    Field::Millisecond,
];

/// Outcome of resolving one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// The field matches at this instant; continue with the next finer field.
    Advance(NaiveDateTime),
    /// A coarser field changed; restart the cascade from this instant.
    Carry(NaiveDateTime),
    /// The year domain ran out.
    Exhausted,
}

/// Outcome of one pass over every field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cascade {
    Found(NaiveDateTime),
    Carry(NaiveDateTime),
    Exhausted,
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Nearest instant at or beyond `start` in `direction` that the schedule
/// allows, or `None` when no such instant exists inside the year domain.
pub fn nearest(
    schedule: &MergedSchedule,
    start: NaiveDateTime,
    direction: Direction,
) -> Option<NaiveDateTime> {
    let mut instant = align(start, direction)?;

    loop {
        match pass(schedule, instant, direction) {
            Cascade::Found(found) => return Some(found),
            Cascade::Carry(next) => {
                trace!(from = %instant, to = %next, ?direction, "cascade carry");
                instant = next;
            }
            Cascade::Exhausted => {
                debug!(%start, ?direction, "search left the year domain");
                return None;
            }
        }
    }
}

/// Whether the schedule allows `instant` (taken at millisecond resolution).
pub fn matches(schedule: &MergedSchedule, instant: NaiveDateTime) -> bool {
    let Some(instant) = align(instant, Direction::Backward) else {
        return false;
    };
    CASCADE.iter().all(|&field| match field {
        Field::Day => day_allowed(schedule, instant.date()),
        field => schedule.interval(field).is_allowed(value_of(instant, field)),
    })
}

// ============================================================================
// CASCADE
// ============================================================================

fn pass(schedule: &MergedSchedule, mut instant: NaiveDateTime, direction: Direction) -> Cascade {
    for field in CASCADE {
        match resolve(schedule, field, instant, direction) {
            Step::Advance(next) => instant = next,
            Step::Carry(next) => return Cascade::Carry(next),
            Step::Exhausted => return Cascade::Exhausted,
        }
    }
    Cascade::Found(instant)
}

fn resolve(
    schedule: &MergedSchedule,
    field: Field,
    instant: NaiveDateTime,
    direction: Direction,
) -> Step {
    if field == Field::Day {
        return resolve_day(schedule, instant, direction);
    }

    let interval = schedule.interval(field);
    let value = value_of(instant, field);
    if interval.is_allowed(value) {
        return Step::Advance(instant);
    }

    let target = match direction {
        Direction::Forward => interval.next_allowed(value),
        Direction::Backward => interval.previous_allowed(value),
    };

    let moved = match target {
        Some(v) => place(instant, field, v, direction),
        None => beyond(instant, field, direction),
    };

    classify(instant, moved, field)
}

/// Day matching needs the day of week as well as the day of month, and `32`
/// stands for whatever the last day of the month is.
fn resolve_day(schedule: &MergedSchedule, instant: NaiveDateTime, direction: Direction) -> Step {
    let date = instant.date();
    if day_allowed(schedule, date) {
        return Step::Advance(instant);
    }

    let last = days_in_month(date);
    let mut day = date.day();

    loop {
        let candidate = match direction {
            Direction::Forward => next_day_candidate(&schedule.days, day, last),
            Direction::Backward => schedule.days.previous_allowed(day as i64),
        };

        let Some(candidate) = candidate else {
            return classify(instant, beyond(instant, Field::Day, direction), Field::Day);
        };

        match date.with_day(candidate) {
            Some(d) if day_allowed(schedule, d) => {
                return classify(instant, place(instant, Field::Day, candidate, direction), Field::Day);
            }
            Some(_) => day = candidate,
            None => return Step::Exhausted,
        }
    }
}

fn next_day_candidate(days: &Interval, day: u32, last: u32) -> Option<u32> {
    let listed = days.next_allowed(day as i64).filter(|&d| d <= last);
    let sentinel = (days.is_allowed(LAST_DAY_OF_MONTH as i64) && last > day).then_some(last);
    match (listed, sentinel) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn day_allowed(schedule: &MergedSchedule, date: NaiveDate) -> bool {
    let weekday = date.weekday().num_days_from_sunday() as i64;
    let day = date.day();
    schedule.days_of_week.is_allowed(weekday)
        && (schedule.days.is_allowed(day as i64)
            || (schedule.days.is_allowed(LAST_DAY_OF_MONTH as i64) && day == days_in_month(date)))
}

/// Advance when only `field` and finer fields moved, carry when the move
/// reached into a coarser field.
fn classify(before: NaiveDateTime, after: Option<NaiveDateTime>, field: Field) -> Step {
    let Some(after) = after else {
        return Step::Exhausted;
    };
    match coarser(field) {
        Some(parent) if value_of(after, parent) != value_of(before, parent) => Step::Carry(after),
        _ => Step::Advance(after),
    }
}

// ============================================================================
// CALENDAR ARITHMETIC
// ============================================================================

fn coarser(field: Field) -> Option<Field> {
    match field {
        Field::Year => None,
        Field::Month => Some(Field::Year),
        Field::Day | Field::DayOfWeek => Some(Field::Month),
        Field::Hour => Some(Field::Day),
        Field::Minute => Some(Field::Hour),
        Field::Second => Some(Field::Minute),
        Field::Millisecond => Some(Field::Second),
    }
}

fn value_of(instant: NaiveDateTime, field: Field) -> i64 {
    match field {
        Field::Year => instant.year() as i64,
        Field::Month => instant.month() as i64,
        Field::Day => instant.day() as i64,
        Field::DayOfWeek => instant.weekday().num_days_from_sunday() as i64,
        Field::Hour => instant.hour() as i64,
        Field::Minute => instant.minute() as i64,
        Field::Second => instant.second() as i64,
        Field::Millisecond => (instant.nanosecond() / 1_000_000) as i64,
    }
}

/// Rounds to whole milliseconds: up when searching forward, down when
/// searching backward.
fn align(instant: NaiveDateTime, direction: Direction) -> Option<NaiveDateTime> {
    let nanos = instant.nanosecond();
    let truncated = instant.with_nanosecond(nanos - nanos % 1_000_000)?;
    if direction == Direction::Forward && nanos % 1_000_000 != 0 {
        truncated.checked_add_signed(Duration::milliseconds(1))
    } else {
        Some(truncated)
    }
}

/// First instant of the `field` unit whose value is `value`, inside the
/// coarser units of `instant`.
fn unit_start(instant: NaiveDateTime, field: Field, value: u32) -> Option<NaiveDateTime> {
    let date = instant.date();
    let (h, m, s) = (instant.hour(), instant.minute(), instant.second());
    match field {
        Field::Year => NaiveDate::from_ymd_opt(value as i32, 1, 1)?.and_hms_milli_opt(0, 0, 0, 0),
        Field::Month => NaiveDate::from_ymd_opt(date.year(), value, 1)?.and_hms_milli_opt(0, 0, 0, 0),
        Field::Day | Field::DayOfWeek => date.with_day(value)?.and_hms_milli_opt(0, 0, 0, 0),
        Field::Hour => date.and_hms_milli_opt(value, 0, 0, 0),
        Field::Minute => date.and_hms_milli_opt(h, value, 0, 0),
        Field::Second => date.and_hms_milli_opt(h, m, value, 0),
        Field::Millisecond => date.and_hms_milli_opt(h, m, s, value),
    }
}

/// First instant of the `field` unit containing `instant`.
fn start_of(instant: NaiveDateTime, field: Field) -> Option<NaiveDateTime> {
    unit_start(instant, field, value_of(instant, field) as u32)
}

/// First instant of the `field` unit after the one starting at `start`.
fn following_unit(start: NaiveDateTime, field: Field) -> Option<NaiveDateTime> {
    match field {
        Field::Year => NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)?.and_hms_milli_opt(0, 0, 0, 0),
        Field::Month => start.checked_add_months(Months::new(1)),
        Field::Day | Field::DayOfWeek => start.checked_add_signed(Duration::days(1)),
        Field::Hour => start.checked_add_signed(Duration::hours(1)),
        Field::Minute => start.checked_add_signed(Duration::minutes(1)),
        Field::Second => start.checked_add_signed(Duration::seconds(1)),
        Field::Millisecond => start.checked_add_signed(Duration::milliseconds(1)),
    }
}

/// Moves `field` to `value`: the unit's first millisecond going forward, its
/// last millisecond going backward.
fn place(instant: NaiveDateTime, field: Field, value: u32, direction: Direction) -> Option<NaiveDateTime> {
    let start = unit_start(instant, field, value)?;
    match direction {
        Direction::Forward => Some(start),
        Direction::Backward => {
            following_unit(start, field)?.checked_sub_signed(Duration::milliseconds(1))
        }
    }
}

/// Leaves the coarser unit of `field` entirely: the first millisecond of the
/// next one going forward, the last millisecond of the previous one going
/// backward. Years have nothing coarser to roll into.
fn beyond(instant: NaiveDateTime, field: Field, direction: Direction) -> Option<NaiveDateTime> {
    let parent = coarser(field)?;
    let start = start_of(instant, parent)?;
    match direction {
        Direction::Forward => following_unit(start, parent),
        Direction::Backward => start.checked_sub_signed(Duration::milliseconds(1)),
    }
}

pub(crate) fn days_in_month(date: NaiveDate) -> u32 {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map_or(31, |last| last.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_milli_opt(h, mi, s, ms)
            .unwrap()
    }

    fn merged(pattern: &str) -> MergedSchedule {
        MergedSchedule::from_format(&parse(pattern).unwrap()).unwrap()
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(NaiveDate::from_ymd_opt(2001, 2, 10).unwrap()), 28);
        assert_eq!(days_in_month(NaiveDate::from_ymd_opt(2004, 2, 1).unwrap()), 29);
        assert_eq!(days_in_month(NaiveDate::from_ymd_opt(2000, 2, 1).unwrap()), 29);
        assert_eq!(days_in_month(NaiveDate::from_ymd_opt(2100, 2, 1).unwrap()), 28);
        assert_eq!(days_in_month(NaiveDate::from_ymd_opt(2001, 12, 31).unwrap()), 31);
    }

    #[test]
    fn matching_instant_is_returned_unchanged() {
        let schedule = merged("10:00:00");
        let t = at(2001, 1, 1, 10, 0, 0, 0);
        assert_eq!(nearest(&schedule, t, Direction::Forward), Some(t));
        assert_eq!(nearest(&schedule, t, Direction::Backward), Some(t));
    }

    #[test]
    fn forward_resets_finer_fields_to_unit_start() {
        let schedule = merged("*:30:00");
        let t = at(2001, 1, 1, 10, 31, 12, 345);
        assert_eq!(
            nearest(&schedule, t, Direction::Forward),
            Some(at(2001, 1, 1, 11, 30, 0, 0))
        );
    }

    #[test]
    fn backward_lands_on_last_matching_millisecond() {
        let schedule = merged("*:30:*.*");
        let t = at(2001, 1, 1, 10, 29, 0, 0);
        assert_eq!(
            nearest(&schedule, t, Direction::Backward),
            Some(at(2001, 1, 1, 9, 30, 59, 999))
        );
    }

    #[test]
    fn month_carry_rolls_into_next_year() {
        let schedule = merged("*.3.15 12:00:00");
        let t = at(2001, 7, 1, 0, 0, 0, 0);
        assert_eq!(
            nearest(&schedule, t, Direction::Forward),
            Some(at(2002, 3, 15, 12, 0, 0, 0))
        );
        assert_eq!(
            nearest(&schedule, t, Direction::Backward),
            Some(at(2001, 3, 15, 12, 0, 0, 0))
        );
    }

    #[test]
    fn last_day_sentinel_follows_month_length() {
        let schedule = merged("*.*.32 00:00:00");
        let t = at(2004, 2, 1, 0, 0, 0, 1);
        assert_eq!(
            nearest(&schedule, t, Direction::Forward),
            Some(at(2004, 2, 29, 0, 0, 0, 0))
        );
        let t = at(2001, 4, 15, 0, 0, 0, 0);
        assert_eq!(
            nearest(&schedule, t, Direction::Backward),
            Some(at(2001, 3, 31, 0, 0, 0, 0))
        );
    }

    #[test]
    fn day_thirty_one_skips_short_months() {
        let schedule = merged("*.*.31 00:00:00");
        let t = at(2001, 4, 1, 0, 0, 0, 0);
        assert_eq!(
            nearest(&schedule, t, Direction::Forward),
            Some(at(2001, 5, 31, 0, 0, 0, 0))
        );
    }

    #[test]
    fn day_of_week_and_day_must_agree() {
        // Friday the 13th
        let schedule = merged("*.*.13 5 00:00:00");
        let t = at(2001, 1, 1, 0, 0, 0, 0);
        assert_eq!(
            nearest(&schedule, t, Direction::Forward),
            Some(at(2001, 4, 13, 0, 0, 0, 0))
        );
        assert_eq!(
            nearest(&schedule, t, Direction::Backward),
            Some(at(2000, 10, 13, 0, 0, 0, 0))
        );
    }

    #[test]
    fn impossible_day_exhausts_the_domain() {
        let schedule = merged("*.2.30 00:00:00");
        let t = at(2001, 1, 1, 0, 0, 0, 0);
        assert_eq!(nearest(&schedule, t, Direction::Forward), None);
        assert_eq!(nearest(&schedule, t, Direction::Backward), None);
    }

    #[test]
    fn search_stops_at_domain_edges() {
        let schedule = merged("10:00:00");
        assert_eq!(
            nearest(&schedule, at(2100, 12, 31, 10, 0, 0, 1), Direction::Forward),
            None
        );
        assert_eq!(
            nearest(&schedule, at(2000, 1, 1, 9, 59, 59, 999), Direction::Backward),
            None
        );
    }

    #[test]
    fn instants_outside_the_domain_jump_into_it() {
        let schedule = merged("2050.*.* 10:00:00");
        assert_eq!(
            nearest(&schedule, at(1990, 6, 1, 0, 0, 0, 0), Direction::Forward),
            Some(at(2050, 1, 1, 10, 0, 0, 0))
        );
        assert_eq!(
            nearest(&schedule, at(2200, 6, 1, 0, 0, 0, 0), Direction::Backward),
            Some(at(2050, 12, 31, 10, 0, 0, 0))
        );
    }

    #[test]
    fn sub_millisecond_input_is_aligned_by_direction() {
        let schedule = merged("*:*:*.*");
        let t = at(2001, 1, 1, 0, 0, 0, 5) + Duration::microseconds(300);
        assert_eq!(
            nearest(&schedule, t, Direction::Forward),
            Some(at(2001, 1, 1, 0, 0, 0, 6))
        );
        assert_eq!(
            nearest(&schedule, t, Direction::Backward),
            Some(at(2001, 1, 1, 0, 0, 0, 5))
        );
    }

    #[test]
    fn matches_checks_every_field() {
        let schedule = merged("*.9.*/2 1-5 10:00:00.000");
        assert!(matches(&schedule, at(2001, 9, 3, 10, 0, 0, 0)));
        assert!(!matches(&schedule, at(2001, 9, 1, 10, 0, 0, 0)));
        assert!(!matches(&schedule, at(2001, 9, 4, 10, 0, 0, 0)));
        assert!(!matches(&schedule, at(2001, 9, 3, 10, 0, 0, 1)));
    }
}
