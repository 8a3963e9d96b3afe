//! Interval merger.
//!
//! Collapses each field's entry list into one [`Interval`]. Entries are OR-ed
//! together: a point is allowed if any entry allows it.

use tracing::debug;

use crate::errors::ScheduleError;
use crate::format::{Field, PatternEntry, ScheduleFormat};
use crate::interval::Interval;
use crate::syntax::validate_format;

/// One [`Interval`] per field, built once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedSchedule {
    pub years: Interval,
    pub months: Interval,
    pub days: Interval,
    pub days_of_week: Interval,
    pub hours: Interval,
    pub minutes: Interval,
    pub seconds: Interval,
    pub milliseconds: Interval,
}

impl MergedSchedule {
    /// Validates `format` and merges every field.
    pub fn from_format(format: &ScheduleFormat) -> Result<Self, ScheduleError> {
        validate_format(format)?;
        Ok(Self::from_validated(format))
    }

    /// Merges a format that has already passed validation.
    pub(crate) fn from_validated(format: &ScheduleFormat) -> Self {
        let field = |f: Field| {
            let (begin, end) = f.domain();
            merge(format.entries(f), begin, end)
        };

        let merged = Self {
            years: field(Field::Year),
            months: field(Field::Month),
            days: field(Field::Day),
            days_of_week: field(Field::DayOfWeek),
            hours: field(Field::Hour),
            minutes: field(Field::Minute),
            seconds: field(Field::Second),
            milliseconds: field(Field::Millisecond),
        };
        debug!(
            years = merged.years.allowed_points().count(),
            months = merged.months.allowed_points().count(),
            days = merged.days.allowed_points().count(),
            "merged schedule"
        );
        merged
    }

    /// Every point of every field allowed.
    pub fn always() -> Self {
        let field = |f: Field| {
            let (begin, end) = f.domain();
            Interval::allowed(begin, end)
        };
        Self {
            years: field(Field::Year),
            months: field(Field::Month),
            days: field(Field::Day),
            days_of_week: field(Field::DayOfWeek),
            hours: field(Field::Hour),
            minutes: field(Field::Minute),
            seconds: field(Field::Second),
            milliseconds: field(Field::Millisecond),
        }
    }

    pub fn interval(&self, field: Field) -> &Interval {
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
}

/// Merges one field's entries over the domain `[begin, end]`.
///
/// Entries must already be validated: every concrete value lies in the domain
/// and every step is at least 1.
pub(crate) fn merge(entries: &[PatternEntry], begin: u32, end: u32) -> Interval {
    if let [only] = entries {
        if only.is_wildcard() {
            return Interval::allowed(begin, end);
        }
    }

    let mut allowed = vec![false; (end - begin) as usize + 1];

    for entry in entries {
        let (b, e, s) = normalize(entry, begin as u64, end as u64);
        let mut point = b;
        while point <= e {
            allowed[(point - begin as u64) as usize] = true;
            point = match point.checked_add(s) {
                Some(next) => next,
                None => break,
            };
        }
    }

    Interval::from_points(begin, end, allowed)
}

/// Concrete `(begin, end, step)` of an entry.
fn normalize(entry: &PatternEntry, domain_begin: u64, domain_end: u64) -> (u64, u64, u64) {
    match (entry.begin, entry.end, entry.step) {
        (None, _, step) => (domain_begin, domain_end, step.unwrap_or(1)),
        (Some(b), None, None) => (b, b, 1),
        // `b/s` counts from `b` to the end of the domain, as `b-max/s` would.
        (Some(b), None, Some(s)) => (b, domain_end, s),
        (Some(b), Some(e), step) => (b, e, step.unwrap_or(1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(interval: &Interval) -> Vec<u32> {
        interval.allowed_points().collect()
    }

    #[test]
    fn bare_wildcard_allows_whole_domain() {
        let interval = merge(&[PatternEntry::ALWAYS], 0, 23);
        assert_eq!(points(&interval).len(), 24);
    }

    #[test]
    fn stepped_wildcard_starts_at_domain_begin() {
        let interval = merge(&[PatternEntry::every(4)], 0, 23);
        assert_eq!(points(&interval), vec![0, 4, 8, 12, 16, 20]);

        let odd_days = merge(&[PatternEntry::every(2)], 1, 32);
        assert_eq!(points(&odd_days).first(), Some(&1));
        assert!(odd_days.is_allowed(31));
        assert!(!odd_days.is_allowed(32));
    }

    #[test]
    fn list_of_points_and_ranges_is_a_union() {
        let entries = [
            PatternEntry::point(1),
            PatternEntry::point(2),
            PatternEntry::range(3, 5),
            PatternEntry::stepped_range(10, 20, 3),
        ];
        let interval = merge(&entries, 0, 59);
        assert_eq!(points(&interval), vec![1, 2, 3, 4, 5, 10, 13, 16, 19]);
    }

    #[test]
    fn overlapping_entries_never_unmark() {
        let entries = [PatternEntry::range(0, 10), PatternEntry::stepped_range(0, 10, 5)];
        let interval = merge(&entries, 0, 59);
        assert_eq!(points(&interval), (0..=10).collect::<Vec<_>>());
    }

    #[test]
    fn open_ended_step_runs_to_domain_end() {
        let interval = merge(&[PatternEntry::new(Some(1), None, Some(24))], 0, 59);
        assert_eq!(points(&interval), vec![1, 25, 49]);
    }

    #[test]
    fn huge_step_yields_only_the_start() {
        let interval = merge(&[PatternEntry::stepped_range(0, 999, u64::MAX)], 0, 999);
        assert_eq!(points(&interval), vec![0]);
    }

    #[test]
    fn from_format_rejects_invalid_entries() {
        let mut format = ScheduleFormat::always();
        format.hours = vec![PatternEntry::ALWAYS, PatternEntry::point(3)];
        assert!(MergedSchedule::from_format(&format).is_err());
    }
}
