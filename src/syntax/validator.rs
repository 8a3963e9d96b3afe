//! # Format Validator
//!
//! Checks a field's entry list as soon as the parser has produced it:
//! - every concrete `begin`/`end` lies inside the field's domain;
//! - ranges run forwards and steps are at least 1;
//! - a bare `*` is the only entry of its field.
//!
//! The checks never touch source text. They report the index of the offending
//! entry and leave it to the caller to turn that into a spanned error.

use crate::errors::{unspanned, ErrorKind, ErrorReporting, PatternContext, ScheduleError, SourceContext};
use crate::format::{Field, PatternEntry, ScheduleFormat};

/// A rule broken by one entry of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ErrorKind,
    /// Index of the offending entry within the field.
    pub entry: usize,
}

/// Validates one field's entries.
pub fn check_field(field: Field, entries: &[PatternEntry]) -> Result<(), Violation> {
    for (index, entry) in entries.iter().enumerate() {
        check_entry(field, entry).map_err(|kind| Violation { kind, entry: index })?;
    }

    if entries.len() > 1 {
        if let Some(index) = entries.iter().position(PatternEntry::is_wildcard) {
            return Err(Violation {
                kind: ErrorKind::AmbiguousWildcard { field },
                entry: index,
            });
        }
    }

    Ok(())
}

fn check_entry(field: Field, entry: &PatternEntry) -> Result<(), ErrorKind> {
    let (min, max) = field.domain();

    if let (None, Some(end)) = (entry.begin, entry.end) {
        return Err(ErrorKind::Syntax {
            expected: "a range start".into(),
            found: format!("'-{}'", end),
        });
    }

    if entry.step == Some(0) {
        return Err(ErrorKind::ZeroStep { field });
    }

    for value in [entry.begin, entry.end].into_iter().flatten() {
        if value < min as u64 || value > max as u64 {
            return Err(ErrorKind::OutOfBounds {
                field,
                min,
                max,
                value,
            });
        }
    }

    if let (Some(begin), Some(end)) = (entry.begin, entry.end) {
        if end < begin {
            return Err(ErrorKind::ReversedRange { field, begin, end });
        }
    }

    Ok(())
}

/// Validates a whole format that was not produced from pattern text.
pub fn validate_format(format: &ScheduleFormat) -> Result<(), ScheduleError> {
    let ctx = PatternContext::new(SourceContext::fallback("schedule format"), "validate");
    for field in Field::ALL {
        check_field(field, format.entries(field)).map_err(|v| ctx.report(v.kind, unspanned()))?;
    }
    Ok(())
}
