//! Cadence: cron-like schedule patterns with nearest-instant search.
//!
//! A pattern such as `*.*.01 01:30:00` is parsed once into an immutable
//! [`Schedule`], which then answers "what is the closest matching instant at
//! or after / at or before `t`?" at millisecond resolution.

pub use crate::errors::{ErrorCategory, ErrorKind, ScheduleError};
pub use crate::format::{Field, PatternEntry, ScheduleFormat, LAST_DAY_OF_MONTH};
pub use crate::interval::Interval;
pub use crate::merge::MergedSchedule;
pub use crate::schedule::{Schedule, Upcoming};
pub use crate::search::Direction;

pub mod cli;
pub mod errors;
pub mod format;
pub mod interval;
pub mod merge;
pub mod schedule;
pub mod search;
pub mod syntax;
