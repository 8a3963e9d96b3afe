//! Cadence Error Handling - Unified Encapsulated API
//!
//! Every failure, whether the pattern text is malformed, a value falls outside
//! its field, or a query runs off the end of the year domain, is a single
//! [`ScheduleError`]. The error carries the pattern it came from so `miette`
//! can point at the offending substring.

use chrono::NaiveDateTime;
use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::format::{Field, LAST_DAY_OF_MONTH};
use crate::search::Direction;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// The pattern text an error refers to.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn from_pattern(content: impl Into<String>) -> Self {
        Self {
            name: "pattern".to_string(),
            content: content.into(),
        }
    }

    /// Used when a format was built in code rather than parsed from text.
    pub fn fallback(context: &str) -> Self {
        Self {
            name: "fallback".to_string(),
            content: context.to_string(),
        }
    }

    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }

    /// Span covering the whole pattern.
    pub fn full_span(&self) -> SourceSpan {
        SourceSpan::from(0..self.content.len())
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// The single error type: what went wrong, where, and how to help.
#[derive(Debug)]
pub struct ScheduleError {
    pub kind: ErrorKind,
    pub source_info: SourceInfo,
    pub diagnostic_info: DiagnosticInfo,
}

/// All failure modes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    // Grammar errors - the text is not a pattern
    #[error("syntax error: expected {expected}, found {found}")]
    Syntax { expected: String, found: String },
    #[error("syntax error: number '{value}' is too large")]
    NumberOverflow { value: String },
    #[error("syntax error: {field} range {begin}-{end} runs backwards")]
    ReversedRange { field: Field, begin: u64, end: u64 },

    // Bounds errors - the text is a pattern, but a value is impossible
    #[error("bounds error: {field} value {value} is outside {min}-{max}")]
    OutOfBounds {
        field: Field,
        min: u32,
        max: u32,
        value: u64,
    },
    #[error("bounds error: {field} step must be at least 1")]
    ZeroStep { field: Field },

    #[error("format error: bare wildcard '*' cannot be combined with other {field} entries")]
    AmbiguousWildcard { field: Field },

    // Query errors
    #[error("schedule error: no matching instant {direction} {from}")]
    Unsatisfiable {
        direction: Direction,
        from: NaiveDateTime,
    },
}

/// Coarse classification used by callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Grammar,
    Bounds,
    AmbiguousWildcard,
    Unsatisfiable,
}

#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
    pub phase: String,
}

#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Syntax { .. } | Self::NumberOverflow { .. } | Self::ReversedRange { .. } => {
                ErrorCategory::Grammar
            }
            Self::OutOfBounds { .. } | Self::ZeroStep { .. } => ErrorCategory::Bounds,
            Self::AmbiguousWildcard { .. } => ErrorCategory::AmbiguousWildcard,
            Self::Unsatisfiable { .. } => ErrorCategory::Unsatisfiable,
        }
    }

    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "syntax",
            Self::NumberOverflow { .. } => "number_overflow",
            Self::ReversedRange { .. } => "reversed_range",
            Self::OutOfBounds { .. } => "out_of_bounds",
            Self::ZeroStep { .. } => "zero_step",
            Self::AmbiguousWildcard { .. } => "ambiguous_wildcard",
            Self::Unsatisfiable { .. } => "unsatisfiable",
        }
    }

    fn help_text(&self) -> Option<String> {
        match self {
            Self::Syntax { .. } => Some(
                "patterns look like 'yyyy.MM.dd w HH:mm:ss.fff'; the date, day of week and milliseconds are optional"
                    .into(),
            ),
            Self::OutOfBounds {
                field: Field::Day, ..
            } => Some(format!(
                "days run from 1 to 31; use {} for the last day of the month",
                LAST_DAY_OF_MONTH
            )),
            Self::OutOfBounds {
                field, min, max, ..
            } => Some(format!("{} accepts values from {} to {}", field, min, max)),
            Self::ReversedRange { begin, end, .. } => {
                Some(format!("write the range as {}-{}", end, begin))
            }
            Self::AmbiguousWildcard { .. } => {
                Some("use '*' on its own, or a stepped wildcard such as '*/2'".into())
            }
            Self::Unsatisfiable { .. } => Some(
                "matches are only searched for between the years 2000 and 2100, and the search ran past that range"
                    .into(),
            ),
            Self::NumberOverflow { .. } | Self::ZeroStep { .. } => None,
        }
    }

    fn primary_label(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "unexpected input",
            Self::NumberOverflow { .. } => "number too large",
            Self::ReversedRange { .. } => "reversed range",
            Self::OutOfBounds { .. } => "out of bounds",
            Self::ZeroStep { .. } => "zero step",
            Self::AmbiguousWildcard { .. } => "ambiguous wildcard",
            Self::Unsatisfiable { .. } => "never matches",
        }
    }
}

impl ScheduleError {
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// The offending substring of the pattern.
    pub fn snippet(&self) -> &str {
        let content = self.source_info.source.inner();
        let start = self.source_info.primary_span.offset();
        let end = start + self.source_info.primary_span.len();
        content.get(start..end).unwrap_or_default()
    }
}

impl std::error::Error for ScheduleError {}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Diagnostic for ScheduleError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.kind.primary_label().to_string()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

// ============================================================================
// ERROR CONSTRUCTION
// ============================================================================

/// Context-aware error creation.
pub trait ErrorReporting {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> ScheduleError;

    fn syntax(&self, expected: &str, found: &str, span: SourceSpan) -> ScheduleError {
        self.report(
            ErrorKind::Syntax {
                expected: expected.into(),
                found: found.into(),
            },
            span,
        )
    }
}

/// Error context for one pattern in one phase (`parse`, `validate`, `search`).
pub struct PatternContext {
    pub source: SourceContext,
    pub phase: &'static str,
}

impl PatternContext {
    pub fn new(source: SourceContext, phase: &'static str) -> Self {
        Self { source, phase }
    }
}

impl ErrorReporting for PatternContext {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> ScheduleError {
        let error_code = format!("cadence::{}::{}", self.phase, kind.code_suffix());
        let help = kind.help_text();

        ScheduleError {
            kind,
            source_info: SourceInfo {
                source: self.source.to_named_source(),
                primary_span: span,
                phase: self.phase.to_string(),
            },
            diagnostic_info: DiagnosticInfo { help, error_code },
        }
    }
}

/// Placeholder span for errors not tied to a location in the pattern.
pub fn unspanned() -> SourceSpan {
    SourceSpan::from(0..0)
}

/// Prints a ScheduleError with full miette diagnostics.
pub fn print_error(error: ScheduleError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
