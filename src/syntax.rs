//! Syntax module for schedule patterns
//!
//! Turns pattern text into a validated [`ScheduleFormat`](crate::format::ScheduleFormat)
//! and keeps source positions around for error reporting.

pub mod parser;
pub mod validator;

pub use parser::{parse, parse_field};
pub use validator::{check_field, validate_format, Violation};

/// Represents a span in the pattern text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Wrapper for carrying source span information with any value
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

/// Converts a pattern Span to a miette SourceSpan.
pub fn to_source_span(span: Span) -> miette::SourceSpan {
    miette::SourceSpan::from(span.start..span.end)
}
