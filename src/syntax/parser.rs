//! Cadence Parser
//!
//! Converts a schedule pattern into a [`ScheduleFormat`]. The grammar lives in
//! `grammar.pest`; this module walks the resulting pairs, parses numbers, and
//! runs the format validator on each field as soon as its entries exist, so a
//! bad value is reported before anything else is built.

use pest::error::{Error, ErrorVariant, InputLocation};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use tracing::debug;

use crate::errors::{ErrorKind, ErrorReporting, PatternContext, ScheduleError, SourceContext};
use crate::format::{Field, PatternEntry, ScheduleFormat};
use crate::syntax::validator::check_field;
use crate::syntax::{to_source_span, Span, Spanned};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct PatternParser;

const DATE_FIELDS: [Field; 3] = [Field::Year, Field::Month, Field::Day];
const DAY_OF_WEEK_FIELDS: [Field; 1] = [Field::DayOfWeek];
const TIME_FIELDS: [Field; 4] = [Field::Hour, Field::Minute, Field::Second, Field::Millisecond];

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse a full schedule pattern.
///
/// Omitted date and day-of-week segments match everything; omitted
/// milliseconds mean `0`.
pub fn parse(source_text: &str) -> Result<ScheduleFormat, ScheduleError> {
    let ctx = PatternContext::new(SourceContext::from_pattern(source_text), "parse");

    let pattern = PatternParser::parse(Rule::pattern, source_text)
        .map_err(|e| convert_parse_error(e, &ctx))?
        .next()
        .ok_or_else(|| ctx.syntax("a schedule pattern", "nothing", ctx.source.full_span()))?;

    let mut format = ScheduleFormat::always();
    format.milliseconds = vec![PatternEntry::point(0)];

    for part in pattern.into_inner() {
        match part.as_rule() {
            Rule::date => build_segment(part, &DATE_FIELDS, &mut format, &ctx)?,
            Rule::day_of_week => build_segment(part, &DAY_OF_WEEK_FIELDS, &mut format, &ctx)?,
            Rule::time => build_segment(part, &TIME_FIELDS, &mut format, &ctx)?,
            Rule::EOI => {}
            rule => return Err(unexpected_rule(rule, &part, &ctx)),
        }
    }

    debug!(pattern = source_text, "parsed schedule pattern");
    Ok(format)
}

/// Parse the text of a single field, e.g. `1,2,3-5,10-20/3`.
pub fn parse_field(source_text: &str, field: Field) -> Result<Vec<PatternEntry>, ScheduleError> {
    let ctx = PatternContext::new(SourceContext::from_pattern(source_text), "parse");

    let single = PatternParser::parse(Rule::single_field, source_text)
        .map_err(|e| convert_parse_error(e, &ctx))?
        .next()
        .ok_or_else(|| ctx.syntax("a field", "nothing", ctx.source.full_span()))?;

    let field_pair = single
        .into_inner()
        .find(|p| p.as_rule() == Rule::field)
        .ok_or_else(|| ctx.syntax("a field", "nothing", ctx.source.full_span()))?;

    build_field(field_pair, field, &ctx)
}

// ============================================================================
// BUILDERS
// ============================================================================

fn build_segment(
    pair: Pair<Rule>,
    fields: &[Field],
    format: &mut ScheduleFormat,
    ctx: &PatternContext,
) -> Result<(), ScheduleError> {
    for (field_pair, &field) in pair.into_inner().zip(fields) {
        *format.entries_mut(field) = build_field(field_pair, field, ctx)?;
    }
    Ok(())
}

fn build_field(
    pair: Pair<Rule>,
    field: Field,
    ctx: &PatternContext,
) -> Result<Vec<PatternEntry>, ScheduleError> {
    let spanned: Vec<Spanned<PatternEntry>> = pair
        .into_inner()
        .map(|p| build_entry(p, ctx))
        .collect::<Result<_, _>>()?;

    let entries: Vec<PatternEntry> = spanned.iter().map(|s| s.value).collect();

    check_field(field, &entries)
        .map_err(|v| ctx.report(v.kind, to_source_span(spanned[v.entry].span)))?;

    Ok(entries)
}

fn build_entry(pair: Pair<Rule>, ctx: &PatternContext) -> Result<Spanned<PatternEntry>, ScheduleError> {
    let span = get_span(&pair);
    let mut entry = PatternEntry::ALWAYS;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::wildcard => {}
            Rule::range => {
                let mut numbers = part.into_inner();
                entry.begin = numbers.next().map(|n| parse_number(&n, ctx)).transpose()?;
                entry.end = numbers.next().map(|n| parse_number(&n, ctx)).transpose()?;
            }
            Rule::step => {
                entry.step = part
                    .into_inner()
                    .next()
                    .map(|n| parse_number(&n, ctx))
                    .transpose()?;
            }
            rule => return Err(unexpected_rule(rule, &part, ctx)),
        }
    }

    Ok(Spanned { value: entry, span })
}

fn parse_number(pair: &Pair<Rule>, ctx: &PatternContext) -> Result<u64, ScheduleError> {
    let text = pair.as_str();
    text.parse::<u64>().map_err(|_| {
        ctx.report(
            ErrorKind::NumberOverflow { value: text.into() },
            to_source_span(get_span(pair)),
        )
    })
}

// ============================================================================
// UTILITIES
// ============================================================================

fn get_span(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

fn describe_rule(rule: &Rule) -> &'static str {
    match rule {
        Rule::EOI => "end of pattern",
        Rule::number | Rule::range => "a number",
        Rule::wildcard => "'*'",
        Rule::step => "'/'",
        Rule::entry | Rule::field | Rule::single_field => "a field entry",
        Rule::date => "a date",
        Rule::day_of_week => "a day of week",
        Rule::time => "a time",
        Rule::pattern => "a schedule pattern",
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn unexpected_rule(rule: Rule, pair: &Pair<Rule>, ctx: &PatternContext) -> ScheduleError {
    ctx.syntax(
        "a schedule pattern",
        &format!("{:?}", rule),
        to_source_span(get_span(pair)),
    )
}

fn convert_parse_error(error: Error<Rule>, ctx: &PatternContext) -> ScheduleError {
    let start = match error.location {
        InputLocation::Pos(pos) => pos,
        InputLocation::Span((start, _)) => start,
    };

    let expected = match &error.variant {
        ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
            let mut names: Vec<&str> = positives.iter().map(describe_rule).collect();
            names.dedup();
            names.join(" or ")
        }
        ErrorVariant::ParsingError { .. } => "a schedule pattern".to_string(),
        ErrorVariant::CustomError { message } => message.clone(),
    };

    let next_char = ctx
        .source
        .content
        .get(start..)
        .and_then(|rest| rest.chars().next());

    let (found, end) = match next_char {
        Some(c) => (format!("'{}'", c), start + c.len_utf8()),
        None => ("end of pattern".to_string(), start),
    };

    ctx.syntax(&expected, &found, to_source_span(Span { start, end }))
}
