// tests/parser_tests.rs

use cadence::syntax::{parse, parse_field};
use cadence::{ErrorCategory, ErrorKind, Field, PatternEntry};

// A helper to parse a single field and fail loudly on error.
fn entries(text: &str, field: Field) -> Vec<PatternEntry> {
    parse_field(text, field).unwrap_or_else(|e| panic!("'{}' failed: {}", text, e))
}

fn category(text: &str, field: Field) -> ErrorCategory {
    parse_field(text, field)
        .expect_err(&format!("'{}' should not parse", text))
        .category()
}

// ---
// Field syntax
// ---

#[test]
fn test_parse_list_of_points_ranges_and_steps() {
    assert_eq!(
        entries("1,2,3-5,10-20/3", Field::Minute),
        vec![
            PatternEntry::point(1),
            PatternEntry::point(2),
            PatternEntry::range(3, 5),
            PatternEntry::stepped_range(10, 20, 3),
        ]
    );
}

#[test]
fn test_parse_wildcards() {
    assert_eq!(entries("*", Field::Hour), vec![PatternEntry::ALWAYS]);
    assert_eq!(entries("*/24", Field::Minute), vec![PatternEntry::every(24)]);
}

#[test]
fn test_parse_open_ended_step() {
    assert_eq!(
        entries("1/24", Field::Minute),
        vec![PatternEntry::new(Some(1), None, Some(24))]
    );
    assert_eq!(
        entries("1-15/24", Field::Minute),
        vec![PatternEntry::stepped_range(1, 15, 24)]
    );
}

#[test]
fn test_round_trip_through_display() {
    for text in ["*", "*/5", "7", "7/5", "3-9", "3-9/2", "1,2,3-5,10-20/3"] {
        let parsed = entries(text, Field::Second);
        let rendered: Vec<String> = parsed.iter().map(|e| e.to_string()).collect();
        assert_eq!(rendered.join(","), text);
    }
}

#[test]
fn test_rejects_malformed_fields() {
    for text in ["aasg0", "1-", "-10", "1-a", "*/*", "1-15-*/12", "-*/12", "", "1,", " 1"] {
        assert_eq!(category(text, Field::Minute), ErrorCategory::Grammar, "{:?}", text);
    }
}

#[test]
fn test_rejects_mixed_bare_wildcard() {
    assert_eq!(category("*,*", Field::Minute), ErrorCategory::AmbiguousWildcard);
    assert_eq!(category("*,*/12", Field::Minute), ErrorCategory::AmbiguousWildcard);
    assert_eq!(category("1,*", Field::Minute), ErrorCategory::AmbiguousWildcard);
}

#[test]
fn test_rejects_zero_step_and_reversed_range() {
    assert_eq!(category("*/0", Field::Hour), ErrorCategory::Bounds);
    assert_eq!(category("20-10", Field::Hour), ErrorCategory::Grammar);
}

// ---
// Whole patterns
// ---

#[test]
fn test_parse_full_pattern() {
    let format = parse("2050.01-06.32 1-5 10:00:00.500").unwrap();
    assert_eq!(format.years, vec![PatternEntry::point(2050)]);
    assert_eq!(format.months, vec![PatternEntry::range(1, 6)]);
    assert_eq!(format.days, vec![PatternEntry::point(32)]);
    assert_eq!(format.days_of_week, vec![PatternEntry::range(1, 5)]);
    assert_eq!(format.hours, vec![PatternEntry::point(10)]);
    assert_eq!(format.milliseconds, vec![PatternEntry::point(500)]);
}

#[test]
fn test_all_six_layouts_parse() {
    for text in [
        "2001.02.03 4 10:00:00.000",
        "2001.02.03 10:00:00.000",
        "10:00:00.000",
        "2001.02.03 4 10:00:00",
        "2001.02.03 10:00:00",
        "10:00:00",
    ] {
        assert!(parse(text).is_ok(), "{:?}", text);
    }
}

#[test]
fn test_day_of_week_without_date() {
    let format = parse("1-5 10:00:00").unwrap();
    assert_eq!(format.days_of_week, vec![PatternEntry::range(1, 5)]);
    assert_eq!(format.days, vec![PatternEntry::ALWAYS]);
}

#[test]
fn test_leading_zeros_are_plain_numbers() {
    let format = parse("*.*.01 01:30:00").unwrap();
    assert_eq!(format.days, vec![PatternEntry::point(1)]);
    assert_eq!(format.hours, vec![PatternEntry::point(1)]);
    assert_eq!(format.minutes, vec![PatternEntry::point(30)]);
}

#[test]
fn test_bounds_errors_point_at_the_value() {
    let err = parse("2050.15.03 10:00:00.000").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::OutOfBounds {
            field: Field::Month,
            value: 15,
            ..
        }
    ));
    assert_eq!(err.snippet(), "15");

    let err = parse("*.*.48 10:00:00.000").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::OutOfBounds {
            field: Field::Day,
            value: 48,
            ..
        }
    ));

    for text in ["1800.01.01 00:00:00", "2050.04.48 00:00:00", "2050.04.04 7 00:00:00", "24:00:00"] {
        assert_eq!(parse(text).unwrap_err().category(), ErrorCategory::Bounds, "{:?}", text);
    }
}

#[test]
fn test_wildcard_error_in_full_pattern() {
    let err = parse("*,* 10:00:00.000").unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::AmbiguousWildcard {
            field: Field::DayOfWeek
        }
    );
}

#[test]
fn test_grammar_errors_carry_a_code() {
    let err = parse("10:00").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Grammar);
    assert_eq!(err.diagnostic_info.error_code, "cadence::parse::syntax");
}
