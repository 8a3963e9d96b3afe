//! Handles all user-facing output for the CLI.
//!
//! Instants and confirmations go to stdout, colored only when stdout is a
//! terminal. Errors are rendered by `miette` in [`crate::errors::print_error`].

use chrono::NaiveDateTime;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Layout used for every printed instant.
pub const INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

fn stdout() -> StandardStream {
    let choice = if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Prints one instant per line as each arrives. Returns how many were printed.
pub fn print_instants(instants: impl IntoIterator<Item = NaiveDateTime>) -> std::io::Result<usize> {
    let mut out = stdout();
    let mut printed = 0;
    for instant in instants {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "{}", instant.format(INSTANT_FORMAT))?;
        out.reset()?;
        writeln!(out)?;
        printed += 1;
    }
    Ok(printed)
}

/// Prints the confirmation for a valid pattern.
pub fn print_ok() -> std::io::Result<()> {
    let mut out = stdout();
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    write!(out, "ok")?;
    out.reset()?;
    writeln!(out)
}

/// Pretty-prints any serializable value as JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value)?;
    let mut out = stdout();
    writeln!(out, "{}", json)?;
    Ok(())
}
