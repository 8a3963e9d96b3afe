//! The Cadence Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use crate::cli::args::{CadenceArgs, Command, QueryArgs};
use crate::errors::print_error;
use crate::schedule::Schedule;
use crate::search::Direction;
use crate::ScheduleError;
use chrono::NaiveDateTime;
use clap::Parser;
use std::{iter, process};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    init_logging();
    let args = CadenceArgs::parse();

    let result = match args.command {
        Command::Next(query) => handle_query(&query, Direction::Forward),
        Command::Prev(query) => handle_query(&query, Direction::Backward),
        Command::Check { pattern } => {
            parse_or_exit(&pattern);
            output::print_ok().map_err(Into::into)
        }
        Command::Ast { pattern } => output::print_json(parse_or_exit(&pattern).format()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be set when `run` is driven from a test.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Handles `next` and `prev`.
fn handle_query(query: &QueryArgs, direction: Direction) -> Result<(), Box<dyn std::error::Error>> {
    let schedule = parse_or_exit(&query.pattern);
    let start = query.start();
    debug!(%start, ?direction, count = query.count, "running query");

    let instants = successive(&schedule, start, direction, query.count, query.inclusive)
        .unwrap_or_else(|e| exit_with(e));
    let printed = output::print_instants(instants)?;
    if printed < query.count as usize {
        warn!(printed, requested = query.count, "no further matches within the year domain");
    }
    Ok(())
}

/// Up to `count` successive matches from `start`, produced lazily. The first
/// may equal `start` only when `inclusive` is set.
///
/// Only a missing first match is an error. Once a later query fails the
/// sequence simply ends, as [`Schedule::upcoming`] does.
pub fn successive(
    schedule: &Schedule,
    start: NaiveDateTime,
    direction: Direction,
    count: u32,
    inclusive: bool,
) -> Result<impl Iterator<Item = NaiveDateTime> + '_, ScheduleError> {
    let first = match (direction, inclusive) {
        (Direction::Forward, true) => schedule.nearest_next(start),
        (Direction::Forward, false) => schedule.strict_next(start),
        (Direction::Backward, true) => schedule.nearest_prev(start),
        (Direction::Backward, false) => schedule.strict_prev(start),
    }?;

    let step = move |&previous: &NaiveDateTime| match direction {
        Direction::Forward => schedule.strict_next(previous).ok(),
        Direction::Backward => schedule.strict_prev(previous).ok(),
    };
    Ok(iter::successors(Some(first), step).take(count as usize))
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn parse_or_exit(pattern: &str) -> Schedule {
    Schedule::parse(pattern).unwrap_or_else(|e| exit_with(e))
}

fn exit_with(error: ScheduleError) -> ! {
    print_error(error);
    process::exit(1);
}
