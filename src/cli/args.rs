//! Defines the command-line arguments and subcommands for the Cadence CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use chrono::{Local, NaiveDateTime};
use clap::{Args, Parser, Subcommand};

/// Accepted `--from` layouts, tried in order.
const INSTANT_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "cadence",
    version,
    about = "Find the instants matching a cron-like schedule pattern."
)]
pub struct CadenceArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the next matching instants.
    Next(QueryArgs),
    /// Print the previous matching instants.
    Prev(QueryArgs),
    /// Check that a pattern is valid.
    Check {
        /// The schedule pattern, e.g. "*.*.01 01:30:00".
        #[arg(required = true)]
        pattern: String,
    },
    /// Show the parsed pattern as JSON.
    Ast {
        /// The schedule pattern to parse.
        #[arg(required = true)]
        pattern: String,
    },
}

/// Arguments shared by `next` and `prev`.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// The schedule pattern, e.g. "*.*.01 01:30:00".
    #[arg(required = true)]
    pub pattern: String,
    /// Starting instant, `YYYY-MM-DDTHH:MM:SS[.fff]`. Defaults to now.
    #[arg(long, value_parser = parse_instant)]
    pub from: Option<NaiveDateTime>,
    /// How many instants to print.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub count: u32,
    /// Let the starting instant itself match.
    #[arg(long)]
    pub inclusive: bool,
}

impl QueryArgs {
    pub fn start(&self) -> NaiveDateTime {
        self.from.unwrap_or_else(|| Local::now().naive_local())
    }
}

fn parse_instant(text: &str) -> Result<NaiveDateTime, String> {
    INSTANT_FORMATS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
        .ok_or_else(|| format!("'{}' is not an instant like 2001-01-01T10:00:00.000", text))
}
