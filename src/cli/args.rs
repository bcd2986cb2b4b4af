//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--file <path>`: Board file (default `weekboard.json`)
//! - `--config <path>`: Config file instead of the standard locations
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::drag::resolve::Direction;

/// WeekBoard - plan a week of cards from the terminal
#[derive(Parser, Debug)]
#[command(name = "weekboard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Board file to operate on
    #[arg(long, global = true, default_value = "weekboard.json")]
    pub file: PathBuf,

    /// Config file to use instead of the standard locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty board for a week
    #[command(after_help = "\
EXAMPLES:
    # Board for the current week
    weekboard init

    # Board for the week containing a date
    weekboard init --week 2026-10-14")]
    Init {
        /// Any date in the week (defaults to today)
        #[arg(long)]
        week: Option<NaiveDate>,

        /// Overwrite an existing board file
        #[arg(long)]
        force: bool,
    },

    /// Add a card to a day
    Add {
        /// Day to add the card to
        #[arg(long)]
        day: NaiveDate,

        /// Card title
        title: String,

        /// Card id (generated when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Keep the card in its day
        #[arg(long)]
        pinned: bool,
    },

    /// Print the board
    Show,

    /// Drag a card to another position
    #[command(after_help = "\
EXAMPLES:
    # Move card c-1 to the end of Tuesday
    weekboard move c-1 --to tue

    # Move card c-1 to the top of 2026-10-14
    weekboard move c-1 --to 2026-10-14 --index 0")]
    Move {
        /// Card id
        card: String,

        /// Target column: id, date, or day name
        #[arg(long)]
        to: String,

        /// Zero-based index in the target column (defaults to the end)
        #[arg(long)]
        index: Option<usize>,
    },

    /// Drag a card with keyboard steps
    #[command(after_help = "\
EXAMPLES:
    # One day later, one position up
    weekboard step c-1 right up")]
    Step {
        /// Card id
        card: String,

        /// Steps to take: up, down, left, right
        #[arg(required = true)]
        directions: Vec<Direction>,
    },

    /// Verify the board file and print its fingerprint
    Check,
}
