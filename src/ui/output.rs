//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag. Status
//! goes to stdout, errors and warnings to stderr.

use std::fmt::{Display, Write as _};

use crate::announce::{Announcement, Urgency};
use crate::core::board::Board;
use crate::core::types::CardId;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print an announcement the way a screen reader would hear it.
///
/// Assertive announcements are shown even in quiet mode.
pub fn announcement(announcement: &Announcement, verbosity: Verbosity) {
    match announcement.urgency {
        Urgency::Polite => print(&announcement.message, verbosity),
        Urgency::Assertive => eprintln!("{}", announcement.message),
    }
}

/// Render a board as text, one column per block.
///
/// ```text
/// Monday (2025-03-10)
///   1. Laundry <c-1>
///   2. Dentist <c-2> [pinned]
/// Tuesday (2025-03-11)
///   (empty)
/// ```
///
/// The `highlight` card is marked with an arrow.
pub fn format_board(board: &Board, highlight: Option<&CardId>) -> String {
    let mut out = String::new();
    for column in board.columns() {
        let _ = writeln!(out, "{} ({})", column.label(), column.id);
        if column.is_empty() {
            out.push_str("  (empty)\n");
            continue;
        }
        for (i, card) in column.items.iter().enumerate() {
            let marker = if Some(&card.id) == highlight { "->" } else { "  " };
            let _ = write!(out, "{}{}. {} <{}>", marker, i + 1, card.title, card.id);
            if card.pinned {
                out.push_str(" [pinned]");
            }
            if card.disabled {
                out.push_str(" [disabled]");
            }
            out.push('\n');
        }
    }
    out
}
