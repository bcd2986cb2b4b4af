//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Reads or changes the board through the file host
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! `move` and `step` commit through the engine, which runs commits on tokio
//! tasks. Their handlers build a runtime and block on the async
//! implementation.

mod add;
mod check;
mod init;
mod move_cmd;
mod show;

pub use add::add;
pub use check::check;
pub use init::init;
pub use move_cmd::{move_card, step_card};
pub use show::show;

use anyhow::{anyhow, Result};

use super::args::Command;
use super::Context;
use crate::core::board::Board;
use crate::core::types::ColumnId;
use crate::host::file::FileHost;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Init { week, force } => init::init(ctx, week, force),
        Command::Add {
            day,
            title,
            id,
            pinned,
        } => add::add(ctx, day, &title, id.as_deref(), pinned),
        Command::Show => show::show(ctx),
        Command::Move { card, to, index } => move_cmd::move_card(ctx, &card, &to, index),
        Command::Step { card, directions } => move_cmd::step_card(ctx, &card, &directions),
        Command::Check => check::check(ctx),
    }
}

/// Open the board file, failing with a hint when it does not exist.
fn open_host(ctx: &Context) -> Result<FileHost> {
    let host = FileHost::new(&ctx.file);
    if !host.exists() {
        return Err(anyhow!(
            "no board at '{}'. Run 'weekboard init' first.",
            ctx.file.display()
        ));
    }
    Ok(host)
}

/// Find a column by id, or by the start of its label ("tue", "Tuesday").
fn find_column(board: &Board, name: &str) -> Result<ColumnId> {
    if let Some(column) = board.columns().iter().find(|c| c.id.as_str() == name) {
        return Ok(column.id.clone());
    }

    let wanted = name.to_lowercase();
    let matches: Vec<_> = board
        .columns()
        .iter()
        .filter(|c| wanted.len() >= 2 && c.label().to_lowercase().starts_with(&wanted))
        .collect();

    match matches.as_slice() {
        [one] => Ok(one.id.clone()),
        [] => Err(anyhow!("no column named '{}'", name)),
        _ => Err(anyhow!("'{}' matches more than one column", name)),
    }
}
