//! init command - Create an empty week board

use anyhow::{bail, Result};
use chrono::NaiveDate;

use crate::cli::Context;
use crate::core::board::Board;
use crate::host::file::FileHost;
use crate::ui::output;

/// Write an empty board for the week containing `week` (default today).
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `week` - Any date in the week
/// * `force` - Overwrite an existing board
pub fn init(ctx: &Context, week: Option<NaiveDate>, force: bool) -> Result<()> {
    let host = FileHost::new(&ctx.file);
    if host.exists() {
        if !force {
            bail!(
                "'{}' already exists. Use --force to replace it.",
                ctx.file.display()
            );
        }
        output::warn(
            format!("replacing the board at '{}'", ctx.file.display()),
            ctx.verbosity,
        );
    }

    let date = week.unwrap_or_else(|| chrono::Local::now().date_naive());
    let board = Board::week_of(date);
    host.save(&board)?;

    let first = board.columns().first().map(|c| c.id.to_string());
    output::print(
        format!(
            "Created week board starting {} at {}",
            first.unwrap_or_default(),
            ctx.file.display()
        ),
        ctx.verbosity,
    );
    Ok(())
}
