//! show command - Print the board

use anyhow::Result;

use super::open_host;
use crate::cli::Context;
use crate::ui::output;

/// Print every column and its cards.
pub fn show(ctx: &Context) -> Result<()> {
    let board = open_host(ctx)?.load()?;
    // Printed even in quiet mode; the board is the output.
    print!("{}", output::format_board(&board, None));
    Ok(())
}
