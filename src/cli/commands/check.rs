//! check command - Verify the board file

use anyhow::{bail, Result};

use super::open_host;
use crate::cli::Context;
use crate::core::board::Board;
use crate::core::verify::verify_columns;
use crate::ui::output;

/// Verify the placement invariant and print the fingerprint.
///
/// The file is read without the checks a normal load applies, so every
/// duplicate column or card is reported, not only the first.
pub fn check(ctx: &Context) -> Result<()> {
    let columns = open_host(ctx)?.load_columns()?;

    let result = verify_columns(&columns);
    if !result.ok {
        for error in &result.errors {
            output::error(error);
        }
        bail!("board has {} problem(s)", result.errors.len());
    }

    let board = Board::new(columns)?;
    output::print(
        format!(
            "ok: {} columns, {} cards, fingerprint {}",
            board.columns().len(),
            board.card_count(),
            board.fingerprint().short()
        ),
        ctx.verbosity,
    );
    Ok(())
}
