//! move and step commands - Drag a card through the engine
//!
//! Both commands run a full drag session against the board file: pick the
//! card up, choose the target, let go, and wait for the commit to settle.
//! Pinned cards may not leave their day.

use anyhow::{anyhow, bail, Result};

use super::{find_column, open_host};
use crate::announce::{Announcement, AnnouncementSink, TracingSink};
use crate::cli::Context;
use crate::core::types::{CardId, Slot};
use crate::drag::policy::PinnedStayPut;
use crate::drag::resolve::Direction;
use crate::drag::EndDrag;
use crate::ui::output;
use crate::weekboard::WeekBoard;

fn open_board(ctx: &Context) -> Result<WeekBoard> {
    let host = open_host(ctx)?;
    let board = host.load()?;
    let verbosity = ctx.verbosity;

    Ok(WeekBoard::builder(board, host)
        .policy(PinnedStayPut)
        .sink(move |a: &Announcement| {
            TracingSink.announce(a);
            output::announcement(a, verbosity);
        })
        .config(ctx.config.clone())
        .build())
}

/// Move `card` to `index` of the column named `to`.
///
/// This is a synchronous wrapper that uses tokio to run the async implementation.
pub fn move_card(ctx: &Context, card: &str, to: &str, index: Option<usize>) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(move_card_async(ctx, card, to, index))
}

async fn move_card_async(
    ctx: &Context,
    card: &str,
    to: &str,
    index: Option<usize>,
) -> Result<()> {
    let mut board = open_board(ctx)?;
    let card = CardId::new(card)?;

    board.start_drag(&card)?;
    let column = find_column(&board.board(), to)?;
    // retarget clamps, so "past the end" lands on the last reachable index
    board.retarget(Slot::new(column, index.unwrap_or(usize::MAX)))?;

    finish(ctx, &mut board, &card).await
}

/// Drag `card` by keyboard steps.
pub fn step_card(ctx: &Context, card: &str, directions: &[Direction]) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(step_card_async(ctx, card, directions))
}

async fn step_card_async(ctx: &Context, card: &str, directions: &[Direction]) -> Result<()> {
    let mut board = open_board(ctx)?;
    let card = CardId::new(card)?;

    board.start_drag(&card)?;
    for direction in directions {
        board.step_target(*direction)?;
    }

    finish(ctx, &mut board, &card).await
}

async fn finish(ctx: &Context, board: &mut WeekBoard, card: &CardId) -> Result<()> {
    match board.end_drag()? {
        EndDrag::Unchanged => {
            output::print(format!("{} is already there", card), ctx.verbosity);
            Ok(())
        }
        EndDrag::Rejected => bail!("{} is pinned to its day", card),
        EndDrag::Dispatched(op_id) => {
            tracing::debug!(op_id = op_id.short(), "waiting for commit");
            let settlement = board
                .next_settlement()
                .await
                .ok_or_else(|| anyhow!("commit for {} never settled", card))?;

            if let Some(message) = settlement.failure_message() {
                bail!(message);
            }
            if ctx.verbosity != output::Verbosity::Quiet {
                print!("{}", output::format_board(&board.board(), Some(card)));
            }
            Ok(())
        }
    }
}
