//! add command - Append a card to a day

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use uuid::Uuid;

use super::open_host;
use crate::cli::Context;
use crate::core::board::{BoardError, Card};
use crate::core::types::{CardId, ColumnId};
use crate::ui::output;

/// Add a card titled `title` to the end of `day`.
pub fn add(
    ctx: &Context,
    day: NaiveDate,
    title: &str,
    id: Option<&str>,
    pinned: bool,
) -> Result<()> {
    let host = open_host(ctx)?;

    let id = match id {
        Some(id) => CardId::new(id)?,
        None => CardId::new(format!("c-{}", &Uuid::new_v4().simple().to_string()[..8]))?,
    };
    let mut card = Card::new(id.clone(), title);
    if pinned {
        card = card.pinned();
    }

    let column = ColumnId::for_date(day);
    host.update(|board| Ok(board.insert_card(&column, card)?))
        .map_err(|e| match e {
            crate::host::file::StoreError::Board(BoardError::ColumnNotFound(_)) => {
                anyhow::anyhow!("{} is not on this week's board", day)
            }
            other => other.into(),
        })
        .context("failed to add card")?;

    output::print(format!("Added {} to {}", id, day), ctx.verbosity);
    Ok(())
}
