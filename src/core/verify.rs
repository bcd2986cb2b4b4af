//! core::verify
//!
//! Board invariant verification.
//!
//! # Checks
//!
//! - **Placement**: column ids unique, every card id in exactly one column
//!   at exactly one index
//! - **Conservation**: two snapshots hold the same set of cards (an
//!   operation never creates or destroys a card)
//!
//! # Invariants
//!
//! - Never mutates the board
//! - Must be deterministic

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use super::board::{Board, Column};
use super::types::{CardId, ColumnId};

/// Errors from verification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("column id appears {count} times: {column}")]
    DuplicateColumn { column: ColumnId, count: usize },

    #[error("card {card} appears {count} times")]
    DuplicateCard { card: CardId, count: usize },

    #[error("card {0} was lost")]
    CardLost(CardId),

    #[error("card {0} appeared from nowhere")]
    CardAppeared(CardId),
}

/// Result of verification.
#[derive(Debug)]
pub struct VerifyResult {
    /// Whether verification passed
    pub ok: bool,
    /// Errors found during verification
    pub errors: Vec<VerifyError>,
}

impl VerifyResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            ok: true,
            errors: vec![],
        }
    }

    /// Create a failed result with errors.
    pub fn failure(errors: Vec<VerifyError>) -> Self {
        Self { ok: false, errors }
    }

    fn from_errors(errors: Vec<VerifyError>) -> Self {
        if errors.is_empty() {
            Self::success()
        } else {
            Self::failure(errors)
        }
    }
}

/// Verify the placement invariant of a board, reporting every violation.
pub fn verify_board(board: &Board) -> VerifyResult {
    verify_columns(board.columns())
}

/// Verify columns that may not form a valid board, such as a damaged file.
pub fn verify_columns(columns: &[Column]) -> VerifyResult {
    let mut column_counts: HashMap<&ColumnId, usize> = HashMap::new();
    let mut card_counts: HashMap<&CardId, usize> = HashMap::new();

    for column in columns {
        *column_counts.entry(&column.id).or_default() += 1;
        for card in &column.items {
            *card_counts.entry(&card.id).or_default() += 1;
        }
    }

    let mut errors: Vec<VerifyError> = column_counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(column, count)| VerifyError::DuplicateColumn {
            column: column.clone(),
            count,
        })
        .collect();
    errors.extend(
        card_counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(card, count)| VerifyError::DuplicateCard {
                card: card.clone(),
                count,
            }),
    );
    errors.sort_by_key(|e| e.to_string());

    VerifyResult::from_errors(errors)
}

/// Verify that `after` holds exactly the cards of `before`.
pub fn verify_conserved(before: &Board, after: &Board) -> VerifyResult {
    let ids = |board: &Board| -> BTreeSet<CardId> {
        board
            .columns()
            .iter()
            .flat_map(|c| c.items.iter().map(|card| card.id.clone()))
            .collect()
    };
    let before = ids(before);
    let after = ids(after);

    let mut errors: Vec<VerifyError> = before
        .difference(&after)
        .cloned()
        .map(VerifyError::CardLost)
        .collect();
    errors.extend(after.difference(&before).cloned().map(VerifyError::CardAppeared));

    VerifyResult::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::board::{Card, Column};

    fn col(id: &str) -> ColumnId {
        ColumnId::new(id).unwrap()
    }

    fn c(id: &str) -> Card {
        Card::new(CardId::new(id).unwrap(), id)
    }

    #[test]
    fn valid_board_passes() {
        let board = Board::new(vec![
            Column::new(col("mon")).with_cards(vec![c("A"), c("B")]),
            Column::new(col("tue")),
        ])
        .unwrap();
        let result = verify_board(&board);
        assert!(result.ok);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn reports_every_duplicate() {
        let columns = vec![
            Column::new(col("mon")).with_cards(vec![c("A"), c("B")]),
            Column::new(col("tue")).with_cards(vec![c("A"), c("B"), c("A")]),
            Column::new(col("mon")),
        ];
        let result = verify_columns(&columns);
        assert!(!result.ok);
        assert_eq!(
            result.errors,
            vec![
                VerifyError::DuplicateCard {
                    card: CardId::new("A").unwrap(),
                    count: 3
                },
                VerifyError::DuplicateCard {
                    card: CardId::new("B").unwrap(),
                    count: 2
                },
                VerifyError::DuplicateColumn {
                    column: col("mon"),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn empty_board_passes() {
        assert!(verify_board(&Board::default()).ok);
    }

    #[test]
    fn conserved_after_relocation() {
        let board = Board::new(vec![
            Column::new(col("mon")).with_cards(vec![c("A"), c("B")]),
            Column::new(col("tue")),
        ])
        .unwrap();
        let moved = board
            .relocate(&CardId::new("A").unwrap(), &crate::core::types::Slot::new(col("tue"), 0))
            .unwrap();
        assert!(verify_conserved(&board, &moved).ok);
    }

    #[test]
    fn lost_and_appeared_cards_reported() {
        let before = Board::new(vec![Column::new(col("mon")).with_cards(vec![c("A")])]).unwrap();
        let after = Board::new(vec![Column::new(col("mon")).with_cards(vec![c("B")])]).unwrap();
        let result = verify_conserved(&before, &after);
        assert!(!result.ok);
        assert_eq!(
            result.errors,
            vec![
                VerifyError::CardLost(CardId::new("A").unwrap()),
                VerifyError::CardAppeared(CardId::new("B").unwrap()),
            ]
        );
    }
}
