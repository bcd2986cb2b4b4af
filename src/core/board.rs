//! core::board
//!
//! The board model: columns holding ordered cards.
//!
//! # Invariants
//!
//! - Column ids are unique
//! - Every card id appears in exactly one column, at exactly one index
//! - A column's indices are `0..n-1` (guaranteed by `Vec`)
//!
//! [`Board::new`] refuses input that violates these, and every derivation
//! ([`Board::apply`]) returns a fresh snapshot that still satisfies them.
//! A snapshot is never mutated in place once handed out.
//!
//! # Example
//!
//! ```
//! use weekboard::core::board::{Board, Card, Column};
//! use weekboard::core::ops::{Operation, ReorderOperation};
//! use weekboard::core::types::{CardId, ColumnId};
//!
//! let mon = ColumnId::new("mon").unwrap();
//! let board = Board::new(vec![Column::new(mon.clone())
//!     .with_cards(vec![
//!         Card::new(CardId::new("A").unwrap(), "Write report"),
//!         Card::new(CardId::new("B").unwrap(), "Call bank"),
//!     ])])
//! .unwrap();
//!
//! let next = board
//!     .apply(&Operation::Reorder(ReorderOperation {
//!         card_id: CardId::new("B").unwrap(),
//!         column: mon.clone(),
//!         from_index: 1,
//!         to_index: 0,
//!     }))
//!     .unwrap();
//!
//! assert_eq!(next.card_ids(&mon), vec!["B", "A"]);
//! assert_eq!(board.card_ids(&mon), vec!["A", "B"]);
//! ```

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ops::Operation;
use super::types::{CardId, ColumnId, Fingerprint, Slot};

/// Errors from building or deriving boards.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("duplicate column id: {0}")]
    DuplicateColumn(ColumnId),

    #[error("duplicate card id: {0}")]
    DuplicateCard(CardId),

    #[error("column not found: {0}")]
    ColumnNotFound(ColumnId),

    #[error("card not found: {0}")]
    CardNotFound(CardId),

    #[error("card {card} is not at {expected} (found at {actual})")]
    StalePosition {
        card: CardId,
        expected: Slot,
        actual: Slot,
    },

    #[error("card {card} dated {date} is outside the week starting {week_start}")]
    OutsideWeek {
        card: CardId,
        date: NaiveDate,
        week_start: NaiveDate,
    },
}

/// A single movable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub disabled: bool,
}

impl Card {
    /// Create a card with default flags.
    pub fn new(id: CardId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            metadata: None,
            color: None,
            pinned: false,
            disabled: false,
        }
    }

    /// Stable identity of this card.
    pub fn id(&self) -> &CardId {
        &self.id
    }

    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// An ordered container of cards, one calendar day on a week board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<Card>,
}

impl Column {
    /// Create an empty column.
    ///
    /// The date defaults to the id when it parses as an ISO date, and to
    /// the Unix epoch otherwise.
    pub fn new(id: ColumnId) -> Self {
        let date = NaiveDate::parse_from_str(id.as_str(), "%Y-%m-%d")
            .unwrap_or(NaiveDate::default());
        Self {
            id,
            date,
            title: None,
            items: Vec::new(),
        }
    }

    /// Create an empty column for a calendar day.
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            id: ColumnId::for_date(date),
            date,
            title: Some(weekday_name(date.weekday()).to_string()),
            items: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.items = cards;
        self
    }

    /// Number of cards.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of a card in this column.
    pub fn position(&self, card: &CardId) -> Option<usize> {
        self.items.iter().position(|c| &c.id == card)
    }

    /// Label shown to users: the title if set, otherwise the id.
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(self.id.as_str())
    }
}

/// An immutable snapshot of all columns and their cards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawBoard")]
pub struct Board {
    columns: Vec<Column>,
}

/// Unchecked wire form of a board.
#[derive(Deserialize)]
struct RawBoard {
    columns: Vec<Column>,
}

impl TryFrom<RawBoard> for Board {
    type Error = BoardError;

    fn try_from(raw: RawBoard) -> Result<Self, Self::Error> {
        Board::new(raw.columns)
    }
}

fn check_unique(columns: &[Column]) -> Result<(), BoardError> {
    let mut column_ids = HashSet::new();
    let mut card_ids = HashSet::new();
    for column in columns {
        if !column_ids.insert(&column.id) {
            return Err(BoardError::DuplicateColumn(column.id.clone()));
        }
        for card in &column.items {
            if !card_ids.insert(&card.id) {
                return Err(BoardError::DuplicateCard(card.id.clone()));
            }
        }
    }
    Ok(())
}

impl Board {
    /// Build a board, checking the placement invariants.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::DuplicateColumn` or `BoardError::DuplicateCard`
    /// if an id appears twice.
    pub fn new(columns: Vec<Column>) -> Result<Self, BoardError> {
        check_unique(&columns)?;
        Ok(Self { columns })
    }

    /// Seven empty day columns, Monday through Sunday, for the week
    /// containing `date`.
    pub fn week_of(date: NaiveDate) -> Self {
        let start = week_start(date);
        let columns = (0..7)
            .map(|offset| Column::for_date(start + Duration::days(offset)))
            .collect();
        Self { columns }
    }

    /// A week board with dated cards placed in their day column, in the
    /// order given.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::OutsideWeek` for a card dated outside the week,
    /// and `BoardError::DuplicateCard` for repeated ids.
    pub fn from_dated(
        date: NaiveDate,
        cards: impl IntoIterator<Item = (NaiveDate, Card)>,
    ) -> Result<Self, BoardError> {
        let mut board = Self::week_of(date);
        let start = week_start(date);
        for (day, card) in cards {
            let offset = (day - start).num_days();
            if !(0..7).contains(&offset) {
                return Err(BoardError::OutsideWeek {
                    card: card.id,
                    date: day,
                    week_start: start,
                });
            }
            board.columns[offset as usize].items.push(card);
        }
        Self::new(board.columns)
    }

    /// All columns in board order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column.
    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }

    /// Position of a column in board order.
    pub fn column_index(&self, id: &ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| &c.id == id)
    }

    /// Find where a card currently sits.
    pub fn locate(&self, card: &CardId) -> Option<Slot> {
        self.columns.iter().find_map(|column| {
            column
                .position(card)
                .map(|index| Slot::new(column.id.clone(), index))
        })
    }

    /// Look up a card.
    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.columns
            .iter()
            .flat_map(|c| c.items.iter())
            .find(|c| &c.id == id)
    }

    /// The card at a slot, if any.
    pub fn card_at(&self, slot: &Slot) -> Option<&Card> {
        self.column(&slot.column)
            .and_then(|c| c.items.get(slot.index))
    }

    /// Card ids of a column in order (empty for unknown columns).
    pub fn card_ids(&self, column: &ColumnId) -> Vec<&str> {
        self.column(column)
            .map(|c| c.items.iter().map(|card| card.id.as_str()).collect())
            .unwrap_or_default()
    }

    /// Total number of cards.
    pub fn card_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    /// Placement fingerprint of this snapshot.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(
            self.columns
                .iter()
                .map(|c| (&c.id, c.items.iter().map(|card| &card.id))),
        )
    }

    /// Derive the snapshot that results from `op`, checking that the card
    /// is where the operation says it is.
    ///
    /// # Errors
    ///
    /// - `BoardError::CardNotFound` if the card is not on the board
    /// - `BoardError::ColumnNotFound` if the target column does not exist
    /// - `BoardError::StalePosition` if the card is not at the source slot
    pub fn apply(&self, op: &Operation) -> Result<Board, BoardError> {
        let actual = self
            .locate(op.card_id())
            .ok_or_else(|| BoardError::CardNotFound(op.card_id().clone()))?;
        let expected = op.source();
        if actual != expected {
            return Err(BoardError::StalePosition {
                card: op.card_id().clone(),
                expected,
                actual,
            });
        }
        self.relocate(op.card_id(), &op.target())
    }

    /// Derive the snapshot with `card` appended to `column`.
    ///
    /// # Errors
    ///
    /// - `BoardError::ColumnNotFound` if the column does not exist
    /// - `BoardError::DuplicateCard` if the id is already on the board
    pub fn insert_card(&self, column: &ColumnId, card: Card) -> Result<Board, BoardError> {
        if self.locate(&card.id).is_some() {
            return Err(BoardError::DuplicateCard(card.id));
        }
        let at = self
            .column_index(column)
            .ok_or_else(|| BoardError::ColumnNotFound(column.clone()))?;
        let mut columns = self.columns.clone();
        columns[at].items.push(card);
        Ok(Board { columns })
    }

    /// Derive the snapshot that results from moving a card to `target`,
    /// wherever the card currently is.
    ///
    /// Used to replay pending operations on a newer confirmed snapshot,
    /// where source indices may have shifted.
    ///
    /// # Errors
    ///
    /// - `BoardError::CardNotFound` if the card is not on the board
    /// - `BoardError::ColumnNotFound` if the target column does not exist
    pub fn relocate(&self, card: &CardId, target: &Slot) -> Result<Board, BoardError> {
        let from = self
            .locate(card)
            .ok_or_else(|| BoardError::CardNotFound(card.clone()))?;
        let to_column = self
            .column_index(&target.column)
            .ok_or_else(|| BoardError::ColumnNotFound(target.column.clone()))?;
        // locate() found the column, so the index lookup cannot miss
        let from_column = self
            .column_index(&from.column)
            .ok_or_else(|| BoardError::ColumnNotFound(from.column.clone()))?;

        let mut columns = self.columns.clone();
        let moved = columns[from_column].items.remove(from.index);
        let items = &mut columns[to_column].items;
        let index = target.index.min(items.len());
        items.insert(index, moved);

        Ok(Board { columns })
    }
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
